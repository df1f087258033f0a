use std::io;
use std::process::{Command, Stdio};

use crate::error::{DetectionError, Result};

/// Captured result of one external tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// stdout and stderr joined, for tools that report on either stream.
    pub fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
            (false, true) => self.stdout.clone(),
            (true, _) => self.stderr.clone(),
        }
    }

    /// Heuristic match for the privilege failures the native tools print.
    pub fn looks_privilege_denied(&self) -> bool {
        looks_privilege_denied(&self.combined())
    }
}

pub fn looks_privilege_denied(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    [
        "access denied",
        "access is denied",
        "permission denied",
        "operation not permitted",
        "must be run as root",
        "requires root",
        "not privileged",
        "elevated",
        "administrator",
        "0x80041003",
    ]
    .iter()
    .any(|needle| lower.contains(needle))
}

/// Process-spawning seam; detectors only ever talk to the OS through this.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        tracing::debug!(program, ?args, "running probe command");
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;
        let result = CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        if !result.success {
            tracing::debug!(program, code = ?result.code, "probe command exited non-zero");
        }
        Ok(result)
    }
}

/// Run a probe command, mapping a spawn failure to `CommandUnavailable`.
///
/// A non-zero exit is not an error here: callers decide whether it means
/// "absent", "needs privilege" or a hard failure.
pub fn run_probe_command(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[&str],
) -> Result<CommandOutput> {
    runner
        .run(program, args)
        .map_err(|source| DetectionError::CommandUnavailable {
            program: program.to_string(),
            source,
        })
}
