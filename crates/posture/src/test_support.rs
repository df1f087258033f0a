//! Scripted `CommandRunner` for detector tests.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::Mutex;

use crate::command::{CommandOutput, CommandRunner};

/// Replays canned outputs keyed by the full command line (`program arg1 arg2`).
///
/// Unscripted invocations fail with `NotFound`, the same way a missing tool
/// does on a real host.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: HashMap<String, CommandOutput>,
    fragments: Vec<(String, String, CommandOutput)>,
    missing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, command_line: &str, output: CommandOutput) -> Self {
        self.responses.insert(command_line.to_string(), output);
        self
    }

    pub fn on_stdout(self, command_line: &str, stdout: &str) -> Self {
        self.on(command_line, CommandOutput::ok(stdout))
    }

    pub fn on_failure(self, command_line: &str, code: i32, stderr: &str) -> Self {
        self.on(command_line, CommandOutput::failed(code, stderr))
    }

    /// Match any `program` invocation whose argument text contains `needle`.
    /// Used for long inline scripts; exact command lines win over fragments.
    pub fn when(mut self, program: &str, needle: &str, output: CommandOutput) -> Self {
        self.fragments
            .push((program.to_string(), needle.to_string(), output));
        self
    }

    /// Every invocation of `program` fails to spawn.
    pub fn missing(mut self, program: &str) -> Self {
        self.missing.insert(program.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn was_called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(line.clone());
        }

        if self.missing.contains(program) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{program}: not installed"),
            ));
        }
        if let Some(output) = self.responses.get(&line) {
            return Ok(output.clone());
        }
        let arg_text = args.join(" ");
        self.fragments
            .iter()
            .find(|(p, needle, _)| p == program && arg_text.contains(needle.as_str()))
            .map(|(_, _, output)| output.clone())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("unscripted command: {line}"))
            })
    }
}
