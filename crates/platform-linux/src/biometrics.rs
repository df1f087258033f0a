use std::io;

use posture::{BiometricStatus, CommandOutput, CommandRunner, Modality, Result};

use crate::PLATFORM;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FprintdReport {
    pub device_found: bool,
    pub enrolled_fingers: usize,
}

/// Parse `fprintd-list <user>` output.
///
/// A device is reported by `found N devices` (N > 0) or a `Device at`/`Using
/// device` line; each enrolled finger is a ` - #N: <finger>` line.
pub fn fprintd_enrollment(output: &str) -> FprintdReport {
    let mut report = FprintdReport::default();
    for line in output.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("found ") {
            if let Some(count) = rest.split_whitespace().next() {
                if count.parse::<u32>().is_ok_and(|n| n > 0) {
                    report.device_found = true;
                }
            }
        } else if trimmed.starts_with("Device at") || trimmed.starts_with("Using device") {
            report.device_found = true;
        } else if let Some(rest) = trimmed.strip_prefix("- #") {
            let is_finger = rest
                .split_once(':')
                .is_some_and(|(idx, _)| idx.trim().parse::<u32>().is_ok());
            if is_finger {
                report.enrolled_fingers += 1;
            }
        }
    }
    report
}

/// Whether `howdy list` shows at least one stored face model.
pub fn howdy_enrollment(output: &str) -> bool {
    let mut lines = output.lines().map(str::trim);
    if !lines.any(|line| line.starts_with("Known face models")) {
        return false;
    }
    lines.any(|line| {
        line.split_whitespace()
            .next()
            .is_some_and(|id| id.parse::<u32>().is_ok())
    })
}

fn run_optional(runner: &dyn CommandRunner, program: &str, args: &[&str]) -> Option<CommandOutput> {
    match runner.run(program, args) {
        Ok(output) => Some(output),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(program, "biometric tool not installed");
            None
        }
        Err(err) => {
            tracing::debug!(program, error = %err, "biometric tool failed to start");
            None
        }
    }
}

fn fingerprint(runner: &dyn CommandRunner, user: Option<&str>) -> Modality {
    let args: Vec<&str> = user.into_iter().collect();
    let Some(output) = run_optional(runner, "fprintd-list", &args) else {
        return Modality::ABSENT;
    };
    let report = fprintd_enrollment(&output.combined());
    Modality::new(report.device_found, report.enrolled_fingers > 0)
}

fn face(runner: &dyn CommandRunner) -> Modality {
    let Some(output) = run_optional(runner, "howdy", &["list"]) else {
        return Modality::ABSENT;
    };
    if !output.success && output.looks_privilege_denied() {
        tracing::debug!("howdy list needs root; face enrollment unknown");
        return Modality::new(true, false);
    }
    Modality::new(true, howdy_enrollment(&output.stdout))
}

/// Absent tooling means absent hardware support, never a detection error.
pub(crate) fn detect(runner: &dyn CommandRunner, user: Option<&str>) -> Result<BiometricStatus> {
    Ok(BiometricStatus::new(
        PLATFORM,
        fingerprint(runner, user),
        face(runner),
    ))
}
