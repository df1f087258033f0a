use std::io;

use posture::{BiometricStatus, CommandRunner, Modality, Result};

use crate::PLATFORM;

/// `bioutil -r` prints the biometric configuration only when a sensor exists.
pub fn touch_id_available(output: &str) -> bool {
    output.lines().any(|line| {
        let line = line.trim();
        line.starts_with("Biometrics functionality") || line.starts_with("Unlock:")
    })
}

/// Total template count from `bioutil -c` output.
pub fn enrolled_template_count(output: &str) -> usize {
    output
        .lines()
        .filter(|line| line.contains("template"))
        .filter_map(|line| {
            line.split(|c: char| !c.is_ascii_digit())
                .filter(|chunk| !chunk.is_empty())
                .last()
                .and_then(|n| n.parse::<usize>().ok())
        })
        .sum()
}

pub(crate) fn detect(runner: &dyn CommandRunner) -> Result<BiometricStatus> {
    let available = match runner.run("bioutil", &["-r"]) {
        Ok(output) => output.success && touch_id_available(&output.stdout),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("bioutil not present; no Touch ID sensor");
            false
        }
        Err(err) => {
            tracing::debug!(error = %err, "bioutil failed to start");
            false
        }
    };

    let enrolled = available
        && match runner.run("bioutil", &["-c"]) {
            Ok(output) if output.success => enrolled_template_count(&output.stdout) > 0,
            _ => false,
        };

    // Face ID does not ship on any Mac.
    Ok(BiometricStatus::new(
        PLATFORM,
        Modality::new(available, enrolled),
        Modality::ABSENT,
    ))
}
