use posture::{run_probe_command, BootMode, BootStatus, CommandRunner, Result, SecureBootType};

use crate::{is_apple_silicon, PLATFORM};

pub const APPLE_SECURE_BOOT_POLICY_VAR: &str =
    "94b73556-2197-4702-82a8-3e1337dafbfb:AppleSecureBootPolicy";

/// Classify `bputil -d` output from an Apple Silicon Mac.
pub fn boot_status_from_bputil(output: &str) -> BootStatus {
    let (enabled, mode, details) = if output.contains("Full Security") {
        (true, BootMode::Full, "Full Security Mode")
    } else if output.contains("Reduced Security") {
        (true, BootMode::Reduced, "Reduced Security Mode")
    } else if output.contains("Permissive Security") {
        (false, BootMode::Permissive, "Permissive Security Mode")
    } else {
        (true, BootMode::Unknown, "Unrecognised bputil security mode")
    };
    let status = BootStatus::new(PLATFORM, SecureBootType::Apple, enabled, mode, details);
    match policy_version(output) {
        Some(version) => status.with_policy_version(version),
        None => status,
    }
}

fn policy_version(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .ends_with("Policy Version")
            .then(|| value.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Value byte of the T2 `AppleSecureBootPolicy` variable as printed by `nvram`.
pub fn parse_secure_boot_policy(output: &str) -> Option<u8> {
    let token = output.split_whitespace().last()?;
    let hex = token.strip_prefix('%')?;
    u8::from_str_radix(hex.get(..2)?, 16).ok()
}

pub fn boot_status_from_t2_policy(policy: Option<u8>) -> BootStatus {
    let (enabled, mode, details) = match policy {
        Some(2) => (true, BootMode::Full, "Full Security"),
        Some(1) => (true, BootMode::Medium, "Medium Security"),
        Some(0) => (false, BootMode::Disabled, "No Security"),
        _ => (false, BootMode::Unknown, "Unrecognised AppleSecureBootPolicy value"),
    };
    BootStatus::new(PLATFORM, SecureBootType::T2, enabled, mode, details)
}

pub(crate) fn detect(runner: &dyn CommandRunner) -> Result<BootStatus> {
    if is_apple_silicon(runner) {
        let output = run_probe_command(runner, "bputil", &["-d"])?;
        if !output.success {
            tracing::debug!(code = ?output.code, "bputil needs admin; assuming default policy");
            return Ok(BootStatus::new(
                PLATFORM,
                SecureBootType::Apple,
                true,
                BootMode::AssumedFull,
                "Apple Silicon default (verification requires admin)",
            ));
        }
        return Ok(boot_status_from_bputil(&output.stdout));
    }

    match runner.run("nvram", &[APPLE_SECURE_BOOT_POLICY_VAR]) {
        Ok(output) if output.success => {
            return Ok(boot_status_from_t2_policy(parse_secure_boot_policy(
                &output.stdout,
            )));
        }
        Ok(output) => {
            tracing::debug!(code = ?output.code, "AppleSecureBootPolicy not readable");
        }
        Err(err) => tracing::debug!(error = %err, "nvram unavailable"),
    }

    let profile = run_probe_command(runner, "system_profiler", &["SPiBridgeDataType"])?;
    if profile.success && profile.stdout.contains("T2") {
        Ok(BootStatus::new(
            PLATFORM,
            SecureBootType::T2,
            true,
            BootMode::AssumedEnabled,
            "T2 chip detected (verification requires admin)",
        ))
    } else {
        Ok(BootStatus::new(
            PLATFORM,
            SecureBootType::None,
            false,
            BootMode::Unavailable,
            "No T2 chip - Secure Boot not available",
        ))
    }
}
