use posture::{
    looks_privilege_denied, BootMode, BootStatus, CommandRunner, Result, SecureBootType,
    REQUIRES_ELEVATION,
};

use crate::shell::{parse_reg_dword, reg_query, run_powershell};
use crate::PLATFORM;

pub const SECURE_BOOT_STATE_KEY: &str =
    r"HKLM\SYSTEM\CurrentControlSet\Control\SecureBoot\State";
pub const SECURE_BOOT_STATE_VALUE: &str = "UEFISecureBootEnabled";

const CONFIRM_SECURE_BOOT: &str = "Confirm-SecureBootUEFI -ErrorAction Stop";

fn uefi(enabled: bool, details: &str) -> BootStatus {
    let mode = if enabled {
        BootMode::Enabled
    } else {
        BootMode::Disabled
    };
    BootStatus::new(PLATFORM, SecureBootType::Uefi, enabled, mode, details)
}

pub fn boot_status_from_registry(value: u32) -> BootStatus {
    if value == 1 {
        uefi(true, "UEFI Secure Boot is enabled")
    } else {
        uefi(false, "UEFI Secure Boot is disabled")
    }
}

/// Interpret `Confirm-SecureBootUEFI` output; the cmdlet writes a bare
/// `True`/`False` or fails with an explanatory error.
pub fn boot_status_from_confirm(success: bool, stdout: &str, stderr: &str) -> BootStatus {
    if success {
        return match stdout.trim() {
            s if s.eq_ignore_ascii_case("true") => uefi(true, "UEFI Secure Boot is enabled"),
            s if s.eq_ignore_ascii_case("false") => uefi(false, "UEFI Secure Boot is disabled"),
            _ => BootStatus::new(
                PLATFORM,
                SecureBootType::Uefi,
                false,
                BootMode::Unknown,
                "Unrecognised Confirm-SecureBootUEFI output",
            ),
        };
    }
    if stderr.to_ascii_lowercase().contains("not supported on this platform") {
        return BootStatus::new(
            PLATFORM,
            SecureBootType::None,
            false,
            BootMode::LegacyBios,
            "System booted in Legacy BIOS mode",
        );
    }
    let details = if looks_privilege_denied(stderr) {
        format!("Secure Boot state {REQUIRES_ELEVATION}")
    } else {
        "Unable to determine Secure Boot state".to_string()
    };
    BootStatus::new(PLATFORM, SecureBootType::Uefi, false, BootMode::Unknown, details)
}

pub(crate) fn detect(runner: &dyn CommandRunner) -> Result<BootStatus> {
    let registry = reg_query(runner, SECURE_BOOT_STATE_KEY, SECURE_BOOT_STATE_VALUE)?;
    if let Some(value) = registry
        .as_deref()
        .and_then(|out| parse_reg_dword(out, SECURE_BOOT_STATE_VALUE))
    {
        return Ok(boot_status_from_registry(value));
    }

    tracing::debug!("SecureBoot state key missing; asking Confirm-SecureBootUEFI");
    let output = run_powershell(runner, CONFIRM_SECURE_BOOT)?;
    Ok(boot_status_from_confirm(
        output.success,
        &output.stdout,
        &output.stderr,
    ))
}
