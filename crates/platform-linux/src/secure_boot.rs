use std::fs;
use std::io;

use posture::{BootMode, BootStatus, Result, SecureBootType};

use crate::sysfs::io_error;
use crate::{LinuxProbeOptions, PLATFORM};

/// EFI global variable vendor GUID shared by `SecureBoot` and `SetupMode`.
pub const EFI_GLOBAL_GUID: &str = "8be4df61-93ca-11d2-aa0d-00e098032b8c";

const SETUP_MODE_NOTE: &str = " (Setup Mode active - keys can be modified)";

/// efivarfs layout: 4-byte attribute header, then the value byte.
pub fn parse_efi_bool_variable(data: &[u8]) -> Option<bool> {
    data.get(4).map(|value| *value == 1)
}

/// Classify a raw `SecureBoot` variable. `SetupMode` only ever adds a note.
pub fn boot_status_from_efivar(secure_boot: &[u8], setup_mode: bool) -> BootStatus {
    let (enabled, mode, details) = match parse_efi_bool_variable(secure_boot) {
        Some(true) => (true, BootMode::Enabled, "UEFI Secure Boot is enabled"),
        Some(false) => (false, BootMode::Disabled, "UEFI Secure Boot is disabled"),
        None => (false, BootMode::Unknown, "Unable to parse Secure Boot variable"),
    };
    let mut details = details.to_string();
    if setup_mode {
        details.push_str(SETUP_MODE_NOTE);
    }
    BootStatus::new(PLATFORM, SecureBootType::Uefi, enabled, mode, details)
}

pub(crate) fn detect(opts: &LinuxProbeOptions) -> Result<BootStatus> {
    if let Err(err) = fs::metadata(&opts.efi_path) {
        if err.kind() == io::ErrorKind::NotFound {
            return Ok(BootStatus::new(
                PLATFORM,
                SecureBootType::None,
                false,
                BootMode::LegacyBios,
                "System booted in Legacy BIOS mode",
            ));
        }
        if err.kind() != io::ErrorKind::PermissionDenied {
            return Err(io_error(&opts.efi_path, err));
        }
    }

    let efivars = opts.efi_path.join("efivars");
    let secure_boot_path = efivars.join(format!("SecureBoot-{EFI_GLOBAL_GUID}"));
    let data = match fs::read(&secure_boot_path) {
        Ok(data) => data,
        Err(err) => {
            tracing::debug!(
                path = %secure_boot_path.display(),
                error = %err,
                "SecureBoot variable unreadable"
            );
            return Ok(BootStatus::new(
                PLATFORM,
                SecureBootType::Uefi,
                false,
                BootMode::Unknown,
                "Unable to read Secure Boot variable (may require root)",
            ));
        }
    };

    let setup_mode = fs::read(efivars.join(format!("SetupMode-{EFI_GLOBAL_GUID}")))
        .ok()
        .and_then(|raw| parse_efi_bool_variable(&raw))
        .unwrap_or(false);
    Ok(boot_status_from_efivar(&data, setup_mode))
}
