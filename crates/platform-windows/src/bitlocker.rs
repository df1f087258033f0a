//! BitLocker state from `Win32_EncryptableVolume`.

use posture::{CommandRunner, EncryptionState, EncryptionStatus, EncryptionType, Result, Volume};
use serde::Deserialize;

use crate::shell::{parse_json_rows, run_powershell};
use crate::PLATFORM;

const ENCRYPTABLE_VOLUME_QUERY: &str = "Get-CimInstance -Namespace \
     root\\cimv2\\Security\\MicrosoftVolumeEncryption -ClassName Win32_EncryptableVolume \
     -ErrorAction Stop | Select-Object DeviceID,DriveLetter,ProtectionStatus,ConversionStatus \
     | ConvertTo-Json -Compress";

const PROTECTION_ON: u32 = 1;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EncryptableVolume {
    #[serde(rename = "DeviceID", default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub drive_letter: Option<String>,
    #[serde(default)]
    pub protection_status: Option<u32>,
    #[serde(default)]
    pub conversion_status: Option<u32>,
}

/// Per-volume status string from the conversion state of a protected volume.
pub fn conversion_label(conversion_status: Option<u32>) -> &'static str {
    match conversion_status {
        Some(1) => "encrypted",
        Some(2) => "encrypting",
        Some(3) => "decrypting",
        Some(4) => "encryption_paused",
        Some(5) => "decryption_paused",
        _ => "protected",
    }
}

pub fn volume_from_row(row: &EncryptableVolume) -> Volume {
    let letter = row
        .drive_letter
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty());
    let name = match (letter, row.device_id.as_deref()) {
        (Some(letter), _) => format!("Volume {letter}"),
        (None, Some(id)) => id.to_string(),
        (None, None) => "Volume".to_string(),
    };
    let protected = row.protection_status == Some(PROTECTION_ON);
    let status = if protected {
        conversion_label(row.conversion_status)
    } else {
        match row.conversion_status {
            Some(2) => "encrypting",
            Some(3) => "decrypting",
            _ => "not_encrypted",
        }
    };
    Volume::new(name, protected, status).mounted_at(letter.map(str::to_string))
}

pub fn bitlocker_status(rows: &[EncryptableVolume]) -> EncryptionStatus {
    let volumes: Vec<Volume> = rows.iter().map(volume_from_row).collect();
    let (state, details) = if volumes.iter().any(|v| v.encrypted) {
        (
            EncryptionState::Enabled,
            "BitLocker disk encryption is enabled on one or more volumes",
        )
    } else if volumes.iter().any(|v| v.status == "encrypting") {
        (EncryptionState::Encrypting, "BitLocker encryption in progress")
    } else if volumes.iter().any(|v| v.status == "decrypting") {
        (EncryptionState::Decrypting, "BitLocker decryption in progress")
    } else {
        (
            EncryptionState::Disabled,
            "BitLocker disk encryption is not enabled on any volume",
        )
    };
    EncryptionStatus::new(PLATFORM, EncryptionType::Bitlocker, state, volumes, details)
}

fn unknown() -> EncryptionStatus {
    EncryptionStatus::new(
        PLATFORM,
        EncryptionType::Bitlocker,
        EncryptionState::Unknown,
        Vec::new(),
        "Unable to query BitLocker status (may require admin privileges)",
    )
}

pub(crate) fn detect(runner: &dyn CommandRunner) -> Result<EncryptionStatus> {
    let output = run_powershell(runner, ENCRYPTABLE_VOLUME_QUERY)?;
    if !output.success {
        tracing::debug!(
            denied = output.looks_privilege_denied(),
            "Win32_EncryptableVolume query failed"
        );
        return Ok(unknown());
    }
    let rows: Vec<EncryptableVolume> =
        parse_json_rows("Win32_EncryptableVolume", &output.stdout)?;
    if rows.is_empty() {
        return Ok(unknown());
    }
    Ok(bitlocker_status(&rows))
}
