use std::fs;
use std::path::Path;

use posture::{decode_tcg_vendor_id, describe_tcg_vendor, ChipStatus, ChipType, Result};

use crate::sysfs::{list_dir, read_trimmed};
use crate::{LinuxProbeOptions, PLATFORM};

/// Fields of the legacy `device/caps` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TpmCaps {
    pub manufacturer: Option<String>,
    pub tcg_version: Option<String>,
}

pub fn parse_tpm_caps(contents: &str) -> TpmCaps {
    let mut caps = TpmCaps::default();
    for line in contents.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim() {
            "Manufacturer" => {
                let hex = value.trim_start_matches("0x").trim_start_matches("0X");
                caps.manufacturer = u32::from_str_radix(hex, 16)
                    .ok()
                    .and_then(decode_tcg_vendor_id)
                    .or_else(|| Some(value.to_string()));
            }
            "TCG version" => caps.tcg_version = Some(value.to_string()),
            _ => {}
        }
    }
    caps
}

fn is_tpm_device(name: &str) -> bool {
    name.starts_with("tpm") && !name.starts_with("tpmrm")
}

pub(crate) fn detect(opts: &LinuxProbeOptions) -> Result<ChipStatus> {
    let Some(entries) = list_dir(&opts.tpm_class_path)? else {
        return Ok(ChipStatus::absent(PLATFORM));
    };
    let Some(device) = entries.into_iter().find(|name| is_tpm_device(name)) else {
        return Ok(ChipStatus::absent(PLATFORM));
    };
    let device_dir = opts.tpm_class_path.join(&device);
    let caps = read_trimmed(&device_dir.join("device/caps"))
        .map(|raw| parse_tpm_caps(&raw))
        .unwrap_or_default();

    let major = read_trimmed(&device_dir.join("tpm_version_major")).or_else(|| {
        caps.tcg_version
            .as_deref()
            .and_then(|v| v.split('.').next())
            .map(str::to_string)
    });
    let minor = read_trimmed(&device_dir.join("tpm_version_minor"));
    let chip_type = major
        .as_deref()
        .map(ChipType::from_tpm_major)
        .unwrap_or(ChipType::Tpm12);
    let version = match (&major, &minor, &caps.tcg_version) {
        (Some(major), Some(minor), _) => format!("TPM {major}.{minor}"),
        (_, _, Some(tcg)) => format!("TPM {tcg}"),
        _ if chip_type == ChipType::Tpm20 => "TPM 2.0".to_string(),
        _ => "TPM 1.2".to_string(),
    };

    let manufacturer = caps
        .manufacturer
        .clone()
        .or_else(|| read_trimmed(&device_dir.join("device/vendor")))
        .map(|code| describe_tcg_vendor(&code))
        .unwrap_or_else(|| "Unknown".to_string());

    let enabled = device_accessible(&opts.dev_path.join(&device))
        && !firmware_disabled(&device_dir);

    tracing::debug!(
        device = %device,
        chip_type = chip_type.as_str(),
        enabled,
        "tpm device found"
    );
    Ok(ChipStatus::tpm(
        PLATFORM,
        chip_type,
        version,
        manufacturer,
        enabled,
        true,
    ))
}

fn device_accessible(node: &Path) -> bool {
    fs::metadata(node).is_ok()
}

// TPM 1.2 drivers expose `enabled`/`active` flags that can be cleared in firmware.
fn firmware_disabled(device_dir: &Path) -> bool {
    ["device/enabled", "device/active"]
        .iter()
        .filter_map(|attr| read_trimmed(&device_dir.join(attr)))
        .any(|value| value == "0")
}
