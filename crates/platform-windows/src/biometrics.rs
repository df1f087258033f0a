use posture::{BiometricStatus, CommandRunner, Modality, Result};
use serde::Deserialize;

use crate::shell::{parse_json_rows, parse_reg_dwords, reg_query_recursive, run_powershell};
use crate::PLATFORM;

const BIOMETRIC_DEVICES_QUERY: &str = "Get-PnpDevice -Class Biometric,Camera -PresentOnly \
     -ErrorAction SilentlyContinue | Select-Object Class,FriendlyName,Status \
     | ConvertTo-Json -Compress";

pub const WINBIO_ACCOUNT_INFO_KEY: &str =
    r"HKLM\SOFTWARE\Microsoft\Windows\CurrentVersion\WinBio\AccountInfo";
const ENROLLED_FACTORS: &str = "EnrolledFactors";

pub const FACTOR_FACIAL_FEATURES: u32 = 0x02;
pub const FACTOR_FINGERPRINT: u32 = 0x08;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensor {
    Fingerprint,
    Face,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PnpDevice {
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    friendly_name: Option<String>,
}

fn is_ir_camera(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.contains("infrared")
        || lower.contains("hello")
        || lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| word == "ir")
}

/// Map a PnP device onto a Windows Hello sensor kind.
pub fn classify_device(class: &str, friendly_name: &str) -> Option<Sensor> {
    if class.eq_ignore_ascii_case("Biometric") {
        let lower = friendly_name.to_ascii_lowercase();
        if lower.contains("face") || is_ir_camera(friendly_name) {
            Some(Sensor::Face)
        } else {
            Some(Sensor::Fingerprint)
        }
    } else if class.eq_ignore_ascii_case("Camera") && is_ir_camera(friendly_name) {
        Some(Sensor::Face)
    } else {
        None
    }
}

/// OR of every per-account `EnrolledFactors` value.
pub fn enrolled_factors(reg_output: &str) -> u32 {
    parse_reg_dwords(reg_output, ENROLLED_FACTORS)
        .into_iter()
        .fold(0, |acc, flags| acc | flags)
}

pub(crate) fn detect(runner: &dyn CommandRunner) -> Result<BiometricStatus> {
    let output = run_powershell(runner, BIOMETRIC_DEVICES_QUERY)?;
    let devices: Vec<PnpDevice> = if output.success {
        parse_json_rows("PnP biometric devices", &output.stdout)?
    } else {
        tracing::debug!(code = ?output.code, "PnP biometric query failed");
        Vec::new()
    };

    let sensors: Vec<Sensor> = devices
        .iter()
        .filter_map(|device| {
            classify_device(
                device.class.as_deref().unwrap_or_default(),
                device.friendly_name.as_deref().unwrap_or_default(),
            )
        })
        .collect();

    let factors = match reg_query_recursive(runner, WINBIO_ACCOUNT_INFO_KEY, ENROLLED_FACTORS) {
        Ok(Some(out)) => enrolled_factors(&out),
        Ok(None) => 0,
        Err(err) => {
            tracing::debug!(error = %err, "WinBio enrollment query failed");
            0
        }
    };

    Ok(BiometricStatus::new(
        PLATFORM,
        Modality::new(
            sensors.contains(&Sensor::Fingerprint),
            factors & FACTOR_FINGERPRINT != 0,
        ),
        Modality::new(
            sensors.contains(&Sensor::Face),
            factors & FACTOR_FACIAL_FEATURES != 0,
        ),
    ))
}
