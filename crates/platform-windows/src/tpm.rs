use posture::{
    decode_tcg_vendor_id, describe_tcg_vendor, ChipStatus, ChipType, CommandRunner, Result,
};
use serde::Deserialize;

use crate::shell::{parse_json_rows, run_powershell};
use crate::PLATFORM;

const WIN32_TPM_QUERY: &str = "Get-CimInstance -Namespace root\\cimv2\\Security\\MicrosoftTpm \
     -ClassName Win32_Tpm -ErrorAction Stop | Select-Object IsActivated_InitialValue,\
     IsEnabled_InitialValue,ManufacturerId,ManufacturerIdTxt,SpecVersion | ConvertTo-Json -Compress";

const SECURITY_DEVICES_QUERY: &str = "Get-PnpDevice -Class SecurityDevices -PresentOnly \
     -ErrorAction SilentlyContinue | Select-Object FriendlyName,Status | ConvertTo-Json -Compress";

/// One row of `Win32_Tpm`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Win32Tpm {
    #[serde(rename = "IsActivated_InitialValue", default)]
    pub is_activated: Option<bool>,
    #[serde(rename = "IsEnabled_InitialValue", default)]
    pub is_enabled: Option<bool>,
    #[serde(default)]
    pub manufacturer_id: Option<u32>,
    #[serde(default)]
    pub manufacturer_id_txt: Option<String>,
    #[serde(default)]
    pub spec_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PnpDevice {
    #[serde(default)]
    friendly_name: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// `SpecVersion` is `"2.0, 0, 1.38"`; the first field is the family.
fn spec_family(spec_version: &str) -> &str {
    spec_version.split(',').next().unwrap_or_default().trim()
}

pub fn chip_from_win32_tpm(row: &Win32Tpm) -> ChipStatus {
    let spec = row.spec_version.as_deref().unwrap_or_default();
    let version = spec_family(spec);
    let chip_type = ChipType::from_tpm_major(version);
    let manufacturer = match row.manufacturer_id_txt.as_deref().map(str::trim) {
        Some(txt) if !txt.is_empty() => describe_tcg_vendor(txt),
        _ => match row.manufacturer_id {
            Some(id) => decode_tcg_vendor_id(id)
                .map(|code| describe_tcg_vendor(&code))
                .unwrap_or_else(|| format!("ID: {id}")),
            None => "Unknown".to_string(),
        },
    };
    let enabled = row.is_enabled.unwrap_or(false);
    ChipStatus::tpm(
        PLATFORM,
        chip_type,
        if version.is_empty() { "Unknown" } else { version },
        manufacturer,
        enabled,
        row.is_activated.unwrap_or(false),
    )
}

/// Presence and version from a PnP friendly name such as
/// `"Trusted Platform Module 2.0"`.
pub fn chip_from_security_device(friendly_name: &str, status_ok: bool) -> Option<ChipStatus> {
    let version = friendly_name
        .strip_prefix("Trusted Platform Module")?
        .trim()
        .to_string();
    let chip_type = ChipType::from_tpm_major(&version);
    let label = if version.is_empty() {
        format!("TPM (limited query, {})", posture::REQUIRES_ELEVATION)
    } else {
        format!("TPM {version} (limited query, {})", posture::REQUIRES_ELEVATION)
    };
    Some(ChipStatus::tpm(PLATFORM, chip_type, label, "Unknown", status_ok, status_ok))
}

pub(crate) fn detect(runner: &dyn CommandRunner) -> Result<ChipStatus> {
    let cim = run_powershell(runner, WIN32_TPM_QUERY)?;
    if cim.success {
        let rows: Vec<Win32Tpm> = parse_json_rows("Win32_Tpm", &cim.stdout)?;
        return Ok(rows
            .first()
            .map(chip_from_win32_tpm)
            .unwrap_or_else(|| ChipStatus::absent(PLATFORM)));
    }

    tracing::debug!(
        denied = cim.looks_privilege_denied(),
        "Win32_Tpm query failed; falling back to PnP security devices"
    );
    let pnp = run_powershell(runner, SECURITY_DEVICES_QUERY)?;
    if !pnp.success {
        return Ok(ChipStatus::absent(PLATFORM));
    }
    let devices: Vec<PnpDevice> = parse_json_rows("SecurityDevices", &pnp.stdout)?;
    Ok(devices
        .iter()
        .find_map(|device| {
            let name = device.friendly_name.as_deref()?;
            let ok = device.status.as_deref() == Some("OK");
            chip_from_security_device(name, ok)
        })
        .unwrap_or_else(|| ChipStatus::absent(PLATFORM)))
}
