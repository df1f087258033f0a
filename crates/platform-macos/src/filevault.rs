//! FileVault status via `fdesetup status`, with `diskutil info /` for the
//! root volume.

use posture::{
    run_probe_command, CommandRunner, EncryptionState, EncryptionStatus, EncryptionType, Result,
    Volume,
};

use crate::PLATFORM;

const DEFAULT_ROOT_VOLUME: &str = "Macintosh HD";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FdeVerdict {
    On,
    Encrypting,
    Decrypting,
    Off,
    Indeterminate,
}

pub fn classify_fdesetup(output: &str) -> FdeVerdict {
    if output.contains("FileVault is On") {
        if output.contains("Encryption in progress") {
            FdeVerdict::Encrypting
        } else if output.contains("Decryption in progress") {
            FdeVerdict::Decrypting
        } else {
            FdeVerdict::On
        }
    } else if output.contains("FileVault is Off") {
        FdeVerdict::Off
    } else {
        FdeVerdict::Indeterminate
    }
}

/// Fields of interest from `diskutil info /`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootVolumeInfo {
    pub volume_name: Option<String>,
    pub mount_point: Option<String>,
    pub filevault: Option<bool>,
}

pub fn parse_diskutil_info(output: &str) -> RootVolumeInfo {
    let mut info = RootVolumeInfo::default();
    for line in output.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "Volume Name" if !value.is_empty() => info.volume_name = Some(value.to_string()),
            "Mount Point" if !value.is_empty() => info.mount_point = Some(value.to_string()),
            "FileVault" => info.filevault = Some(value.starts_with("Yes")),
            _ => {}
        }
    }
    info
}

fn root_volume(info: Option<&RootVolumeInfo>, encrypted: bool, status: &str) -> Volume {
    let name = info
        .and_then(|i| i.volume_name.clone())
        .unwrap_or_else(|| DEFAULT_ROOT_VOLUME.to_string());
    let mount = info
        .and_then(|i| i.mount_point.clone())
        .or_else(|| Some("/".to_string()));
    Volume::new(name, encrypted, status).mounted_at(mount)
}

/// Combine the fdesetup verdict with the optional root volume description.
pub fn filevault_status(verdict: FdeVerdict, info: Option<&RootVolumeInfo>) -> EncryptionStatus {
    let build = |state, volumes, details: &str| {
        EncryptionStatus::new(PLATFORM, EncryptionType::Filevault, state, volumes, details)
    };
    match verdict {
        FdeVerdict::On => build(
            EncryptionState::Enabled,
            vec![root_volume(info, true, "encrypted")],
            "FileVault disk encryption is enabled",
        ),
        FdeVerdict::Encrypting => build(
            EncryptionState::Encrypting,
            vec![root_volume(info, true, "encrypting")],
            "FileVault encryption in progress",
        ),
        FdeVerdict::Decrypting => build(
            EncryptionState::Decrypting,
            vec![root_volume(info, true, "decrypting")],
            "FileVault decryption in progress",
        ),
        FdeVerdict::Off => {
            let volumes = info
                .map(|_| vec![root_volume(info, false, "not_encrypted")])
                .unwrap_or_default();
            build(
                EncryptionState::Disabled,
                volumes,
                "FileVault disk encryption is disabled",
            )
        }
        FdeVerdict::Indeterminate => match info.and_then(|i| i.filevault) {
            Some(true) => build(
                EncryptionState::Enabled,
                vec![root_volume(info, true, "encrypted")],
                "FileVault reported by diskutil",
            ),
            Some(false) => build(
                EncryptionState::Disabled,
                vec![root_volume(info, false, "not_encrypted")],
                "FileVault disabled according to diskutil",
            ),
            None => build(
                EncryptionState::Unknown,
                Vec::new(),
                "Unable to determine FileVault status (may require admin)",
            ),
        },
    }
}

pub(crate) fn detect(runner: &dyn CommandRunner) -> Result<EncryptionStatus> {
    let fde = run_probe_command(runner, "fdesetup", &["status"])?;
    let verdict = if fde.success {
        classify_fdesetup(&fde.stdout)
    } else {
        tracing::debug!(code = ?fde.code, "fdesetup status failed");
        FdeVerdict::Indeterminate
    };

    let info = match runner.run("diskutil", &["info", "/"]) {
        Ok(output) if output.success => Some(parse_diskutil_info(&output.stdout)),
        Ok(_) => None,
        Err(err) => {
            tracing::debug!(error = %err, "diskutil unavailable");
            None
        }
    };
    Ok(filevault_status(verdict, info.as_ref()))
}
