use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use posture::{
    EncryptionState, EncryptionStatus, EncryptionType, Result, Volume, REQUIRES_ELEVATION,
};

use crate::sysfs::{io_error, list_dir, mount_point_for, parse_mounts, read_optional, read_trimmed, MountEntry};
use crate::{LinuxProbeOptions, PLATFORM};

const LUKS_MAGIC: [u8; 6] = [0x4C, 0x55, 0x4B, 0x53, 0xBA, 0xBE];
const DM_CRYPT_UUID_PREFIX: &str = "CRYPT-";

pub fn has_luks_magic(header: &[u8]) -> bool {
    header.starts_with(&LUKS_MAGIC)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrypttabEntry {
    pub name: String,
    pub device: String,
}

pub fn parse_crypttab(contents: &str) -> Vec<CrypttabEntry> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let name = fields.next()?;
            let device = fields.next()?;
            Some(CrypttabEntry {
                name: name.to_string(),
                device: device.to_string(),
            })
        })
        .collect()
}

/// Disks and partitions whose header is worth probing.
pub fn is_candidate_block_device(name: &str) -> bool {
    let prefixed = |prefix: &str| {
        name.strip_prefix(prefix)
            .is_some_and(|rest| rest.chars().next().is_some_and(|c| c.is_ascii_lowercase()))
    };
    if prefixed("sd") || prefixed("vd") || prefixed("xvd") || prefixed("hd") {
        return true;
    }
    // nvme0n1 / nvme0n1p2, not the nvme0 controller node.
    if let Some(rest) = name.strip_prefix("nvme") {
        return rest.contains('n') && rest.chars().all(|c| c.is_ascii_alphanumeric());
    }
    // mmcblk0 / mmcblk0p1, not mmcblk0boot0 or mmcblk0rpmb.
    if let Some(rest) = name.strip_prefix("mmcblk") {
        return !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit() || c == 'p');
    }
    false
}

struct ActiveCrypt {
    name: String,
    dm_node: String,
    backing: Vec<String>,
}

fn active_crypt_targets(opts: &LinuxProbeOptions) -> Result<Vec<ActiveCrypt>> {
    let Some(entries) = list_dir(&opts.sys_block_path)? else {
        return Ok(Vec::new());
    };
    let mut targets = Vec::new();
    for dm_node in entries.into_iter().filter(|name| name.starts_with("dm-")) {
        let dm_dir = opts.sys_block_path.join(&dm_node);
        let Some(uuid) = read_trimmed(&dm_dir.join("dm/uuid")) else {
            continue;
        };
        if !uuid.starts_with(DM_CRYPT_UUID_PREFIX) {
            continue;
        }
        let Some(name) = read_trimmed(&dm_dir.join("dm/name")) else {
            continue;
        };
        let backing = list_dir(&dm_dir.join("slaves"))?.unwrap_or_default();
        targets.push(ActiveCrypt {
            name,
            dm_node,
            backing,
        });
    }
    Ok(targets)
}

enum HeaderProbe {
    Luks,
    NotLuks,
    Denied,
}

fn probe_header(path: &Path) -> Result<HeaderProbe> {
    let mut header = [0u8; 6];
    let read = File::open(path).and_then(|mut file| file.read_exact(&mut header));
    match read {
        Ok(()) if has_luks_magic(&header) => Ok(HeaderProbe::Luks),
        Ok(()) => Ok(HeaderProbe::NotLuks),
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => Ok(HeaderProbe::Denied),
        Err(err)
            if matches!(
                err.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::UnexpectedEof
            ) =>
        {
            Ok(HeaderProbe::NotLuks)
        }
        // Removable media without a disc report ENOMEDIUM and similar; skip them.
        Err(err) if err.raw_os_error().is_some() => {
            tracing::debug!(path = %path.display(), error = %err, "skipping unreadable block device");
            Ok(HeaderProbe::NotLuks)
        }
        Err(err) => Err(io_error(path, err)),
    }
}

fn mapper_sources(opts: &LinuxProbeOptions, name: &str, dm_node: Option<&str>) -> Vec<String> {
    let mut sources = vec![
        format!("/dev/mapper/{name}"),
        opts.dev_mapper_path.join(name).display().to_string(),
    ];
    if let Some(node) = dm_node {
        sources.push(format!("/dev/{node}"));
    }
    sources
}

fn crypttab_backing_device(device: &str) -> Option<String> {
    device
        .strip_prefix("/dev/")
        .filter(|rest| !rest.contains('/'))
        .map(str::to_string)
}

/// Union of the three signals, keyed exactly: mapper name for active and
/// configured mappings, backing device name for header-probed devices.
pub(crate) fn detect(opts: &LinuxProbeOptions) -> Result<EncryptionStatus> {
    let mounts: Vec<MountEntry> = read_optional(&opts.mounts_path)?
        .map(|raw| parse_mounts(&raw))
        .unwrap_or_default();

    let mut volumes = Vec::new();
    let mut mapped_names = HashSet::new();
    let mut claimed_devices = HashSet::new();

    for target in active_crypt_targets(opts)? {
        let sources = mapper_sources(opts, &target.name, Some(&target.dm_node));
        let mount = mount_point_for(&mounts, &sources);
        claimed_devices.extend(target.backing.iter().cloned());
        mapped_names.insert(target.name.clone());
        volumes.push(Volume::new(target.name, true, "encrypted_active").mounted_at(mount));
    }

    if let Some(raw) = read_optional(&opts.crypttab_path)? {
        for entry in parse_crypttab(&raw) {
            if let Some(device) = crypttab_backing_device(&entry.device) {
                claimed_devices.insert(device);
            }
            if !mapped_names.insert(entry.name.clone()) {
                continue;
            }
            let active = fs::metadata(opts.dev_mapper_path.join(&entry.name)).is_ok();
            let status = if active {
                "configured_active"
            } else {
                "configured_inactive"
            };
            let mount = if active {
                mount_point_for(&mounts, &mapper_sources(opts, &entry.name, None))
            } else {
                None
            };
            volumes.push(Volume::new(entry.name, true, status).mounted_at(mount));
        }
    }

    let mut header_probe_denied = false;
    let candidates = list_dir(&opts.dev_path)?.unwrap_or_default();
    for device in candidates
        .into_iter()
        .filter(|name| is_candidate_block_device(name))
    {
        if claimed_devices.contains(&device) {
            continue;
        }
        match probe_header(&opts.dev_path.join(&device))? {
            HeaderProbe::Luks => {
                volumes.push(Volume::new(format!("{device} (LUKS)"), true, "luks_device"));
                claimed_devices.insert(device);
            }
            HeaderProbe::NotLuks => {}
            HeaderProbe::Denied => header_probe_denied = true,
        }
    }

    let status = if !volumes.is_empty() {
        EncryptionStatus::new(
            PLATFORM,
            EncryptionType::Luks,
            EncryptionState::Enabled,
            volumes,
            "LUKS/dm-crypt encryption detected",
        )
    } else if header_probe_denied {
        EncryptionStatus::new(
            PLATFORM,
            EncryptionType::Luks,
            EncryptionState::Unknown,
            volumes,
            format!("No active dm-crypt mappings found; block device header probe {REQUIRES_ELEVATION}"),
        )
    } else {
        EncryptionStatus::new(
            PLATFORM,
            EncryptionType::Luks,
            EncryptionState::Disabled,
            volumes,
            "No LUKS/dm-crypt encrypted volumes detected",
        )
    };
    tracing::debug!(
        volumes = status.volumes.len(),
        state = status.status.as_str(),
        "linux encryption scan complete"
    );
    Ok(status)
}
