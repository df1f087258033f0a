use std::fs;
use std::io;
use std::path::Path;

use posture::{DetectionError, Result};

pub(crate) fn is_absent_or_denied(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
    )
}

pub(crate) fn io_error(path: &Path, source: io::Error) -> DetectionError {
    DetectionError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub(crate) fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

/// Read a text attribute; NotFound and PermissionDenied read as `None`.
pub(crate) fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if is_absent_or_denied(&err) => Ok(None),
        Err(err) => Err(io_error(path, err)),
    }
}

/// Sorted entry names of a directory, or `None` when it is absent or unreadable.
pub(crate) fn list_dir(path: &Path) -> Result<Option<Vec<String>>> {
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(err) if is_absent_or_denied(&err) => {
            tracing::debug!(path = %path.display(), error = %err, "directory unavailable");
            return Ok(None);
        }
        Err(err) => return Err(io_error(path, err)),
    };
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| io_error(path, err))?;
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    names.sort();
    Ok(Some(names))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub source: String,
    pub target: String,
}

/// Parse a `/proc/self/mounts` style table, decoding `\040`-style escapes.
pub fn parse_mounts(contents: &str) -> Vec<MountEntry> {
    contents
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let source = fields.next()?;
            let target = fields.next()?;
            Some(MountEntry {
                source: unescape_mount_field(source),
                target: unescape_mount_field(target),
            })
        })
        .collect()
}

fn unescape_mount_field(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] == b'\\' && idx + 3 < bytes.len() {
            let digits = &bytes[idx + 1..idx + 4];
            if digits.iter().all(|b| (b'0'..=b'7').contains(b)) {
                let value = digits
                    .iter()
                    .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
                if let Ok(value) = u8::try_from(value) {
                    out.push(value);
                    idx += 4;
                    continue;
                }
            }
        }
        out.push(bytes[idx]);
        idx += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// First mount target whose source is one of `sources`.
pub fn mount_point_for(mounts: &[MountEntry], sources: &[String]) -> Option<String> {
    mounts
        .iter()
        .find(|entry| sources.iter().any(|source| *source == entry.source))
        .map(|entry| entry.target.clone())
}
