use std::path::{Path, PathBuf};

use anyhow::Result;

use super::util::env_non_empty;

pub(super) const CONFIG_ENV: &str = "HWPOSTURE_CONFIG";
const SYSTEM_CONFIG: &str = "/etc/hwposture/config.toml";
const CONFIG_RELATIVE: &str = "hwposture/config.toml";

fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(SYSTEM_CONFIG)];
    if let Some(xdg) = env_non_empty("XDG_CONFIG_HOME") {
        candidates.push(Path::new(&xdg).join(CONFIG_RELATIVE));
    }
    if let Some(home) = env_non_empty("HOME") {
        candidates.push(Path::new(&home).join(".config").join(CONFIG_RELATIVE));
    }
    candidates
}

/// An explicit path (flag, then `HWPOSTURE_CONFIG`) must exist; otherwise
/// the first existing candidate wins.
pub(crate) fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("configured --config does not exist: {}", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }

    if let Some(p) = env_non_empty(CONFIG_ENV) {
        let path = PathBuf::from(p.trim());
        if !path.exists() {
            anyhow::bail!("configured {} does not exist: {}", CONFIG_ENV, path.display());
        }
        return Ok(Some(path));
    }

    Ok(config_candidates().into_iter().find(|p| p.exists()))
}
