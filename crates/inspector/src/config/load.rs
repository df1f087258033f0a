use std::path::Path;

use anyhow::Result;

use super::paths::resolve_config_path;
use super::types::InspectorConfig;
use crate::cli::Cli;

impl InspectorConfig {
    /// Defaults, then the TOML file, then `HWPOSTURE_*` variables.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(path) = resolve_config_path(explicit)? {
            cfg.apply_file_config(&path)?;
        }
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Command-line flags win over every other layer.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(format) = cli.format {
            self.format = format;
        }
        if let Some(color) = cli.color {
            self.color = color;
        }
    }
}
