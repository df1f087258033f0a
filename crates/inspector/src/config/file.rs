use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use posture::OutputFormat;
use serde::Deserialize;

use super::types::InspectorConfig;
use super::util::{non_empty, parse_color};

impl InspectorConfig {
    pub(super) fn apply_file_config(&mut self, path: &Path) -> Result<()> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed reading config file {}", path.display()))?;
        let file_cfg: FileConfig = toml::from_str(&raw)
            .with_context(|| format!("failed parsing TOML config {}", path.display()))?;

        self.apply_file_output(file_cfg.output);
        self.apply_file_probe(file_cfg.probe);
        self.apply_file_log(file_cfg.log);
        self.apply_file_linux(file_cfg.linux);
        self.source = Some(path.to_path_buf());
        Ok(())
    }

    fn apply_file_output(&mut self, output: Option<FileOutputConfig>) {
        let Some(output) = output else {
            return;
        };
        if let Some(format) = non_empty(output.format).and_then(|v| OutputFormat::parse(&v)) {
            self.format = format;
        }
        if let Some(color) = non_empty(output.color).and_then(|v| parse_color(&v)) {
            self.color = color;
        }
    }

    fn apply_file_probe(&mut self, probe: Option<FileProbeConfig>) {
        if let Some(parallel) = probe.and_then(|p| p.parallel) {
            self.parallel_probes = parallel;
        }
    }

    fn apply_file_log(&mut self, log: Option<FileLogConfig>) {
        if let Some(filter) = non_empty(log.and_then(|l| l.filter)) {
            self.log_filter = Some(filter);
        }
    }

    fn apply_file_linux(&mut self, linux: Option<FileLinuxConfig>) {
        let Some(linux) = linux else {
            return;
        };
        let opts = &mut self.linux;
        let overrides = [
            (linux.tpm_class_path, &mut opts.tpm_class_path),
            (linux.dev_path, &mut opts.dev_path),
            (linux.efi_path, &mut opts.efi_path),
            (linux.dev_mapper_path, &mut opts.dev_mapper_path),
            (linux.crypttab_path, &mut opts.crypttab_path),
            (linux.sys_block_path, &mut opts.sys_block_path),
            (linux.mounts_path, &mut opts.mounts_path),
        ];
        for (value, slot) in overrides {
            if let Some(path) = value.filter(|p| !p.as_os_str().is_empty()) {
                *slot = path;
            }
        }
        if let Some(user) = non_empty(linux.user) {
            opts.user = Some(user);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    output: Option<FileOutputConfig>,
    #[serde(default)]
    probe: Option<FileProbeConfig>,
    #[serde(default)]
    log: Option<FileLogConfig>,
    #[serde(default)]
    linux: Option<FileLinuxConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct FileOutputConfig {
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct FileProbeConfig {
    #[serde(default)]
    parallel: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct FileLogConfig {
    #[serde(default)]
    filter: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct FileLinuxConfig {
    #[serde(default)]
    tpm_class_path: Option<PathBuf>,
    #[serde(default)]
    dev_path: Option<PathBuf>,
    #[serde(default)]
    efi_path: Option<PathBuf>,
    #[serde(default)]
    dev_mapper_path: Option<PathBuf>,
    #[serde(default)]
    crypttab_path: Option<PathBuf>,
    #[serde(default)]
    sys_block_path: Option<PathBuf>,
    #[serde(default)]
    mounts_path: Option<PathBuf>,
    #[serde(default)]
    user: Option<String>,
}
