use std::path::PathBuf;

use platform_linux::LinuxProbeOptions;
use posture::OutputFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectorConfig {
    pub format: OutputFormat,
    pub color: ColorChoice,
    pub parallel_probes: bool,
    /// `EnvFilter` directive; `None` falls back to `warn`.
    pub log_filter: Option<String>,
    pub linux: LinuxProbeOptions,
    /// File the settings were read from, if any.
    pub source: Option<PathBuf>,
}
