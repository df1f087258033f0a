use platform_linux::LinuxProbeOptions;
use posture::OutputFormat;

use super::types::{ColorChoice, InspectorConfig};

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            color: ColorChoice::Auto,
            parallel_probes: false,
            log_filter: None,
            linux: LinuxProbeOptions::default(),
            source: None,
        }
    }
}
