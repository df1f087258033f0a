use posture::OutputFormat;

use super::types::InspectorConfig;
use super::util::{env_non_empty, parse_bool, parse_color};

impl InspectorConfig {
    pub(super) fn apply_env_overrides(&mut self) {
        if let Some(v) = env_non_empty("HWPOSTURE_FORMAT") {
            if let Some(format) = OutputFormat::parse(&v) {
                self.format = format;
            }
        }
        if let Some(v) = env_non_empty("HWPOSTURE_COLOR") {
            if let Some(color) = parse_color(&v) {
                self.color = color;
            }
        }
        if let Some(v) = env_non_empty("HWPOSTURE_PARALLEL_PROBES") {
            self.parallel_probes = parse_bool(&v);
        }
        if let Some(v) = env_non_empty("HWPOSTURE_LOG") {
            self.log_filter = Some(v);
        }
        self.linux.apply_env();
    }
}
