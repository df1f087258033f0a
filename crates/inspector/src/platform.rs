use platform_linux::LinuxProbe;
use platform_macos::MacosProbe;
use platform_windows::WindowsProbe;
use posture::{PostureProbe, UnsupportedProbe};

use crate::config::InspectorConfig;

/// OS family the inspector is running on, detected once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostPlatform {
    Linux,
    Macos,
    Windows,
    Other(String),
}

impl HostPlatform {
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => Self::Linux,
            "macos" => Self::Macos,
            "windows" => Self::Windows,
            other => Self::Other(other.to_string()),
        }
    }

    /// GOOS-style name used in every record.
    pub fn name(&self) -> &str {
        match self {
            Self::Linux => platform_linux::PLATFORM,
            Self::Macos => platform_macos::PLATFORM,
            Self::Windows => platform_windows::PLATFORM,
            Self::Other(os) => os,
        }
    }

    pub fn probe(&self, config: &InspectorConfig) -> Box<dyn PostureProbe> {
        match self {
            Self::Linux => Box::new(LinuxProbe::new(config.linux.clone())),
            Self::Macos => Box::new(MacosProbe::new()),
            Self::Windows => Box::new(WindowsProbe::new()),
            Self::Other(os) => Box::new(UnsupportedProbe::new(os.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use posture::Feature;

    use super::*;

    #[test]
    fn os_names_map_to_goos_style_platforms() {
        assert_eq!(HostPlatform::from_os("linux").name(), "linux");
        assert_eq!(HostPlatform::from_os("macos").name(), "darwin");
        assert_eq!(HostPlatform::from_os("windows").name(), "windows");
        assert_eq!(HostPlatform::from_os("freebsd").name(), "freebsd");
    }

    #[test]
    fn unknown_os_gets_a_closed_gate() {
        let probe = HostPlatform::from_os("illumos").probe(&InspectorConfig::default());
        assert_eq!(probe.platform(), "illumos");
        for feature in Feature::ALL {
            assert!(!probe.is_supported(feature));
        }
    }

    #[test]
    fn probe_platform_matches_host_name() {
        let config = InspectorConfig::default();
        for os in ["linux", "macos", "windows"] {
            let host = HostPlatform::from_os(os);
            assert_eq!(host.probe(&config).platform(), host.name());
        }
    }
}
