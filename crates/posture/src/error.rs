use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::model::Feature;

/// Hard failure of a detector query.
///
/// Feature absence and insufficient privilege are never reported through
/// this type; they are encoded inside the status record instead.
#[derive(Debug)]
pub enum DetectionError {
    Unsupported {
        feature: Feature,
        platform: String,
    },
    CommandUnavailable {
        program: String,
        source: io::Error,
    },
    CommandFailed {
        program: String,
        detail: String,
    },
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Parse {
        what: &'static str,
        detail: String,
    },
}

impl DetectionError {
    pub fn command_failed(program: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::CommandFailed {
            program: program.into(),
            detail: detail.into(),
        }
    }

    pub fn parse(what: &'static str, detail: impl Into<String>) -> Self {
        Self::Parse {
            what,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for DetectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported { feature, platform } => write!(
                f,
                "{} is not supported on this platform ({})",
                feature.display_name(),
                platform
            ),
            Self::CommandUnavailable { program, source } => {
                write!(f, "unable to run {}: {}", program, source)
            }
            Self::CommandFailed { program, detail } => {
                write!(f, "{} query failed: {}", program, detail)
            }
            Self::Io { path, source } => {
                write!(f, "failed reading {}: {}", path.display(), source)
            }
            Self::Parse { what, detail } => write!(f, "failed parsing {}: {}", what, detail),
        }
    }
}

impl std::error::Error for DetectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CommandUnavailable { source, .. } | Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DetectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_message_names_feature_and_platform() {
        let err = DetectionError::Unsupported {
            feature: Feature::Biometrics,
            platform: "freebsd".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Biometric authentication is not supported on this platform (freebsd)"
        );
    }

    #[test]
    fn command_unavailable_keeps_io_source() {
        let err = DetectionError::CommandUnavailable {
            program: "fdesetup".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().starts_with("unable to run fdesetup"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
