use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{DetectionError, Result};
use crate::model::{BiometricStatus, BootStatus, ChipStatus, EncryptionStatus, Feature};

/// One OS family's detectors plus its capability gate.
///
/// `is_supported` is a constant per implementation: no I/O, never fails.
/// Callers check it before invoking the matching detector; a detector for an
/// unsupported feature returns `DetectionError::Unsupported`.
pub trait PostureProbe: Send + Sync {
    /// GOOS-style platform name written into every record.
    fn platform(&self) -> &str;

    fn is_supported(&self, feature: Feature) -> bool;

    fn security_chip(&self) -> Result<ChipStatus>;

    fn secure_boot(&self) -> Result<BootStatus>;

    fn encryption(&self) -> Result<EncryptionStatus>;

    fn biometrics(&self) -> Result<BiometricStatus>;

    fn unsupported(&self, feature: Feature) -> DetectionError {
        DetectionError::Unsupported {
            feature,
            platform: self.platform().to_string(),
        }
    }
}

/// Fallback for operating systems without any detector implementation.
#[derive(Debug, Clone)]
pub struct UnsupportedProbe {
    platform: String,
}

impl UnsupportedProbe {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
        }
    }
}

impl PostureProbe for UnsupportedProbe {
    fn platform(&self) -> &str {
        &self.platform
    }

    fn is_supported(&self, _feature: Feature) -> bool {
        false
    }

    fn security_chip(&self) -> Result<ChipStatus> {
        Err(self.unsupported(Feature::SecurityChip))
    }

    fn secure_boot(&self) -> Result<BootStatus> {
        Err(self.unsupported(Feature::SecureBoot))
    }

    fn encryption(&self) -> Result<EncryptionStatus> {
        Err(self.unsupported(Feature::Encryption))
    }

    fn biometrics(&self) -> Result<BiometricStatus> {
        Err(self.unsupported(Feature::Biometrics))
    }
}

/// Result of a single-feature query, for callers that dispatch on `Feature`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FeatureRecord {
    SecurityChip(ChipStatus),
    SecureBoot(BootStatus),
    Encryption(EncryptionStatus),
    Biometrics(BiometricStatus),
}

impl FeatureRecord {
    pub fn feature(&self) -> Feature {
        match self {
            Self::SecurityChip(_) => Feature::SecurityChip,
            Self::SecureBoot(_) => Feature::SecureBoot,
            Self::Encryption(_) => Feature::Encryption,
            Self::Biometrics(_) => Feature::Biometrics,
        }
    }
}

/// Gate check followed by the detector query.
pub fn query_feature(probe: &dyn PostureProbe, feature: Feature) -> Result<FeatureRecord> {
    if !probe.is_supported(feature) {
        return Err(probe.unsupported(feature));
    }
    tracing::debug!(feature = %feature, platform = probe.platform(), "querying detector");
    match feature {
        Feature::SecurityChip => probe.security_chip().map(FeatureRecord::SecurityChip),
        Feature::SecureBoot => probe.secure_boot().map(FeatureRecord::SecureBoot),
        Feature::Encryption => probe.encryption().map(FeatureRecord::Encryption),
        Feature::Biometrics => probe.biometrics().map(FeatureRecord::Biometrics),
    }
}

/// Snapshot of the capability gate for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureGate {
    pub platform: String,
    pub features: BTreeMap<Feature, bool>,
}

/// The capability gate as a feature → bool map, in scoring order.
pub fn supported_features(probe: &dyn PostureProbe) -> FeatureGate {
    FeatureGate {
        platform: probe.platform().to_string(),
        features: Feature::ALL
            .iter()
            .map(|feature| (*feature, probe.is_supported(*feature)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_probe_refuses_every_feature() {
        let probe = UnsupportedProbe::new("freebsd");
        for feature in Feature::ALL {
            assert!(!probe.is_supported(feature));
            let err = query_feature(&probe, feature).unwrap_err();
            assert!(matches!(err, DetectionError::Unsupported { .. }));
            assert!(err.to_string().contains("freebsd"));
        }
    }

    #[test]
    fn gate_map_lists_features_in_order() {
        let probe = UnsupportedProbe::new("openbsd");
        let gate = supported_features(&probe);
        let order: Vec<Feature> = gate.features.keys().copied().collect();
        assert_eq!(order, Feature::ALL.to_vec());
        assert!(gate.features.values().all(|supported| !supported));

        let value = serde_json::to_value(&gate).expect("serialize");
        assert_eq!(value["platform"], "openbsd");
        assert_eq!(value["features"]["secure_boot"], false);
    }
}
