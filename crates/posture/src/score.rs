use std::thread;

use serde::{Deserialize, Serialize};

use crate::model::{
    BiometricStatus, BiometryType, BootMode, BootStatus, ChipStatus, ChipType, EncryptionState,
    EncryptionStatus, EncryptionType, Feature,
};
use crate::probe::PostureProbe;

pub const CATEGORY_POINTS: u8 = 25;

pub const REC_CHIP_ABSENT: &str = "Hardware security module (TPM/Secure Enclave) not detected";
pub const REC_CHIP_DISABLED: &str =
    "Enable the hardware security module (TPM) in firmware settings";
pub const REC_SECURE_BOOT: &str = "Enable Secure Boot for enhanced boot security";
pub const REC_BIOMETRICS_CONFIGURE: &str =
    "Configure biometric authentication for enhanced security";
pub const REC_BIOMETRICS_ABSENT: &str =
    "Biometric hardware not detected; consider a fingerprint reader or IR camera";

pub fn encryption_recommendation(encryption_type: EncryptionType) -> String {
    format!(
        "Enable {} to protect data at rest",
        encryption_type.product_name()
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Critical,
    NeedsImprovement,
    Fair,
    Good,
    Excellent,
}

impl OverallStatus {
    /// Descending threshold table; every score maps to exactly one bucket.
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= 100 => Self::Excellent,
            s if s >= 75 => Self::Good,
            s if s >= 50 => Self::Fair,
            s if s >= 25 => Self::NeedsImprovement,
            _ => Self::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::NeedsImprovement => "needs_improvement",
            Self::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipSummary {
    pub present: bool,
    pub enabled: bool,
    #[serde(rename = "type")]
    pub chip_type: ChipType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootSummary {
    pub enabled: bool,
    pub mode: BootMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionSummary {
    pub enabled: bool,
    #[serde(rename = "type")]
    pub encryption_type: EncryptionType,
    pub status: EncryptionState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiometricSummary {
    pub available: bool,
    pub configured: bool,
    #[serde(rename = "type")]
    pub biometry_type: BiometryType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecuritySummary {
    pub platform: String,
    pub overall_score: u8,
    pub overall_status: OverallStatus,
    pub tpm: Option<ChipSummary>,
    pub secure_boot: Option<BootSummary>,
    pub encryption: Option<EncryptionSummary>,
    pub biometrics: Option<BiometricSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
}

/// The four optional status records fed into the scorer.
///
/// `None` means the category was unsupported or its detector failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Findings {
    pub chip: Option<ChipStatus>,
    pub boot: Option<BootStatus>,
    pub encryption: Option<EncryptionStatus>,
    pub biometrics: Option<BiometricStatus>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryOptions {
    /// Run the four detectors on scoped threads instead of one after another.
    pub parallel: bool,
}

fn gated<T>(
    probe: &dyn PostureProbe,
    feature: Feature,
    query: impl FnOnce() -> crate::Result<T>,
) -> Option<T> {
    if !probe.is_supported(feature) {
        tracing::debug!(feature = %feature, "feature unsupported on this platform");
        return None;
    }
    match query() {
        Ok(record) => Some(record),
        Err(err) => {
            tracing::warn!(
                feature = %feature,
                error = %err,
                "detector failed; omitting category from summary"
            );
            None
        }
    }
}

/// Query every supported detector; a failing detector leaves its slot empty.
pub fn collect_findings(probe: &dyn PostureProbe, options: SummaryOptions) -> Findings {
    if !options.parallel {
        return Findings {
            chip: gated(probe, Feature::SecurityChip, || probe.security_chip()),
            boot: gated(probe, Feature::SecureBoot, || probe.secure_boot()),
            encryption: gated(probe, Feature::Encryption, || probe.encryption()),
            biometrics: gated(probe, Feature::Biometrics, || probe.biometrics()),
        };
    }

    thread::scope(|scope| {
        let chip = scope.spawn(|| gated(probe, Feature::SecurityChip, || probe.security_chip()));
        let boot = scope.spawn(|| gated(probe, Feature::SecureBoot, || probe.secure_boot()));
        let encryption = scope.spawn(|| gated(probe, Feature::Encryption, || probe.encryption()));
        let biometrics = scope.spawn(|| gated(probe, Feature::Biometrics, || probe.biometrics()));
        Findings {
            chip: join_detector(chip, Feature::SecurityChip),
            boot: join_detector(boot, Feature::SecureBoot),
            encryption: join_detector(encryption, Feature::Encryption),
            biometrics: join_detector(biometrics, Feature::Biometrics),
        }
    })
}

fn join_detector<T>(handle: thread::ScopedJoinHandle<'_, Option<T>>, feature: Feature) -> Option<T> {
    match handle.join() {
        Ok(record) => record,
        Err(_) => {
            tracing::warn!(feature = %feature, "detector thread panicked; omitting category");
            None
        }
    }
}

/// Pure, total scoring law over the collected findings.
pub fn score_findings(platform: &str, findings: &Findings) -> SecuritySummary {
    let mut score: u8 = 0;
    let mut recommendations = Vec::new();

    let tpm = findings.chip.as_ref().map(|chip| {
        if chip.fully_enabled() {
            score += CATEGORY_POINTS;
        } else if !chip.present {
            recommendations.push(REC_CHIP_ABSENT.to_string());
        } else {
            recommendations.push(REC_CHIP_DISABLED.to_string());
        }
        ChipSummary {
            present: chip.present,
            enabled: chip.enabled,
            chip_type: chip.chip_type,
        }
    });

    let secure_boot = findings.boot.as_ref().map(|boot| {
        if boot.enabled {
            score += CATEGORY_POINTS;
        } else {
            recommendations.push(REC_SECURE_BOOT.to_string());
        }
        BootSummary {
            enabled: boot.enabled,
            mode: boot.mode,
        }
    });

    let encryption = findings.encryption.as_ref().map(|enc| {
        if enc.enabled {
            score += CATEGORY_POINTS;
        } else {
            recommendations.push(encryption_recommendation(enc.encryption_type));
        }
        EncryptionSummary {
            enabled: enc.enabled,
            encryption_type: enc.encryption_type,
            status: enc.status,
        }
    });

    let biometrics = findings.biometrics.as_ref().map(|bio| {
        let available = bio.any_available();
        let configured = bio.any_enrolled();
        if configured {
            score += CATEGORY_POINTS;
        } else if available {
            recommendations.push(REC_BIOMETRICS_CONFIGURE.to_string());
        } else {
            recommendations.push(REC_BIOMETRICS_ABSENT.to_string());
        }
        BiometricSummary {
            available,
            configured,
            biometry_type: bio.biometry_type(),
        }
    });

    SecuritySummary {
        platform: platform.to_string(),
        overall_score: score,
        overall_status: OverallStatus::from_score(score),
        tpm,
        secure_boot,
        encryption,
        biometrics,
        recommendations,
    }
}

pub fn summarize(probe: &dyn PostureProbe) -> SecuritySummary {
    summarize_with(probe, SummaryOptions::default())
}

pub fn summarize_with(probe: &dyn PostureProbe, options: SummaryOptions) -> SecuritySummary {
    let findings = collect_findings(probe, options);
    let summary = score_findings(probe.platform(), &findings);
    tracing::info!(
        platform = %summary.platform,
        score = summary.overall_score,
        status = summary.overall_status.as_str(),
        recommendations = summary.recommendations.len(),
        "security summary computed"
    );
    summary
}
