mod command;
mod error;
mod model;
mod probe;
pub mod render;
mod score;
#[cfg(feature = "test-support")]
pub mod test_support;

pub use command::{
    looks_privilege_denied, run_probe_command, CommandOutput, CommandRunner, SystemCommandRunner,
};
pub use error::{DetectionError, Result};
pub use model::{
    decode_tcg_vendor_id, describe_tcg_vendor, secure_enclave_capabilities, tcg_vendor_name,
    tpm_capabilities, BiometricStatus, BiometryType, BootMode, BootStatus, ChipStatus, ChipType,
    EncryptionState, EncryptionStatus, EncryptionType, Feature, Modality, SecureBootType, Volume,
};
pub use probe::{
    query_feature, supported_features, FeatureGate, FeatureRecord, PostureProbe, UnsupportedProbe,
};
pub use render::{render, OutputFormat, RenderTable, Theme};
pub use score::{
    collect_findings, encryption_recommendation, score_findings, summarize, summarize_with,
    BiometricSummary, BootSummary, ChipSummary, EncryptionSummary, Findings, OverallStatus,
    SecuritySummary, SummaryOptions, CATEGORY_POINTS, REC_BIOMETRICS_ABSENT,
    REC_BIOMETRICS_CONFIGURE, REC_CHIP_ABSENT, REC_CHIP_DISABLED, REC_SECURE_BOOT,
};

/// Details string used wherever a query was blocked by missing privilege.
pub const REQUIRES_ELEVATION: &str = "requires elevated privileges";
