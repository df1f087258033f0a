//! Status records produced by the feature detectors.
//!
//! Every record is built fresh per query and never mutated afterwards. The
//! constructors on each type are the only places that establish the record
//! invariants, so detectors should prefer them over struct literals.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The four security features a host is assessed on, in scoring order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    SecurityChip,
    SecureBoot,
    Encryption,
    Biometrics,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::SecurityChip,
        Feature::SecureBoot,
        Feature::Encryption,
        Feature::Biometrics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecurityChip => "security_chip",
            Self::SecureBoot => "secure_boot",
            Self::Encryption => "encryption",
            Self::Biometrics => "biometrics",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SecurityChip => "Platform security chip",
            Self::SecureBoot => "Secure Boot",
            Self::Encryption => "Disk encryption",
            Self::Biometrics => "Biometric authentication",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Security chip (TPM / Secure Enclave) ───────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChipType {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "tpm_1.2")]
    Tpm12,
    #[serde(rename = "tpm_2.0")]
    Tpm20,
    #[serde(rename = "secure_enclave")]
    SecureEnclave,
    #[serde(rename = "secure_enclave_t2")]
    SecureEnclaveT2,
}

impl ChipType {
    /// Classify a TPM from its major version string ("2", "1", "2.0", ...).
    pub fn from_tpm_major(major: &str) -> Self {
        if major.trim().starts_with('2') {
            Self::Tpm20
        } else {
            Self::Tpm12
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Tpm12 => "tpm_1.2",
            Self::Tpm20 => "tpm_2.0",
            Self::SecureEnclave => "secure_enclave",
            Self::SecureEnclaveT2 => "secure_enclave_t2",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Tpm12 => "TPM 1.2",
            Self::Tpm20 => "TPM 2.0",
            Self::SecureEnclave => "Secure Enclave",
            Self::SecureEnclaveT2 => "Secure Enclave (T2)",
        }
    }
}

pub const CAP_KEY_GENERATION: &str = "hardware_key_generation";
pub const CAP_KEY_STORAGE: &str = "hardware_key_storage";
pub const CAP_PLATFORM_INTEGRITY: &str = "platform_integrity";
pub const CAP_SECURE_BOOT_SUPPORT: &str = "secure_boot_support";
pub const CAP_ENHANCED_AUTHORIZATION: &str = "enhanced_authorization";
pub const CAP_ALGORITHM_AGILITY: &str = "algorithm_agility";
pub const CAP_BIOMETRIC_AUTHENTICATION: &str = "biometric_authentication";
pub const CAP_SECURE_BOOT: &str = "secure_boot";
pub const CAP_ENCRYPTED_MEMORY: &str = "encrypted_memory";

/// Capability list for a TPM, a pure function of enablement and version.
pub fn tpm_capabilities(enabled: bool, chip_type: ChipType) -> Vec<String> {
    if !enabled {
        return Vec::new();
    }
    let mut caps = vec![
        CAP_KEY_GENERATION,
        CAP_KEY_STORAGE,
        CAP_PLATFORM_INTEGRITY,
        CAP_SECURE_BOOT_SUPPORT,
    ];
    if chip_type == ChipType::Tpm20 {
        caps.push(CAP_ENHANCED_AUTHORIZATION);
        caps.push(CAP_ALGORITHM_AGILITY);
    }
    caps.into_iter().map(str::to_string).collect()
}

/// Capability list for an Apple Secure Enclave.
pub fn secure_enclave_capabilities(enabled: bool, chip_type: ChipType) -> Vec<String> {
    if !enabled {
        return Vec::new();
    }
    let mut caps = vec![
        CAP_KEY_GENERATION,
        CAP_KEY_STORAGE,
        CAP_BIOMETRIC_AUTHENTICATION,
        CAP_SECURE_BOOT,
    ];
    if chip_type == ChipType::SecureEnclave {
        caps.push(CAP_ENCRYPTED_MEMORY);
    }
    caps.into_iter().map(str::to_string).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipStatus {
    pub present: bool,
    pub enabled: bool,
    pub version: String,
    pub manufacturer: String,
    #[serde(rename = "type")]
    pub chip_type: ChipType,
    pub platform: String,
    pub capabilities: Vec<String>,
    pub hardware_key_support: bool,
}

impl ChipStatus {
    /// No security chip was found.
    pub fn absent(platform: impl Into<String>) -> Self {
        Self {
            present: false,
            enabled: false,
            version: "Not detected".to_string(),
            manufacturer: "Unknown".to_string(),
            chip_type: ChipType::None,
            platform: platform.into(),
            capabilities: Vec::new(),
            hardware_key_support: false,
        }
    }

    /// A TPM was found; capabilities follow from `enabled` and the version.
    pub fn tpm(
        platform: impl Into<String>,
        chip_type: ChipType,
        version: impl Into<String>,
        manufacturer: impl Into<String>,
        enabled: bool,
        hardware_key_support: bool,
    ) -> Self {
        Self {
            present: true,
            enabled,
            version: version.into(),
            manufacturer: manufacturer.into(),
            chip_type,
            platform: platform.into(),
            capabilities: tpm_capabilities(enabled, chip_type),
            hardware_key_support: enabled && hardware_key_support,
        }
    }

    /// A Secure Enclave answered the key probe.
    pub fn secure_enclave(platform: impl Into<String>, chip_type: ChipType) -> Self {
        let version = match chip_type {
            ChipType::SecureEnclave => "Secure Enclave (Apple Silicon)",
            _ => "Secure Enclave (T2)",
        };
        Self {
            present: true,
            enabled: true,
            version: version.to_string(),
            manufacturer: "Apple".to_string(),
            chip_type,
            platform: platform.into(),
            capabilities: secure_enclave_capabilities(true, chip_type),
            hardware_key_support: true,
        }
    }

    pub fn fully_enabled(&self) -> bool {
        self.present && self.enabled
    }

    /// `present=false ⇒ ¬enabled ∧ capabilities=∅ ∧ ¬hardware_key_support`.
    pub fn is_consistent(&self) -> bool {
        self.present
            || (!self.enabled && self.capabilities.is_empty() && !self.hardware_key_support)
    }
}

/// Decode a numeric TCG vendor ID into its four-character ASCII code.
pub fn decode_tcg_vendor_id(id: u32) -> Option<String> {
    let code: String = id
        .to_be_bytes()
        .iter()
        .take_while(|b| **b != 0)
        .map(|b| *b as char)
        .collect();
    let code = code.trim();
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_graphic()) {
        return None;
    }
    Some(code.to_string())
}

/// Friendly name for a TCG vendor code such as `IFX` or `NTC`.
pub fn tcg_vendor_name(code: &str) -> Option<&'static str> {
    let name = match code.trim().to_ascii_uppercase().as_str() {
        "AMD" => "AMD",
        "ATML" => "Atmel",
        "BRCM" => "Broadcom",
        "CSCO" => "Cisco",
        "GOOG" => "Google",
        "HISI" => "Huawei",
        "HPE" => "HPE",
        "IBM" => "IBM",
        "IFX" => "Infineon",
        "INTC" => "Intel",
        "LEN" => "Lenovo",
        "MSFT" => "Microsoft",
        "NSM" => "National Semiconductor",
        "NTC" => "Nuvoton",
        "NTZ" => "Nationz",
        "QCOM" => "Qualcomm",
        "ROCC" => "Rockchip",
        "SMSC" => "SMSC",
        "SMSN" => "Samsung",
        "SNS" => "Sinosun",
        "STM" => "STMicroelectronics",
        "TXN" => "Texas Instruments",
        "WEC" => "Winbond",
        _ => return None,
    };
    Some(name)
}

/// Human-readable manufacturer for a TCG vendor code, falling back to the code.
pub fn describe_tcg_vendor(code: &str) -> String {
    match tcg_vendor_name(code) {
        Some(name) => format!("{} ({})", name, code.trim()),
        None => code.trim().to_string(),
    }
}

// ── Secure Boot ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootMode {
    Full,
    Reduced,
    Medium,
    Permissive,
    Disabled,
    Enabled,
    LegacyBios,
    Unknown,
    Unavailable,
    AssumedFull,
    AssumedEnabled,
}

impl BootMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Reduced => "reduced",
            Self::Medium => "medium",
            Self::Permissive => "permissive",
            Self::Disabled => "disabled",
            Self::Enabled => "enabled",
            Self::LegacyBios => "legacy_bios",
            Self::Unknown => "unknown",
            Self::Unavailable => "unavailable",
            Self::AssumedFull => "assumed_full",
            Self::AssumedEnabled => "assumed_enabled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecureBootType {
    #[serde(rename = "uefi_secure_boot")]
    Uefi,
    #[serde(rename = "apple_secure_boot")]
    Apple,
    #[serde(rename = "t2_secure_boot")]
    T2,
    #[serde(rename = "none")]
    None,
}

impl SecureBootType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Uefi => "UEFI Secure Boot",
            Self::Apple => "Apple Secure Boot",
            Self::T2 => "T2 Secure Boot",
            Self::None => "Not Available",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootStatus {
    pub enabled: bool,
    pub platform: String,
    pub mode: BootMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_version: Option<String>,
    pub secure_boot_type: SecureBootType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl BootStatus {
    pub fn new(
        platform: impl Into<String>,
        secure_boot_type: SecureBootType,
        enabled: bool,
        mode: BootMode,
        details: impl Into<String>,
    ) -> Self {
        let details = details.into();
        Self {
            enabled,
            platform: platform.into(),
            mode,
            policy_version: None,
            secure_boot_type,
            details: (!details.is_empty()).then_some(details),
        }
    }

    pub fn with_policy_version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        self.policy_version = (!version.trim().is_empty()).then_some(version);
        self
    }
}

// ── Disk encryption ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncryptionType {
    Filevault,
    Bitlocker,
    Luks,
}

impl EncryptionType {
    /// Product name used in recommendations and table titles.
    pub fn product_name(&self) -> &'static str {
        match self {
            Self::Filevault => "FileVault",
            Self::Bitlocker => "BitLocker",
            Self::Luks => "LUKS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncryptionState {
    Enabled,
    Disabled,
    Encrypting,
    Decrypting,
    Unknown,
}

impl EncryptionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Encrypting => "encrypting",
            Self::Decrypting => "decrypting",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_point: Option<String>,
    pub encrypted: bool,
    pub status: String,
}

impl Volume {
    pub fn new(name: impl Into<String>, encrypted: bool, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mount_point: None,
            encrypted,
            status: status.into(),
        }
    }

    pub fn mounted_at(mut self, mount_point: Option<String>) -> Self {
        self.mount_point = mount_point.filter(|m| !m.trim().is_empty());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionStatus {
    pub enabled: bool,
    pub platform: String,
    #[serde(rename = "type")]
    pub encryption_type: EncryptionType,
    pub status: EncryptionState,
    #[serde(
        rename = "encrypted_volumes",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub volumes: Vec<Volume>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl EncryptionStatus {
    /// `enabled` is derived: true iff at least one volume is encrypted.
    pub fn new(
        platform: impl Into<String>,
        encryption_type: EncryptionType,
        status: EncryptionState,
        volumes: Vec<Volume>,
        details: impl Into<String>,
    ) -> Self {
        let details = details.into();
        Self {
            enabled: volumes.iter().any(|v| v.encrypted),
            platform: platform.into(),
            encryption_type,
            status,
            volumes,
            details: (!details.is_empty()).then_some(details),
        }
    }

    pub fn is_consistent(&self) -> bool {
        !self.enabled || self.volumes.iter().any(|v| v.encrypted)
    }
}

// ── Biometrics ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiometryType {
    None,
    Fingerprint,
    Face,
    FingerprintAndFace,
}

impl BiometryType {
    /// Both modalities win over fingerprint, which wins over face.
    pub fn from_modalities(fingerprint: bool, face: bool) -> Self {
        match (fingerprint, face) {
            (true, true) => Self::FingerprintAndFace,
            (true, false) => Self::Fingerprint,
            (false, true) => Self::Face,
            (false, false) => Self::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Fingerprint => "fingerprint",
            Self::Face => "face",
            Self::FingerprintAndFace => "fingerprint_and_face",
        }
    }
}

/// Availability and enrollment of a single biometric modality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modality {
    pub available: bool,
    pub enrolled: bool,
}

impl Modality {
    pub const ABSENT: Modality = Modality {
        available: false,
        enrolled: false,
    };

    /// Enrollment implies a working sensor.
    pub fn new(available: bool, enrolled: bool) -> Self {
        Self {
            available: available || enrolled,
            enrolled,
        }
    }

    pub fn present(&self) -> bool {
        self.available || self.enrolled
    }
}

/// Biometric capabilities of the host.
///
/// `biometry_type` is not stored: it is recomputed from the modality flags
/// on every read and on serialization, so it can never disagree with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BiometricRecord", into = "BiometricRecord")]
pub struct BiometricStatus {
    pub fingerprint: Modality,
    pub face: Modality,
    pub platform: String,
}

impl BiometricStatus {
    pub fn new(platform: impl Into<String>, fingerprint: Modality, face: Modality) -> Self {
        Self {
            fingerprint,
            face,
            platform: platform.into(),
        }
    }

    pub fn biometry_type(&self) -> BiometryType {
        BiometryType::from_modalities(self.fingerprint.present(), self.face.present())
    }

    pub fn any_available(&self) -> bool {
        self.fingerprint.available || self.face.available
    }

    pub fn any_enrolled(&self) -> bool {
        self.fingerprint.enrolled || self.face.enrolled
    }
}

#[derive(Serialize, Deserialize)]
struct BiometricRecord {
    touch_id_available: bool,
    touch_id_enrolled: bool,
    face_id_available: bool,
    face_id_enrolled: bool,
    #[serde(default = "default_biometry_type")]
    biometry_type: BiometryType,
    platform: String,
}

fn default_biometry_type() -> BiometryType {
    BiometryType::None
}

impl From<BiometricRecord> for BiometricStatus {
    fn from(record: BiometricRecord) -> Self {
        Self {
            fingerprint: Modality {
                available: record.touch_id_available,
                enrolled: record.touch_id_enrolled,
            },
            face: Modality {
                available: record.face_id_available,
                enrolled: record.face_id_enrolled,
            },
            platform: record.platform,
        }
    }
}

impl From<BiometricStatus> for BiometricRecord {
    fn from(status: BiometricStatus) -> Self {
        let biometry_type = status.biometry_type();
        Self {
            touch_id_available: status.fingerprint.available,
            touch_id_enrolled: status.fingerprint.enrolled,
            face_id_available: status.face.available,
            face_id_enrolled: status.face.enrolled,
            biometry_type,
            platform: status.platform,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tpm2_capabilities_extend_base_set() {
        let caps = tpm_capabilities(true, ChipType::Tpm20);
        assert_eq!(caps.len(), 6);
        assert_eq!(caps[0], CAP_KEY_GENERATION);
        assert!(caps.contains(&CAP_ALGORITHM_AGILITY.to_string()));

        let caps = tpm_capabilities(true, ChipType::Tpm12);
        assert_eq!(caps.len(), 4);
        assert!(!caps.contains(&CAP_ENHANCED_AUTHORIZATION.to_string()));
    }

    #[test]
    fn disabled_tpm_has_no_capabilities() {
        assert!(tpm_capabilities(false, ChipType::Tpm20).is_empty());
        let status = ChipStatus::tpm("linux", ChipType::Tpm20, "TPM 2.0", "IFX", false, true);
        assert!(status.present);
        assert!(!status.hardware_key_support);
        assert!(status.capabilities.is_empty());
    }

    #[test]
    fn absent_chip_is_consistent() {
        let status = ChipStatus::absent("windows");
        assert!(status.is_consistent());
        assert_eq!(status.chip_type, ChipType::None);
        assert!(!status.fully_enabled());
    }

    #[test]
    fn chip_type_follows_major_version() {
        assert_eq!(ChipType::from_tpm_major("2"), ChipType::Tpm20);
        assert_eq!(ChipType::from_tpm_major("2.0, 0, 1.38"), ChipType::Tpm20);
        assert_eq!(ChipType::from_tpm_major("1"), ChipType::Tpm12);
        assert_eq!(ChipType::from_tpm_major(""), ChipType::Tpm12);
    }

    #[test]
    fn chip_type_serializes_with_dotted_names() {
        let raw = serde_json::to_string(&ChipType::Tpm12).expect("serialize");
        assert_eq!(raw, "\"tpm_1.2\"");
        let parsed: ChipType = serde_json::from_str("\"secure_enclave_t2\"").expect("parse");
        assert_eq!(parsed, ChipType::SecureEnclaveT2);
    }

    #[test]
    fn vendor_ids_decode_to_tcg_codes() {
        assert_eq!(decode_tcg_vendor_id(0x4946_5800).as_deref(), Some("IFX"));
        assert_eq!(decode_tcg_vendor_id(0x4E54_4300).as_deref(), Some("NTC"));
        assert_eq!(decode_tcg_vendor_id(0), None);
        assert_eq!(describe_tcg_vendor("IFX"), "Infineon (IFX)");
        assert_eq!(describe_tcg_vendor("ZZZZ"), "ZZZZ");
    }

    #[test]
    fn encryption_enabled_is_derived_from_volumes() {
        let status = EncryptionStatus::new(
            "linux",
            EncryptionType::Luks,
            EncryptionState::Disabled,
            vec![Volume::new("sda1", false, "not_encrypted")],
            "",
        );
        assert!(!status.enabled);
        assert!(status.details.is_none());

        let status = EncryptionStatus::new(
            "linux",
            EncryptionType::Luks,
            EncryptionState::Enabled,
            vec![Volume::new("cryptroot", true, "encrypted_active")],
            "LUKS/dm-crypt encryption detected",
        );
        assert!(status.enabled);
        assert!(status.is_consistent());
    }

    #[test]
    fn encryption_json_uses_wire_field_names() {
        let status = EncryptionStatus::new(
            "windows",
            EncryptionType::Bitlocker,
            EncryptionState::Enabled,
            vec![Volume::new("Volume C:", true, "encrypted").mounted_at(Some("C:".into()))],
            "",
        );
        let value = serde_json::to_value(&status).expect("serialize");
        assert_eq!(value["type"], "bitlocker");
        assert_eq!(value["encrypted_volumes"][0]["mount_point"], "C:");
        assert!(value.get("details").is_none());

        let empty = EncryptionStatus::new(
            "windows",
            EncryptionType::Bitlocker,
            EncryptionState::Unknown,
            Vec::new(),
            "requires elevated privileges",
        );
        let value = serde_json::to_value(&empty).expect("serialize");
        assert!(value.get("encrypted_volumes").is_none());
        assert_eq!(value["status"], "unknown");
    }

    #[test]
    fn biometry_type_precedence() {
        assert_eq!(
            BiometryType::from_modalities(true, true),
            BiometryType::FingerprintAndFace
        );
        assert_eq!(
            BiometryType::from_modalities(true, false),
            BiometryType::Fingerprint
        );
        assert_eq!(BiometryType::from_modalities(false, true), BiometryType::Face);
        assert_eq!(BiometryType::from_modalities(false, false), BiometryType::None);
    }

    #[test]
    fn enrolled_modality_is_available() {
        let m = Modality::new(false, true);
        assert!(m.available);
        assert!(m.present());
    }

    #[test]
    fn biometric_json_recomputes_type() {
        let status = BiometricStatus::new("linux", Modality::new(true, true), Modality::ABSENT);
        let value = serde_json::to_value(&status).expect("serialize");
        assert_eq!(value["touch_id_available"], true);
        assert_eq!(value["face_id_enrolled"], false);
        assert_eq!(value["biometry_type"], "fingerprint");

        // A stale stored type is ignored on the way in.
        let raw = r#"{"touch_id_available":false,"touch_id_enrolled":false,
            "face_id_available":true,"face_id_enrolled":false,
            "biometry_type":"fingerprint","platform":"windows"}"#;
        let parsed: BiometricStatus = serde_json::from_str(raw).expect("parse");
        assert_eq!(parsed.biometry_type(), BiometryType::Face);
    }

    #[test]
    fn boot_status_omits_empty_optionals() {
        let status = BootStatus::new(
            "linux",
            SecureBootType::Uefi,
            true,
            BootMode::Enabled,
            "UEFI Secure Boot is enabled",
        );
        let value = serde_json::to_value(&status).expect("serialize");
        assert!(value.get("policy_version").is_none());
        assert_eq!(value["secure_boot_type"], "uefi_secure_boot");
        assert_eq!(value["mode"], "enabled");

        let status = BootStatus::new("darwin", SecureBootType::T2, false, BootMode::Unknown, "")
            .with_policy_version("  ");
        assert!(status.details.is_none());
        assert!(status.policy_version.is_none());
    }
}
