use posture::{
    collect_findings, score_findings, summarize, summarize_with, BiometricStatus, BiometryType,
    BootMode, BootStatus, ChipStatus, ChipType, DetectionError, EncryptionState, EncryptionStatus,
    EncryptionType, Feature, Findings, Modality, OverallStatus, PostureProbe, Result,
    SecureBootType, SummaryOptions, Volume, REC_BIOMETRICS_CONFIGURE, REC_CHIP_ABSENT,
    REC_SECURE_BOOT,
};
use proptest::prelude::*;

#[derive(Clone)]
struct FixedProbe {
    platform: &'static str,
    supported: [bool; 4],
    chip: Option<ChipStatus>,
    boot: Option<BootStatus>,
    encryption: Option<EncryptionStatus>,
    biometrics: Option<BiometricStatus>,
}

impl FixedProbe {
    fn all_supported(platform: &'static str) -> Self {
        Self {
            platform,
            supported: [true; 4],
            chip: None,
            boot: None,
            encryption: None,
            biometrics: None,
        }
    }

    fn failure(&self, program: &str) -> DetectionError {
        DetectionError::command_failed(program, "simulated failure")
    }
}

impl PostureProbe for FixedProbe {
    fn platform(&self) -> &str {
        self.platform
    }

    fn is_supported(&self, feature: Feature) -> bool {
        let idx = Feature::ALL.iter().position(|f| *f == feature).unwrap_or(0);
        self.supported[idx]
    }

    fn security_chip(&self) -> Result<ChipStatus> {
        self.chip.clone().ok_or_else(|| self.failure("tpm"))
    }

    fn secure_boot(&self) -> Result<BootStatus> {
        self.boot.clone().ok_or_else(|| self.failure("efivars"))
    }

    fn encryption(&self) -> Result<EncryptionStatus> {
        self.encryption.clone().ok_or_else(|| self.failure("dmsetup"))
    }

    fn biometrics(&self) -> Result<BiometricStatus> {
        self.biometrics.clone().ok_or_else(|| self.failure("fprintd"))
    }
}

fn tpm(enabled: bool) -> ChipStatus {
    ChipStatus::tpm("linux", ChipType::Tpm20, "2.0", "Infineon (IFX)", enabled, true)
}

fn boot(enabled: bool) -> BootStatus {
    let mode = if enabled {
        BootMode::Enabled
    } else {
        BootMode::Disabled
    };
    BootStatus::new("linux", SecureBootType::Uefi, enabled, mode, "")
}

fn encryption(platform: &str, kind: EncryptionType, enabled: bool) -> EncryptionStatus {
    let (state, volumes) = if enabled {
        (
            EncryptionState::Enabled,
            vec![Volume::new("root", true, "encrypted")],
        )
    } else {
        (EncryptionState::Disabled, Vec::new())
    };
    EncryptionStatus::new(platform, kind, state, volumes, "")
}

fn biometrics(available: bool, enrolled: bool) -> BiometricStatus {
    BiometricStatus::new("linux", Modality::new(available, enrolled), Modality::ABSENT)
}

#[test]
fn scenario_a_three_of_four_enabled_scores_good() {
    let mut probe = FixedProbe::all_supported("windows");
    probe.chip = Some(tpm(true));
    probe.boot = Some(boot(true));
    probe.encryption = Some(encryption("windows", EncryptionType::Bitlocker, false));
    probe.biometrics = Some(biometrics(true, true));

    let summary = summarize(&probe);
    assert_eq!(summary.overall_score, 75);
    assert_eq!(summary.overall_status, OverallStatus::Good);
    assert_eq!(
        summary.recommendations,
        vec!["Enable BitLocker to protect data at rest".to_string()]
    );
}

#[test]
fn scenario_b_everything_off_scores_critical() {
    let mut probe = FixedProbe::all_supported("linux");
    probe.chip = Some(ChipStatus::absent("linux"));
    probe.boot = Some(boot(false));
    probe.encryption = Some(encryption("linux", EncryptionType::Luks, false));
    probe.biometrics = Some(biometrics(true, false));

    let summary = summarize(&probe);
    assert_eq!(summary.overall_score, 0);
    assert_eq!(summary.overall_status, OverallStatus::Critical);
    assert_eq!(
        summary.recommendations,
        vec![
            REC_CHIP_ABSENT.to_string(),
            REC_SECURE_BOOT.to_string(),
            "Enable LUKS to protect data at rest".to_string(),
            REC_BIOMETRICS_CONFIGURE.to_string(),
        ]
    );
}

#[test]
fn scenario_c_unsupported_biometrics_is_null() {
    let mut probe = FixedProbe::all_supported("freebsd");
    probe.supported = [true, true, true, false];
    probe.chip = Some(tpm(true));
    probe.boot = Some(boot(true));
    probe.encryption = Some(encryption("freebsd", EncryptionType::Luks, true));
    probe.biometrics = Some(biometrics(true, true));

    let summary = summarize(&probe);
    assert!(summary.biometrics.is_none());
    assert_eq!(summary.overall_score, 75);
    assert_eq!(summary.overall_status, OverallStatus::Good);
    assert!(summary.recommendations.is_empty());

    let value = serde_json::to_value(&summary).expect("serialize");
    assert!(value["biometrics"].is_null());
    assert!(value.get("recommendations").is_none());
}

#[test]
fn failing_detector_is_omitted_without_affecting_siblings() {
    let mut probe = FixedProbe::all_supported("linux");
    probe.chip = Some(tpm(true));
    probe.boot = None;
    probe.encryption = Some(encryption("linux", EncryptionType::Luks, true));
    probe.biometrics = Some(biometrics(false, false));

    let summary = summarize(&probe);
    assert!(summary.secure_boot.is_none());
    assert_eq!(summary.overall_score, 50);
    assert_eq!(summary.overall_status, OverallStatus::Fair);
    assert!(!summary
        .recommendations
        .contains(&REC_SECURE_BOOT.to_string()));
}

#[test]
fn present_but_disabled_chip_earns_nothing() {
    let findings = Findings {
        chip: Some(tpm(false)),
        ..Findings::default()
    };
    let summary = score_findings("linux", &findings);
    assert_eq!(summary.overall_score, 0);
    assert_eq!(summary.recommendations.len(), 1);
    assert_ne!(summary.recommendations[0], REC_CHIP_ABSENT);
    let tpm = summary.tpm.expect("tpm summary");
    assert!(tpm.present);
    assert!(!tpm.enabled);
}

#[test]
fn parallel_collection_matches_sequential() {
    let mut probe = FixedProbe::all_supported("darwin");
    probe.chip = Some(ChipStatus::secure_enclave("darwin", ChipType::SecureEnclave));
    probe.boot = Some(BootStatus::new(
        "darwin",
        SecureBootType::Apple,
        true,
        BootMode::Full,
        "Full Security",
    ));
    probe.encryption = Some(encryption("darwin", EncryptionType::Filevault, false));
    probe.biometrics = None;

    let sequential = collect_findings(&probe, SummaryOptions { parallel: false });
    let parallel = collect_findings(&probe, SummaryOptions { parallel: true });
    assert_eq!(sequential, parallel);

    let summary = summarize_with(&probe, SummaryOptions { parallel: true });
    assert_eq!(summary.platform, "darwin");
    assert_eq!(summary.overall_score, 50);
    assert_eq!(
        summary.recommendations,
        vec!["Enable FileVault to protect data at rest".to_string()]
    );
}

#[test]
fn biometric_summary_reports_derived_type() {
    let status = BiometricStatus::new(
        "windows",
        Modality::new(true, false),
        Modality::new(true, true),
    );
    let findings = Findings {
        biometrics: Some(status),
        ..Findings::default()
    };
    let summary = score_findings("windows", &findings);
    let bio = summary.biometrics.expect("biometrics summary");
    assert!(bio.available);
    assert!(bio.configured);
    assert_eq!(bio.biometry_type, BiometryType::FingerprintAndFace);
    assert_eq!(summary.overall_score, 25);
}

fn arb_chip() -> impl Strategy<Value = Option<ChipStatus>> {
    prop_oneof![
        Just(None),
        Just(Some(ChipStatus::absent("linux"))),
        any::<bool>().prop_map(|enabled| Some(tpm(enabled))),
    ]
}

fn arb_boot() -> impl Strategy<Value = Option<BootStatus>> {
    proptest::option::of(any::<bool>().prop_map(boot))
}

fn arb_encryption() -> impl Strategy<Value = Option<EncryptionStatus>> {
    proptest::option::of(
        any::<bool>().prop_map(|enabled| encryption("linux", EncryptionType::Luks, enabled)),
    )
}

fn arb_biometrics() -> impl Strategy<Value = Option<BiometricStatus>> {
    proptest::option::of(
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(fa, fe, ca, ce)| {
                BiometricStatus::new("linux", Modality::new(fa, fe), Modality::new(ca, ce))
            },
        ),
    )
}

fn arb_findings() -> impl Strategy<Value = Findings> {
    (arb_chip(), arb_boot(), arb_encryption(), arb_biometrics()).prop_map(
        |(chip, boot, encryption, biometrics)| Findings {
            chip,
            boot,
            encryption,
            biometrics,
        },
    )
}

fn expected_points(findings: &Findings) -> u8 {
    let mut points = 0;
    if findings.chip.as_ref().is_some_and(|c| c.present && c.enabled) {
        points += 25;
    }
    if findings.boot.as_ref().is_some_and(|b| b.enabled) {
        points += 25;
    }
    if findings.encryption.as_ref().is_some_and(|e| e.enabled) {
        points += 25;
    }
    if findings.biometrics.as_ref().is_some_and(|b| b.any_enrolled()) {
        points += 25;
    }
    points
}

proptest! {
    #[test]
    fn score_is_sum_of_category_points(findings in arb_findings()) {
        let summary = score_findings("linux", &findings);
        prop_assert!([0u8, 25, 50, 75, 100].contains(&summary.overall_score));
        prop_assert_eq!(summary.overall_score, expected_points(&findings));
        prop_assert_eq!(summary.overall_status, OverallStatus::from_score(summary.overall_score));
    }

    #[test]
    fn recommendations_match_unsatisfied_categories(findings in arb_findings()) {
        let summary = score_findings("linux", &findings);
        let reported = [
            findings.chip.is_some(),
            findings.boot.is_some(),
            findings.encryption.is_some(),
            findings.biometrics.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count();
        let satisfied = usize::from(summary.overall_score / 25);
        prop_assert_eq!(summary.recommendations.len(), reported - satisfied);
    }

    #[test]
    fn status_is_monotonic_in_score(a in 0u8..=100, b in 0u8..=100) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(OverallStatus::from_score(lo) <= OverallStatus::from_score(hi));
    }

    #[test]
    fn chip_records_stay_consistent(enabled in any::<bool>(), v2 in any::<bool>()) {
        let kind = if v2 { ChipType::Tpm20 } else { ChipType::Tpm12 };
        let status = ChipStatus::tpm("linux", kind, "x", "y", enabled, true);
        prop_assert!(status.is_consistent());
        prop_assert_eq!(status.capabilities.is_empty(), !enabled);
        prop_assert!(ChipStatus::absent("linux").is_consistent());
    }

    #[test]
    fn summary_round_trips_through_json(findings in arb_findings()) {
        let summary = score_findings("windows", &findings);
        let raw = serde_json::to_string(&summary).expect("serialize");
        let parsed: posture::SecuritySummary = serde_json::from_str(&raw).expect("parse");
        prop_assert_eq!(parsed, summary);
    }

    #[test]
    fn biometric_record_round_trips(fa in any::<bool>(), fe in any::<bool>(), ca in any::<bool>(), ce in any::<bool>()) {
        let status = BiometricStatus::new("darwin", Modality::new(fa, fe), Modality::new(ca, ce));
        let raw = serde_json::to_string(&status).expect("serialize");
        let parsed: BiometricStatus = serde_json::from_str(&raw).expect("parse");
        prop_assert_eq!(parsed.biometry_type(), status.biometry_type());
        prop_assert_eq!(parsed, status);
    }
}
