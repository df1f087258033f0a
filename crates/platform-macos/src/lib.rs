//! macOS posture detectors: Secure Enclave, Apple/T2 Secure Boot, FileVault
//! and Touch ID.

mod biometrics;
mod enclave;
mod filevault;
mod secure_boot;

use std::sync::Arc;

use posture::{
    BiometricStatus, BootStatus, ChipStatus, CommandRunner, EncryptionStatus, Feature,
    PostureProbe, Result, SystemCommandRunner,
};

pub use biometrics::{enrolled_template_count, touch_id_available};
pub use enclave::{KeyProbeOutcome, NativeSecureEnclave, SecureEnclaveProbe, ERR_SEC_UNIMPLEMENTED};
pub use filevault::{
    classify_fdesetup, filevault_status, parse_diskutil_info, FdeVerdict, RootVolumeInfo,
};
pub use secure_boot::{
    boot_status_from_bputil, boot_status_from_t2_policy, parse_secure_boot_policy,
    APPLE_SECURE_BOOT_POLICY_VAR,
};

pub const PLATFORM: &str = "darwin";

/// `sysctl -n hw.optional.arm64` reports 1 on Apple Silicon, including
/// Rosetta-translated processes.
pub fn is_apple_silicon(runner: &dyn CommandRunner) -> bool {
    match runner.run("sysctl", &["-n", "hw.optional.arm64"]) {
        Ok(output) if output.success => output.stdout.trim() == "1",
        Ok(_) => false,
        Err(err) => {
            tracing::debug!(error = %err, "sysctl unavailable; using compile-time arch");
            std::env::consts::ARCH == "aarch64"
        }
    }
}

pub struct MacosProbe {
    runner: Arc<dyn CommandRunner>,
    enclave: Arc<dyn SecureEnclaveProbe>,
}

impl Default for MacosProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MacosProbe {
    pub fn new() -> Self {
        Self::with_runner(Arc::new(SystemCommandRunner))
    }

    pub fn with_runner(runner: Arc<dyn CommandRunner>) -> Self {
        Self::with_parts(runner, Arc::new(NativeSecureEnclave))
    }

    pub fn with_parts(
        runner: Arc<dyn CommandRunner>,
        enclave: Arc<dyn SecureEnclaveProbe>,
    ) -> Self {
        Self { runner, enclave }
    }
}

impl PostureProbe for MacosProbe {
    fn platform(&self) -> &str {
        PLATFORM
    }

    fn is_supported(&self, feature: Feature) -> bool {
        matches!(
            feature,
            Feature::SecurityChip | Feature::SecureBoot | Feature::Encryption | Feature::Biometrics
        )
    }

    fn security_chip(&self) -> Result<ChipStatus> {
        enclave::detect(self.runner.as_ref(), self.enclave.as_ref())
    }

    fn secure_boot(&self) -> Result<BootStatus> {
        secure_boot::detect(self.runner.as_ref())
    }

    fn encryption(&self) -> Result<EncryptionStatus> {
        filevault::detect(self.runner.as_ref())
    }

    fn biometrics(&self) -> Result<BiometricStatus> {
        biometrics::detect(self.runner.as_ref())
    }
}
