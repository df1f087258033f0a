//! Windows posture detectors: TPM, UEFI Secure Boot, BitLocker and
//! Windows Hello sensors.
//!
//! Everything is read through PowerShell CIM/PnP queries and `reg.exe`, so the
//! whole crate is exercised off-Windows with a scripted `CommandRunner`.

mod biometrics;
mod bitlocker;
mod secure_boot;
mod shell;
mod tpm;
mod windows_cmd;

use std::sync::Arc;

use posture::{
    BiometricStatus, BootStatus, ChipStatus, CommandRunner, EncryptionStatus, Feature,
    PostureProbe, Result, SystemCommandRunner,
};

pub use biometrics::{
    classify_device, enrolled_factors, Sensor, FACTOR_FACIAL_FEATURES, FACTOR_FINGERPRINT,
    WINBIO_ACCOUNT_INFO_KEY,
};
pub use bitlocker::{bitlocker_status, conversion_label, volume_from_row, EncryptableVolume};
pub use secure_boot::{
    boot_status_from_confirm, boot_status_from_registry, SECURE_BOOT_STATE_KEY,
    SECURE_BOOT_STATE_VALUE,
};
pub use shell::{parse_json_rows, parse_reg_dword, parse_reg_dwords};
pub use tpm::{chip_from_security_device, chip_from_win32_tpm, Win32Tpm};
pub use windows_cmd::{POWERSHELL_EXE, REG_EXE};

pub const PLATFORM: &str = "windows";

pub struct WindowsProbe {
    runner: Arc<dyn CommandRunner>,
}

impl Default for WindowsProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowsProbe {
    pub fn new() -> Self {
        Self::with_runner(Arc::new(SystemCommandRunner))
    }

    pub fn with_runner(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl PostureProbe for WindowsProbe {
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
        tpm::detect(self.runner.as_ref())
    }

    fn secure_boot(&self) -> Result<BootStatus> {
        secure_boot::detect(self.runner.as_ref())
    }

    fn encryption(&self) -> Result<EncryptionStatus> {
        bitlocker::detect(self.runner.as_ref())
    }

    fn biometrics(&self) -> Result<BiometricStatus> {
        biometrics::detect(self.runner.as_ref())
    }
}
