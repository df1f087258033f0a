mod biometrics;
mod encryption;
mod secure_boot;
mod sysfs;
mod tpm;

use std::path::PathBuf;
use std::sync::Arc;

use posture::{
    BiometricStatus, BootStatus, ChipStatus, CommandRunner, EncryptionStatus, Feature,
    PostureProbe, Result, SystemCommandRunner,
};
use serde::{Deserialize, Serialize};

pub use biometrics::{fprintd_enrollment, howdy_enrollment, FprintdReport};
pub use encryption::{has_luks_magic, is_candidate_block_device, parse_crypttab, CrypttabEntry};
pub use secure_boot::{boot_status_from_efivar, parse_efi_bool_variable, EFI_GLOBAL_GUID};
pub use sysfs::{mount_point_for, parse_mounts, MountEntry};
pub use tpm::parse_tpm_caps;

pub const PLATFORM: &str = "linux";

/// Kernel interface locations; overridable so detectors can run against a
/// fake tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinuxProbeOptions {
    pub tpm_class_path: PathBuf,
    pub dev_path: PathBuf,
    pub efi_path: PathBuf,
    pub dev_mapper_path: PathBuf,
    pub crypttab_path: PathBuf,
    pub sys_block_path: PathBuf,
    pub mounts_path: PathBuf,
    /// Account whose fingerprint and face enrollments are checked.
    pub user: Option<String>,
}

impl Default for LinuxProbeOptions {
    fn default() -> Self {
        Self {
            tpm_class_path: PathBuf::from("/sys/class/tpm"),
            dev_path: PathBuf::from("/dev"),
            efi_path: PathBuf::from("/sys/firmware/efi"),
            dev_mapper_path: PathBuf::from("/dev/mapper"),
            crypttab_path: PathBuf::from("/etc/crypttab"),
            sys_block_path: PathBuf::from("/sys/block"),
            mounts_path: PathBuf::from("/proc/self/mounts"),
            user: None,
        }
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

impl LinuxProbeOptions {
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        opts.apply_env();
        opts
    }

    /// Overlay `HWPOSTURE_LINUX_*_PATH` variables on top of `self`.
    pub fn apply_env(&mut self) {
        if let Some(path) = env_path("HWPOSTURE_LINUX_TPM_CLASS_PATH") {
            self.tpm_class_path = path;
        }
        if let Some(path) = env_path("HWPOSTURE_LINUX_DEV_PATH") {
            self.dev_path = path;
        }
        if let Some(path) = env_path("HWPOSTURE_LINUX_EFI_PATH") {
            self.efi_path = path;
        }
        if let Some(path) = env_path("HWPOSTURE_LINUX_DEV_MAPPER_PATH") {
            self.dev_mapper_path = path;
        }
        if let Some(path) = env_path("HWPOSTURE_LINUX_CRYPTTAB_PATH") {
            self.crypttab_path = path;
        }
        if let Some(path) = env_path("HWPOSTURE_LINUX_SYS_BLOCK_PATH") {
            self.sys_block_path = path;
        }
        if let Some(path) = env_path("HWPOSTURE_LINUX_MOUNTS_PATH") {
            self.mounts_path = path;
        }
        if self.user.is_none() {
            self.user = std::env::var("USER")
                .or_else(|_| std::env::var("LOGNAME"))
                .ok()
                .filter(|user| !user.trim().is_empty());
        }
    }
}

pub struct LinuxProbe {
    options: LinuxProbeOptions,
    runner: Arc<dyn CommandRunner>,
}

impl LinuxProbe {
    pub fn new(options: LinuxProbeOptions) -> Self {
        Self::with_runner(options, Arc::new(SystemCommandRunner))
    }

    pub fn with_runner(options: LinuxProbeOptions, runner: Arc<dyn CommandRunner>) -> Self {
        Self { options, runner }
    }

    pub fn options(&self) -> &LinuxProbeOptions {
        &self.options
    }
}

impl PostureProbe for LinuxProbe {
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
        tpm::detect(&self.options)
    }

    fn secure_boot(&self) -> Result<BootStatus> {
        secure_boot::detect(&self.options)
    }

    fn encryption(&self) -> Result<EncryptionStatus> {
        encryption::detect(&self.options)
    }

    fn biometrics(&self) -> Result<BiometricStatus> {
        biometrics::detect(self.runner.as_ref(), self.options.user.as_deref())
    }
}
