use super::table::{Cell, Table};
use super::theme::{icons, Theme, Tone};
use super::{flag_cell, platform_label, section_title, RenderTable};
use crate::model::{
    BiometricStatus, BootStatus, ChipStatus, ChipType, EncryptionState, EncryptionStatus,
    Modality, SecureBootType,
};
use crate::probe::{FeatureGate, FeatureRecord};

impl RenderTable for ChipStatus {
    fn render_table(&self, theme: &Theme) -> String {
        let title = match self.chip_type {
            ChipType::SecureEnclave | ChipType::SecureEnclaveT2 => "Secure Enclave Status",
            _ if self.platform == "darwin" => "Secure Enclave Status",
            _ => "TPM Status",
        };
        let mut out = section_title(icons::SHIELD, title, theme);

        let mut table = Table::new(["Property", "Value"]);
        table.row([Cell::plain("Platform"), Cell::new(platform_label(&self.platform), Tone::Info)]);
        table.row([Cell::plain("Present"), flag_cell(self.present)]);
        table.row([Cell::plain("Enabled"), flag_cell(self.enabled)]);
        table.row([Cell::plain("Type"), Cell::plain(self.chip_type.label())]);
        table.row(["Version", self.version.as_str()]);
        table.row(["Manufacturer", self.manufacturer.as_str()]);
        table.row([Cell::plain("Hardware keys"), flag_cell(self.hardware_key_support)]);
        out.push_str(&table.render(theme));

        if !self.capabilities.is_empty() {
            out.push('\n');
            out.push_str(&theme.paint("Capabilities:", Tone::Bold));
            out.push('\n');
            for cap in &self.capabilities {
                out.push_str(&format!(
                    "  {} {}\n",
                    theme.paint(icons::CHECK, Tone::Success),
                    cap.replace('_', " ")
                ));
            }
        }
        out
    }
}

impl RenderTable for BootStatus {
    fn render_table(&self, theme: &Theme) -> String {
        let mut out = section_title(icons::LOCK, "Secure Boot Status", theme);

        let mode_tone = if self.enabled {
            Tone::Success
        } else if self.secure_boot_type == SecureBootType::None {
            Tone::Muted
        } else {
            Tone::Warning
        };
        let mut table = Table::new(["Property", "Value"]);
        table.row([Cell::plain("Platform"), Cell::new(platform_label(&self.platform), Tone::Info)]);
        table.row([Cell::plain("Enabled"), flag_cell(self.enabled)]);
        table.row([Cell::plain("Mode"), Cell::new(self.mode.as_str(), mode_tone)]);
        table.row(["Type", self.secure_boot_type.label()]);
        if let Some(policy) = &self.policy_version {
            table.row(["Policy version", policy.as_str()]);
        }
        out.push_str(&table.render(theme));

        if let Some(details) = &self.details {
            out.push('\n');
            out.push_str(&theme.paint(details, Tone::Muted));
            out.push('\n');
        }
        out
    }
}

fn encryption_state_tone(state: EncryptionState) -> Tone {
    match state {
        EncryptionState::Enabled => Tone::Success,
        EncryptionState::Encrypting | EncryptionState::Decrypting => Tone::Warning,
        EncryptionState::Disabled => Tone::Danger,
        EncryptionState::Unknown => Tone::Muted,
    }
}

impl RenderTable for EncryptionStatus {
    fn render_table(&self, theme: &Theme) -> String {
        let title = format!("{} Status", self.encryption_type.product_name());
        let mut out = section_title(icons::LOCK, &title, theme);

        let mut table = Table::new(["Property", "Value"]);
        table.row([Cell::plain("Platform"), Cell::new(platform_label(&self.platform), Tone::Info)]);
        table.row([Cell::plain("Enabled"), flag_cell(self.enabled)]);
        table.row([
            Cell::plain("Status"),
            Cell::new(self.status.as_str(), encryption_state_tone(self.status)),
        ]);
        out.push_str(&table.render(theme));

        if !self.volumes.is_empty() {
            out.push('\n');
            out.push_str(&theme.paint("Volumes:", Tone::Bold));
            out.push('\n');
            let mut volumes = Table::new(["Volume", "Mount point", "Encrypted", "Status"]);
            for volume in &self.volumes {
                volumes.row([
                    Cell::plain(volume.name.as_str()),
                    Cell::plain(volume.mount_point.as_deref().unwrap_or("-")),
                    flag_cell(volume.encrypted),
                    Cell::plain(volume.status.as_str()),
                ]);
            }
            out.push_str(&volumes.render(theme));
        }

        if let Some(details) = &self.details {
            out.push('\n');
            out.push_str(&theme.paint(details, Tone::Muted));
            out.push('\n');
        }
        out
    }
}

fn modality_row(table: &mut Table, name: &str, modality: Modality) {
    table.row([
        Cell::plain(name),
        flag_cell(modality.available),
        flag_cell(modality.enrolled),
    ]);
}

impl RenderTable for BiometricStatus {
    fn render_table(&self, theme: &Theme) -> String {
        let mut out = section_title(icons::FINGERPRINT, "Biometric Capabilities", theme);

        let (fingerprint, face) = if self.platform == "darwin" {
            ("Touch ID", "Face ID")
        } else if self.platform == "windows" {
            ("Fingerprint (Windows Hello)", "Face (Windows Hello)")
        } else {
            ("Fingerprint", "Face")
        };
        let mut table = Table::new(["Modality", "Available", "Enrolled"]);
        modality_row(&mut table, fingerprint, self.fingerprint);
        modality_row(&mut table, face, self.face);
        out.push_str(&table.render(theme));

        out.push('\n');
        out.push_str(&theme.paint("Biometry type: ", Tone::Bold));
        let tone = if self.any_enrolled() {
            Tone::Success
        } else {
            Tone::Muted
        };
        out.push_str(&theme.paint(self.biometry_type().as_str(), tone));
        out.push('\n');
        out
    }
}

impl RenderTable for FeatureRecord {
    fn render_table(&self, theme: &Theme) -> String {
        match self {
            Self::SecurityChip(status) => status.render_table(theme),
            Self::SecureBoot(status) => status.render_table(theme),
            Self::Encryption(status) => status.render_table(theme),
            Self::Biometrics(status) => status.render_table(theme),
        }
    }
}

impl RenderTable for FeatureGate {
    fn render_table(&self, theme: &Theme) -> String {
        let title = format!("Supported Features ({})", platform_label(&self.platform));
        let mut out = section_title(icons::CHIP, &title, theme);
        let mut table = Table::new(["Feature", "Supported"]);
        for (feature, supported) in &self.features {
            table.row([Cell::plain(feature.display_name()), flag_cell(*supported)]);
        }
        out.push_str(&table.render(theme));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BootMode, EncryptionType, Volume};

    #[test]
    fn chip_table_lists_capabilities() {
        let status = ChipStatus::tpm("linux", ChipType::Tpm20, "2.0", "Infineon (IFX)", true, true);
        let out = status.render_table(&Theme::plain());
        assert!(out.contains("TPM Status"));
        assert!(out.contains("Infineon (IFX)"));
        assert!(out.contains("algorithm agility"));
        assert!(!out.contains('\u{1b}'));
    }

    #[test]
    fn encryption_table_lists_volumes() {
        let status = EncryptionStatus::new(
            "linux",
            EncryptionType::Luks,
            EncryptionState::Enabled,
            vec![Volume::new("cryptroot", true, "encrypted_active").mounted_at(Some("/".into()))],
            "LUKS/dm-crypt encryption detected",
        );
        let out = status.render_table(&Theme::plain());
        assert!(out.contains("LUKS Status"));
        assert!(out.contains("cryptroot"));
        assert!(out.contains("encrypted_active"));
        assert!(out.contains("LUKS/dm-crypt encryption detected"));
    }

    #[test]
    fn boot_table_shows_policy_version_when_known() {
        let status = BootStatus::new(
            "darwin",
            SecureBootType::Apple,
            true,
            BootMode::Full,
            "Full Security",
        )
        .with_policy_version("2");
        let out = status.render_table(&Theme::plain());
        assert!(out.contains("Policy version"));
        assert!(out.contains("Apple Secure Boot"));
    }

    #[test]
    fn biometrics_table_uses_platform_labels() {
        let status = BiometricStatus::new("darwin", Modality::new(true, false), Modality::ABSENT);
        let out = status.render_table(&Theme::plain());
        assert!(out.contains("Touch ID"));
        assert!(out.contains("fingerprint"));
    }
}
