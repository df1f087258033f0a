use std::path::PathBuf;

use clap::{Parser, Subcommand};
use posture::{Feature, OutputFormat};

use crate::config::ColorChoice;

/// hwposture - hardware security posture inspector
#[derive(Parser, Debug)]
#[command(name = "hwposture")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format: json (default) or table
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Colorize table output
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (overrides HWPOSTURE_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// TPM or Secure Enclave status
    #[command(visible_aliases = ["chip", "tpm", "se", "secureenclave"])]
    SecurityChip,

    /// Secure Boot configuration
    #[command(visible_aliases = ["secureboot", "boot"])]
    SecureBoot,

    /// Full-disk encryption (FileVault, BitLocker, LUKS)
    #[command(visible_aliases = ["disk-encryption", "fde"])]
    Encryption,

    /// Fingerprint and face authentication hardware
    #[command(visible_aliases = ["bio", "biometric"])]
    Biometrics,

    /// Scored overview of all supported features
    #[command(visible_aliases = ["sum", "status", "security"])]
    Summary,

    /// Which features this platform can inspect
    Features,
}

impl Commands {
    /// The single feature a subcommand inspects, if any.
    pub fn feature(&self) -> Option<Feature> {
        match self {
            Self::SecurityChip => Some(Feature::SecurityChip),
            Self::SecureBoot => Some(Feature::SecureBoot),
            Self::Encryption => Some(Feature::Encryption),
            Self::Biometrics => Some(Feature::Biometrics),
            Self::Summary | Self::Features => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("hwposture").chain(args.iter().copied()))
            .expect("parse")
    }

    #[test]
    fn aliases_resolve_to_subcommands() {
        for alias in ["security-chip", "chip", "tpm", "se", "secureenclave"] {
            assert_eq!(parse(&[alias]).command, Commands::SecurityChip);
        }
        for alias in ["secure-boot", "secureboot", "boot"] {
            assert_eq!(parse(&[alias]).command, Commands::SecureBoot);
        }
        for alias in ["encryption", "disk-encryption", "fde"] {
            assert_eq!(parse(&[alias]).command, Commands::Encryption);
        }
        for alias in ["biometrics", "bio", "biometric"] {
            assert_eq!(parse(&[alias]).command, Commands::Biometrics);
        }
        for alias in ["summary", "sum", "status", "security"] {
            assert_eq!(parse(&[alias]).command, Commands::Summary);
        }
        assert_eq!(parse(&["features"]).command, Commands::Features);
    }

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() {
        let cli = parse(&["summary", "-f", "table", "--color", "never", "-vv"]);
        assert_eq!(cli.format, Some(OutputFormat::Table));
        assert_eq!(cli.color, Some(ColorChoice::Never));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn format_defaults_to_unset_and_rejects_unknown_values() {
        assert_eq!(parse(&["tpm"]).format, None);
        assert!(Cli::try_parse_from(["hwposture", "-f", "yaml", "tpm"]).is_err());
    }

    #[test]
    fn missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["hwposture"]).is_err());
    }

    #[test]
    fn only_feature_commands_map_to_a_feature() {
        assert_eq!(Commands::Biometrics.feature(), Some(Feature::Biometrics));
        assert_eq!(Commands::Summary.feature(), None);
        assert_eq!(Commands::Features.feature(), None);
    }
}
