use super::table::{Cell, Table};
use super::theme::{borders, icons, Theme, Tone};
use super::{platform_label, section_title, RenderTable};
use crate::score::{OverallStatus, SecuritySummary};

pub const SCORE_BAR_WIDTH: usize = 40;

fn score_tone(score: u8) -> Tone {
    if score >= 75 {
        Tone::Success
    } else if score >= 50 {
        Tone::Warning
    } else {
        Tone::Danger
    }
}

/// Fixed-width bar: one filled cell per 2.5 points.
pub fn score_bar(score: u8, width: usize, theme: &Theme) -> String {
    let filled = (usize::from(score.min(100)) * width / 100).min(width);
    let bar = format!(
        "{}{}",
        icons::BAR_FILLED.repeat(filled),
        icons::BAR_EMPTY.repeat(width - filled)
    );
    format!("[{}]", theme.paint(&bar, score_tone(score)))
}

fn status_badge(status: OverallStatus, theme: &Theme) -> String {
    let (icon, label, tone) = match status {
        OverallStatus::Excellent => (icons::CHECK, "Excellent", Tone::Success),
        OverallStatus::Good => (icons::CHECK, "Good", Tone::Success),
        OverallStatus::Fair => (icons::WARNING, "Fair", Tone::Warning),
        OverallStatus::NeedsImprovement => (icons::WARNING, "Needs Improvement", Tone::Warning),
        OverallStatus::Critical => (icons::CROSS, "Critical", Tone::Danger),
    };
    theme.paint(&format!("{icon} {label}"), tone)
}

fn feature_state(ok: bool) -> Cell {
    if ok {
        Cell::new(format!("{} Enabled", icons::CHECK), Tone::Success)
    } else {
        Cell::new(format!("{} Disabled", icons::CROSS), Tone::Danger)
    }
}

fn not_applicable(table: &mut Table, name: &str) {
    table.row([
        Cell::plain(name),
        Cell::new("N/A", Tone::Muted),
        Cell::new("-", Tone::Muted),
    ]);
}

impl RenderTable for SecuritySummary {
    fn render_table(&self, theme: &Theme) -> String {
        let mut out = section_title(icons::SHIELD, "Security Summary", theme);

        out.push_str(&theme.paint("Platform: ", Tone::Bold));
        out.push_str(&theme.paint(platform_label(&self.platform), Tone::Info));
        out.push_str("\n\n");

        out.push_str(&theme.paint("Security Score: ", Tone::Bold));
        out.push_str(&theme.paint(
            &format!("{}/100", self.overall_score),
            score_tone(self.overall_score),
        ));
        out.push('\n');
        out.push_str(&score_bar(self.overall_score, SCORE_BAR_WIDTH, theme));
        out.push_str("\n\n");

        out.push_str(&theme.paint("Status: ", Tone::Bold));
        out.push_str(&status_badge(self.overall_status, theme));
        out.push_str("\n\n");

        let chip_name = if self.platform == "darwin" {
            "Secure Enclave"
        } else {
            "TPM"
        };
        let mut table = Table::new(["Feature", "Status", "Details"]);
        match &self.tpm {
            Some(tpm) => {
                table.row([
                    Cell::plain(chip_name),
                    feature_state(tpm.present && tpm.enabled),
                    Cell::plain(tpm.chip_type.as_str()),
                ]);
            }
            None => not_applicable(&mut table, chip_name),
        }
        match &self.secure_boot {
            Some(boot) => {
                table.row([
                    Cell::plain("Secure Boot"),
                    feature_state(boot.enabled),
                    Cell::plain(boot.mode.as_str()),
                ]);
            }
            None => not_applicable(&mut table, "Secure Boot"),
        }
        match &self.encryption {
            Some(enc) => {
                table.row([
                    Cell::plain(enc.encryption_type.product_name()),
                    feature_state(enc.enabled),
                    Cell::plain(enc.status.as_str()),
                ]);
            }
            None => not_applicable(&mut table, "Disk Encryption"),
        }
        match &self.biometrics {
            Some(bio) => {
                table.row([
                    Cell::plain("Biometrics"),
                    feature_state(bio.configured),
                    Cell::plain(bio.biometry_type.as_str()),
                ]);
            }
            None => not_applicable(&mut table, "Biometrics"),
        }
        out.push_str(&theme.paint("Security Features:", Tone::Bold));
        out.push('\n');
        out.push_str(&table.render(theme));

        if !self.recommendations.is_empty() {
            out.push('\n');
            out.push_str(&theme.paint(&format!("{} Recommendations:", icons::WARNING), Tone::Bold));
            out.push('\n');
            out.push_str(&theme.paint(&borders::HORIZONTAL.repeat(50), Tone::Muted));
            out.push('\n');
            for (idx, rec) in self.recommendations.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", idx + 1, theme.paint(rec, Tone::Warning)));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BootMode, ChipType};
    use crate::score::{BootSummary, ChipSummary};

    fn summary(score: u8, recommendations: Vec<String>) -> SecuritySummary {
        SecuritySummary {
            platform: "linux".to_string(),
            overall_score: score,
            overall_status: OverallStatus::from_score(score),
            tpm: Some(ChipSummary {
                present: true,
                enabled: true,
                chip_type: ChipType::Tpm20,
            }),
            secure_boot: Some(BootSummary {
                enabled: false,
                mode: BootMode::Disabled,
            }),
            encryption: None,
            biometrics: None,
            recommendations,
        }
    }

    #[test]
    fn score_bar_has_fixed_width() {
        let theme = Theme::plain();
        for score in [0u8, 25, 50, 75, 100] {
            let bar = score_bar(score, SCORE_BAR_WIDTH, &theme);
            assert_eq!(bar.chars().count(), SCORE_BAR_WIDTH + 2);
        }
        let half = score_bar(50, SCORE_BAR_WIDTH, &theme);
        assert_eq!(half.matches(icons::BAR_FILLED).count(), 20);
    }

    #[test]
    fn summary_table_numbers_recommendations() {
        let out = summary(
            25,
            vec!["Enable Secure Boot for enhanced boot security".to_string()],
        )
        .render_table(&Theme::plain());
        assert!(out.contains("Security Score: 25/100"));
        assert!(out.contains("Needs Improvement"));
        assert!(out.contains("1. Enable Secure Boot for enhanced boot security"));
        assert!(out.contains("N/A"));
    }

    #[test]
    fn summary_table_skips_empty_recommendations() {
        let out = summary(25, Vec::new()).render_table(&Theme::plain());
        assert!(!out.contains("Recommendations"));
    }
}
