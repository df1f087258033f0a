use crossterm::style::{Color, Stylize};

pub mod colors {
    use crossterm::style::Color;

    pub const SUCCESS: Color = Color::Green;
    pub const DANGER: Color = Color::Red;
    pub const WARNING: Color = Color::Yellow;
    pub const INFO: Color = Color::Cyan;
    pub const MUTED: Color = Color::DarkGrey;
}

pub mod icons {
    pub const CHECK: &str = "✓";
    pub const CROSS: &str = "✗";
    pub const WARNING: &str = "⚠";
    pub const SHIELD: &str = "◆";
    pub const LOCK: &str = "■";
    pub const FINGERPRINT: &str = "◉";
    pub const CHIP: &str = "▣";
    pub const BAR_FILLED: &str = "█";
    pub const BAR_EMPTY: &str = "░";
}

pub mod borders {
    pub const TOP_LEFT: &str = "┌";
    pub const TOP_RIGHT: &str = "┐";
    pub const BOTTOM_LEFT: &str = "└";
    pub const BOTTOM_RIGHT: &str = "┘";
    pub const HORIZONTAL: &str = "─";
    pub const VERTICAL: &str = "│";
    pub const TOP_TEE: &str = "┬";
    pub const BOTTOM_TEE: &str = "┴";
    pub const LEFT_TEE: &str = "├";
    pub const RIGHT_TEE: &str = "┤";
    pub const CROSS: &str = "┼";
}

/// Semantic role of a piece of text; the theme maps it to a colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Plain,
    Bold,
    Header,
    Success,
    Warning,
    Danger,
    Info,
    Muted,
}

impl Tone {
    pub fn for_flag(ok: bool) -> Self {
        if ok {
            Self::Success
        } else {
            Self::Danger
        }
    }

    fn color(&self) -> Option<Color> {
        match self {
            Self::Plain | Self::Bold => None,
            Self::Header | Self::Info => Some(colors::INFO),
            Self::Success => Some(colors::SUCCESS),
            Self::Warning => Some(colors::WARNING),
            Self::Danger => Some(colors::DANGER),
            Self::Muted => Some(colors::MUTED),
        }
    }
}

/// Colour decision made once by the caller (`--color`, `NO_COLOR`, tty).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Theme {
    pub color: bool,
}

impl Theme {
    pub fn colored() -> Self {
        Self { color: true }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn paint(&self, text: &str, tone: Tone) -> String {
        if !self.color {
            return text.to_string();
        }
        let bold = matches!(tone, Tone::Bold | Tone::Header);
        match (tone.color(), bold) {
            (Some(color), true) => format!("{}", text.with(color).bold()),
            (Some(color), false) => format!("{}", text.with(color)),
            (None, true) => format!("{}", text.bold()),
            (None, false) => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_theme_never_emits_escapes() {
        let theme = Theme::plain();
        for tone in [Tone::Header, Tone::Success, Tone::Danger, Tone::Muted] {
            assert_eq!(theme.paint("TPM", tone), "TPM");
        }
    }

    #[test]
    fn colored_theme_wraps_text_in_escapes() {
        let painted = Theme::colored().paint("enabled", Tone::Success);
        assert!(painted.contains('\u{1b}'));
        assert!(painted.contains("enabled"));
        assert_eq!(Theme::colored().paint("x", Tone::Plain), "x");
    }
}
