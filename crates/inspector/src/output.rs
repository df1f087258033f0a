use is_terminal::IsTerminal;
use posture::Theme;

use crate::config::ColorChoice;

pub fn use_color(choice: ColorChoice, no_color: bool, is_tty: bool) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => is_tty && !no_color,
    }
}

/// Decided once per run from `--color`, `NO_COLOR` and whether stdout is a tty.
pub fn theme_for(choice: ColorChoice) -> Theme {
    let no_color = std::env::var_os("NO_COLOR").is_some();
    if use_color(choice, no_color, std::io::stdout().is_terminal()) {
        Theme::colored()
    } else {
        Theme::plain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_requires_tty_and_no_no_color() {
        assert!(use_color(ColorChoice::Auto, false, true));
        assert!(!use_color(ColorChoice::Auto, true, true));
        assert!(!use_color(ColorChoice::Auto, false, false));
    }

    #[test]
    fn explicit_choices_ignore_environment() {
        assert!(use_color(ColorChoice::Always, true, false));
        assert!(!use_color(ColorChoice::Never, false, true));
    }
}
