use super::types::ColorChoice;

pub(super) fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

pub(super) fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|v| non_empty(Some(v)))
}

pub(super) fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "enabled" | "on"
    )
}

pub(super) fn parse_color(raw: &str) -> Option<ColorChoice> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "auto" => Some(ColorChoice::Auto),
        "always" | "force" => Some(ColorChoice::Always),
        "never" | "none" | "off" => Some(ColorChoice::Never),
        _ => None,
    }
}
