//! JSON and table renderings of status records.
//!
//! Both renderings are pure functions of a record; nothing here detects or
//! scores anything.

mod records;
mod summary;
pub mod table;
pub mod theme;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use table::{Cell, Table};
pub use theme::{Theme, Tone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

impl OutputFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "table" | "text" => Some(Self::Table),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Table => "table",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown output format '{s}' (expected json or table)"))
    }
}

/// Table rendering of a record.
pub trait RenderTable {
    fn render_table(&self, theme: &Theme) -> String;
}

pub fn render<T>(record: &T, format: OutputFormat, theme: &Theme) -> serde_json::Result<String>
where
    T: Serialize + RenderTable,
{
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(record),
        OutputFormat::Table => Ok(record.render_table(theme)),
    }
}

pub(crate) fn section_title(icon: &str, title: &str, theme: &Theme) -> String {
    let mut out = String::from("\n");
    out.push_str(&theme.paint(&format!("{icon} {title}"), Tone::Header));
    out.push('\n');
    out.push_str(&theme.paint(&theme::borders::HORIZONTAL.repeat(60), Tone::Muted));
    out.push_str("\n\n");
    out
}

pub(crate) fn flag_cell(value: bool) -> Cell {
    if value {
        Cell::new(format!("{} Yes", theme::icons::CHECK), Tone::Success)
    } else {
        Cell::new(format!("{} No", theme::icons::CROSS), Tone::Danger)
    }
}

pub(crate) fn platform_label(platform: &str) -> &str {
    match platform {
        "darwin" => "macOS",
        "windows" => "Windows",
        "linux" => "Linux",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_parses_case_insensitively() {
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse(" table "), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::parse("yaml"), None);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
