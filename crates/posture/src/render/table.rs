use unicode_width::UnicodeWidthStr;

use super::theme::{borders, Theme, Tone};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub tone: Tone,
}

impl Cell {
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Tone::Plain)
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Self::plain(text)
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Self::plain(text)
    }
}

/// Boxed table whose column widths come from display width of unstyled text.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row<I, C>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        let mut cells: Vec<Cell> = cells.into_iter().map(Into::into).collect();
        cells.resize(self.headers.len(), Cell::plain(""));
        self.rows.push(cells);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        for row in &self.rows {
            for (idx, cell) in row.iter().enumerate() {
                widths[idx] = widths[idx].max(cell.text.width());
            }
        }
        widths
    }

    pub fn render(&self, theme: &Theme) -> String {
        let widths = self.widths();
        let mut out = String::new();

        out.push_str(&rule(
            &widths,
            borders::TOP_LEFT,
            borders::TOP_TEE,
            borders::TOP_RIGHT,
            theme,
        ));
        let header: Vec<Cell> = self
            .headers
            .iter()
            .map(|h| Cell::new(h.clone(), Tone::Header))
            .collect();
        out.push_str(&line(&header, &widths, theme));
        out.push_str(&rule(
            &widths,
            borders::LEFT_TEE,
            borders::CROSS,
            borders::RIGHT_TEE,
            theme,
        ));
        for row in &self.rows {
            out.push_str(&line(row, &widths, theme));
        }
        out.push_str(&rule(
            &widths,
            borders::BOTTOM_LEFT,
            borders::BOTTOM_TEE,
            borders::BOTTOM_RIGHT,
            theme,
        ));
        out
    }
}

/// Pad on display width, then style, so escapes never skew alignment.
pub fn pad_right(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

fn rule(widths: &[usize], left: &str, mid: &str, right: &str, theme: &Theme) -> String {
    let segments: Vec<String> = widths
        .iter()
        .map(|w| borders::HORIZONTAL.repeat(w + 2))
        .collect();
    let text = format!("{}{}{}", left, segments.join(mid), right);
    format!("{}\n", theme.paint(&text, Tone::Muted))
}

fn line(cells: &[Cell], widths: &[usize], theme: &Theme) -> String {
    let bar = theme.paint(borders::VERTICAL, Tone::Muted);
    let mut out = bar.clone();
    for (cell, width) in cells.iter().zip(widths) {
        out.push(' ');
        out.push_str(&theme.paint(&pad_right(&cell.text, *width), cell.tone));
        out.push(' ');
        out.push_str(&bar);
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_on_display_width() {
        let mut table = Table::new(["Property", "Value"]);
        table.row(["Present", "✓ yes"]);
        table.row(["Manufacturer", "Infineon (IFX)"]);
        let out = table.render(&Theme::plain());
        let widths: Vec<usize> = out.lines().map(|l| l.width()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{out}");
        assert!(out.starts_with("┌"));
        assert!(out.contains("│ Manufacturer │ Infineon (IFX) │"));
    }

    #[test]
    fn short_rows_are_padded_to_header_count() {
        let mut table = Table::new(["Feature", "Status", "Details"]);
        table.row(["TPM"]);
        let out = table.render(&Theme::plain());
        assert_eq!(out.lines().count(), 5);
    }

    #[test]
    fn pad_right_counts_wide_characters() {
        assert_eq!(pad_right("ab", 4), "ab  ");
        assert_eq!(pad_right("日本", 5), "日本 ");
        assert_eq!(pad_right("toolong", 3), "toolong");
    }
}
