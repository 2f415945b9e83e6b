//! Fixed-width text rendering of result sets.
//!
//! Turns any [`ResultSet`] into a block of aligned text:
//!
//! ```text
//! id name
//! -- -----------
//! 1  Engineering
//! 2  Sales
//! ```
//!
//! Every column is as wide as its header or its widest value, whichever is
//! larger. Cells are left-aligned and never truncated. Null cells render as
//! blanks. Widths are measured in terminal columns, so wide characters count
//! twice.
//!
//! Writing the text to the console is the caller's job.

use unicode_width::UnicodeWidthStr;

use crate::store::ResultSet;

/// Message rendered in place of a table when there are no rows.
pub const NO_RESULTS: &str = "No results found.";

/// Render a result set as a text block.
///
/// Lines are separated by `\n`; there is no trailing newline.
#[must_use]
pub fn render(result: &ResultSet) -> String {
    if result.is_empty() {
        return NO_RESULTS.to_string();
    }

    let cells: Vec<Vec<String>> = result
        .rows()
        .iter()
        .map(|row| row.iter().map(display_value).collect())
        .collect();

    let widths = column_widths(result.columns(), &cells);

    let mut lines = Vec::with_capacity(cells.len() + 2);
    lines.push(join_padded(result.columns().iter().map(String::as_str), &widths));
    lines.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join(" "));
    for row in &cells {
        lines.push(join_padded(row.iter().map(String::as_str), &widths));
    }

    lines.join("\n")
}

/// Canonical text form of a cell.
///
/// Null is the empty string, strings are shown unescaped, numbers in plain
/// decimal without exponents. Control characters (newlines, tabs) become
/// spaces so every row stays on one line. Arrays and objects fall back to
/// compact JSON.
#[must_use]
pub fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => {
            s.chars().map(|c| if c.is_control() { ' ' } else { c }).collect()
        }
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
        // f64's Display never switches to exponent notation
        serde_json::Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string()),
        serde_json::Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn column_widths(columns: &[String], cells: &[Vec<String>]) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            cells.iter().map(|row| row[idx].width()).fold(name.width(), usize::max)
        })
        .collect()
}

fn join_padded<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    values.zip(widths).map(|(value, width)| pad_right(value, *width)).collect::<Vec<_>>().join(" ")
}

// `format!("{:<w$}")` pads by char count, which misaligns wide characters.
fn pad_right(value: &str, width: usize) -> String {
    let mut padded = String::with_capacity(width.max(value.len()));
    padded.push_str(value);
    padded.extend(std::iter::repeat(' ').take(width.saturating_sub(value.width())));
    padded
}
