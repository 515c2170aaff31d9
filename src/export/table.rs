//! Adaptive console table.

use super::render_value;
use crate::config::{DisplayMode, OutputConfig};
use crate::record::ResolvedRecord;

/// Print the record set as an aligned table, clipping cells at the
/// configured width.
pub fn print_table(records: &[ResolvedRecord], config: &OutputConfig, mode: DisplayMode) {
    let headers: Vec<&str> = config.columns.iter().map(|column| column.header()).collect();
    let matrix: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            config
                .columns
                .iter()
                .map(|column| render_value(record, *column, mode))
                .collect()
        })
        .collect();

    let max_width = config.max_col_width.max(1);
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let cell_max = matrix
                .iter()
                .map(|row| row[i].chars().count())
                .max()
                .unwrap_or(0);
            header.chars().count().max(cell_max).min(max_width)
        })
        .collect();

    let header_line: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| pad(&clip(header, widths[i]), widths[i]))
        .collect();
    println!("{}", header_line.join(" | "));

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    println!("{}", separator.join("-+-"));

    for row in &matrix {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| pad(&clip(cell, widths[i]), widths[i]))
            .collect();
        println!("{}", line.join(" | "));
    }
}

/// Clip to `width` characters, ending with an ellipsis when truncated.
fn clip(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        return text.to_string();
    }
    if width <= 1 {
        return text.chars().take(width).collect();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push('…');
    out
}

fn pad(text: &str, width: usize) -> String {
    let count = text.chars().count();
    let mut out = text.to_string();
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(count)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_respects_char_boundaries() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("abcdefgh", 5), "abcd…");
        assert_eq!(clip("ééééé", 3), "éé…");
        assert_eq!(clip("abc", 1), "a");
    }

    #[test]
    fn pad_fills_to_width() {
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(pad("abcd", 2), "abcd");
    }
}
