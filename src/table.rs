//! Plain-text table rendering for previews.

use std::fmt::Write as _;

/// Renders headers and rows as an aligned two-space-separated table with a
/// dashed separator line. Control characters inside cells become spaces so
/// a stray newline cannot break the layout.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    push_row(&mut output, headers, &widths);
    let dashes: Vec<String> = widths.iter().map(|w| "-".repeat((*w).max(1))).collect();
    push_row(&mut output, &dashes, &widths);
    for row in rows {
        push_row(&mut output, row, &widths);
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn push_row(output: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (idx, cell) in cells.iter().enumerate().take(widths.len()) {
        let cleaned: String = cell
            .chars()
            .map(|ch| if ch.is_control() { ' ' } else { ch })
            .collect();
        if idx > 0 {
            line.push_str("  ");
        }
        let padding = widths[idx].saturating_sub(cleaned.chars().count());
        line.push_str(&cleaned);
        line.push_str(&" ".repeat(padding));
    }
    let _ = writeln!(output, "{}", line.trim_end());
}
