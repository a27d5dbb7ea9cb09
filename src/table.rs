//! Plain-text grid tables for terminal output.

use crate::models::PollutantLevels;

// ---

/// Render `rows` under `headers` as a bordered grid.
///
/// Column count is the widest of the header and any row; short rows are
/// padded with empty cells. Widths are measured in chars.
pub fn render_table<S: AsRef<str>>(rows: &[Vec<String>], headers: &[S]) -> String {
    // ---
    let columns = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(headers.len()))
        .max()
        .unwrap_or(0);

    let mut widths = vec![0usize; columns];
    for (i, h) in headers.iter().enumerate() {
        widths[i] = widths[i].max(h.as_ref().chars().count());
    }
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = rule(&widths, '-');
    if !headers.is_empty() {
        out.push_str(&line(&widths, headers.iter().map(|h| h.as_ref())));
        out.push_str(&rule(&widths, '='));
    }
    for row in rows {
        out.push_str(&line(&widths, row.iter().map(String::as_str)));
        out.push_str(&rule(&widths, '-'));
    }
    out
}

fn rule(widths: &[usize], fill: char) -> String {
    // ---
    let mut out = String::from("+");
    for w in widths {
        out.extend(std::iter::repeat(fill).take(w + 2));
        out.push('+');
    }
    out.push('\n');
    out
}

fn line<'a>(widths: &[usize], mut cells: impl Iterator<Item = &'a str>) -> String {
    // ---
    let mut out = String::from("|");
    for w in widths {
        let cell = cells.next().unwrap_or("");
        let pad = w - cell.chars().count();
        out.push(' ');
        out.push_str(cell);
        out.extend(std::iter::repeat(' ').take(pad + 1));
        out.push('|');
    }
    out.push('\n');
    out
}

/// Display form of a pollutant map, e.g. `{NO2: 12.5, PM10: 40}`.
pub fn format_levels(levels: &PollutantLevels) -> String {
    // ---
    let inner: Vec<String> = levels
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect();
    format!("{{{}}}", inner.join(", "))
}

/// Averages are shown to one decimal place.
pub fn format_mean(value: f64) -> String {
    format!("{:.1}", value)
}
