//! Formatted output helpers for CLI commands.
//!
//! Provides the shared ANSI styles, aligned tables, and the URL and
//! warning blocks printed after a launch.

/// Bold text.
pub const BOLD: &str = "\x1b[1m";
/// Dimmed text.
pub const DIM: &str = "\x1b[2m";
/// Green text.
pub const GREEN: &str = "\x1b[32m";
/// Cyan text.
pub const CYAN: &str = "\x1b[36m";
/// Yellow text.
pub const YELLOW: &str = "\x1b[33m";
/// Resets all styles.
pub const RESET: &str = "\x1b[0m";

/// Prints the banner shown at the top of long-running commands.
pub fn print_header() {
    eprintln!();
    eprintln!(
        "  {BOLD}ispawn{RESET} {DIM}v{}{RESET}",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!();
}

/// Prints access URLs, one per service.
pub fn print_urls(urls: &[(&str, String)]) {
    for (service, url) in urls {
        eprintln!("  {CYAN}{service:<12}{RESET} {url}");
    }
}

/// Prints non-fatal warnings.
pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("  {YELLOW}warning:{RESET} {warning}");
    }
}

/// Renders rows as left-aligned columns sized to their widest cell.
///
/// Every line, header included, ends with a newline; trailing spaces are
/// trimmed.
#[must_use]
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }
    let mut out = render_line(headers.iter().copied(), &widths);
    for row in rows {
        out.push_str(&render_line(row.iter().map(String::as_str), &widths));
    }
    out
}

fn render_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let line = cells
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect::<Vec<_>>()
        .join("  ");
    format!("{}\n", line.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_aligns_columns() {
        let rows = vec![
            vec!["a".to_owned(), "running".to_owned()],
            vec!["longer".to_owned(), "exited".to_owned()],
        ];
        let out = table(&["RUN", "STATE"], &rows);
        assert_eq!(
            out,
            "RUN     STATE\na       running\nlonger  exited\n"
        );
    }

    #[test]
    fn table_without_rows_is_header_only() {
        assert_eq!(table(&["NAME", "SIZE"], &[]), "NAME  SIZE\n");
    }

    #[test]
    fn table_ignores_extra_cells() {
        let rows = vec![vec!["x".to_owned(), "y".to_owned()]];
        assert_eq!(table(&["A"], &rows), "A\nx\n");
    }
}
