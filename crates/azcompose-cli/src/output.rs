//! Formatted output helpers for CLI commands.
//!
//! Commands render into a `String` first so the rendering can be tested,
//! then hand it to [`emit`].

use serde::Serialize;

/// Heavy rule printed under headings.
const RULE: char = '\u{2550}';

/// Writes rendered output to stdout.
#[allow(clippy::print_stdout)]
pub fn emit(text: &str) {
    print!("{text}");
}

/// Writes a value as pretty JSON.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn emit_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    emit(&text);
    Ok(())
}

/// A title followed by a rule of the same width.
#[must_use]
pub fn heading(title: &str) -> String {
    let width = title.chars().count().max(20);
    format!("{title}\n{}\n", RULE.to_string().repeat(width))
}

/// Left-aligned columns sized to the widest cell, two spaces apart.
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

    let render = |cells: &mut dyn Iterator<Item = &str>| {
        let line = cells
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        format!("{}\n", line.trim_end())
    };

    let mut out = render(&mut headers.iter().copied());
    for row in rows {
        out.push_str(&render(&mut row.iter().map(String::as_str)));
    }
    out
}

/// `1 resource`, `3 resources`.
#[must_use]
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_aligns_columns() {
        let rendered = table(
            &["NAME", "KIND"],
            &[
                vec!["staticEndpoint".into(), "attribute".into()],
                vec!["cdnEndpoint".into(), "derived".into()],
            ],
        );
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "NAME            KIND");
        assert_eq!(lines[1], "staticEndpoint  attribute");
        assert_eq!(lines[2], "cdnEndpoint     derived");
    }

    #[test]
    fn table_without_rows_prints_headers() {
        assert_eq!(table(&["NAME"], &[]), "NAME\n");
    }

    #[test]
    fn heading_rule_matches_title() {
        let rendered = heading("Preview of the webserver stack");
        let rule = rendered.lines().nth(1).unwrap();
        assert_eq!(rule.chars().count(), 30);
    }

    #[test]
    fn plural_counts() {
        assert_eq!(plural(1, "export"), "1 export");
        assert_eq!(plural(0, "export"), "0 exports");
    }
}
