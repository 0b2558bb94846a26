//! CSV rendering for attendance exports.

use csv::{QuoteStyle, WriterBuilder};

fn needs_formula_guard(value: &str) -> bool {
    matches!(value.chars().next(), Some('=' | '+' | '-' | '@'))
}

/// Prefixes cells that a spreadsheet would evaluate as formulas.
fn guard_cell(value: &str) -> String {
    if needs_formula_guard(value) {
        format!("'{value}")
    } else {
        value.to_string()
    }
}

/// Renders a header row plus `rows` with every cell quoted.
pub fn render_csv<I>(header: &[&str], rows: I) -> anyhow::Result<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row.iter().map(|cell| guard_cell(cell)))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_every_cell_and_escapes_quotes() {
        let csv = render_csv(
            &["Date", "Remarks"],
            vec![vec!["2024-06-03".into(), "said \"hi\"".into()]],
        )
        .unwrap();
        assert_eq!(
            csv,
            "\"Date\",\"Remarks\"\n\"2024-06-03\",\"said \"\"hi\"\"\"\n"
        );
    }

    #[test]
    fn formula_cells_are_guarded() {
        let csv = render_csv(&["Remarks"], vec![vec!["=SUM(A1)".into()]]).unwrap();
        assert!(csv.contains("\"'=SUM(A1)\""));
    }
}
