use crate::config::OutputFormat;
use crate::domain::model::{CellValue, ResultTable};
use crate::utils::error::Result;

pub fn render(table: &ResultTable, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(format_table(table)),
        OutputFormat::Csv => format_csv(table),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&table.to_records())?),
    }
}

/// Aligned text table with a row count footer.
pub fn format_table(table: &ResultTable) -> String {
    if table.columns.is_empty() {
        return String::new();
    }

    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(format_cell).collect())
        .collect();

    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (i, value) in row.iter().enumerate() {
            widths[i] = widths[i].max(value.chars().count());
        }
    }

    let separator = format!(
        "+{}+\n",
        widths
            .iter()
            .map(|w| "-".repeat(*w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );

    let mut output = String::new();
    output.push_str(&separator);
    let header = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!(" {:^width$} ", c, width = *w))
        .collect::<Vec<_>>()
        .join("|");
    output.push_str(&format!("|{}|\n", header));
    output.push_str(&separator);

    for (row, raw) in cells.iter().zip(&table.rows) {
        let line = row
            .iter()
            .zip(raw)
            .zip(&widths)
            .map(|((value, cell), w)| match cell {
                CellValue::Integer(_) | CellValue::Real(_) => format!(" {:>width$} ", value, width = *w),
                _ => format!(" {:<width$} ", value, width = *w),
            })
            .collect::<Vec<_>>()
            .join("|");
        output.push_str(&format!("|{}|\n", line));
    }

    if !table.is_empty() {
        output.push_str(&separator);
    }
    output.push_str(&format!("{} row(s) returned\n", table.len()));

    output
}

pub fn format_csv(table: &ResultTable) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Horizontal bar chart: first column as labels, first numeric column as values.
///
/// Returns `None` when there is nothing to plot.
pub fn format_bar_chart(table: &ResultTable, width: usize) -> Option<String> {
    if table.is_empty() || table.columns.len() < 2 {
        return None;
    }

    let value_idx = (1..table.columns.len())
        .find(|&idx| table.rows.iter().any(|row| row[idx].as_f64().is_some()))?;

    let points: Vec<(String, f64)> = table
        .rows
        .iter()
        .map(|row| (row[0].to_string(), row[value_idx].as_f64().unwrap_or(0.0)))
        .collect();

    let max = points.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let label_width = points
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);

    let mut output = format!("{}\n", table.columns[value_idx]);
    for (label, value) in points {
        let bar_len = if max > 0.0 {
            ((value / max) * width as f64).round() as usize
        } else {
            0
        };
        output.push_str(&format!(
            "{:<label_width$} | {} {}\n",
            label,
            "█".repeat(bar_len),
            format_number(value),
            label_width = label_width
        ));
    }
    Some(output)
}

fn format_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Real(r) => format_number(*r),
        other => other.to_string(),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn claims_by_meal() -> ResultTable {
        ResultTable {
            columns: vec!["Meal_Type".to_string(), "NumberOfClaims".to_string()],
            rows: vec![
                vec![CellValue::Text("Dinner".to_string()), CellValue::Integer(4)],
                vec![CellValue::Text("Lunch".to_string()), CellValue::Integer(2)],
            ],
        }
    }

    #[test]
    fn test_format_table() {
        let expected = "\
+-----------+----------------+
| Meal_Type | NumberOfClaims |
+-----------+----------------+
| Dinner    |              4 |
| Lunch     |              2 |
+-----------+----------------+
2 row(s) returned
";
        assert_eq!(format_table(&claims_by_meal()), expected);
    }

    #[test]
    fn test_format_csv_quotes_commas() {
        let table = ResultTable {
            columns: vec!["Name".to_string(), "Address".to_string()],
            rows: vec![vec![
                CellValue::Text("Bakery".to_string()),
                CellValue::Text("1 Main St, Boston".to_string()),
            ]],
        };
        assert_eq!(
            format_csv(&table).unwrap(),
            "Name,Address\nBakery,\"1 Main St, Boston\"\n"
        );
    }

    #[test]
    fn test_bar_chart_scales_to_width() {
        let chart = format_bar_chart(&claims_by_meal(), 10).unwrap();
        let lines: Vec<&str> = chart.lines().collect();

        assert_eq!(lines[0], "NumberOfClaims");
        assert_eq!(lines[1], format!("Dinner | {} 4", "█".repeat(10)));
        assert_eq!(lines[2], format!("Lunch  | {} 2", "█".repeat(5)));
    }

    #[test]
    fn test_bar_chart_needs_numbers() {
        let table = ResultTable {
            columns: vec!["Name".to_string(), "Contact".to_string()],
            rows: vec![vec![
                CellValue::Text("Bakery".to_string()),
                CellValue::Text("555-0101".to_string()),
            ]],
        };
        assert!(format_bar_chart(&table, 10).is_none());
        assert!(format_bar_chart(&ResultTable::default(), 10).is_none());
    }

    #[test]
    fn test_json_output() {
        let json = render(&claims_by_meal(), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["Meal_Type"], "Dinner");
        assert_eq!(parsed[1]["NumberOfClaims"], 2);
    }
}
