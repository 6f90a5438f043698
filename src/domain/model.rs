use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    #[serde(rename = "Provider_ID")]
    pub provider_id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub provider_type: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Contact")]
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receiver {
    #[serde(rename = "Receiver_ID")]
    pub receiver_id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub receiver_type: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Contact")]
    pub contact: String,
}

/// A Food_Listings row. Dates arrive as spreadsheet text and are normalised
/// by the loader before insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodListing {
    #[serde(rename = "Food_ID")]
    pub food_id: i64,
    #[serde(rename = "Food_Name")]
    pub food_name: String,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
    #[serde(rename = "Expiry_Date")]
    pub expiry_date: String,
    #[serde(rename = "Provider_ID")]
    pub provider_id: i64,
    #[serde(rename = "Provider_Type")]
    pub provider_type: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Food_Type")]
    pub food_type: String,
    #[serde(rename = "Meal_Type")]
    pub meal_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "Claim_ID")]
    pub claim_id: i64,
    #[serde(rename = "Food_ID")]
    pub food_id: i64,
    #[serde(rename = "Receiver_ID")]
    pub receiver_id: i64,
    /// Free text; "Completed" is the only value the catalog treats specially.
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
}

/// Input of the single-row insert form. Food_ID is assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewListing {
    pub food_name: String,
    pub quantity: u32,
    pub expiry_date: NaiveDate,
    pub provider_id: i64,
    pub provider_type: Option<String>,
    pub location: Option<String>,
    pub food_type: Option<String>,
    pub meal_type: Option<String>,
}

impl NewListing {
    pub fn new(food_name: impl Into<String>, quantity: u32, expiry_date: NaiveDate, provider_id: i64) -> Self {
        Self {
            food_name: food_name.into(),
            quantity,
            expiry_date,
            provider_id,
            provider_type: None,
            location: None,
            food_type: None,
            meal_type: None,
        }
    }
}

/// One cell of a materialised result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Real(r) => write!(f, "{}", r),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// Ordered columns and ordered rows, column names taken from the SQL projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ResultTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn column(&self, name: &str) -> Vec<&CellValue> {
        match self.column_index(name) {
            Some(idx) => self.rows.iter().map(|row| &row[idx]).collect(),
            None => Vec::new(),
        }
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Rows as column-name keyed JSON objects.
    pub fn to_records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(name, cell)| {
                        let value = serde_json::to_value(cell).unwrap_or(serde_json::Value::Null);
                        (name.clone(), value)
                    })
                    .collect()
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableOutcome {
    Loaded { rows: usize },
    Missing { path: String },
    Failed { message: String },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub tables: Vec<(String, TableOutcome)>,
}

impl LoadReport {
    pub fn record(&mut self, table: &str, outcome: TableOutcome) {
        self.tables.push((table.to_string(), outcome));
    }

    pub fn outcome(&self, table: &str) -> Option<&TableOutcome> {
        self.tables
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, outcome)| outcome)
    }

    pub fn rows_loaded(&self) -> usize {
        self.tables
            .iter()
            .map(|(_, outcome)| match outcome {
                TableOutcome::Loaded { rows } => *rows,
                _ => 0,
            })
            .sum()
    }

    pub fn has_failures(&self) -> bool {
        self.tables
            .iter()
            .any(|(_, outcome)| matches!(outcome, TableOutcome::Failed { .. }))
    }

    pub fn warnings(&self) -> usize {
        self.tables
            .iter()
            .filter(|(_, outcome)| matches!(outcome, TableOutcome::Missing { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> ResultTable {
        ResultTable {
            columns: vec!["Status".to_string(), "Percentage".to_string()],
            rows: vec![
                vec![CellValue::Text("Completed".to_string()), CellValue::Real(75.0)],
                vec![CellValue::Text("Pending".to_string()), CellValue::Real(25.0)],
            ],
        }
    }

    #[test]
    fn test_column_lookup_is_case_insensitive() {
        let table = sample_table();
        assert_eq!(table.column_index("percentage"), Some(1));
        assert_eq!(table.column("status").len(), 2);
        assert_eq!(table.get(1, "Percentage").and_then(|c| c.as_f64()), Some(25.0));
        assert!(table.get(5, "Percentage").is_none());
    }

    #[test]
    fn test_to_records() {
        let records = sample_table().to_records();
        assert_eq!(records[0]["Status"], serde_json::json!("Completed"));
        assert_eq!(records[1]["Percentage"], serde_json::json!(25.0));
    }

    #[test]
    fn test_load_report_summary() {
        let mut report = LoadReport::default();
        report.record("Providers", TableOutcome::Loaded { rows: 3 });
        report.record(
            "Claims",
            TableOutcome::Missing {
                path: "data/claims_data.csv".to_string(),
            },
        );

        assert_eq!(report.rows_loaded(), 3);
        assert_eq!(report.warnings(), 1);
        assert!(!report.has_failures());
    }
}
