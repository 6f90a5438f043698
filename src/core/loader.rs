//! Bulk loader: four CSV exports into the four tables.
//!
//! Runs as an ETL pipeline. Extract reads the files through `Storage`,
//! transform parses them into typed rows, load writes each table in its own
//! transaction. A missing file or a bad table never stops the other tables.

use crate::db::{drop_schema, ensure_schema, DatabaseUrl, Table};
use crate::domain::model::{Claim, FoodListing, LoadReport, Provider, Receiver, TableOutcome};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::{Result, TrackerError};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params_from_iter, Connection, ToSql};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum LoadMode {
    /// Insert into the existing tables.
    #[default]
    Append,
    /// Drop and recreate the tables, then insert.
    Replace,
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadMode::Append => f.write_str("append"),
            LoadMode::Replace => f.write_str("replace"),
        }
    }
}

#[derive(Debug)]
pub enum SourceContent {
    Found(Vec<u8>),
    Missing,
    Unreadable(String),
}

/// Bytes of one source file, or where it should have been.
#[derive(Debug)]
pub struct SourceFile {
    pub table: Table,
    pub location: String,
    pub content: SourceContent,
}

#[derive(Debug)]
pub enum TableRows {
    Providers(Vec<Provider>),
    Receivers(Vec<Receiver>),
    FoodListings(Vec<FoodListing>),
    Claims(Vec<Claim>),
}

impl TableRows {
    pub fn len(&self) -> usize {
        match self {
            TableRows::Providers(rows) => rows.len(),
            TableRows::Receivers(rows) => rows.len(),
            TableRows::FoodListings(rows) => rows.len(),
            TableRows::Claims(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
pub struct ParsedSource {
    pub table: Table,
    pub rows: std::result::Result<TableRows, TableOutcome>,
}

/// Row types that map one-to-one onto a table's columns.
trait TableRow {
    const TABLE: Table;
    fn values(&self) -> Vec<&dyn ToSql>;
}

impl TableRow for Provider {
    const TABLE: Table = Table::Providers;
    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.provider_id,
            &self.name,
            &self.provider_type,
            &self.address,
            &self.city,
            &self.contact,
        ]
    }
}

impl TableRow for Receiver {
    const TABLE: Table = Table::Receivers;
    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.receiver_id,
            &self.name,
            &self.receiver_type,
            &self.city,
            &self.contact,
        ]
    }
}

impl TableRow for FoodListing {
    const TABLE: Table = Table::FoodListings;
    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.food_id,
            &self.food_name,
            &self.quantity,
            &self.expiry_date,
            &self.provider_id,
            &self.provider_type,
            &self.location,
            &self.food_type,
            &self.meal_type,
        ]
    }
}

impl TableRow for Claim {
    const TABLE: Table = Table::Claims;
    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.claim_id,
            &self.food_id,
            &self.receiver_id,
            &self.status,
            &self.timestamp,
        ]
    }
}

pub struct CsvLoader<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    url: DatabaseUrl,
}

impl<S: Storage, C: ConfigProvider> CsvLoader<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let url = DatabaseUrl::parse(config.database_url())?;
        Ok(Self {
            storage,
            config,
            url,
        })
    }

    pub fn mode(&self) -> LoadMode {
        self.config.load_mode()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CsvLoader<S, C> {
    type Raw = Vec<SourceFile>;
    type Parsed = Vec<ParsedSource>;

    async fn extract(&self) -> Result<Vec<SourceFile>> {
        let mut sources = Vec::with_capacity(Table::ALL.len());

        for table in Table::ALL {
            let file = self.config.source_file(table);
            let location = self.storage.describe(&file);
            tracing::debug!("Reading {} for table {}", location, table.name());

            let content = match self.storage.read_file(&file).await {
                Ok(bytes) => SourceContent::Found(bytes),
                Err(TrackerError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                    SourceContent::Missing
                }
                Err(e) => SourceContent::Unreadable(e.to_string()),
            };
            sources.push(SourceFile {
                table,
                location,
                content,
            });
        }

        Ok(sources)
    }

    async fn transform(&self, raw: Vec<SourceFile>) -> Result<Vec<ParsedSource>> {
        let parsed = raw
            .into_iter()
            .map(|source| {
                let rows = match source.content {
                    SourceContent::Missing => Err(TableOutcome::Missing {
                        path: source.location,
                    }),
                    SourceContent::Unreadable(message) => Err(TableOutcome::Failed { message }),
                    SourceContent::Found(bytes) => parse_table(source.table, &bytes)
                        .map_err(|e| TableOutcome::Failed { message: e.to_string() }),
                };
                ParsedSource {
                    table: source.table,
                    rows,
                }
            })
            .collect();
        Ok(parsed)
    }

    async fn load(&self, parsed: Vec<ParsedSource>) -> Result<LoadReport> {
        if self.mode() == LoadMode::Replace {
            // 來源不齊全時不能清空舊資料
            ensure_complete(&parsed)?;
        }

        let mut conn = self.url.open_or_create()?;

        if self.mode() == LoadMode::Replace {
            tracing::info!("Replace mode: dropping existing tables");
            drop_schema(&conn)?;
        }
        ensure_schema(&conn)?;

        let mut report = LoadReport::default();
        for source in parsed {
            let name = source.table.name();
            let outcome = match source.rows {
                Err(outcome) => outcome,
                Ok(rows) => match insert_rows(&mut conn, &rows) {
                    Ok(count) => TableOutcome::Loaded { rows: count },
                    Err(e) => TableOutcome::Failed {
                        message: e.to_string(),
                    },
                },
            };

            match &outcome {
                TableOutcome::Loaded { rows } => {
                    tracing::info!("✅ Loaded {} rows into '{}'", rows, name)
                }
                TableOutcome::Missing { path } => {
                    tracing::warn!("⚠️ Source for '{}' not found at {}, skipping", name, path)
                }
                TableOutcome::Failed { message } => {
                    tracing::error!("❌ Loading '{}' failed: {}", name, message)
                }
            }
            report.record(name, outcome);
        }

        Ok(report)
    }
}

/// Replace mode only swaps in a complete snapshot: every source must be
/// present and parsed before anything is dropped.
fn ensure_complete(parsed: &[ParsedSource]) -> Result<()> {
    for source in parsed {
        match &source.rows {
            Ok(_) | Err(TableOutcome::Loaded { .. }) => {}
            Err(TableOutcome::Missing { path }) => {
                return Err(TrackerError::MissingSourceError {
                    table: source.table.name().to_string(),
                    path: path.clone(),
                });
            }
            Err(TableOutcome::Failed { message }) => {
                return Err(TrackerError::LoadError {
                    table: source.table.name().to_string(),
                    message: format!("{}; existing tables left untouched", message),
                });
            }
        }
    }
    Ok(())
}

fn parse_table(table: Table, bytes: &[u8]) -> Result<TableRows> {
    let rows = match table {
        Table::Providers => TableRows::Providers(read_rows(table, bytes)?),
        Table::Receivers => TableRows::Receivers(read_rows(table, bytes)?),
        Table::FoodListings => {
            let mut rows: Vec<FoodListing> = read_rows(table, bytes)?;
            for (idx, row) in rows.iter_mut().enumerate() {
                row.expiry_date = normalize_date(&row.expiry_date)
                    .ok_or_else(|| malformed(table, idx, "Expiry_Date", &row.expiry_date))?;
            }
            TableRows::FoodListings(rows)
        }
        Table::Claims => {
            let mut rows: Vec<Claim> = read_rows(table, bytes)?;
            for (idx, row) in rows.iter_mut().enumerate() {
                row.timestamp = normalize_timestamp(&row.timestamp)
                    .ok_or_else(|| malformed(table, idx, "Timestamp", &row.timestamp))?;
            }
            TableRows::Claims(rows)
        }
    };
    Ok(rows)
}

fn read_rows<T: DeserializeOwned>(table: Table, bytes: &[u8]) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, csv::Error>>()
        .map_err(|e| TrackerError::LoadError {
            table: table.name().to_string(),
            message: e.to_string(),
        })
}

fn malformed(table: Table, idx: usize, column: &str, value: &str) -> TrackerError {
    TrackerError::LoadError {
        table: table.name().to_string(),
        // 資料列從第 2 行開始（第 1 行是標題）
        message: format!("line {}: unrecognised {} '{}'", idx + 2, column, value),
    }
}

fn insert_rows(conn: &mut Connection, rows: &TableRows) -> Result<usize> {
    match rows {
        TableRows::Providers(rows) => insert_all(conn, rows),
        TableRows::Receivers(rows) => insert_all(conn, rows),
        TableRows::FoodListings(rows) => insert_all(conn, rows),
        TableRows::Claims(rows) => insert_all(conn, rows),
    }
}

fn insert_all<T: TableRow>(conn: &mut Connection, rows: &[T]) -> Result<usize> {
    let table = T::TABLE;
    let columns = table.columns();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.name(),
        columns.join(", "),
        placeholders.join(", ")
    );

    let to_load_error = |e: rusqlite::Error| TrackerError::LoadError {
        table: table.name().to_string(),
        message: e.to_string(),
    };

    // 整張表一個交易：任何一列失敗就整張表回滾
    let tx = conn.transaction().map_err(to_load_error)?;
    {
        let mut stmt = tx.prepare(&sql).map_err(to_load_error)?;
        for (idx, row) in rows.iter().enumerate() {
            stmt.execute(params_from_iter(row.values())).map_err(|e| {
                TrackerError::LoadError {
                    table: table.name().to_string(),
                    message: format!("line {}: {}", idx + 2, e),
                }
            })?;
        }
    }
    tx.commit().map_err(to_load_error)?;

    Ok(rows.len())
}

/// Accepts ISO dates and the US-style dates spreadsheets export.
pub fn normalize_date(raw: &str) -> Option<String> {
    const FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
    let raw = raw.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
}

pub fn normalize_timestamp(raw: &str) -> Option<String> {
    const FORMATS: [&str; 6] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%Y/%m/%d %H:%M:%S",
    ];
    let raw = raw.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
}
