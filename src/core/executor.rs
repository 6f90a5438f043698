//! Runs catalog entries and the dashboard's ad-hoc statements.
//!
//! Every call opens its own connection and drops it before returning, on the
//! error path as well; nothing is cached between calls.

use crate::core::catalog::CatalogEntry;
use crate::db::DatabaseUrl;
use crate::domain::model::{CellValue, NewListing, ResultTable};
use crate::utils::error::{classify_sqlite, Result, TrackerError};
use rusqlite::types::ValueRef;
use rusqlite::{params, params_from_iter, Connection, ToSql};

#[derive(Debug, Clone)]
pub struct QueryExecutor {
    url: DatabaseUrl,
}

impl QueryExecutor {
    pub fn new(url: DatabaseUrl) -> Self {
        Self { url }
    }

    pub fn url(&self) -> &DatabaseUrl {
        &self.url
    }

    /// Verify the store can be opened. Used once at startup.
    pub fn ping(&self) -> Result<()> {
        let conn = self.url.open()?;
        conn.query_row("SELECT 1", [], |_| Ok(()))
            .map_err(|e| self.classify(e))
    }

    /// Run one ad-hoc statement and materialise all of its rows.
    pub fn execute(&self, sql: &str) -> Result<ResultTable> {
        self.query(sql, &[])
    }

    pub fn run_entry(&self, entry: CatalogEntry, contact_city: &str) -> Result<ResultTable> {
        tracing::debug!("Running catalog entry {}", entry);
        if entry.takes_city() {
            self.query(entry.statement(), &[&contact_city as &dyn ToSql])
        } else {
            self.query(entry.statement(), &[])
        }
    }

    /// All listings, or only those whose Location is one of `cities`.
    pub fn filter_listings(&self, cities: &[String]) -> Result<ResultTable> {
        let mut sql = String::from("SELECT * FROM Food_Listings");
        if !cities.is_empty() {
            let placeholders: Vec<String> = (1..=cities.len()).map(|i| format!("?{}", i)).collect();
            sql.push_str(&format!(" WHERE Location IN ({})", placeholders.join(", ")));
        }
        sql.push_str(" ORDER BY Food_ID");

        let conn = self.url.open()?;
        let mut stmt = conn.prepare(&sql).map_err(|e| self.classify(e))?;
        let table = materialize(&mut stmt, params_from_iter(cities.iter()))
            .map_err(|e| self.classify(e))?;
        tracing::debug!("Listing filter {:?} matched {} rows", cities, table.len());
        Ok(table)
    }

    /// Distinct provider cities, used to populate the listing filter.
    pub fn distinct_cities(&self) -> Result<Vec<String>> {
        let conn = self.url.open()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT City FROM Providers WHERE City IS NOT NULL ORDER BY City")
            .map_err(|e| self.classify(e))?;
        let cities = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<std::result::Result<Vec<_>, _>>())
            .map_err(|e| self.classify(e))?;
        Ok(cities)
    }

    /// Insert one listing with bound parameters and return its Food_ID.
    ///
    /// Provider_ID is not looked up first; an orphaned reference is refused by
    /// the foreign-key constraint and nothing is written.
    pub fn insert_listing(&self, listing: &NewListing) -> Result<i64> {
        validate_listing(listing)?;

        let mut conn = self.url.open()?;
        let food_id = insert_in_transaction(&mut conn, listing).map_err(|e| self.classify(e))?;

        tracing::info!(
            "Inserted listing {} ('{}', qty {}) for provider {}",
            food_id,
            listing.food_name,
            listing.quantity,
            listing.provider_id
        );
        Ok(food_id)
    }

    fn query(&self, sql: &str, params: &[&dyn ToSql]) -> Result<ResultTable> {
        let conn = self.url.open()?;
        let mut stmt = conn.prepare(sql).map_err(|e| self.classify(e))?;
        let table = materialize(&mut stmt, params).map_err(|e| self.classify(e))?;
        tracing::debug!("Statement returned {} rows", table.len());
        Ok(table)
    }

    fn classify(&self, err: rusqlite::Error) -> TrackerError {
        classify_sqlite(&self.url.to_string(), err)
    }
}

fn validate_listing(listing: &NewListing) -> Result<()> {
    if listing.food_name.trim().is_empty() {
        return Err(TrackerError::ValidationError {
            message: "Food_Name cannot be empty".to_string(),
        });
    }
    if listing.quantity < 1 {
        return Err(TrackerError::ValidationError {
            message: "Quantity must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn insert_in_transaction(conn: &mut Connection, listing: &NewListing) -> rusqlite::Result<i64> {
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO Food_Listings \
         (Food_Name, Quantity, Expiry_Date, Provider_ID, Provider_Type, Location, Food_Type, Meal_Type) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            listing.food_name.trim(),
            listing.quantity,
            listing.expiry_date.format("%Y-%m-%d").to_string(),
            listing.provider_id,
            listing.provider_type,
            listing.location,
            listing.food_type,
            listing.meal_type,
        ],
    )?;
    let food_id = tx.last_insert_rowid();
    tx.commit()?;
    Ok(food_id)
}

fn materialize<P: rusqlite::Params>(
    stmt: &mut rusqlite::Statement<'_>,
    params: P,
) -> rusqlite::Result<ResultTable> {
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();
    let mut table = ResultTable::new(columns);

    let mut rows = stmt.query(params)?;
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(width);
        for idx in 0..width {
            cells.push(to_cell(row.get_ref(idx)?));
        }
        table.rows.push(cells);
    }
    Ok(table)
}

fn to_cell(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(i) => CellValue::Integer(i),
        ValueRef::Real(r) => CellValue::Real(r),
        ValueRef::Text(t) => CellValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => CellValue::Text(format!("<{} bytes>", b.len())),
    }
}
