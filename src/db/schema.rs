//! The four tables of the donation tracker and their DDL.
//!
//! Referential integrity is left to SQLite's foreign-key enforcement, which
//! every connection switches on when it is opened.

use crate::utils::error::{Result, TrackerError};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Providers,
    Receivers,
    FoodListings,
    Claims,
}

impl Table {
    /// Parents before children, the order tables are created and loaded in.
    pub const ALL: [Table; 4] = [
        Table::Providers,
        Table::Receivers,
        Table::FoodListings,
        Table::Claims,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Providers => "Providers",
            Table::Receivers => "Receivers",
            Table::FoodListings => "Food_Listings",
            Table::Claims => "Claims",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::Providers => &["Provider_ID", "Name", "Type", "Address", "City", "Contact"],
            Table::Receivers => &["Receiver_ID", "Name", "Type", "City", "Contact"],
            Table::FoodListings => &[
                "Food_ID",
                "Food_Name",
                "Quantity",
                "Expiry_Date",
                "Provider_ID",
                "Provider_Type",
                "Location",
                "Food_Type",
                "Meal_Type",
            ],
            Table::Claims => &["Claim_ID", "Food_ID", "Receiver_ID", "Status", "Timestamp"],
        }
    }

    pub fn default_source(&self) -> &'static str {
        match self {
            Table::Providers => "providers_data.csv",
            Table::Receivers => "receivers_data.csv",
            Table::FoodListings => "food_listings_data.csv",
            Table::Claims => "claims_data.csv",
        }
    }

    fn create_sql(&self) -> &'static str {
        match self {
            Table::Providers => {
                r#"CREATE TABLE IF NOT EXISTS Providers (
                    Provider_ID INTEGER PRIMARY KEY,
                    Name VARCHAR(255),
                    Type VARCHAR(255),
                    Address TEXT,
                    City VARCHAR(255),
                    Contact VARCHAR(255)
                )"#
            }
            Table::Receivers => {
                r#"CREATE TABLE IF NOT EXISTS Receivers (
                    Receiver_ID INTEGER PRIMARY KEY,
                    Name VARCHAR(255),
                    Type VARCHAR(255),
                    City VARCHAR(255),
                    Contact VARCHAR(255)
                )"#
            }
            Table::FoodListings => {
                r#"CREATE TABLE IF NOT EXISTS Food_Listings (
                    Food_ID INTEGER PRIMARY KEY,
                    Food_Name VARCHAR(255),
                    Quantity INTEGER CHECK (Quantity >= 0),
                    Expiry_Date DATE,
                    Provider_ID INTEGER,
                    Provider_Type VARCHAR(255),
                    Location VARCHAR(255),
                    Food_Type VARCHAR(255),
                    Meal_Type VARCHAR(255),
                    FOREIGN KEY (Provider_ID) REFERENCES Providers(Provider_ID)
                )"#
            }
            Table::Claims => {
                r#"CREATE TABLE IF NOT EXISTS Claims (
                    Claim_ID INTEGER PRIMARY KEY,
                    Food_ID INTEGER,
                    Receiver_ID INTEGER,
                    Status VARCHAR(255),
                    Timestamp TIMESTAMP,
                    FOREIGN KEY (Food_ID) REFERENCES Food_Listings(Food_ID),
                    FOREIGN KEY (Receiver_ID) REFERENCES Receivers(Receiver_ID)
                )"#
            }
        }
    }
}

/// Create all four tables. Safe to call any number of times.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    for table in Table::ALL {
        conn.execute(table.create_sql(), [])
            .map_err(|e| TrackerError::SchemaError {
                message: format!("{}: {}", table.name(), e),
            })?;
    }
    tracing::debug!("Schema ensured for {} tables", Table::ALL.len());
    Ok(())
}

/// Drop all four tables, children first so no foreign key dangles mid-way.
pub fn drop_schema(conn: &Connection) -> Result<()> {
    for table in Table::ALL.iter().rev() {
        conn.execute(&format!("DROP TABLE IF EXISTS {}", table.name()), [])
            .map_err(|e| TrackerError::SchemaError {
                message: format!("{}: {}", table.name(), e),
            })?;
    }
    Ok(())
}

pub fn row_count(conn: &Connection, table: Table) -> Result<usize> {
    // 表名來自封閉的列舉，不是使用者輸入
    let count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {}", table.name()), [], |row| {
            row.get(0)
        })
        .map_err(|e| TrackerError::QueryError {
            message: e.to_string(),
        })?;
    Ok(count as usize)
}
