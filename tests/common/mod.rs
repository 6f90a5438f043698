#![allow(dead_code)]

use foodshare::db::{ensure_schema, DatabaseUrl};
use foodshare::{AppConfig, QueryExecutor};
use std::path::Path;
use tempfile::TempDir;

pub const PROVIDERS_HEADER: &str = "Provider_ID,Name,Type,Address,City,Contact";
pub const RECEIVERS_HEADER: &str = "Receiver_ID,Name,Type,City,Contact";
pub const LISTINGS_HEADER: &str =
    "Food_ID,Food_Name,Quantity,Expiry_Date,Provider_ID,Provider_Type,Location,Food_Type,Meal_Type";
pub const CLAIMS_HEADER: &str = "Claim_ID,Food_ID,Receiver_ID,Status,Timestamp";

/// Write the four CSV exports into `dir`, with ids starting after `offset`.
pub fn write_exports(dir: &Path, offset: i64) {
    let a = offset + 1;
    let b = offset + 2;

    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(
        dir.join("providers_data.csv"),
        format!(
            "{PROVIDERS_HEADER}\n\
             {a},Green Grocer,Supermarket,\"1 Main St, Suite 2\",New York,555-0101\n\
             {b},Bean Bakery,Restaurant,9 Elm Rd,Boston,555-0102\n"
        ),
    )
    .unwrap();
    std::fs::write(
        dir.join("receivers_data.csv"),
        format!(
            "{RECEIVERS_HEADER}\n\
             {a},Hope Shelter,Shelter,New York,555-0201\n\
             {b},City Pantry,NGO,Boston,555-0202\n"
        ),
    )
    .unwrap();
    std::fs::write(
        dir.join("food_listings_data.csv"),
        format!(
            "{LISTINGS_HEADER}\n\
             {a},Bread,10,3/17/2025,{a},Supermarket,New York,Vegetarian,Breakfast\n\
             {b},Soup,5,2025-03-20,{b},Restaurant,Boston,Vegan,Dinner\n"
        ),
    )
    .unwrap();
    std::fs::write(
        dir.join("claims_data.csv"),
        format!(
            "{CLAIMS_HEADER}\n\
             {a},{a},{b},Completed,3/5/2025 5:26\n\
             {b},{b},{a},Pending,2025-03-06 10:00:00\n"
        ),
    )
    .unwrap();
}

pub fn config_for(db: &Path, data_dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = format!("sqlite:///{}", db.display());
    config.loader.data_dir = data_dir.display().to_string();
    config
}

/// An empty database with the schema in place.
pub fn empty_store(dir: &TempDir) -> (DatabaseUrl, QueryExecutor) {
    let url = DatabaseUrl::from_path(dir.path().join("food_waste.db"));
    let conn = url.open_or_create().unwrap();
    ensure_schema(&conn).unwrap();
    (url.clone(), QueryExecutor::new(url))
}

pub fn seed(url: &DatabaseUrl, sql: &str) {
    let conn = url.open().unwrap();
    conn.execute_batch(sql).unwrap();
}
