pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod db;
pub mod domain;
pub mod utils;

pub use adapters::storage::LocalStorage;
pub use app::{Action, Dashboard, Outcome};
pub use config::AppConfig;
pub use core::{
    catalog::{CatalogEntry, ChartHint},
    etl::EtlEngine,
    executor::QueryExecutor,
    loader::{CsvLoader, LoadMode},
};
pub use db::DatabaseUrl;
pub use utils::error::{Result, TrackerError};
