pub mod catalog;
pub mod etl;
pub mod executor;
pub mod loader;

pub use crate::domain::model::{CellValue, LoadReport, NewListing, ResultTable, TableOutcome};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
