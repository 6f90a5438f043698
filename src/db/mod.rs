pub mod connection;
pub mod schema;

pub use connection::DatabaseUrl;
pub use schema::{drop_schema, ensure_schema, row_count, Table};
