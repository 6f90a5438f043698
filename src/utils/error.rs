use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Cannot reach database '{target}': {message}")]
    ConnectivityError { target: String, message: String },

    #[error("Schema setup failed: {message}")]
    SchemaError { message: String },

    #[error("Failed to load table '{table}': {message}")]
    LoadError { table: String, message: String },

    #[error("Source file for table '{table}' not found: {path}")]
    MissingSourceError { table: String, path: String },

    #[error("Query failed: {message}")]
    QueryError { message: String },

    #[error("Rejected by integrity constraint: {message}")]
    IntegrityError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Storage,
    Data,
    Configuration,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl TrackerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TrackerError::ConnectivityError { .. }
            | TrackerError::SchemaError { .. }
            | TrackerError::QueryError { .. }
            | TrackerError::IntegrityError { .. } => ErrorCategory::Storage,
            TrackerError::LoadError { .. }
            | TrackerError::MissingSourceError { .. }
            | TrackerError::CsvError(_)
            | TrackerError::SerializationError(_) => ErrorCategory::Data,
            TrackerError::ConfigError { .. }
            | TrackerError::InvalidConfigValueError { .. }
            | TrackerError::MissingConfigError { .. }
            | TrackerError::TomlError(_) => ErrorCategory::Configuration,
            TrackerError::ValidationError { .. } => ErrorCategory::Input,
            TrackerError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TrackerError::QueryError { .. }
            | TrackerError::IntegrityError { .. }
            | TrackerError::ValidationError { .. } => ErrorSeverity::Medium,
            TrackerError::LoadError { .. }
            | TrackerError::MissingSourceError { .. }
            | TrackerError::CsvError(_)
            | TrackerError::SerializationError(_)
            | TrackerError::ConfigError { .. }
            | TrackerError::InvalidConfigValueError { .. }
            | TrackerError::MissingConfigError { .. }
            | TrackerError::TomlError(_) => ErrorSeverity::High,
            TrackerError::ConnectivityError { .. }
            | TrackerError::SchemaError { .. }
            | TrackerError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            TrackerError::ConnectivityError { target, .. } => {
                format!("Could not open the database at {}", target)
            }
            TrackerError::SchemaError { .. } => "Could not create the database tables".to_string(),
            TrackerError::LoadError { table, .. } => format!("Loading '{}' failed", table),
            TrackerError::MissingSourceError { table, path } => {
                format!("No source file for '{}' at {}", table, path)
            }
            TrackerError::QueryError { message } => format!("The query could not run: {}", message),
            TrackerError::IntegrityError { message } => {
                format!("The record was rejected: {}", message)
            }
            TrackerError::ValidationError { message } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            TrackerError::ConnectivityError { .. } => {
                "Check database.url, or run `foodshare setup` to create the database"
            }
            TrackerError::SchemaError { .. } => "Make sure the database file is writable",
            TrackerError::LoadError { .. } | TrackerError::CsvError(_) => {
                "Check the CSV headers and values for this table"
            }
            TrackerError::MissingSourceError { .. } => "Place the CSV file under loader.data_dir",
            TrackerError::QueryError { .. } => "Check the SQL text and the table names",
            TrackerError::IntegrityError { .. } => {
                "Make sure every referenced Provider_ID, Food_ID and Receiver_ID exists"
            }
            TrackerError::ConfigError { .. }
            | TrackerError::InvalidConfigValueError { .. }
            | TrackerError::MissingConfigError { .. }
            | TrackerError::TomlError(_) => "Review foodshare.toml and the command-line flags",
            TrackerError::ValidationError { .. } => "Correct the input and try again",
            TrackerError::SerializationError(_) => "Retry with a different output format",
            TrackerError::IoError(_) => "Check file permissions and free disk space",
        }
    }

    /// Process exit code derived from severity.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

/// Map a SQLite failure onto the storage taxonomy.
///
/// Constraint violations (foreign key, check, primary key) become
/// `IntegrityError`; failures to open the file become `ConnectivityError`;
/// everything else is a `QueryError`.
pub fn classify_sqlite(target: &str, err: rusqlite::Error) -> TrackerError {
    use rusqlite::ErrorCode;

    match &err {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
            ErrorCode::ConstraintViolation => TrackerError::IntegrityError {
                message: err.to_string(),
            },
            ErrorCode::CannotOpen
            | ErrorCode::NotADatabase
            | ErrorCode::PermissionDenied
            | ErrorCode::SystemIoFailure => TrackerError::ConnectivityError {
                target: target.to_string(),
                message: err.to_string(),
            },
            _ => TrackerError::QueryError {
                message: err.to_string(),
            },
        },
        _ => TrackerError::QueryError {
            message: err.to_string(),
        },
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source_fails_the_run() {
        let err = TrackerError::MissingSourceError {
            table: "Claims".to_string(),
            path: "data/claims_data.csv".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.category(), ErrorCategory::Data);
    }

    #[test]
    fn test_connectivity_is_critical() {
        let err = TrackerError::ConnectivityError {
            target: "food_waste.db".to_string(),
            message: "unable to open database file".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
        assert!(err.user_friendly_message().contains("food_waste.db"));
    }

    #[test]
    fn test_classify_constraint_violation() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY); INSERT INTO t VALUES (1);")
            .unwrap();
        let err = conn.execute("INSERT INTO t VALUES (1)", []).unwrap_err();

        assert!(matches!(
            classify_sqlite(":memory:", err),
            TrackerError::IntegrityError { .. }
        ));
    }

    #[test]
    fn test_classify_bad_sql() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let err = conn.execute("SELEC 1", []).unwrap_err();

        assert!(matches!(
            classify_sqlite(":memory:", err),
            TrackerError::QueryError { .. }
        ));
    }
}
