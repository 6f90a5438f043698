use crate::utils::error::{classify_sqlite, Result, TrackerError};
use rusqlite::{Connection, OpenFlags};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Location of the backing store, parsed from a connection URI.
///
/// Follows the SQLAlchemy convention: `sqlite:///food_waste.db` is relative to
/// the working directory, `sqlite:////var/lib/food_waste.db` is absolute. A
/// bare path without a scheme is accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseUrl {
    path: PathBuf,
}

impl DatabaseUrl {
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(TrackerError::InvalidConfigValueError {
                field: "database.url".to_string(),
                value: uri.to_string(),
                reason: "Connection string cannot be empty".to_string(),
            });
        }

        if !uri.contains("://") {
            return Ok(Self::from_path(uri));
        }

        let parsed = Url::parse(uri).map_err(|e| TrackerError::InvalidConfigValueError {
            field: "database.url".to_string(),
            value: uri.to_string(),
            reason: format!("Invalid connection string: {}", e),
        })?;

        if parsed.scheme() != "sqlite" {
            return Err(TrackerError::InvalidConfigValueError {
                field: "database.url".to_string(),
                value: redact(&parsed),
                reason: format!(
                    "Unsupported backend '{}'; only sqlite:// is available",
                    parsed.scheme()
                ),
            });
        }

        // 取 "sqlite://" 之後的部分，再去掉一個前導斜線
        let rest = &uri["sqlite://".len()..];
        let path = rest.strip_prefix('/').unwrap_or(rest);
        if path.is_empty() || path == ":memory:" {
            return Err(TrackerError::InvalidConfigValueError {
                field: "database.url".to_string(),
                value: uri.to_string(),
                reason: "A database file path is required".to_string(),
            });
        }

        Ok(Self::from_path(path))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open an existing store. A missing file is a connectivity failure, not
    /// an invitation to create an empty database.
    pub fn open(&self) -> Result<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.path, flags).map_err(|e| {
            TrackerError::ConnectivityError {
                target: self.to_string(),
                message: e.to_string(),
            }
        })?;
        self.prepare(conn)
    }

    /// Open the store, creating the file when absent. Setup and loading only.
    pub fn open_or_create(&self) -> Result<Connection> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&self.path).map_err(|e| TrackerError::ConnectivityError {
            target: self.to_string(),
            message: e.to_string(),
        })?;
        self.prepare(conn)
    }

    fn prepare(&self, conn: Connection) -> Result<Connection> {
        conn.pragma_update(None, "foreign_keys", true)
            .map_err(|e| classify_sqlite(&self.to_string(), e))?;
        tracing::trace!("Opened connection to {}", self);
        Ok(conn)
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

fn redact(url: &Url) -> String {
    let mut url = url.clone();
    if url.password().is_some() {
        let _ = url.set_password(Some("***"));
    }
    url.to_string()
}
