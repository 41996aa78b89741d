//! Audit log store contracts.
//!
//! # Responsibility
//! - Define the append-only audit log adapter used after primary commits.
//! - Keep table-store details out of the mutation orchestrator.
//!
//! # Invariants
//! - `append` is an upsert keyed by `(partition_key, row_key)`. With fresh
//!   row keys every append is a pure insert, and retrying the same record
//!   cannot create a duplicate.
//! - There is no read path; audit records are write-only from here.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::model::audit::AuditRecord;

mod sqlite_log;

pub use sqlite_log::{is_valid_table_name, SqliteAuditLog};

pub type AuditResult<T> = Result<T, AuditLogError>;

/// Audit log store failures.
#[derive(Debug)]
pub enum AuditLogError {
    /// Table name does not follow table-store naming rules.
    InvalidTableName(String),
    Db(rusqlite::Error),
    /// Store handle is unusable (for example a poisoned lock).
    Unavailable(String),
}

impl Display for AuditLogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTableName(name) => write!(
                f,
                "invalid audit table name `{name}`; expected 3-63 alphanumeric characters starting with a letter"
            ),
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "audit log store unavailable: {message}"),
        }
    }
}

impl Error for AuditLogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for AuditLogError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(value)
    }
}

/// Append-oriented, partition/row keyed audit store.
pub trait AuditLog {
    /// Creates the backing table when absent. Idempotent.
    fn ensure_store_exists(&self) -> AuditResult<()>;
    /// Upserts one record keyed by `(partition_key, row_key)`.
    fn append(&self, record: &AuditRecord) -> AuditResult<()>;
}

impl<T: AuditLog + ?Sized> AuditLog for &T {
    fn ensure_store_exists(&self) -> AuditResult<()> {
        (**self).ensure_store_exists()
    }

    fn append(&self, record: &AuditRecord) -> AuditResult<()> {
        (**self).append(record)
    }
}

impl<T: AuditLog + ?Sized> AuditLog for Arc<T> {
    fn ensure_store_exists(&self) -> AuditResult<()> {
        (**self).ensure_store_exists()
    }

    fn append(&self, record: &AuditRecord) -> AuditResult<()> {
        (**self).append(record)
    }
}
