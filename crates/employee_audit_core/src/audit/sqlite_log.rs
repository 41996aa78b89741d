//! SQLite-backed audit table store.
//!
//! # Responsibility
//! - Emulate a partition/row keyed table store in its own database.
//! - Create the connection and table lazily on first use, once per process.
//!
//! # Invariants
//! - The table name is validated before it is ever spliced into SQL.
//! - `(partition_key, row_key)` is the table's primary key.
//! - One handle may be shared across worker threads; writes are serialized
//!   on the cached connection.

use super::{AuditLog, AuditLogError, AuditResult};
use crate::db::BUSY_TIMEOUT;
use crate::model::audit::AuditRecord;
use log::{debug, error, info};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use rusqlite::{params, Connection};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

static TABLE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]{2,62}$").expect("valid table name regex"));

/// Returns whether `name` follows table-store naming rules.
pub fn is_valid_table_name(name: &str) -> bool {
    TABLE_NAME_RE.is_match(name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StoreLocation {
    File(PathBuf),
    Memory,
}

/// Process-wide audit log handle over a SQLite table.
pub struct SqliteAuditLog {
    location: StoreLocation,
    table_name: String,
    conn: OnceCell<Mutex<Connection>>,
}

impl SqliteAuditLog {
    /// Creates a handle for a database file. Performs no I/O.
    ///
    /// # Errors
    /// - Returns `InvalidTableName` when `table_name` breaks naming rules.
    pub fn new(path: impl Into<PathBuf>, table_name: &str) -> AuditResult<Self> {
        Self::with_location(StoreLocation::File(path.into()), table_name)
    }

    /// Creates a handle over a private in-memory database.
    pub fn in_memory(table_name: &str) -> AuditResult<Self> {
        Self::with_location(StoreLocation::Memory, table_name)
    }

    fn with_location(location: StoreLocation, table_name: &str) -> AuditResult<Self> {
        if !is_valid_table_name(table_name) {
            return Err(AuditLogError::InvalidTableName(table_name.to_string()));
        }
        Ok(Self {
            location,
            table_name: table_name.to_string(),
            conn: OnceCell::new(),
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn connection(&self) -> AuditResult<&Mutex<Connection>> {
        self.conn.get_or_try_init(|| {
            let started_at = Instant::now();
            let conn = match &self.location {
                StoreLocation::File(path) => Connection::open(path),
                StoreLocation::Memory => Connection::open_in_memory(),
            }
            .and_then(|conn| {
                conn.busy_timeout(BUSY_TIMEOUT)?;
                conn.execute_batch(&create_table_sql(&self.table_name))?;
                Ok(conn)
            });

            match conn {
                Ok(conn) => {
                    info!(
                        "event=audit_store_ensure module=audit status=ok table={} duration_ms={}",
                        self.table_name,
                        started_at.elapsed().as_millis()
                    );
                    Ok(Mutex::new(conn))
                }
                Err(err) => {
                    error!(
                        "event=audit_store_ensure module=audit status=error table={} error={}",
                        self.table_name, err
                    );
                    Err(err.into())
                }
            }
        })
    }
}

impl AuditLog for SqliteAuditLog {
    fn ensure_store_exists(&self) -> AuditResult<()> {
        self.connection().map(|_| ())
    }

    fn append(&self, record: &AuditRecord) -> AuditResult<()> {
        let conn = self
            .connection()?
            .lock()
            .map_err(|_| AuditLogError::Unavailable("connection lock poisoned".to_string()))?;

        let snapshot = &record.snapshot;
        conn.execute(
            &format!(
                "INSERT INTO {table} (
                    partition_key,
                    row_key,
                    action,
                    employee_id,
                    name,
                    address,
                    department,
                    extension,
                    professional_email,
                    salary
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ON CONFLICT (partition_key, row_key) DO UPDATE SET
                    action = excluded.action,
                    employee_id = excluded.employee_id,
                    name = excluded.name,
                    address = excluded.address,
                    department = excluded.department,
                    extension = excluded.extension,
                    professional_email = excluded.professional_email,
                    salary = excluded.salary,
                    recorded_at = (strftime('%s', 'now') * 1000);",
                table = self.table_name
            ),
            params![
                record.partition_key.as_str(),
                record.row_key.as_str(),
                record.action.as_str(),
                snapshot.id,
                snapshot.name.as_str(),
                snapshot.address.as_str(),
                snapshot.department.as_str(),
                snapshot.extension.as_str(),
                snapshot.professional_email.as_str(),
                snapshot.salary,
            ],
        )?;

        debug!(
            "event=audit_append module=audit status=ok table={} action={} employee_id={}",
            self.table_name,
            record.action.as_str(),
            snapshot.id
        );
        Ok(())
    }
}

fn create_table_sql(table_name: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table_name} (
            partition_key TEXT NOT NULL,
            row_key TEXT NOT NULL,
            action TEXT NOT NULL CHECK (action IN ('insertion', 'update', 'removal')),
            employee_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            address TEXT NOT NULL,
            department TEXT NOT NULL,
            extension TEXT NOT NULL,
            professional_email TEXT NOT NULL,
            salary REAL NOT NULL,
            recorded_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now') * 1000),
            PRIMARY KEY (partition_key, row_key)
        ) WITHOUT ROWID;"
    )
}
