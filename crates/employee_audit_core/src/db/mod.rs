//! Primary employee store bootstrap.
//!
//! # Responsibility
//! - Open the SQLite database holding authoritative employee records.
//! - Create the `employees` schema on first open and stamp its version.
//!
//! # Invariants
//! - A returned connection has the current schema, `foreign_keys=ON` and a
//!   busy timeout, so concurrent workers queue on each other's commits.
//! - A database stamped with a newer schema than this binary knows is
//!   refused before any employee row is touched.

use log::{error, info};
use rusqlite::{Connection, TransactionBehavior};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::{Duration, Instant};

/// Schema version written to `PRAGMA user_version`.
pub const SCHEMA_VERSION: u32 = 1;

pub(crate) const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const EMPLOYEES_SCHEMA: &str = include_str!("employees.sql");

pub type StoreResult<T> = Result<T, StoreError>;

/// Primary store failures below the repository layer.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "employee store schema version {found} is newer than supported {supported}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Opens (creating if needed) the employee store at `path`.
pub fn open_db(path: impl AsRef<Path>) -> StoreResult<Connection> {
    open_with("file", || Connection::open(path))
}

/// Opens a private in-memory employee store.
pub fn open_db_in_memory() -> StoreResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &'static str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> StoreResult<Connection> {
    let started_at = Instant::now();
    let opened = open().map_err(StoreError::from).and_then(|mut conn| {
        prepare_employee_store(&mut conn)?;
        Ok(conn)
    });

    match &opened {
        Ok(_) => info!(
            "event=primary_store_open module=db status=ok mode={mode} schema_version={SCHEMA_VERSION} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=primary_store_open module=db status=error mode={mode} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }
    opened
}

fn prepare_employee_store(conn: &mut Connection) -> StoreResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;

    // Immediate lock: two workers opening a fresh file must not both create.
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let found: u32 = tx.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    match found.cmp(&SCHEMA_VERSION) {
        Ordering::Greater => {
            return Err(StoreError::SchemaTooNew {
                found,
                supported: SCHEMA_VERSION,
            })
        }
        Ordering::Equal => {}
        Ordering::Less => {
            tx.execute_batch(EMPLOYEES_SCHEMA)?;
            tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
        }
    }
    tx.commit()?;
    Ok(())
}
