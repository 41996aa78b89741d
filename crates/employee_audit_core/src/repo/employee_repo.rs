//! Employee repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide find/insert/update/remove over the `employees` table.
//! - Keep SQL details inside the primary-store boundary.
//!
//! # Invariants
//! - Every write runs in its own transaction and is committed before the
//!   call returns. A returned `Ok` means the mutation is durable.
//! - Write paths call `validate()` before SQL mutations.
//! - Identifiers come from SQLite `AUTOINCREMENT` and are never reused.

use crate::db::StoreError;
use crate::model::employee::{
    Employee, EmployeeDraft, EmployeeId, EmployeeValidationError,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    id,
    name,
    address,
    department,
    extension,
    professional_email,
    salary
FROM employees";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for employee persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(EmployeeValidationError),
    Store(StoreError),
    NotFound(EmployeeId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "employee not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted employee data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<EmployeeValidationError> for RepoError {
    fn from(value: EmployeeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(StoreError::Sqlite(value))
    }
}

/// Primary-store contract for employee records.
pub trait EmployeeRepository {
    /// Looks up one employee; `Ok(None)` when the id does not resolve.
    fn find_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    /// Inserts and commits a new employee, returning it with its assigned id.
    fn insert(&self, draft: &EmployeeDraft) -> RepoResult<Employee>;
    /// Writes every mutable field of `employee` and commits.
    fn update(&self, employee: &Employee) -> RepoResult<()>;
    /// Deletes `employee` by id and commits.
    fn remove(&self, employee: &Employee) -> RepoResult<()>;
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn find_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EMPLOYEE_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt
            .query_row([id], |row| Ok(read_employee_row(row)))
            .optional()?;

        match row {
            Some(parsed) => Ok(Some(parsed?)),
            None => Ok(None),
        }
    }

    fn insert(&self, draft: &EmployeeDraft) -> RepoResult<Employee> {
        draft.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO employees (
                name,
                address,
                department,
                extension,
                professional_email,
                salary
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                draft.name.as_str(),
                draft.address.as_str(),
                draft.department.as_str(),
                draft.extension.as_str(),
                draft.professional_email.as_str(),
                draft.salary,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Employee::from_draft(id, draft))
    }

    fn update(&self, employee: &Employee) -> RepoResult<()> {
        employee.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE employees
             SET
                name = ?1,
                address = ?2,
                department = ?3,
                extension = ?4,
                professional_email = ?5,
                salary = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?7;",
            params![
                employee.name.as_str(),
                employee.address.as_str(),
                employee.department.as_str(),
                employee.extension.as_str(),
                employee.professional_email.as_str(),
                employee.salary,
                employee.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(employee.id));
        }

        tx.commit()?;
        Ok(())
    }

    fn remove(&self, employee: &Employee) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute("DELETE FROM employees WHERE id = ?1;", [employee.id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(employee.id));
        }

        tx.commit()?;
        Ok(())
    }
}

fn read_employee_row(row: &Row<'_>) -> RepoResult<Employee> {
    let employee = Employee {
        id: row.get("id")?,
        name: row.get("name")?,
        address: row.get("address")?,
        department: row.get("department")?,
        extension: row.get("extension")?,
        professional_email: row.get("professional_email")?,
        salary: row.get("salary")?,
    };
    employee.validate().map_err(|err| {
        RepoError::InvalidData(format!(
            "employees.salary for id {}: {err}",
            employee.id
        ))
    })?;
    Ok(employee)
}
