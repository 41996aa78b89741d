//! Employee domain model.
//!
//! # Responsibility
//! - Define the authoritative employee record kept in the primary store.
//! - Define the inbound payload shape used by create and update requests.
//!
//! # Invariants
//! - `id` is assigned by the primary store and never changes afterwards.
//! - The six mutable fields are always replaced as a whole; there is no
//!   partial patch.
//! - `salary` is finite and non-negative.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Primary-store assigned employee identifier.
pub type EmployeeId = i64;

/// Validation errors for employee payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum EmployeeValidationError {
    /// Salary is NaN or infinite.
    NonFiniteSalary,
    /// Salary is below zero.
    NegativeSalary(f64),
}

impl Display for EmployeeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteSalary => write!(f, "salary must be a finite number"),
            Self::NegativeSalary(value) => {
                write!(f, "salary must not be negative, got {value}")
            }
        }
    }
}

impl Error for EmployeeValidationError {}

/// Inbound payload for create and update requests.
///
/// Carries no identifier; the primary store assigns one on insert and the
/// update path takes it from the request address instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmployeeDraft {
    pub name: String,
    pub address: String,
    pub department: String,
    /// Phone extension, kept as text (may carry leading zeros).
    pub extension: String,
    pub professional_email: String,
    pub salary: f64,
}

impl EmployeeDraft {
    /// Checks payload invariants shared by create and update.
    pub fn validate(&self) -> Result<(), EmployeeValidationError> {
        validate_salary(self.salary)
    }
}

/// Authoritative employee record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub address: String,
    pub department: String,
    pub extension: String,
    pub professional_email: String,
    pub salary: f64,
}

impl Employee {
    /// Builds a record from a store-assigned id and a payload.
    pub fn from_draft(id: EmployeeId, draft: &EmployeeDraft) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            address: draft.address.clone(),
            department: draft.department.clone(),
            extension: draft.extension.clone(),
            professional_email: draft.professional_email.clone(),
            salary: draft.salary,
        }
    }

    /// Overwrites every mutable field with the payload values.
    ///
    /// Empty or default payload values are copied as-is.
    pub fn apply(&mut self, draft: &EmployeeDraft) {
        self.name = draft.name.clone();
        self.address = draft.address.clone();
        self.department = draft.department.clone();
        self.extension = draft.extension.clone();
        self.professional_email = draft.professional_email.clone();
        self.salary = draft.salary;
    }

    pub fn validate(&self) -> Result<(), EmployeeValidationError> {
        validate_salary(self.salary)
    }
}

fn validate_salary(salary: f64) -> Result<(), EmployeeValidationError> {
    if !salary.is_finite() {
        return Err(EmployeeValidationError::NonFiniteSalary);
    }
    if salary < 0.0 {
        return Err(EmployeeValidationError::NegativeSalary(salary));
    }
    Ok(())
}
