//! Request surface for employee operations.
//!
//! # Responsibility
//! - Translate service results into transport-neutral responses with
//!   HTTP-equivalent status codes.
//! - Surface degraded audit writes without failing the request.
//!
//! # Invariants
//! - `NotFound` and primary-store failures never carry an audit warning,
//!   since no audit record was attempted.
//! - Create responses always carry a `/employees/{id}` locator.

use crate::audit::AuditLog;
use crate::model::employee::{Employee, EmployeeDraft, EmployeeId};
use crate::repo::employee_repo::EmployeeRepository;
use crate::service::employee_service::{
    AuditOutcome, EmployeeService, Mutation, ServiceError, ServiceResult,
};

/// Path prefix used to build follow-up read locators.
pub const EMPLOYEES_PATH: &str = "/employees";

/// Outcome of one request.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Read succeeded.
    Ok(Employee),
    /// Create succeeded; `location` addresses the new record.
    Created { location: String, employee: Employee },
    /// Update succeeded; no body.
    Updated,
    /// Delete succeeded; no body.
    NoContent,
    NotFound,
    BadRequest(String),
    InternalError(String),
}

impl ApiResponse {
    /// HTTP-equivalent status code.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Ok(_) | Self::Updated => 200,
            Self::Created { .. } => 201,
            Self::NoContent => 204,
            Self::BadRequest(_) => 400,
            Self::NotFound => 404,
            Self::InternalError(_) => 500,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code())
    }
}

/// Response plus an optional notice that the audit record was lost.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub response: ApiResponse,
    pub audit_warning: Option<String>,
}

impl From<ApiResponse> for ApiReply {
    fn from(response: ApiResponse) -> Self {
        Self {
            response,
            audit_warning: None,
        }
    }
}

/// Builds the read locator for one employee.
pub fn employee_location(id: EmployeeId) -> String {
    format!("{EMPLOYEES_PATH}/{id}")
}

/// Request handlers over an [`EmployeeService`].
pub struct EmployeeApi<R: EmployeeRepository, L: AuditLog> {
    service: EmployeeService<R, L>,
}

impl<R: EmployeeRepository, L: AuditLog> EmployeeApi<R, L> {
    pub fn new(service: EmployeeService<R, L>) -> Self {
        Self { service }
    }

    pub fn get(&self, id: EmployeeId) -> ApiReply {
        match self.service.get_employee(id) {
            Ok(employee) => ApiResponse::Ok(employee).into(),
            Err(err) => error_response(err).into(),
        }
    }

    pub fn create(&self, draft: &EmployeeDraft) -> ApiReply {
        reply(self.service.create_employee(draft), |mutation| {
            ApiResponse::Created {
                location: employee_location(mutation.employee.id),
                employee: mutation.employee.clone(),
            }
        })
    }

    pub fn update(&self, id: EmployeeId, draft: &EmployeeDraft) -> ApiReply {
        reply(self.service.update_employee(id, draft), |_| {
            ApiResponse::Updated
        })
    }

    pub fn delete(&self, id: EmployeeId) -> ApiReply {
        reply(self.service.delete_employee(id), |_| ApiResponse::NoContent)
    }
}

fn reply(
    result: ServiceResult<Mutation>,
    on_success: impl FnOnce(&Mutation) -> ApiResponse,
) -> ApiReply {
    match result {
        Ok(mutation) => ApiReply {
            response: on_success(&mutation),
            audit_warning: audit_warning(&mutation.audit),
        },
        Err(err) => error_response(err).into(),
    }
}

fn audit_warning(outcome: &AuditOutcome) -> Option<String> {
    match outcome {
        AuditOutcome::Recorded { .. } => None,
        AuditOutcome::Failed {
            row_key,
            attempts,
            reason,
        } => Some(format!(
            "audit record {row_key} not written after {attempts} attempt(s): {reason}"
        )),
    }
}

fn error_response(err: ServiceError) -> ApiResponse {
    match err {
        ServiceError::NotFound(_) => ApiResponse::NotFound,
        ServiceError::Validation(err) => ApiResponse::BadRequest(err.to_string()),
        ServiceError::PrimaryStore(err) => ApiResponse::InternalError(err.to_string()),
    }
}
