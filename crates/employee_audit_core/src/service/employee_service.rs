//! Employee mutation orchestrator.
//!
//! # Responsibility
//! - Sequence locate -> apply -> record for create/update/delete.
//! - Mirror every committed mutation into the audit log.
//! - Decide how primary-store and audit-log failures are reported.
//!
//! # Invariants
//! - The primary commit strictly precedes the audit append.
//! - A missing employee or a failed primary write produces no audit record.
//! - Audit append failure never undoes or fails a committed mutation; it is
//!   reported through `AuditOutcome::Failed` and logged at `error`.
//! - Retried appends reuse one row key, so retries cannot duplicate records.

use crate::audit::AuditLog;
use crate::model::audit::{ActionKind, AuditRecord};
use crate::model::employee::{Employee, EmployeeDraft, EmployeeId, EmployeeValidationError};
use crate::repo::employee_repo::{EmployeeRepository, RepoError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

const DEFAULT_AUDIT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_AUDIT_BACKOFF: Duration = Duration::from_millis(50);

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for employee use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Payload rejected before touching the primary store.
    Validation(EmployeeValidationError),
    /// Identifier does not resolve to an employee.
    NotFound(EmployeeId),
    /// Primary-store read or commit failed; nothing was audited.
    PrimaryStore(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid employee payload: {err}"),
            Self::NotFound(id) => write!(f, "employee not found: {id}"),
            Self::PrimaryStore(err) => write!(f, "primary store failure: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::PrimaryStore(err) => Some(err),
        }
    }
}

impl From<EmployeeValidationError> for ServiceError {
    fn from(value: EmployeeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::PrimaryStore(other),
        }
    }
}

/// Bounded retry policy for the audit append step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditRetryPolicy {
    /// Total attempts including the first one. Values below 1 act as 1.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub backoff: Duration,
}

impl Default for AuditRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_AUDIT_MAX_ATTEMPTS,
            backoff: DEFAULT_AUDIT_BACKOFF,
        }
    }
}

impl AuditRetryPolicy {
    /// Single attempt, no backoff.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }
}

/// Result of mirroring one mutation into the audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    Recorded {
        partition_key: String,
        row_key: String,
        attempts: u32,
    },
    Failed {
        row_key: String,
        attempts: u32,
        reason: String,
    },
}

impl AuditOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded { .. })
    }

    pub fn row_key(&self) -> &str {
        match self {
            Self::Recorded { row_key, .. } | Self::Failed { row_key, .. } => row_key,
        }
    }
}

/// Committed mutation plus the fate of its audit record.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    /// Created/updated record, or the pre-deletion snapshot for removals.
    pub employee: Employee,
    pub audit: AuditOutcome,
}

/// Orchestrates employee mutations across primary store and audit log.
pub struct EmployeeService<R: EmployeeRepository, L: AuditLog> {
    repo: R,
    audit_log: L,
    retry: AuditRetryPolicy,
}

impl<R: EmployeeRepository, L: AuditLog> EmployeeService<R, L> {
    /// Creates a service with the default audit retry policy.
    pub fn new(repo: R, audit_log: L) -> Self {
        Self {
            repo,
            audit_log,
            retry: AuditRetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: AuditRetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Reads one employee. Never touches the audit log.
    pub fn get_employee(&self, id: EmployeeId) -> ServiceResult<Employee> {
        self.locate(id)
    }

    /// Inserts a new employee, then records an `Insertion`.
    pub fn create_employee(&self, draft: &EmployeeDraft) -> ServiceResult<Mutation> {
        draft.validate()?;

        let employee = self
            .repo
            .insert(draft)
            .map_err(|err| primary_failure("employee_create", None, err))?;
        info!(
            "event=employee_create module=service status=ok employee_id={}",
            employee.id
        );

        let audit = self.record(ActionKind::Insertion, &employee);
        Ok(Mutation { employee, audit })
    }

    /// Overwrites all mutable fields of an existing employee, then records an
    /// `Update` carrying the new state.
    ///
    /// An unknown id is reported before the payload is validated.
    pub fn update_employee(
        &self,
        id: EmployeeId,
        draft: &EmployeeDraft,
    ) -> ServiceResult<Mutation> {
        let mut employee = self.locate(id)?;
        draft.validate()?;

        employee.apply(draft);
        self.repo
            .update(&employee)
            .map_err(|err| primary_failure("employee_update", Some(id), err))?;
        info!("event=employee_update module=service status=ok employee_id={id}");

        let audit = self.record(ActionKind::Update, &employee);
        Ok(Mutation { employee, audit })
    }

    /// Removes an existing employee, then records a `Removal` carrying the
    /// pre-deletion snapshot.
    pub fn delete_employee(&self, id: EmployeeId) -> ServiceResult<Mutation> {
        let employee = self.locate(id)?;

        self.repo
            .remove(&employee)
            .map_err(|err| primary_failure("employee_delete", Some(id), err))?;
        info!("event=employee_delete module=service status=ok employee_id={id}");

        let audit = self.record(ActionKind::Removal, &employee);
        Ok(Mutation { employee, audit })
    }

    fn locate(&self, id: EmployeeId) -> ServiceResult<Employee> {
        self.repo
            .find_by_id(id)
            .map_err(|err| primary_failure("employee_locate", Some(id), err))?
            .ok_or(ServiceError::NotFound(id))
    }

    fn record(&self, action: ActionKind, snapshot: &Employee) -> AuditOutcome {
        let record = AuditRecord::for_mutation(snapshot, action);
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempts = 0;

        loop {
            attempts += 1;
            let result = self
                .audit_log
                .ensure_store_exists()
                .and_then(|()| self.audit_log.append(&record));

            match result {
                Ok(()) => {
                    info!(
                        "event=audit_record module=service status=ok action={} employee_id={} attempts={}",
                        action.as_str(),
                        snapshot.id,
                        attempts
                    );
                    return AuditOutcome::Recorded {
                        partition_key: record.partition_key,
                        row_key: record.row_key,
                        attempts,
                    };
                }
                Err(err) if attempts < max_attempts => {
                    warn!(
                        "event=audit_record module=service status=retry action={} employee_id={} attempt={} error={}",
                        action.as_str(),
                        snapshot.id,
                        attempts,
                        err
                    );
                    if !self.retry.backoff.is_zero() {
                        std::thread::sleep(self.retry.backoff);
                    }
                }
                Err(err) => {
                    error!(
                        "event=audit_record module=service status=error error_code=audit_append_failed action={} employee_id={} attempts={} error={}",
                        action.as_str(),
                        snapshot.id,
                        attempts,
                        err
                    );
                    return AuditOutcome::Failed {
                        row_key: record.row_key,
                        attempts,
                        reason: err.to_string(),
                    };
                }
            }
        }
    }
}

fn primary_failure(event: &str, id: Option<EmployeeId>, err: RepoError) -> ServiceError {
    let err = ServiceError::from(err);
    if let ServiceError::PrimaryStore(inner) = &err {
        error!(
            "event={event} module=service status=error error_code=primary_store_failed employee_id={} error={inner}",
            id.map_or_else(|| "-".to_string(), |id| id.to_string())
        );
    }
    err
}
