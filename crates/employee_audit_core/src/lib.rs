//! Employee records with a mirrored audit trail.
//!
//! Every create/update/delete is committed to the primary store first and
//! then appended, best-effort, to a separate partition/row keyed audit log.

pub mod api;
pub mod audit;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use api::{employee_location, ApiReply, ApiResponse, EmployeeApi};
pub use audit::{AuditLog, AuditLogError, AuditResult, SqliteAuditLog};
pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_from_settings, init_logging};
pub use model::audit::{ActionKind, AuditRecord};
pub use model::employee::{Employee, EmployeeDraft, EmployeeId, EmployeeValidationError};
pub use repo::employee_repo::{
    EmployeeRepository, RepoError, RepoResult, SqliteEmployeeRepository,
};
pub use service::employee_service::{
    AuditOutcome, AuditRetryPolicy, EmployeeService, Mutation, ServiceError, ServiceResult,
};
