//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate primary-store and audit-log calls into use-case level APIs.
//! - Keep callers decoupled from storage details.

pub mod employee_service;
