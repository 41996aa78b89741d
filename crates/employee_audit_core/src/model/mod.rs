//! Domain model for employees and their audit trail.
//!
//! # Responsibility
//! - Define the employee record and its inbound payload.
//! - Define the audit record built for every committed mutation.
//!
//! # Invariants
//! - Employee identity is assigned by the primary store.
//! - Audit records are immutable once built.

pub mod audit;
pub mod employee;
