//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the primary-store contract used by the mutation orchestrator.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Employee::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod employee_repo;
