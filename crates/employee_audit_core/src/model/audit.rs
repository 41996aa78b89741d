//! Audit trail model.
//!
//! # Responsibility
//! - Tag every mutation with a closed action kind.
//! - Build the append-only record mirrored into the audit log store.
//!
//! # Invariants
//! - `partition_key` is the employee department at mutation time.
//! - `row_key` is a fresh v4 UUID per record, so appends never collide.
//! - Records are never changed after construction.

use crate::model::employee::Employee;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why an audit record was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Insertion,
    Update,
    Removal,
}

impl ActionKind {
    /// Stable storage/text form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insertion => "insertion",
            Self::Update => "update",
            Self::Removal => "removal",
        }
    }
}

/// One mutation event, snapshotting the affected employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Department of the snapshot; groups audit entries.
    pub partition_key: String,
    /// Unique per record.
    pub row_key: String,
    pub action: ActionKind,
    /// Employee fields as they were right after (or, for removals, right
    /// before) the primary-store commit.
    pub snapshot: Employee,
}

impl AuditRecord {
    /// Builds a record for a committed mutation with a generated row key.
    pub fn for_mutation(snapshot: &Employee, action: ActionKind) -> Self {
        Self::with_row_key(snapshot, action, Uuid::new_v4().to_string())
    }

    /// Builds a record with a caller-provided row key.
    ///
    /// The caller is responsible for row key uniqueness.
    pub fn with_row_key(snapshot: &Employee, action: ActionKind, row_key: String) -> Self {
        Self {
            partition_key: snapshot.department.clone(),
            row_key,
            action,
            snapshot: snapshot.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionKind, AuditRecord};
    use crate::model::employee::{Employee, EmployeeDraft};
    use std::collections::HashSet;
    use uuid::Uuid;

    fn employee(department: &str) -> Employee {
        Employee::from_draft(
            1,
            &EmployeeDraft {
                name: "Ana".to_string(),
                department: department.to_string(),
                salary: 1000.0,
                ..EmployeeDraft::default()
            },
        )
    }

    #[test]
    fn record_is_partitioned_by_department() {
        let record = AuditRecord::for_mutation(&employee("Eng"), ActionKind::Insertion);
        assert_eq!(record.partition_key, "Eng");
        assert_eq!(record.action, ActionKind::Insertion);
        assert_eq!(record.snapshot, employee("Eng"));
        assert!(Uuid::parse_str(&record.row_key).is_ok());
    }

    #[test]
    fn generated_row_keys_do_not_repeat() {
        let snapshot = employee("Eng");
        let keys: HashSet<String> = (0..1000)
            .map(|_| AuditRecord::for_mutation(&snapshot, ActionKind::Update).row_key)
            .collect();
        assert_eq!(keys.len(), 1000);
    }

    #[test]
    fn action_kind_text_forms_are_stable() {
        assert_eq!(ActionKind::Insertion.as_str(), "insertion");
        assert_eq!(ActionKind::Update.as_str(), "update");
        assert_eq!(ActionKind::Removal.as_str(), "removal");
    }
}
