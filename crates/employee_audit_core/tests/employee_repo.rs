use employee_audit_core::db::{open_db_in_memory, StoreError};
use employee_audit_core::{
    Employee, EmployeeDraft, EmployeeRepository, EmployeeValidationError, RepoError,
    SqliteEmployeeRepository,
};

fn draft(name: &str, department: &str, salary: f64) -> EmployeeDraft {
    EmployeeDraft {
        name: name.to_string(),
        address: "Rua das Flores, 10".to_string(),
        department: department.to_string(),
        extension: "0101".to_string(),
        professional_email: format!("{}@corp.example", name.to_lowercase()),
        salary,
    }
}

#[test]
fn insert_assigns_id_and_find_returns_same_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::new(&conn);

    let created = repo.insert(&draft("Ana", "Eng", 1000.0)).unwrap();
    assert!(created.id > 0);

    let loaded = repo.find_by_id(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded, Employee::from_draft(created.id, &draft("Ana", "Eng", 1000.0)));
}

#[test]
fn find_unknown_id_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::new(&conn);

    assert!(repo.find_by_id(9999).unwrap().is_none());
}

#[test]
fn update_overwrites_every_mutable_field() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::new(&conn);

    let mut employee = repo.insert(&draft("Ana", "Eng", 1000.0)).unwrap();
    employee.apply(&EmployeeDraft::default());
    repo.update(&employee).unwrap();

    let loaded = repo.find_by_id(employee.id).unwrap().unwrap();
    assert_eq!(loaded, Employee::from_draft(employee.id, &EmployeeDraft::default()));
}

#[test]
fn update_and_remove_unknown_id_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::new(&conn);

    let mut ghost = repo.insert(&draft("Ghost", "Ops", 10.0)).unwrap();
    repo.remove(&ghost).unwrap();

    let err = repo.remove(&ghost).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == ghost.id));

    ghost.salary = 20.0;
    let err = repo.update(&ghost).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == ghost.id));
}

#[test]
fn removed_ids_are_never_reassigned() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::new(&conn);

    let first = repo.insert(&draft("Ana", "Eng", 1000.0)).unwrap();
    repo.remove(&first).unwrap();
    let second = repo.insert(&draft("Bia", "Eng", 1000.0)).unwrap();

    assert!(second.id > first.id);
    assert!(repo.find_by_id(first.id).unwrap().is_none());
}

#[test]
fn validation_failure_blocks_insert_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::new(&conn);

    let err = repo.insert(&draft("Ana", "Eng", -1.0)).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(EmployeeValidationError::NegativeSalary(_))
    ));

    let mut employee = repo.insert(&draft("Ana", "Eng", 1000.0)).unwrap();
    employee.salary = f64::INFINITY;
    let err = repo.update(&employee).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(EmployeeValidationError::NonFiniteSalary)
    ));

    let loaded = repo.find_by_id(employee.id).unwrap().unwrap();
    assert_eq!(loaded.salary, 1000.0);
}

#[test]
fn failed_commit_leaves_no_row_behind() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_insert BEFORE INSERT ON employees
         BEGIN SELECT RAISE(ABORT, 'primary store offline'); END;",
    )
    .unwrap();
    let repo = SqliteEmployeeRepository::new(&conn);

    let err = repo.insert(&draft("Ana", "Eng", 1000.0)).unwrap_err();
    assert!(matches!(err, RepoError::Store(StoreError::Sqlite(_))));
    assert!(err.to_string().contains("primary store offline"));

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM employees;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 0);
    assert!(conn.is_autocommit());
}
