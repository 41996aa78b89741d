use employee_audit_core::db::open_db_in_memory;
use employee_audit_core::{
    ApiResponse, AuditLog, AuditLogError, AuditRecord, AuditResult, AuditRetryPolicy,
    EmployeeApi, EmployeeDraft, EmployeeService, SqliteAuditLog, SqliteEmployeeRepository,
};

fn payload(salary: f64) -> EmployeeDraft {
    EmployeeDraft {
        name: "Ana".to_string(),
        address: "Rua A, 1".to_string(),
        department: "Eng".to_string(),
        extension: "100".to_string(),
        professional_email: "ana@corp.example".to_string(),
        salary,
    }
}

struct OfflineAuditLog;

impl AuditLog for OfflineAuditLog {
    fn ensure_store_exists(&self) -> AuditResult<()> {
        Err(AuditLogError::Unavailable("table service unreachable".to_string()))
    }

    fn append(&self, _record: &AuditRecord) -> AuditResult<()> {
        Err(AuditLogError::Unavailable("table service unreachable".to_string()))
    }
}

#[test]
fn full_lifecycle_maps_to_http_style_responses() {
    let conn = open_db_in_memory().unwrap();
    let log = SqliteAuditLog::in_memory("EmployeeLog").unwrap();
    let api = EmployeeApi::new(EmployeeService::new(
        SqliteEmployeeRepository::new(&conn),
        &log,
    ));

    let created = api.create(&payload(1000.0));
    assert_eq!(created.response.status_code(), 201);
    assert_eq!(created.audit_warning, None);
    let (location, employee) = match created.response {
        ApiResponse::Created { location, employee } => (location, employee),
        other => panic!("unexpected response: {other:?}"),
    };
    assert_eq!(location, format!("/employees/{}", employee.id));

    assert_eq!(
        api.get(employee.id).response,
        ApiResponse::Ok(employee.clone())
    );

    let updated = api.update(employee.id, &payload(1200.0));
    assert_eq!(updated.response, ApiResponse::Updated);
    match api.get(employee.id).response {
        ApiResponse::Ok(current) => assert_eq!(current.salary, 1200.0),
        other => panic!("unexpected response: {other:?}"),
    }

    assert_eq!(api.delete(employee.id).response, ApiResponse::NoContent);
    assert_eq!(api.get(employee.id).response, ApiResponse::NotFound);
    assert_eq!(api.delete(employee.id).response, ApiResponse::NotFound);
}

#[test]
fn unknown_ids_are_not_found_for_every_operation() {
    let conn = open_db_in_memory().unwrap();
    let api = EmployeeApi::new(EmployeeService::new(
        SqliteEmployeeRepository::new(&conn),
        OfflineAuditLog,
    ));

    for reply in [
        api.get(9999),
        api.update(9999, &payload(1.0)),
        api.delete(9999),
    ] {
        assert_eq!(reply.response, ApiResponse::NotFound);
        assert_eq!(reply.audit_warning, None);
    }
}

#[test]
fn invalid_payload_is_bad_request() {
    let conn = open_db_in_memory().unwrap();
    let log = SqliteAuditLog::in_memory("EmployeeLog").unwrap();
    let api = EmployeeApi::new(EmployeeService::new(
        SqliteEmployeeRepository::new(&conn),
        &log,
    ));

    let reply = api.create(&payload(f64::NAN));
    assert!(matches!(reply.response, ApiResponse::BadRequest(ref message) if message.contains("finite")));
}

#[test]
fn lost_audit_record_is_success_with_warning() {
    let conn = open_db_in_memory().unwrap();
    let api = EmployeeApi::new(
        EmployeeService::new(SqliteEmployeeRepository::new(&conn), OfflineAuditLog)
            .with_retry_policy(AuditRetryPolicy::no_retry()),
    );

    let reply = api.create(&payload(1000.0));
    assert_eq!(reply.response.status_code(), 201);
    let warning = reply.audit_warning.expect("audit warning expected");
    assert!(warning.contains("table service unreachable"));
    assert!(warning.contains("1 attempt"));
}

#[test]
fn primary_store_failure_is_internal_error_without_audit_warning() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_insert BEFORE INSERT ON employees
         BEGIN SELECT RAISE(ABORT, 'disk I/O error'); END;",
    )
    .unwrap();
    let api = EmployeeApi::new(EmployeeService::new(
        SqliteEmployeeRepository::new(&conn),
        OfflineAuditLog,
    ));

    let reply = api.create(&payload(1000.0));
    assert_eq!(reply.response.status_code(), 500);
    assert_eq!(reply.audit_warning, None);
}
