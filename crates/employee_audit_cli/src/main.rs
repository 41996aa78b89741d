//! Command-line front end for employee records.
//!
//! # Responsibility
//! - Run exactly one employee operation per invocation.
//! - Print the reply as a JSON document; non-2xx replies exit non-zero.
//!
//! # Invariants
//! - A lost audit record never changes the exit code; it is reported on
//!   stderr and in the `audit_warning` field.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use employee_audit_core::db::open_db;
use employee_audit_core::{
    init_from_settings, ApiReply, ApiResponse, AppConfig, Employee, EmployeeApi, EmployeeDraft,
    EmployeeId, EmployeeService, SqliteAuditLog, SqliteEmployeeRepository,
};
use log::warn;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "employee-audit", version, about = "Employee records with an audit trail")]
struct Cli {
    /// TOML config file. Defaults plus environment overrides when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read one employee by id.
    Get { id: EmployeeId },
    /// Create an employee.
    Create(PayloadArgs),
    /// Overwrite every field of an existing employee.
    Update {
        id: EmployeeId,
        #[command(flatten)]
        payload: PayloadArgs,
    },
    /// Delete an employee by id.
    Delete { id: EmployeeId },
}

/// Employee payload. Omitted flags are sent as empty values.
#[derive(Debug, Clone, Default, PartialEq, Args)]
struct PayloadArgs {
    #[arg(long, default_value = "")]
    name: String,
    #[arg(long, default_value = "")]
    address: String,
    #[arg(long, default_value = "")]
    department: String,
    #[arg(long, default_value = "")]
    extension: String,
    #[arg(long = "email", default_value = "")]
    professional_email: String,
    #[arg(long, default_value_t = 0.0)]
    salary: f64,
}

impl From<PayloadArgs> for EmployeeDraft {
    fn from(args: PayloadArgs) -> Self {
        Self {
            name: args.name,
            address: args.address,
            department: args.department,
            extension: args.extension,
            professional_email: args.professional_email,
            salary: args.salary,
        }
    }
}

/// JSON shape printed for every reply.
#[derive(Debug, Serialize)]
struct ReplyDocument<'a> {
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a Employee>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audit_warning: Option<&'a str>,
}

fn render_reply(reply: &ApiReply) -> ReplyDocument<'_> {
    let (location, body, error) = match &reply.response {
        ApiResponse::Ok(employee) => (None, Some(employee), None),
        ApiResponse::Created { location, employee } => {
            (Some(location.as_str()), Some(employee), None)
        }
        ApiResponse::Updated | ApiResponse::NoContent => (None, None, None),
        ApiResponse::NotFound => (None, None, Some("employee not found")),
        ApiResponse::BadRequest(message) | ApiResponse::InternalError(message) => {
            (None, None, Some(message.as_str()))
        }
    };

    ReplyDocument {
        status: reply.response.status_code(),
        location,
        body,
        error,
        audit_warning: reply.audit_warning.as_deref(),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load config `{}`", path.display())),
        None => AppConfig::from_env().context("invalid configuration from environment"),
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_ref())?;
    init_from_settings(&config.logging)
        .map_err(anyhow::Error::msg)
        .context("failed to initialize logging")?;

    let strings = &config.connection_strings;
    let conn = open_db(&strings.primary_store)
        .with_context(|| format!("failed to open primary store `{}`", strings.primary_store))?;
    let audit_log = SqliteAuditLog::new(&strings.log_store, &strings.audit_table_name)?;
    let api = EmployeeApi::new(
        EmployeeService::new(SqliteEmployeeRepository::new(&conn), &audit_log)
            .with_retry_policy(config.audit.retry_policy()),
    );

    let reply = match cli.command {
        Command::Get { id } => api.get(id),
        Command::Create(payload) => api.create(&payload.into()),
        Command::Update { id, payload } => api.update(id, &payload.into()),
        Command::Delete { id } => api.delete(id),
    };

    println!("{}", serde_json::to_string_pretty(&render_reply(&reply))?);
    if let Some(warning) = &reply.audit_warning {
        warn!("event=cli_reply module=cli status=degraded");
        eprintln!("warning: {warning}");
    }

    Ok(if reply.response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{render_reply, Cli, Command, PayloadArgs};
    use clap::{CommandFactory, Parser};
    use employee_audit_core::{ApiReply, ApiResponse, Employee, EmployeeDraft};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn update_parses_id_and_payload_flags() {
        let cli = Cli::try_parse_from([
            "employee-audit",
            "--config",
            "/etc/employee-audit.toml",
            "update",
            "7",
            "--name",
            "Ana",
            "--department",
            "Eng",
            "--email",
            "ana@corp.example",
            "--salary",
            "1200.5",
        ])
        .unwrap();

        match cli.command {
            Command::Update { id, payload } => {
                assert_eq!(id, 7);
                let draft = EmployeeDraft::from(payload);
                assert_eq!(draft.name, "Ana");
                assert_eq!(draft.department, "Eng");
                assert_eq!(draft.professional_email, "ana@corp.example");
                assert_eq!(draft.address, "");
                assert_eq!(draft.salary, 1200.5);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn omitted_payload_flags_default_to_empty_values() {
        let cli = Cli::try_parse_from(["employee-audit", "create"]).unwrap();
        match cli.command {
            Command::Create(payload) => assert_eq!(payload, PayloadArgs::default()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn created_reply_renders_location_body_and_warning() {
        let employee = Employee::from_draft(
            3,
            &EmployeeDraft {
                name: "Ana".to_string(),
                department: "Eng".to_string(),
                salary: 1000.0,
                ..EmployeeDraft::default()
            },
        );
        let reply = ApiReply {
            response: ApiResponse::Created {
                location: "/employees/3".to_string(),
                employee,
            },
            audit_warning: Some("audit record lost".to_string()),
        };

        let json = serde_json::to_value(render_reply(&reply)).unwrap();
        assert_eq!(json["status"], 201);
        assert_eq!(json["location"], "/employees/3");
        assert_eq!(json["body"]["id"], 3);
        assert_eq!(json["body"]["department"], "Eng");
        assert_eq!(json["audit_warning"], "audit record lost");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn no_content_reply_renders_status_only() {
        let reply = ApiReply::from(ApiResponse::NoContent);
        let json = serde_json::to_value(render_reply(&reply)).unwrap();
        assert_eq!(json, serde_json::json!({ "status": 204 }));
    }
}
