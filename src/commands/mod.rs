//! Command gateway: dispatches parsed CLI commands to the admin and citizen
//! workflows. `main.rs` only talks to [`run`].

use std::io::Write;

use anyhow::Result;
use thiserror::Error;

use crate::cli::Command;
use crate::store::RecordStore;
use crate::util::parse_float;
use crate::Config;

mod admin;
mod citizen;

// ---

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("Citizen '{0}' not found. Please register.")]
    UnknownCitizen(String),

    #[error("{kind} '{id}' not found.")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid pollutant level '{0}', expected NAME=VALUE")]
    BadLevel(String),
}

/// Run one command against the store, writing user-facing output to `out`.
pub fn run<W: Write>(
    command: Command,
    config: &Config,
    store: &RecordStore,
    out: &mut W,
) -> Result<()> {
    // ---
    match command {
        Command::Admin {
            username,
            password,
            command,
        } => {
            if !config.admin_credentials_match(&username, &password) {
                tracing::warn!("Rejected admin login for '{}'", username);
                return Err(CommandError::InvalidCredentials.into());
            }
            tracing::info!("Admin '{}' logged in", username);
            admin::run(command, store, out)
        }
        Command::Register {
            name,
            age,
            location,
            contact,
        } => citizen::register(store, &name, age.as_deref(), &location, &contact, out),
        Command::Citizen { id, command } => citizen::run(&id, command, store, out),
        Command::Seed => {
            crate::sample::create_sample_data(store)?;
            writeln!(out, "Sample data created in {}", store.data_dir().display())?;
            Ok(())
        }
    }
}

/// Parse a `NAME=VALUE` pollutant argument. The value is coerced, defaulting
/// to 0.
pub(crate) fn parse_level(arg: &str) -> Result<(String, f64), CommandError> {
    // ---
    match arg.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), parse_float(value, 0.0)))
        }
        _ => Err(CommandError::BadLevel(arg.to_string())),
    }
}

/// Print `table`, or `empty_message` when there are no rows.
pub(crate) fn print_rows<W: Write>(
    out: &mut W,
    rows: Vec<Vec<String>>,
    headers: &[&str],
    empty_message: &str,
) -> Result<()> {
    // ---
    if rows.is_empty() {
        writeln!(out, "{}", empty_message)?;
    } else {
        write!(out, "{}", crate::table::render_table(&rows, headers))?;
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    // ---
    use super::test_support::*;
    use super::*;
    use crate::cli::{AdminCommand, ReportCommand};

    #[test]
    fn test_parse_level() {
        // ---
        assert_eq!(parse_level("PM2.5=80.5").unwrap(), ("PM2.5".to_string(), 80.5));
        assert_eq!(parse_level(" NO2 = abc").unwrap(), ("NO2".to_string(), 0.0));
        assert!(matches!(parse_level("PM10"), Err(CommandError::BadLevel(_))));
        assert!(matches!(parse_level("=5"), Err(CommandError::BadLevel(_))));
    }

    #[test]
    fn test_admin_requires_credentials() {
        // ---
        let (_dir, store) = test_store();
        let mut out = Vec::new();
        let command = Command::Admin {
            username: "admin".to_string(),
            password: "nope".to_string(),
            command: AdminCommand::Report {
                command: ReportCommand::Regions,
            },
        };

        let err = run(command, &test_config(), &store, &mut out).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CommandError>(),
            Some(CommandError::InvalidCredentials)
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_seed_command() {
        // ---
        let (_dir, store) = test_store();
        let mut out = Vec::new();

        run(Command::Seed, &test_config(), &store, &mut out).unwrap();
        assert!(output(out).starts_with("Sample data created"));
        assert_eq!(store.load::<crate::models::Pollutant>().len(), 6);
    }
}
