//! Shared helpers for command handlers.

use std::io::Read;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Parse a UUID argument, mapping failures to a usage error.
pub fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("'{raw}' is not a valid UUID"),
    })
}

/// Resolve a value from an inline argument, a file (`-` for stdin), or
/// stdin when neither is given.
pub fn read_value(inline: Option<String>, file: Option<&PathBuf>) -> Result<Vec<u8>, CliError> {
    if let Some(value) = inline {
        return Ok(value.into_bytes());
    }
    match file {
        Some(path) if path.as_os_str() != "-" => read_file(path),
        _ => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|e| CliError::Validation {
        field: "file".into(),
        reason: format!("cannot read {}: {e}", path.display()),
    })
}
