//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::sync::Arc;

use cumulo_core::{Device, GId, Platform};

use crate::error::CliError;

/// Ask for confirmation unless `--yes` was passed.
///
/// In a non-interactive context (stdin is not a TTY) a destructive
/// action without `--yes` is an error, not a hang.
pub fn confirm(prompt: &str, yes: bool) -> Result<bool, CliError> {
    if yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: prompt.to_owned(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Resolve a device argument: tries the store by ID first, then the
/// identity service by serial number.
pub async fn resolve_device(platform: &Platform, ident: &str) -> Result<Arc<Device>, CliError> {
    let id = GId::new(ident);
    if let Some(device) = platform.store().device_by_id(&id) {
        return Ok(device);
    }

    match platform.find_device_by_serial(ident).await {
        Ok(device) => Ok(Arc::new(device)),
        Err(_) => Err(CliError::NotFound {
            resource_type: "device".into(),
            identifier: ident.to_owned(),
            list_command: "devices list".into(),
        }),
    }
}

/// Short human form for an optional timestamp.
pub fn fmt_time(time: Option<chrono::DateTime<chrono::Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".into())
}
