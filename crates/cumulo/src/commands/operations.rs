//! Operation command handlers.

use std::sync::Arc;

use tabled::Tabled;

use cumulo_core::{Command as CoreCommand, GId, Operation, Platform};

use crate::cli::{GlobalOpts, OperationsArgs, OperationsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct OperationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Arc<Operation>> for OperationRow {
    fn from(o: &Arc<Operation>) -> Self {
        Self {
            id: o.id.to_string(),
            device: o
                .device_id
                .as_ref()
                .map_or_else(String::new, ToString::to_string),
            kind: o.kind().unwrap_or("-").to_owned(),
            status: o.status.map(|s| s.to_string()).unwrap_or_default(),
            created: util::fmt_time(o.created_at),
        }
    }
}

fn detail(o: &Arc<Operation>) -> String {
    let mut lines = vec![
        format!("ID:      {}", o.id),
        format!(
            "Device:  {}",
            o.device_id
                .as_ref()
                .map_or_else(|| "-".into(), ToString::to_string)
        ),
        format!("Kind:    {}", o.kind().unwrap_or("-")),
        format!(
            "Status:  {}",
            o.status.map_or_else(|| "-".into(), |s| s.to_string())
        ),
        format!("Created: {}", util::fmt_time(o.created_at)),
    ];
    if let Some(ref reason) = o.failure_reason {
        lines.push(format!("Failure: {reason}"));
    }
    lines.join("\n")
}

pub async fn handle(
    platform: &Platform,
    args: OperationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        OperationsCommand::List {
            list: _,
            device,
            status,
        } => {
            let snap = platform.operations_snapshot();
            let filtered: Vec<Arc<Operation>> = snap
                .iter()
                .filter(|o| {
                    device
                        .as_deref()
                        .is_none_or(|d| o.device_id.as_ref().is_some_and(|id| id.as_str() == d))
                })
                .filter(|o| {
                    status.as_deref().is_none_or(|s| {
                        o.status
                            .map(|st| st.to_string().eq_ignore_ascii_case(s))
                            .unwrap_or(false)
                    })
                })
                .cloned()
                .collect();

            let out = output::render_list(
                &global.output,
                &filtered,
                |o| OperationRow::from(o),
                |o| o.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        OperationsCommand::Get { operation } => {
            let id = GId::new(&operation);
            let found =
                platform
                    .store()
                    .operation_by_id(&id)
                    .ok_or_else(|| CliError::NotFound {
                        resource_type: "operation".into(),
                        identifier: operation,
                        list_command: "operations list".into(),
                    })?;
            let out = output::render_single(&global.output, &found, detail, |o| o.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        OperationsCommand::Create {
            device,
            fragment,
            payload,
        } => {
            let payload: serde_json::Value = serde_json::from_str(&payload)?;
            let found = util::resolve_device(platform, &device).await?;
            let result = platform
                .execute(CoreCommand::CreateOperation {
                    device_id: found.id.clone(),
                    fragment,
                    payload,
                })
                .await?;
            if let cumulo_core::CommandResult::Operation(op) = result {
                if !global.quiet {
                    eprintln!("Operation {} queued", op.id);
                }
            }
            Ok(())
        }

        OperationsCommand::Cancel { operation, reason } => {
            platform
                .execute(CoreCommand::CancelOperation {
                    id: GId::new(operation),
                    reason,
                })
                .await?;
            if !global.quiet {
                eprintln!("Operation cancelled");
            }
            Ok(())
        }
    }
}
