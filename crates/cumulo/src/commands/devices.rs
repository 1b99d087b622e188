//! Device command handlers.

use std::sync::Arc;

use tabled::Tabled;

use cumulo_core::{Command as CoreCommand, Device, Platform};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Firmware")]
    firmware: String,
}

impl From<&Arc<Device>> for DeviceRow {
    fn from(d: &Arc<Device>) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.name.clone().unwrap_or_default(),
            dtype: d.device_type.clone().unwrap_or_default(),
            state: format!("{:?}", d.state),
            serial: d.serial.clone().unwrap_or_default(),
            firmware: d.firmware_version.clone().unwrap_or_default(),
        }
    }
}

fn detail(d: &Arc<Device>) -> String {
    let mut lines = vec![
        format!("ID:       {}", d.id),
        format!("Name:     {}", d.name.as_deref().unwrap_or("-")),
        format!("Type:     {}", d.device_type.as_deref().unwrap_or("-")),
        format!("Owner:    {}", d.owner.as_deref().unwrap_or("-")),
        format!("State:    {:?}", d.state),
        format!("Serial:   {}", d.serial.as_deref().unwrap_or("-")),
        format!("Agent:    {}", if d.is_agent { "yes" } else { "no" }),
    ];
    if let Some(ref model) = d.hardware_model {
        lines.push(format!("Hardware: {model}"));
    }
    if let Some(ref fw) = d.firmware_version {
        lines.push(format!(
            "Firmware: {} {fw}",
            d.firmware_name.as_deref().unwrap_or("")
        ));
    }
    if !d.child_device_ids.is_empty() {
        lines.push(format!("Children: {}", d.child_device_ids.len()));
    }
    lines.push(format!("Updated:  {}", util::fmt_time(d.last_updated)));
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    platform: &Platform,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List(_list) => {
            let snap = platform.devices_snapshot();
            let out = output::render_list(
                &global.output,
                &snap,
                |d| DeviceRow::from(d),
                |d| d.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { device } => {
            let found = util::resolve_device(platform, &device).await?;
            let out = output::render_single(&global.output, &found, detail, |d| d.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Create { name, device_type } => {
            let result = platform
                .execute(CoreCommand::CreateDevice { name, device_type })
                .await?;
            if let cumulo_core::CommandResult::Device(device) = result {
                if !global.quiet {
                    eprintln!("Created device {}", device.id);
                }
            }
            Ok(())
        }

        DevicesCommand::Rename { device, name } => {
            let found = util::resolve_device(platform, &device).await?;
            let mut draft = cumulo_core::DeviceDraft::from_device(&found);
            draft.set_name(name);
            if !draft.is_dirty() {
                if !global.quiet {
                    eprintln!("Name unchanged");
                }
                return Ok(());
            }
            platform
                .execute(CoreCommand::UpdateDevice {
                    id: found.id.clone(),
                    patch: draft.changes(),
                })
                .await?;
            if !global.quiet {
                eprintln!("Device renamed");
            }
            Ok(())
        }

        DevicesCommand::Restart { device } => {
            let found = util::resolve_device(platform, &device).await?;
            platform
                .execute(CoreCommand::RestartDevice {
                    device_id: found.id.clone(),
                })
                .await?;
            if !global.quiet {
                eprintln!("Restart operation queued");
            }
            Ok(())
        }

        DevicesCommand::Delete { device } => {
            let found = util::resolve_device(platform, &device).await?;
            if !util::confirm(
                &format!("Delete device {} and all its data?", found.label()),
                global.yes,
            )? {
                return Ok(());
            }
            platform
                .execute(CoreCommand::DeleteDevice {
                    id: found.id.clone(),
                })
                .await?;
            if !global.quiet {
                eprintln!("Device deleted");
            }
            Ok(())
        }
    }
}
