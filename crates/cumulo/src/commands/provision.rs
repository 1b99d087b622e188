//! Device registration workflow handlers.

use tabled::Tabled;

use cumulo_core::{Command as CoreCommand, Platform};

use crate::cli::{GlobalOpts, ProvisionArgs, ProvisionCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct RequestRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Created")]
    created: String,
}

pub async fn handle(
    platform: &Platform,
    args: ProvisionArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ProvisionCommand::Register { id } => {
            platform
                .execute(CoreCommand::RegisterDevice { request_id: id })
                .await?;
            if !global.quiet {
                eprintln!("Registration created — device may now request credentials");
            }
            Ok(())
        }

        ProvisionCommand::List => {
            let requests = platform.list_device_requests().await?;
            let out = output::render_list(
                &global.output,
                &requests,
                |r| RequestRow {
                    id: r.id.clone(),
                    status: r.status.clone().unwrap_or_default(),
                    created: util::fmt_time(r.creation_time),
                },
                |r| r.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProvisionCommand::Accept { id } => {
            platform
                .execute(CoreCommand::AcceptDevice { request_id: id })
                .await?;
            if !global.quiet {
                eprintln!("Request accepted");
            }
            Ok(())
        }

        ProvisionCommand::Cancel { id } => {
            if !util::confirm(&format!("Cancel device request {id}?"), global.yes)? {
                return Ok(());
            }
            platform
                .execute(CoreCommand::CancelDeviceRequest { request_id: id })
                .await?;
            if !global.quiet {
                eprintln!("Request cancelled");
            }
            Ok(())
        }
    }
}
