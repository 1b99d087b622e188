//! Event command handlers.

use std::sync::Arc;

use tabled::Tabled;

use cumulo_core::{Command as CoreCommand, Event, GId, Platform};

use crate::cli::{EventsArgs, EventsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    etype: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Text")]
    text: String,
    #[tabled(rename = "Time")]
    time: String,
}

impl From<&Arc<Event>> for EventRow {
    fn from(e: &Arc<Event>) -> Self {
        Self {
            id: e.id.to_string(),
            etype: e.event_type.clone().unwrap_or_default(),
            source: e
                .source_name
                .clone()
                .or_else(|| e.source_id.as_ref().map(ToString::to_string))
                .unwrap_or_default(),
            text: e.text.clone().unwrap_or_default(),
            time: util::fmt_time(e.time),
        }
    }
}

fn detail(e: &Arc<Event>) -> String {
    let mut lines = vec![
        format!("ID:     {}", e.id),
        format!("Type:   {}", e.event_type.as_deref().unwrap_or("-")),
        format!("Text:   {}", e.text.as_deref().unwrap_or("-")),
        format!(
            "Source: {} ({})",
            e.source_name.as_deref().unwrap_or("-"),
            e.source_id
                .as_ref()
                .map_or_else(|| "-".into(), ToString::to_string)
        ),
        format!("Time:   {}", util::fmt_time(e.time)),
    ];
    if !e.fragments.is_empty() {
        lines.push(format!(
            "Fragments: {}",
            e.fragments.keys().cloned().collect::<Vec<_>>().join(", ")
        ));
    }
    lines.join("\n")
}

pub async fn handle(
    platform: &Platform,
    args: EventsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        EventsCommand::List {
            list: _,
            source,
            event_type,
        } => {
            let snap = platform.events_snapshot();
            let filtered: Vec<Arc<Event>> = snap
                .iter()
                .filter(|e| {
                    source
                        .as_deref()
                        .is_none_or(|s| e.source_id.as_ref().is_some_and(|id| id.as_str() == s))
                })
                .filter(|e| {
                    event_type
                        .as_deref()
                        .is_none_or(|t| e.event_type.as_deref() == Some(t))
                })
                .cloned()
                .collect();

            let out = output::render_list(
                &global.output,
                &filtered,
                |e| EventRow::from(e),
                |e| e.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EventsCommand::Get { event } => {
            let id = GId::new(&event);
            let found = platform
                .events_snapshot()
                .iter()
                .find(|e| e.id == id)
                .cloned()
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "event".into(),
                    identifier: event,
                    list_command: "events list".into(),
                })?;
            let out = output::render_single(&global.output, &found, detail, |e| e.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EventsCommand::Create {
            device,
            event_type,
            text,
        } => {
            let found = util::resolve_device(platform, &device).await?;
            platform
                .execute(CoreCommand::CreateEvent {
                    source: found.id.clone(),
                    event_type,
                    text,
                })
                .await?;
            if !global.quiet {
                eprintln!("Event recorded");
            }
            Ok(())
        }
    }
}
