//! Alarm command handlers.

use std::sync::Arc;

use tabled::Tabled;

use cumulo_core::{Alarm, AlarmFilter, Command as CoreCommand, GId, Platform, Severity};

use crate::cli::{AlarmsArgs, AlarmsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct AlarmRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Type")]
    atype: String,
    #[tabled(rename = "Count")]
    count: i64,
    #[tabled(rename = "Time")]
    time: String,
}

impl From<&Arc<Alarm>> for AlarmRow {
    fn from(a: &Arc<Alarm>) -> Self {
        Self {
            id: a.id.to_string(),
            severity: a.severity.map(|s| s.to_string()).unwrap_or_default(),
            status: a.status.map(|s| s.to_string()).unwrap_or_default(),
            source: a
                .source_name
                .clone()
                .or_else(|| a.source_id.as_ref().map(ToString::to_string))
                .unwrap_or_default(),
            atype: a.alarm_type.clone().unwrap_or_default(),
            count: a.count,
            time: util::fmt_time(a.time),
        }
    }
}

fn detail(a: &Arc<Alarm>) -> String {
    [
        format!("ID:        {}", a.id),
        format!(
            "Severity:  {}",
            a.severity.map_or_else(|| "-".into(), |s| s.to_string())
        ),
        format!(
            "Status:    {}",
            a.status.map_or_else(|| "-".into(), |s| s.to_string())
        ),
        format!("Type:      {}", a.alarm_type.as_deref().unwrap_or("-")),
        format!("Text:      {}", a.text.as_deref().unwrap_or("-")),
        format!(
            "Source:    {} ({})",
            a.source_name.as_deref().unwrap_or("-"),
            a.source_id
                .as_ref()
                .map_or_else(|| "-".into(), ToString::to_string)
        ),
        format!("Count:     {}", a.count),
        format!("Time:      {}", util::fmt_time(a.time)),
        format!("First:     {}", util::fmt_time(a.first_occurrence)),
    ]
    .join("\n")
}

fn parse_severity(raw: &str) -> Result<Severity, CliError> {
    raw.to_uppercase()
        .parse::<Severity>()
        .map_err(|_| CliError::Validation {
            field: "severity".into(),
            reason: format!("expected CRITICAL, MAJOR, MINOR, or WARNING, got '{raw}'"),
        })
}

pub async fn handle(
    platform: &Platform,
    args: AlarmsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AlarmsCommand::List {
            list: _,
            severity,
            source,
            resolved,
        } => {
            let severity_filter = severity.as_deref().map(parse_severity).transpose()?;

            let snap = platform.alarms_snapshot();
            let filtered: Vec<Arc<Alarm>> = snap
                .iter()
                .filter(|a| {
                    severity_filter.is_none_or(|sev| AlarmFilter::BySeverity(sev).matches(a))
                })
                .filter(|a| {
                    source
                        .as_deref()
                        .is_none_or(|s| a.source_id.as_ref().is_some_and(|id| id.as_str() == s))
                })
                .filter(|a| resolved || AlarmFilter::Unresolved.matches(a))
                .cloned()
                .collect();

            let out = output::render_list(
                &global.output,
                &filtered,
                |a| AlarmRow::from(a),
                |a| a.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlarmsCommand::Get { alarm } => {
            let id = GId::new(&alarm);
            let found = platform
                .store()
                .alarm_by_id(&id)
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "alarm".into(),
                    identifier: alarm,
                    list_command: "alarms list".into(),
                })?;
            let out = output::render_single(&global.output, &found, detail, |a| a.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlarmsCommand::Raise {
            device,
            alarm_type,
            text,
            severity,
        } => {
            let severity = parse_severity(&severity)?;
            let found = util::resolve_device(platform, &device).await?;
            platform
                .execute(CoreCommand::RaiseAlarm {
                    source: found.id.clone(),
                    alarm_type,
                    text,
                    severity,
                })
                .await?;
            if !global.quiet {
                eprintln!("Alarm raised");
            }
            Ok(())
        }

        AlarmsCommand::Ack { alarm } => {
            platform
                .execute(CoreCommand::AcknowledgeAlarm {
                    id: GId::new(alarm),
                })
                .await?;
            if !global.quiet {
                eprintln!("Alarm acknowledged");
            }
            Ok(())
        }

        AlarmsCommand::Clear { alarm } => {
            platform
                .execute(CoreCommand::ClearAlarm {
                    id: GId::new(alarm),
                })
                .await?;
            if !global.quiet {
                eprintln!("Alarm cleared");
            }
            Ok(())
        }
    }
}
