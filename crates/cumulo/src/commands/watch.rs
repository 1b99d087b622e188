//! Realtime watch: stream notifications to stdout until interrupted.
//!
//! Connects with realtime enabled and prints alarms, events, and
//! measurements as they arrive. Exits on Ctrl-C, or when the
//! subscription's connect loop dies (its error policy is
//! terminate-without-restart, so there is nothing to wait for).

use owo_colors::OwoColorize;

use cumulo_api::realtime::SubscriptionState;
use cumulo_core::{Platform, PlatformConfig};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    config: PlatformConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let all = !(args.alarms || args.events || args.measurements);
    let color = output::should_color(&global.color);

    let platform = Platform::new(config);
    platform.connect().await.map_err(CliError::from)?;

    for warning in platform.take_warnings().await {
        eprintln!("warning: {warning}");
    }

    let Some(mut rt_state) = platform.realtime_state().await else {
        platform.disconnect().await;
        return Err(CliError::ConnectionFailed {
            url: "(realtime)".into(),
            source: "realtime subscription could not be established".into(),
        });
    };

    let mut alarms = platform.alarms_feed();
    let mut events = platform.events_feed();
    let mut measurements = platform.measurements_feed();

    // The loop may already be dead (terminate-without-restart policy);
    // changed() alone would wait forever in that case.
    if matches!(
        *rt_state.borrow_and_update(),
        SubscriptionState::Stopped { .. }
    ) {
        platform.disconnect().await;
        return Err(CliError::ConnectionFailed {
            url: "(realtime)".into(),
            source: "realtime subscription ended before watch started".into(),
        });
    }

    if !global.quiet {
        eprintln!("watching — Ctrl-C to stop");
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                break;
            }
            changed = rt_state.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rt_state.borrow_and_update().clone();
                if let SubscriptionState::Stopped { error } = state {
                    if error {
                        eprintln!("realtime subscription died — exiting");
                    }
                    break;
                }
            }
            alarm = alarms.recv() => {
                if let Ok(alarm) = alarm {
                    if all || args.alarms {
                        print_line("ALARM", &alarm_summary(&alarm), &alarm, global, color);
                    }
                }
            }
            event = events.recv() => {
                if let Ok(event) = event {
                    if all || args.events {
                        print_line("EVENT", &event_summary(&event), &event, global, color);
                    }
                }
            }
            m = measurements.recv() => {
                if let Ok(m) = m {
                    if all || args.measurements {
                        print_line("MEAS", &measurement_summary(&m), &m, global, color);
                    }
                }
            }
        }
    }

    platform.disconnect().await;
    Ok(())
}

fn alarm_summary(alarm: &cumulo_core::Alarm) -> String {
    format!(
        "{} {} {} — {}",
        alarm
            .severity
            .map_or_else(|| "-".into(), |s| s.to_string()),
        alarm
            .status
            .map_or_else(|| "-".into(), |s| s.to_string()),
        alarm.alarm_type.as_deref().unwrap_or("-"),
        alarm.text.as_deref().unwrap_or("")
    )
}

fn event_summary(event: &cumulo_core::Event) -> String {
    format!(
        "{} — {}",
        event.event_type.as_deref().unwrap_or("-"),
        event.text.as_deref().unwrap_or("")
    )
}

fn measurement_summary(m: &cumulo_core::Measurement) -> String {
    m.series
        .iter()
        .map(|s| {
            format!(
                "{}.{}={}{}",
                s.fragment,
                s.series,
                s.value,
                s.unit.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_line<T: serde::Serialize>(
    tag: &str,
    summary: &str,
    value: &T,
    global: &GlobalOpts,
    color: bool,
) {
    match global.output {
        crate::cli::OutputFormat::Json | crate::cli::OutputFormat::JsonCompact => {
            println!("{}", output::render_json_compact(value));
        }
        _ => {
            if color {
                println!("{} {summary}", tag.bold());
            } else {
                println!("{tag} {summary}");
            }
        }
    }
}
