//! Measurement command handlers.

use tabled::Tabled;

use cumulo_api::measurements::MeasurementQuery;
use cumulo_core::{Command as CoreCommand, Measurement, Platform};

use crate::cli::{GlobalOpts, MeasurementsArgs, MeasurementsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct SeriesRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Fragment")]
    fragment: String,
    #[tabled(rename = "Series")]
    series: String,
    #[tabled(rename = "Value")]
    value: f64,
    #[tabled(rename = "Unit")]
    unit: String,
}

/// One table row per series value — a measurement with three series
/// renders as three rows.
fn to_rows(measurements: &[Measurement]) -> Vec<SeriesRow> {
    measurements
        .iter()
        .flat_map(|m| {
            m.series.iter().map(|s| SeriesRow {
                id: m.id.to_string(),
                time: util::fmt_time(m.time),
                fragment: s.fragment.clone(),
                series: s.series.clone(),
                value: s.value,
                unit: s.unit.clone().unwrap_or_default(),
            })
        })
        .collect()
}

pub async fn handle(
    platform: &Platform,
    args: MeasurementsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        MeasurementsCommand::List {
            device,
            list,
            fragment,
        } => {
            let found = util::resolve_device(platform, &device).await?;
            let query = MeasurementQuery {
                source: Some(found.id.to_string()),
                value_fragment_type: fragment,
                ..MeasurementQuery::default()
            };
            let measurements = platform.list_measurements(&query, list.limit).await?;

            let out = match global.output {
                crate::cli::OutputFormat::Table => {
                    let rows = to_rows(&measurements);
                    if rows.is_empty() {
                        String::new()
                    } else {
                        tabled::Table::new(&rows)
                            .with(tabled::settings::Style::rounded())
                            .to_string()
                    }
                }
                crate::cli::OutputFormat::Json => output::render_json_pretty(&measurements),
                crate::cli::OutputFormat::JsonCompact => {
                    output::render_json_compact(&measurements)
                }
                crate::cli::OutputFormat::Yaml => output::render_yaml(&measurements),
                crate::cli::OutputFormat::Plain => measurements
                    .iter()
                    .map(|m| m.id.to_string())
                    .collect::<Vec<_>>()
                    .join("\n"),
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MeasurementsCommand::Create {
            device,
            measurement_type,
            fragment,
            series,
            value,
            unit,
        } => {
            let found = util::resolve_device(platform, &device).await?;
            platform
                .execute(CoreCommand::CreateMeasurement {
                    source: found.id.clone(),
                    measurement_type,
                    fragment,
                    series,
                    value,
                    unit,
                })
                .await?;
            if !global.quiet {
                eprintln!("Measurement sent");
            }
            Ok(())
        }
    }
}
