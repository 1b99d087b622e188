// ── Measurement domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::GId;

/// One series value extracted from a measurement fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSeries {
    /// Fragment key, e.g. `"c8y_TemperatureMeasurement"`.
    pub fragment: String,
    /// Series key within the fragment, e.g. `"T"`.
    pub series: String,
    pub value: f64,
    pub unit: Option<String>,
}

/// A measurement with its series values flattened out of the fragment
/// structure — the shape a chart or table actually wants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub id: GId,
    pub source_id: Option<GId>,
    pub measurement_type: Option<String>,
    pub time: Option<DateTime<Utc>>,
    pub series: Vec<MeasurementSeries>,
}

impl Measurement {
    /// Look up one series value by fragment and series key.
    pub fn value(&self, fragment: &str, series: &str) -> Option<f64> {
        self.series
            .iter()
            .find(|s| s.fragment == fragment && s.series == series)
            .map(|s| s.value)
    }
}
