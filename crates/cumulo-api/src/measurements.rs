//! Measurement endpoints.
//!
//! Base path: `/measurement/measurements`.

use chrono::{DateTime, Utc};

use crate::Error;
use crate::client::{ApiClient, paging_params};
use crate::types::{Measurement, MeasurementCollection};

/// Filters for `GET /measurement/measurements`.
#[derive(Debug, Clone, Default)]
pub struct MeasurementQuery {
    /// Source managed object ID.
    pub source: Option<String>,
    pub measurement_type: Option<String>,
    /// Fragment key, e.g. `"c8y_TemperatureMeasurement"`.
    pub value_fragment_type: Option<String>,
    /// Series key within the fragment, e.g. `"T"`.
    pub value_fragment_series: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl MeasurementQuery {
    fn to_params(&self, current_page: i32, page_size: i32) -> Vec<(&'static str, String)> {
        let mut params = paging_params(current_page, page_size);
        if let Some(ref v) = self.source {
            params.push(("source", v.clone()));
        }
        if let Some(ref v) = self.measurement_type {
            params.push(("type", v.clone()));
        }
        if let Some(ref v) = self.value_fragment_type {
            params.push(("valueFragmentType", v.clone()));
        }
        if let Some(ref v) = self.value_fragment_series {
            params.push(("valueFragmentSeries", v.clone()));
        }
        if let Some(v) = self.date_from {
            params.push(("dateFrom", v.to_rfc3339()));
        }
        if let Some(v) = self.date_to {
            params.push(("dateTo", v.to_rfc3339()));
        }
        params
    }
}

impl ApiClient {
    pub async fn list_measurements(
        &self,
        query: &MeasurementQuery,
        current_page: i32,
        page_size: i32,
    ) -> Result<MeasurementCollection, Error> {
        self.get_with_params(
            "measurement/measurements",
            &query.to_params(current_page, page_size),
        )
        .await
    }

    pub async fn get_measurement(&self, id: &str) -> Result<Measurement, Error> {
        self.get(&format!("measurement/measurements/{id}")).await
    }

    pub async fn create_measurement(&self, body: &Measurement) -> Result<Measurement, Error> {
        self.post("measurement/measurements", body).await
    }

    pub async fn delete_measurement(&self, id: &str) -> Result<(), Error> {
        self.delete(&format!("measurement/measurements/{id}")).await
    }

    /// Bulk-delete all measurements of a source object.
    pub async fn purge_measurements(&self, source: &str) -> Result<(), Error> {
        self.delete_with_params(
            "measurement/measurements",
            &[("source", source.to_owned())],
        )
        .await
    }
}
