//! Alarm endpoints.
//!
//! Base path: `/alarm/alarms`. Alarm lifecycle is driven through PUT
//! status updates: ACTIVE → ACKNOWLEDGED → CLEARED.

use chrono::{DateTime, Utc};

use crate::Error;
use crate::client::{ApiClient, paging_params};
use crate::types::{Alarm, AlarmCollection};

/// Filters for `GET /alarm/alarms`.
#[derive(Debug, Clone, Default)]
pub struct AlarmQuery {
    /// Source managed object ID.
    pub source: Option<String>,
    /// `CRITICAL`, `MAJOR`, `MINOR`, or `WARNING`.
    pub severity: Option<String>,
    /// `ACTIVE`, `ACKNOWLEDGED`, or `CLEARED`.
    pub status: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    /// `true` for CLEARED alarms only, `false` for unresolved only.
    pub resolved: Option<bool>,
}

impl AlarmQuery {
    fn to_params(&self, current_page: i32, page_size: i32) -> Vec<(&'static str, String)> {
        let mut params = paging_params(current_page, page_size);
        if let Some(ref v) = self.source {
            params.push(("source", v.clone()));
        }
        if let Some(ref v) = self.severity {
            params.push(("severity", v.clone()));
        }
        if let Some(ref v) = self.status {
            params.push(("status", v.clone()));
        }
        if let Some(v) = self.date_from {
            params.push(("dateFrom", v.to_rfc3339()));
        }
        if let Some(v) = self.date_to {
            params.push(("dateTo", v.to_rfc3339()));
        }
        if let Some(v) = self.resolved {
            params.push(("resolved", v.to_string()));
        }
        params
    }
}

impl ApiClient {
    /// List alarms matching `query`, one page at a time.
    pub async fn list_alarms(
        &self,
        query: &AlarmQuery,
        current_page: i32,
        page_size: i32,
    ) -> Result<AlarmCollection, Error> {
        self.get_with_params("alarm/alarms", &query.to_params(current_page, page_size))
            .await
    }

    /// Fetch a single alarm.
    pub async fn get_alarm(&self, id: &str) -> Result<Alarm, Error> {
        self.get(&format!("alarm/alarms/{id}")).await
    }

    /// Raise an alarm.
    ///
    /// If an active alarm with the same source and type already exists,
    /// the platform de-duplicates: the existing alarm's `count` is
    /// bumped and returned instead of a new record.
    pub async fn create_alarm(&self, body: &Alarm) -> Result<Alarm, Error> {
        self.post("alarm/alarms", body).await
    }

    /// Update an alarm — a partial body with just the changed fields
    /// (typically `status` or `severity`).
    pub async fn update_alarm(&self, id: &str, body: &Alarm) -> Result<Alarm, Error> {
        self.put(&format!("alarm/alarms/{id}"), body).await
    }
}
