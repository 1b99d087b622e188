//! Event endpoints.
//!
//! Base path: `/event/events`.

use chrono::{DateTime, Utc};

use crate::Error;
use crate::client::{ApiClient, paging_params};
use crate::types::{Event, EventCollection};

/// Filters for `GET /event/events`.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    /// Source managed object ID.
    pub source: Option<String>,
    pub event_type: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl EventQuery {
    fn to_params(&self, current_page: i32, page_size: i32) -> Vec<(&'static str, String)> {
        let mut params = paging_params(current_page, page_size);
        if let Some(ref v) = self.source {
            params.push(("source", v.clone()));
        }
        if let Some(ref v) = self.event_type {
            params.push(("type", v.clone()));
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
    pub async fn list_events(
        &self,
        query: &EventQuery,
        current_page: i32,
        page_size: i32,
    ) -> Result<EventCollection, Error> {
        self.get_with_params("event/events", &query.to_params(current_page, page_size))
            .await
    }

    pub async fn get_event(&self, id: &str) -> Result<Event, Error> {
        self.get(&format!("event/events/{id}")).await
    }

    pub async fn create_event(&self, body: &Event) -> Result<Event, Error> {
        self.post("event/events", body).await
    }

    pub async fn delete_event(&self, id: &str) -> Result<(), Error> {
        self.delete(&format!("event/events/{id}")).await
    }
}
