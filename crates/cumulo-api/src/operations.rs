//! Device-control operation endpoints.
//!
//! Base path: `/devicecontrol/operations`. An operation is created
//! PENDING, picked up by the device agent, and moved through
//! EXECUTING to SUCCESSFUL or FAILED via PUT.

use crate::Error;
use crate::client::{ApiClient, paging_params};
use crate::types::{Operation, OperationCollection};

/// Filters for `GET /devicecontrol/operations`.
#[derive(Debug, Clone, Default)]
pub struct OperationQuery {
    /// Target device ID.
    pub device_id: Option<String>,
    /// Agent ID (for agents polling their own queue).
    pub agent_id: Option<String>,
    /// `PENDING`, `EXECUTING`, `SUCCESSFUL`, or `FAILED`.
    pub status: Option<String>,
}

impl OperationQuery {
    fn to_params(&self, current_page: i32, page_size: i32) -> Vec<(&'static str, String)> {
        let mut params = paging_params(current_page, page_size);
        if let Some(ref v) = self.device_id {
            params.push(("deviceId", v.clone()));
        }
        if let Some(ref v) = self.agent_id {
            params.push(("agentId", v.clone()));
        }
        if let Some(ref v) = self.status {
            params.push(("status", v.clone()));
        }
        params
    }
}

impl ApiClient {
    pub async fn list_operations(
        &self,
        query: &OperationQuery,
        current_page: i32,
        page_size: i32,
    ) -> Result<OperationCollection, Error> {
        self.get_with_params(
            "devicecontrol/operations",
            &query.to_params(current_page, page_size),
        )
        .await
    }

    pub async fn get_operation(&self, id: &str) -> Result<Operation, Error> {
        self.get(&format!("devicecontrol/operations/{id}")).await
    }

    /// Queue an operation for a device. The body must carry `deviceId`
    /// and at least one instruction fragment (e.g. `c8y_Restart`).
    pub async fn create_operation(&self, body: &Operation) -> Result<Operation, Error> {
        self.post("devicecontrol/operations", body).await
    }

    /// Update an operation — a partial body, typically `status` plus
    /// `failureReason` on failure.
    pub async fn update_operation(&self, id: &str, body: &Operation) -> Result<Operation, Error> {
        self.put(&format!("devicecontrol/operations/{id}"), body)
            .await
    }
}
