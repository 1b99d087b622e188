//! Identity endpoints: external-ID to global-ID mapping.
//!
//! Base path: `/identity`. An external ID (e.g. a serial number under
//! the `c8y_Serial` namespace) resolves to exactly one managed object;
//! a managed object may carry many external IDs.

use serde_json::json;

use crate::Error;
use crate::client::{ApiClient, paging_params};
use crate::types::{ExternalId, ExternalIdCollection};

impl ApiClient {
    /// Resolve an external ID to its managed object.
    pub async fn get_external_id(&self, id_type: &str, value: &str) -> Result<ExternalId, Error> {
        self.get(&format!("identity/externalIds/{id_type}/{value}"))
            .await
    }

    /// List the external IDs attached to a managed object.
    pub async fn list_external_ids(
        &self,
        global_id: &str,
        current_page: i32,
        page_size: i32,
    ) -> Result<ExternalIdCollection, Error> {
        self.get_with_params(
            &format!("identity/globalIds/{global_id}/externalIds"),
            &paging_params(current_page, page_size),
        )
        .await
    }

    /// Attach an external ID to a managed object.
    pub async fn register_external_id(
        &self,
        global_id: &str,
        id_type: &str,
        value: &str,
    ) -> Result<ExternalId, Error> {
        self.post(
            &format!("identity/globalIds/{global_id}/externalIds"),
            &json!({ "externalId": value, "type": id_type }),
        )
        .await
    }

    /// Remove an external-ID mapping. The managed object is untouched.
    pub async fn delete_external_id(&self, id_type: &str, value: &str) -> Result<(), Error> {
        self.delete(&format!("identity/externalIds/{id_type}/{value}"))
            .await
    }
}
