//! Device provisioning endpoints.
//!
//! Registration workflow: an operator creates a new-device request, the
//! device starts polling for credentials (WAITING_FOR_CONNECTION →
//! PENDING_ACCEPTANCE), the operator accepts, and the credentials call
//! succeeds exactly once.

use serde_json::json;

use crate::Error;
use crate::client::{ApiClient, paging_params};
use crate::types::{CurrentUser, DeviceCredentials, NewDeviceRequest, NewDeviceRequestCollection};

impl ApiClient {
    /// Register a device ID for provisioning.
    pub async fn create_new_device_request(&self, id: &str) -> Result<NewDeviceRequest, Error> {
        self.post("devicecontrol/newDeviceRequests", &json!({ "id": id }))
            .await
    }

    pub async fn list_new_device_requests(
        &self,
        current_page: i32,
        page_size: i32,
    ) -> Result<NewDeviceRequestCollection, Error> {
        self.get_with_params(
            "devicecontrol/newDeviceRequests",
            &paging_params(current_page, page_size),
        )
        .await
    }

    /// Accept a pending request, allowing the device's credentials
    /// poll to succeed.
    pub async fn accept_new_device_request(&self, id: &str) -> Result<NewDeviceRequest, Error> {
        self.put(
            &format!("devicecontrol/newDeviceRequests/{id}"),
            &json!({ "status": "ACCEPTED" }),
        )
        .await
    }

    /// Cancel a request (any state).
    pub async fn delete_new_device_request(&self, id: &str) -> Result<(), Error> {
        self.delete(&format!("devicecontrol/newDeviceRequests/{id}"))
            .await
    }

    /// Poll for device credentials.
    ///
    /// Fails with a 404 API error until the matching request has been
    /// accepted; device agents call this in a retry loop during
    /// bootstrap.
    pub async fn request_device_credentials(&self, id: &str) -> Result<DeviceCredentials, Error> {
        self.post("devicecontrol/deviceCredentials", &json!({ "id": id }))
            .await
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Fetch the authenticated user. Doubles as the credential check
    /// during connect.
    pub async fn current_user(&self) -> Result<CurrentUser, Error> {
        self.get("user/currentUser").await
    }
}
