//! Inventory endpoints: CRUD on managed objects and child references.
//!
//! Base path: `/inventory/managedObjects`. Managed objects are the
//! platform's generic asset records; devices and groups are managed
//! objects with marker fragments.

use crate::Error;
use crate::client::{ApiClient, paging_params};
use crate::types::{
    ManagedObject, ManagedObjectCollection, ManagedObjectReference,
    ManagedObjectReferenceCollection, SourceRef,
};

// ── Query filters ────────────────────────────────────────────────────

/// Filters for `GET /inventory/managedObjects`.
///
/// All fields combine with AND. `query` is the platform's query
/// language and is mutually exclusive with the other filters server-side;
/// the client passes through whatever is set.
#[derive(Debug, Clone, Default)]
pub struct InventoryQuery {
    /// Only objects carrying this fragment, e.g. `"c8y_IsDevice"`.
    pub fragment_type: Option<String>,
    /// Only objects of this `type`.
    pub object_type: Option<String>,
    /// Full-text search.
    pub text: Option<String>,
    /// Raw platform query expression, e.g. `"name eq 'pump*'"`.
    pub query: Option<String>,
}

impl InventoryQuery {
    /// Convenience: all device managed objects.
    pub fn devices() -> Self {
        Self {
            fragment_type: Some("c8y_IsDevice".into()),
            ..Self::default()
        }
    }

    /// Convenience: all group managed objects of the given type.
    pub fn of_type(object_type: impl Into<String>) -> Self {
        Self {
            object_type: Some(object_type.into()),
            ..Self::default()
        }
    }

    fn to_params(&self, current_page: i32, page_size: i32) -> Vec<(&'static str, String)> {
        let mut params = paging_params(current_page, page_size);
        if let Some(ref v) = self.fragment_type {
            params.push(("fragmentType", v.clone()));
        }
        if let Some(ref v) = self.object_type {
            params.push(("type", v.clone()));
        }
        if let Some(ref v) = self.text {
            params.push(("text", v.clone()));
        }
        if let Some(ref v) = self.query {
            params.push(("query", v.clone()));
        }
        params
    }
}

// ── Endpoints ────────────────────────────────────────────────────────

impl ApiClient {
    /// Create a managed object. The response carries the assigned ID.
    pub async fn create_managed_object(
        &self,
        body: &ManagedObject,
    ) -> Result<ManagedObject, Error> {
        self.post("inventory/managedObjects", body).await
    }

    /// Fetch a single managed object by ID.
    pub async fn get_managed_object(&self, id: &str) -> Result<ManagedObject, Error> {
        self.get(&format!("inventory/managedObjects/{id}")).await
    }

    /// Update a managed object.
    ///
    /// The platform merges the body into the stored object, so a partial
    /// body (only the changed fields) is the normal case.
    pub async fn update_managed_object(
        &self,
        id: &str,
        body: &ManagedObject,
    ) -> Result<ManagedObject, Error> {
        self.put(&format!("inventory/managedObjects/{id}"), body)
            .await
    }

    /// Apply a raw JSON patch to a managed object.
    ///
    /// Used by draft editors that produce minimal patches outside the
    /// typed `ManagedObject` shape.
    pub async fn patch_managed_object(
        &self,
        id: &str,
        patch: &serde_json::Value,
    ) -> Result<ManagedObject, Error> {
        self.put(&format!("inventory/managedObjects/{id}"), patch)
            .await
    }

    /// Delete a managed object (and its alarms, events, measurements).
    pub async fn delete_managed_object(&self, id: &str) -> Result<(), Error> {
        self.delete(&format!("inventory/managedObjects/{id}")).await
    }

    /// List managed objects matching `query`, one page at a time.
    pub async fn list_managed_objects(
        &self,
        query: &InventoryQuery,
        current_page: i32,
        page_size: i32,
    ) -> Result<ManagedObjectCollection, Error> {
        self.get_with_params(
            "inventory/managedObjects",
            &query.to_params(current_page, page_size),
        )
        .await
    }

    // ── Child references ─────────────────────────────────────────────

    /// List child assets of a managed object (group membership).
    pub async fn list_child_assets(
        &self,
        id: &str,
        current_page: i32,
        page_size: i32,
    ) -> Result<ManagedObjectReferenceCollection, Error> {
        self.get_with_params(
            &format!("inventory/managedObjects/{id}/childAssets"),
            &paging_params(current_page, page_size),
        )
        .await
    }

    /// List child devices of a managed object.
    pub async fn list_child_devices(
        &self,
        id: &str,
        current_page: i32,
        page_size: i32,
    ) -> Result<ManagedObjectReferenceCollection, Error> {
        self.get_with_params(
            &format!("inventory/managedObjects/{id}/childDevices"),
            &paging_params(current_page, page_size),
        )
        .await
    }

    /// Link an existing managed object as a child asset of `parent_id`.
    pub async fn add_child_asset(&self, parent_id: &str, child_id: &str) -> Result<(), Error> {
        self.post_no_content(
            &format!("inventory/managedObjects/{parent_id}/childAssets"),
            &ManagedObjectReference {
                managed_object: SourceRef::new(child_id),
            },
        )
        .await
    }

    /// Link an existing managed object as a child device of `parent_id`.
    pub async fn add_child_device(&self, parent_id: &str, child_id: &str) -> Result<(), Error> {
        self.post_no_content(
            &format!("inventory/managedObjects/{parent_id}/childDevices"),
            &ManagedObjectReference {
                managed_object: SourceRef::new(child_id),
            },
        )
        .await
    }

    /// Unlink a child asset. The child object itself is not deleted.
    pub async fn remove_child_asset(&self, parent_id: &str, child_id: &str) -> Result<(), Error> {
        self.delete(&format!(
            "inventory/managedObjects/{parent_id}/childAssets/{child_id}"
        ))
        .await
    }

    /// Unlink a child device. The child object itself is not deleted.
    pub async fn remove_child_device(&self, parent_id: &str, child_id: &str) -> Result<(), Error> {
        self.delete(&format!(
            "inventory/managedObjects/{parent_id}/childDevices/{child_id}"
        ))
        .await
    }
}
