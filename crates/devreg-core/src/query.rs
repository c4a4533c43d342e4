// ── Query façade ──
//
// Read-only access. No policy, no version checks.

use std::sync::Arc;

use tracing::debug;

use crate::error::CoreError;
use crate::model::{Device, DeviceId, DeviceState};
use crate::store::{DeviceFilter, DeviceStore};

pub struct DeviceQuery<S> {
    store: Arc<S>,
}

impl<S: DeviceStore> DeviceQuery<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn get_by_id(&self, id: &DeviceId) -> Result<Device, CoreError> {
        debug!(device_id = %id, "fetching device");
        self.store
            .get(id)
            .await?
            .ok_or(CoreError::DeviceNotFound { id: *id })
    }

    pub async fn get_all(&self) -> Result<Vec<Device>, CoreError> {
        self.scan(DeviceFilter::All).await
    }

    /// Exact, case-sensitive match on `brand`.
    pub async fn get_by_brand(&self, brand: &str) -> Result<Vec<Device>, CoreError> {
        self.scan(DeviceFilter::Brand(brand.to_owned())).await
    }

    pub async fn get_by_state(&self, state: DeviceState) -> Result<Vec<Device>, CoreError> {
        self.scan(DeviceFilter::State(state)).await
    }

    /// Results come back oldest first, ties broken by id.
    async fn scan(&self, filter: DeviceFilter) -> Result<Vec<Device>, CoreError> {
        let mut devices = self.store.scan(&filter).await?;
        devices.sort_by(|a, b| {
            a.creation_time
                .cmp(&b.creation_time)
                .then_with(|| a.id.cmp(&b.id))
        });
        debug!(?filter, count = devices.len(), "listed devices");
        Ok(devices)
    }
}
