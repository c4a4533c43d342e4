// ── Registry façade ──
//
// The one entry point boundary layers talk to. Built from explicit parts:
// a store, a policy and a config. Nothing is looked up ambiently.

use std::sync::Arc;

use crate::config::RegistryConfig;
use crate::coordinator::MutationCoordinator;
use crate::error::CoreError;
use crate::model::{Device, DeviceChanges, DeviceId, DeviceState};
use crate::policy::LifecyclePolicy;
use crate::query::DeviceQuery;
use crate::request::{CreateDeviceRequest, UpdateDeviceRequest};
use crate::store::DeviceStore;

/// Device registry: lifecycle-checked writes plus read-only queries over a
/// shared [`DeviceStore`].
pub struct DeviceRegistry<S> {
    store: Arc<S>,
    coordinator: MutationCoordinator<S>,
    query: DeviceQuery<S>,
}

impl<S: DeviceStore> DeviceRegistry<S> {
    pub fn new(store: Arc<S>, config: RegistryConfig) -> Self {
        Self::with_policy(store, LifecyclePolicy::new(), config)
    }

    pub fn with_policy(store: Arc<S>, policy: LifecyclePolicy, config: RegistryConfig) -> Self {
        Self {
            coordinator: MutationCoordinator::new(Arc::clone(&store), policy, config),
            query: DeviceQuery::new(Arc::clone(&store)),
            store,
        }
    }

    /// The backing store, for callers that manage its durability.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // ── Writes ───────────────────────────────────────────────────────

    pub async fn create(&self, request: CreateDeviceRequest) -> Result<Device, CoreError> {
        request.validate()?;
        self.coordinator.create(request.into()).await
    }

    pub async fn update(
        &self,
        id: &DeviceId,
        request: UpdateDeviceRequest,
    ) -> Result<Device, CoreError> {
        request.validate()?;
        let changes = DeviceChanges::from(request);
        self.coordinator.update(id, &changes).await
    }

    pub async fn delete(&self, id: &DeviceId) -> Result<(), CoreError> {
        self.coordinator.delete(id).await
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub async fn get(&self, id: &DeviceId) -> Result<Device, CoreError> {
        self.query.get_by_id(id).await
    }

    pub async fn list(&self) -> Result<Vec<Device>, CoreError> {
        self.query.get_all().await
    }

    pub async fn list_by_brand(&self, brand: &str) -> Result<Vec<Device>, CoreError> {
        self.query.get_by_brand(brand).await
    }

    pub async fn list_by_state(&self, state: DeviceState) -> Result<Vec<Device>, CoreError> {
        self.query.get_by_state(state).await
    }
}
