// ── Mutation coordinator ──
//
// Read, authorize, compare-and-swap. Each attempt is one bounded round trip
// against the store; nothing here locks. A lost race either surfaces as
// `VersionConflict` or, when retries are configured, starts over from a
// fresh read so the policy always judges the state that is actually stored.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::error::CoreError;
use crate::model::{Device, DeviceChanges, DeviceId, NewDevice};
use crate::policy::LifecyclePolicy;
use crate::store::DeviceStore;

pub struct MutationCoordinator<S> {
    store: Arc<S>,
    policy: LifecyclePolicy,
    config: RegistryConfig,
}

impl<S: DeviceStore> MutationCoordinator<S> {
    pub fn new(store: Arc<S>, policy: LifecyclePolicy, config: RegistryConfig) -> Self {
        Self {
            store,
            policy,
            config,
        }
    }

    pub async fn create(&self, device: NewDevice) -> Result<Device, CoreError> {
        debug!(
            name = %device.name,
            brand = %device.brand,
            state = %device.state,
            "creating device"
        );
        let created = self.store.insert(device).await?;
        info!(device_id = %created.id, "device created");
        Ok(created)
    }

    async fn read_current(&self, id: &DeviceId) -> Result<Device, CoreError> {
        self.store.get(id).await?.ok_or_else(|| {
            warn!(device_id = %id, "device not found");
            CoreError::DeviceNotFound { id: *id }
        })
    }

    /// Apply a partial update under the lifecycle policy.
    ///
    /// A change set that matches what is already stored returns the current
    /// record without writing, so the version does not move.
    pub async fn update(
        &self,
        id: &DeviceId,
        changes: &DeviceChanges,
    ) -> Result<Device, CoreError> {
        let mut retries_left = self.config.max_conflict_retries;
        loop {
            let current = self.read_current(id).await?;

            self.policy
                .authorize(current.state, changes)
                .into_result()
                .map_err(|denial| {
                    warn!(device_id = %id, state = %current.state, %denial, "update refused");
                    CoreError::IllegalOperation { id: *id, denial }
                })?;

            if !changes.differs_from(&current) {
                debug!(device_id = %id, version = current.version, "update is a no-op");
                return Ok(current);
            }

            let apply = changes.clone();
            let result = self
                .store
                .conditional_update(id, current.version, move |device| apply.apply_to(device))
                .await;

            match result {
                Ok(updated) => {
                    info!(device_id = %id, version = updated.version, "device updated");
                    return Ok(updated);
                }
                Err(err) => {
                    let err = CoreError::from_store(*id, current.version, err);
                    if !err.is_retryable() {
                        return Err(err);
                    }
                    if retries_left == 0 {
                        warn!(
                            device_id = %id,
                            expected = current.version,
                            "update lost a version race"
                        );
                        return Err(err);
                    }
                    retries_left -= 1;
                    debug!(
                        device_id = %id,
                        expected = current.version,
                        retries_left,
                        "update lost a version race, retrying"
                    );
                }
            }
        }
    }

    /// Remove a device that is not in use.
    pub async fn delete(&self, id: &DeviceId) -> Result<(), CoreError> {
        let mut retries_left = self.config.max_conflict_retries;
        loop {
            let current = self.read_current(id).await?;

            self.policy
                .authorize_delete(current.state)
                .into_result()
                .map_err(|denial| {
                    warn!(device_id = %id, %denial, "delete refused");
                    CoreError::IllegalOperation { id: *id, denial }
                })?;

            match self.store.conditional_delete(id, current.version).await {
                Ok(()) => {
                    info!(device_id = %id, "device deleted");
                    return Ok(());
                }
                Err(err) => {
                    let err = CoreError::from_store(*id, current.version, err);
                    if !err.is_retryable() {
                        return Err(err);
                    }
                    if retries_left == 0 {
                        warn!(
                            device_id = %id,
                            expected = current.version,
                            "delete lost a version race"
                        );
                        return Err(err);
                    }
                    retries_left -= 1;
                    debug!(
                        device_id = %id,
                        expected = current.version,
                        retries_left,
                        "delete lost a version race, retrying"
                    );
                }
            }
        }
    }
}
