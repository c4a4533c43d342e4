// ── In-memory device store ──
//
// Concurrent storage with O(1) lookups. Compare-and-swap goes through the
// map's entry API, which holds the shard write lock for the key across
// the version check and the write.

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::trace;

use super::{DeviceFilter, DeviceStore, StoreError};
use crate::model::{Device, DeviceId, NewDevice};

/// A [`DeviceStore`] backed by a `DashMap`.
///
/// Durable across processes through [`load`](Self::load) /
/// [`save`](Self::save) JSON snapshots.
#[derive(Debug, Default)]
pub struct InMemoryDeviceStore {
    by_id: DashMap<DeviceId, Device>,
}

impl InMemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing records, keeping their ids and versions.
    pub fn from_devices(devices: impl IntoIterator<Item = Device>) -> Self {
        let by_id = devices.into_iter().map(|d| (d.id, d)).collect();
        Self { by_id }
    }

    /// Copy of every record, in no particular order.
    pub fn devices(&self) -> Vec<Device> {
        self.by_id.iter().map(|r| r.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl DeviceStore for InMemoryDeviceStore {
    async fn insert(&self, device: NewDevice) -> Result<Device, StoreError> {
        let record = Device {
            id: DeviceId::generate(),
            name: device.name,
            brand: device.brand,
            state: device.state,
            creation_time: Utc::now(),
            version: 0,
        };
        match self.by_id.entry(record.id) {
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                trace!(device_id = %record.id, "inserted device");
                Ok(record)
            }
            // Identifiers are never reused; a collision means the id source is broken.
            Entry::Occupied(_) => Err(StoreError::Fault(format!(
                "generated identifier {} already in use",
                record.id
            ))),
        }
    }

    async fn get(&self, id: &DeviceId) -> Result<Option<Device>, StoreError> {
        Ok(self.by_id.get(id).map(|r| r.value().clone()))
    }

    async fn scan(&self, filter: &DeviceFilter) -> Result<Vec<Device>, StoreError> {
        Ok(self
            .by_id
            .iter()
            .filter(|r| filter.matches(r.value()))
            .map(|r| r.value().clone())
            .collect())
    }

    async fn conditional_update<F>(
        &self,
        id: &DeviceId,
        expected_version: u64,
        mutator: F,
    ) -> Result<Device, StoreError>
    where
        F: FnOnce(&mut Device) + Send,
    {
        let Entry::Occupied(mut slot) = self.by_id.entry(*id) else {
            return Err(StoreError::NotFound);
        };
        let stored = slot.get();
        if stored.version != expected_version {
            return Err(StoreError::VersionConflict {
                expected: expected_version,
                actual: stored.version,
            });
        }

        let mut next = stored.clone();
        mutator(&mut next);
        next.id = stored.id;
        next.creation_time = stored.creation_time;
        next.version = expected_version + 1;

        slot.insert(next.clone());
        trace!(device_id = %id, version = next.version, "updated device");
        Ok(next)
    }

    async fn conditional_delete(
        &self,
        id: &DeviceId,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        let Entry::Occupied(slot) = self.by_id.entry(*id) else {
            return Err(StoreError::NotFound);
        };
        let actual = slot.get().version;
        if actual != expected_version {
            return Err(StoreError::VersionConflict {
                expected: expected_version,
                actual,
            });
        }
        slot.remove();
        trace!(device_id = %id, "deleted device");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::DeviceState;
    use pretty_assertions::assert_eq;

    fn new_device(name: &str, brand: &str, state: DeviceState) -> NewDevice {
        NewDevice {
            name: name.into(),
            brand: brand.into(),
            state,
        }
    }

    #[tokio::test]
    async fn insert_assigns_identity_and_version_zero() {
        let store = InMemoryDeviceStore::new();
        let a = store
            .insert(new_device("iPhone 14", "Apple", DeviceState::Available))
            .await
            .unwrap();
        let b = store
            .insert(new_device("iPhone 14", "Apple", DeviceState::Available))
            .await
            .unwrap();

        assert_eq!(a.version, 0);
        assert_ne!(a.id, b.id);
        assert_eq!(store.get(&a.id).await.unwrap(), Some(a));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = InMemoryDeviceStore::new();
        assert!(store.get(&DeviceId::generate()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn scan_filters_by_exact_brand_and_state() {
        let store = InMemoryDeviceStore::new();
        store
            .insert(new_device("S23", "Samsung", DeviceState::Available))
            .await
            .unwrap();
        store
            .insert(new_device("S22", "samsung", DeviceState::InUse))
            .await
            .unwrap();
        store
            .insert(new_device("Pixel", "Google", DeviceState::InUse))
            .await
            .unwrap();

        let samsung = store
            .scan(&DeviceFilter::Brand("Samsung".into()))
            .await
            .unwrap();
        assert_eq!(samsung.len(), 1);
        assert_eq!(samsung[0].name, "S23");

        let in_use = store
            .scan(&DeviceFilter::State(DeviceState::InUse))
            .await
            .unwrap();
        assert_eq!(in_use.len(), 2);

        assert_eq!(store.scan(&DeviceFilter::All).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn conditional_update_bumps_version_and_protects_identity() {
        let store = InMemoryDeviceStore::new();
        let created = store
            .insert(new_device("Old", "OldBrand", DeviceState::Available))
            .await
            .unwrap();

        let updated = store
            .conditional_update(&created.id, 0, |d| {
                d.name = "New".into();
                d.id = DeviceId::generate();
                d.creation_time = Utc::now() + chrono::Duration::days(1);
                d.version = 99;
            })
            .await
            .unwrap();

        assert_eq!(updated.name, "New");
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.creation_time, created.creation_time);
        assert_eq!(updated.version, 1);
        assert_eq!(store.get(&created.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn conditional_update_rejects_stale_version() {
        let store = InMemoryDeviceStore::new();
        let created = store
            .insert(new_device("A", "B", DeviceState::Available))
            .await
            .unwrap();
        store
            .conditional_update(&created.id, 0, |d| d.state = DeviceState::InUse)
            .await
            .unwrap();

        let err = store
            .conditional_update(&created.id, 0, |d| d.name = "stale".into())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::VersionConflict {
                expected: 0,
                actual: 1
            }
        );
        assert_eq!(store.get(&created.id).await.unwrap().unwrap().name, "A");
    }

    #[tokio::test]
    async fn conditional_operations_report_missing_records() {
        let store = InMemoryDeviceStore::new();
        let id = DeviceId::generate();
        assert_eq!(
            store.conditional_update(&id, 0, |_| {}).await.unwrap_err(),
            StoreError::NotFound
        );
        assert_eq!(
            store.conditional_delete(&id, 0).await.unwrap_err(),
            StoreError::NotFound
        );
    }

    #[tokio::test]
    async fn conditional_delete_checks_version() {
        let store = InMemoryDeviceStore::new();
        let created = store
            .insert(new_device("A", "B", DeviceState::Inactive))
            .await
            .unwrap();

        assert_eq!(
            store.conditional_delete(&created.id, 7).await.unwrap_err(),
            StoreError::VersionConflict {
                expected: 7,
                actual: 0
            }
        );
        store.conditional_delete(&created.id, 0).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_writers_on_same_version_yield_one_winner() {
        let store = Arc::new(InMemoryDeviceStore::new());
        let created = store
            .insert(new_device("A", "B", DeviceState::Available))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            let id = created.id;
            handles.push(tokio::spawn(async move {
                store
                    .conditional_update(&id, 0, move |d| d.name = format!("writer-{i}"))
                    .await
            }));
        }

        let mut winners = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(device) => {
                    winners += 1;
                    assert_eq!(device.version, 1);
                }
                Err(StoreError::VersionConflict { expected: 0, actual: 1 }) => conflicts += 1,
                Err(other) => panic!("unexpected store error: {other}"),
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(conflicts, 15);
        assert_eq!(store.get(&created.id).await.unwrap().unwrap().version, 1);
    }

    #[tokio::test]
    async fn from_devices_keeps_ids_and_versions() {
        let seed = InMemoryDeviceStore::new();
        let a = seed
            .insert(new_device("A", "B", DeviceState::Available))
            .await
            .unwrap();
        let a = seed
            .conditional_update(&a.id, 0, |d| d.brand = "C".into())
            .await
            .unwrap();

        let copy = InMemoryDeviceStore::from_devices(seed.devices());
        assert_eq!(copy.get(&a.id).await.unwrap(), Some(a));
    }
}
