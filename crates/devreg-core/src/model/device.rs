// ── Device domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::device_id::DeviceId;

/// Upper bound on `Device::name`, in characters.
pub const NAME_MAX_CHARS: usize = 100;
/// Upper bound on `Device::brand`, in characters.
pub const BRAND_MAX_CHARS: usize = 50;

/// Device lifecycle state.
///
/// Any state may move to any other state. What the state controls is
/// which *other* fields may change while the device sits in it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceState {
    #[default]
    Available,
    InUse,
    Inactive,
}

impl DeviceState {
    pub fn is_in_use(self) -> bool {
        matches!(self, Self::InUse)
    }
}

/// Error returned when text does not name a [`DeviceState`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown device state '{input}': expected AVAILABLE, IN_USE or INACTIVE")]
pub struct ParseDeviceStateError {
    pub input: String,
}

impl FromStr for DeviceState {
    type Err = ParseDeviceStateError;

    /// Case-insensitive; `-` and `_` are interchangeable (`in-use`, `IN_USE`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "AVAILABLE" => Ok(Self::Available),
            "IN_USE" => Ok(Self::InUse),
            "INACTIVE" => Ok(Self::Inactive),
            _ => Err(ParseDeviceStateError {
                input: s.to_owned(),
            }),
        }
    }
}

/// A registered device.
///
/// `id` and `creation_time` are fixed at insert; `version` is owned by
/// the store and advances by one on every accepted write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub brand: String,
    pub state: DeviceState,
    pub creation_time: DateTime<Utc>,
    pub version: u64,
}

impl Device {
    pub fn is_in_use(&self) -> bool {
        self.state.is_in_use()
    }
}

/// Field values for a device that does not exist yet.
///
/// Identity, creation time and version are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDevice {
    pub name: String,
    pub brand: String,
    pub state: DeviceState,
}

/// Mutable fields a caller can touch, as a sparse change set.
///
/// `None` means "leave as is". There is no way to clear a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceChanges {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub state: Option<DeviceState>,
}

/// Fields that lock while a device is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestrictedField {
    Name,
    Brand,
}

impl fmt::Display for RestrictedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => f.write_str("name"),
            Self::Brand => f.write_str("brand"),
        }
    }
}

impl DeviceChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.brand.is_none() && self.state.is_none()
    }

    /// Restricted fields this change set assigns, in declaration order.
    pub fn restricted_fields(&self) -> Vec<RestrictedField> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push(RestrictedField::Name);
        }
        if self.brand.is_some() {
            fields.push(RestrictedField::Brand);
        }
        fields
    }

    /// Whether applying this change set to `device` would alter anything.
    pub fn differs_from(&self, device: &Device) -> bool {
        self.name.as_ref().is_some_and(|n| *n != device.name)
            || self.brand.as_ref().is_some_and(|b| *b != device.brand)
            || self.state.is_some_and(|s| s != device.state)
    }

    /// Overwrite every present field on `device`.
    pub fn apply_to(&self, device: &mut Device) {
        if let Some(ref name) = self.name {
            device.name.clone_from(name);
        }
        if let Some(ref brand) = self.brand {
            device.brand.clone_from(brand);
        }
        if let Some(state) = self.state {
            device.state = state;
        }
    }
}
