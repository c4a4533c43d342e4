// ── Domain model ──

mod device;
mod device_id;

pub use device::{
    BRAND_MAX_CHARS, Device, DeviceChanges, DeviceState, NAME_MAX_CHARS, NewDevice,
    ParseDeviceStateError, RestrictedField,
};
pub use device_id::{DeviceId, ParseDeviceIdError};
