// ── Typed request structs ──
//
// What a boundary layer hands to the registry. Payloads are parsed
// strictly: unknown keys (`id`, `version`, `creationTime`, ...) are
// rejected at deserialization, so immutable fields never reach the core.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{BRAND_MAX_CHARS, DeviceChanges, DeviceState, NAME_MAX_CHARS, NewDevice};

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check_text(field: &str, value: &str, max_chars: usize, out: &mut Vec<FieldViolation>) {
    if value.trim().is_empty() {
        out.push(FieldViolation::new(field, format!("{field} must not be blank")));
    } else if value.chars().count() > max_chars {
        out.push(FieldViolation::new(
            field,
            format!("{field} must be at most {max_chars} characters"),
        ));
    }
}

fn finish(violations: Vec<FieldViolation>) -> Result<(), CoreError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation { violations })
    }
}

// ── Create ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateDeviceRequest {
    pub name: String,
    pub brand: String,
    #[serde(default)]
    pub state: DeviceState,
}

impl CreateDeviceRequest {
    /// Collect every violated constraint, not just the first.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut violations = Vec::new();
        check_text("name", &self.name, NAME_MAX_CHARS, &mut violations);
        check_text("brand", &self.brand, BRAND_MAX_CHARS, &mut violations);
        finish(violations)
    }
}

impl From<CreateDeviceRequest> for NewDevice {
    fn from(req: CreateDeviceRequest) -> Self {
        Self {
            name: req.name,
            brand: req.brand,
            state: req.state,
        }
    }
}

// ── Update ─────────────────────────────────────────────────────────

/// Partial update. Absent or `null` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateDeviceRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<DeviceState>,
}

impl UpdateDeviceRequest {
    /// Present fields obey the same constraints as on create; a name or
    /// brand can be replaced but never cleared.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut violations = Vec::new();
        if let Some(ref name) = self.name {
            check_text("name", name, NAME_MAX_CHARS, &mut violations);
        }
        if let Some(ref brand) = self.brand {
            check_text("brand", brand, BRAND_MAX_CHARS, &mut violations);
        }
        finish(violations)
    }

    /// Overlay `other` on top of `self`: fields present in `other` win.
    pub fn merged_with(self, other: Self) -> Self {
        Self {
            name: other.name.or(self.name),
            brand: other.brand.or(self.brand),
            state: other.state.or(self.state),
        }
    }
}

impl From<UpdateDeviceRequest> for DeviceChanges {
    fn from(req: UpdateDeviceRequest) -> Self {
        Self {
            name: req.name,
            brand: req.brand,
            state: req.state,
        }
    }
}
