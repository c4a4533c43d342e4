// ── Lifecycle policy ──
//
// Pure decision logic: given the state a device is in right now and what
// a caller wants to change, say yes or no. No store, no clock, no I/O.

use std::fmt;

use crate::model::{DeviceChanges, DeviceState, RestrictedField};

/// Why the policy refused a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// `name` / `brand` assignments on a device that is in use.
    RestrictedFieldWhileInUse { fields: Vec<RestrictedField> },
    /// Removal of a device that is in use.
    DeleteWhileInUse,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RestrictedFieldWhileInUse { fields } => {
                let names: Vec<String> = fields.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "cannot update brand or name for devices in use (attempted: {})",
                    names.join(", ")
                )
            }
            Self::DeleteWhileInUse => f.write_str("cannot delete devices in use"),
        }
    }
}

/// Outcome of a policy check.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Decision {
    Allowed,
    Denied(Denial),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Convert into a `Result`, keeping the denial reason.
    pub fn into_result(self) -> Result<(), Denial> {
        match self {
            Self::Allowed => Ok(()),
            Self::Denied(denial) => Err(denial),
        }
    }
}

/// The rules that tie field mutability to lifecycle state.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecyclePolicy;

#[allow(clippy::unused_self)]
impl LifecyclePolicy {
    pub fn new() -> Self {
        Self
    }

    /// Decide whether `changes` may be applied to a device in `current`.
    ///
    /// While in use, any assignment to `name` or `brand` is refused, even
    /// one that repeats the stored value. `state` is always free to move.
    pub fn authorize(self, current: DeviceState, changes: &DeviceChanges) -> Decision {
        if !current.is_in_use() {
            return Decision::Allowed;
        }
        let fields = changes.restricted_fields();
        if fields.is_empty() {
            Decision::Allowed
        } else {
            Decision::Denied(Denial::RestrictedFieldWhileInUse { fields })
        }
    }

    /// Decide whether a device in `current` may be removed.
    pub fn authorize_delete(self, current: DeviceState) -> Decision {
        if current.is_in_use() {
            Decision::Denied(Denial::DeleteWhileInUse)
        } else {
            Decision::Allowed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn name_change() -> DeviceChanges {
        DeviceChanges {
            name: Some("Galaxy S23".into()),
            ..DeviceChanges::default()
        }
    }

    fn brand_change() -> DeviceChanges {
        DeviceChanges {
            brand: Some("Samsung".into()),
            ..DeviceChanges::default()
        }
    }

    fn state_change(to: DeviceState) -> DeviceChanges {
        DeviceChanges {
            state: Some(to),
            ..DeviceChanges::default()
        }
    }

    #[test]
    fn in_use_locks_name_and_brand() {
        let policy = LifecyclePolicy::new();
        assert_eq!(
            policy.authorize(DeviceState::InUse, &name_change()),
            Decision::Denied(Denial::RestrictedFieldWhileInUse {
                fields: vec![RestrictedField::Name]
            })
        );
        assert_eq!(
            policy.authorize(DeviceState::InUse, &brand_change()),
            Decision::Denied(Denial::RestrictedFieldWhileInUse {
                fields: vec![RestrictedField::Brand]
            })
        );
    }

    #[test]
    fn in_use_denies_whole_change_set_when_mixed_with_state() {
        let changes = DeviceChanges {
            brand: Some("Apple".into()),
            state: Some(DeviceState::Available),
            ..DeviceChanges::default()
        };
        assert!(
            !LifecyclePolicy::new()
                .authorize(DeviceState::InUse, &changes)
                .is_allowed()
        );
    }

    #[test]
    fn state_is_free_to_move_from_any_state() {
        let policy = LifecyclePolicy::new();
        for from in DeviceState::iter() {
            for to in DeviceState::iter() {
                assert!(
                    policy.authorize(from, &state_change(to)).is_allowed(),
                    "{from} -> {to} should be allowed"
                );
            }
        }
    }

    #[test]
    fn other_states_accept_any_change() {
        let policy = LifecyclePolicy::new();
        let everything = DeviceChanges {
            name: Some("n".into()),
            brand: Some("b".into()),
            state: Some(DeviceState::InUse),
        };
        for state in [DeviceState::Available, DeviceState::Inactive] {
            assert!(policy.authorize(state, &everything).is_allowed());
        }
    }

    #[test]
    fn empty_change_set_is_always_allowed() {
        let policy = LifecyclePolicy::new();
        for state in DeviceState::iter() {
            assert!(policy.authorize(state, &DeviceChanges::default()).is_allowed());
        }
    }

    #[test]
    fn delete_is_refused_only_while_in_use() {
        let policy = LifecyclePolicy::new();
        assert_eq!(
            policy.authorize_delete(DeviceState::InUse),
            Decision::Denied(Denial::DeleteWhileInUse)
        );
        assert!(policy.authorize_delete(DeviceState::Available).is_allowed());
        assert!(policy.authorize_delete(DeviceState::Inactive).is_allowed());
    }

    #[test]
    fn denial_messages_name_the_rule() {
        let denial = Denial::RestrictedFieldWhileInUse {
            fields: vec![RestrictedField::Name, RestrictedField::Brand],
        };
        assert_eq!(
            denial.to_string(),
            "cannot update brand or name for devices in use (attempted: name, brand)"
        );
        assert_eq!(
            Denial::DeleteWhileInUse.to_string(),
            "cannot delete devices in use"
        );
    }

    #[test]
    fn into_result_keeps_reason() {
        assert!(Decision::Allowed.into_result().is_ok());
        assert_eq!(
            Decision::Denied(Denial::DeleteWhileInUse).into_result(),
            Err(Denial::DeleteWhileInUse)
        );
    }
}
