//! Three-valued configuration toggles.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A per-stream toggle with an explicit "inherit the global default" state.
///
/// Serialized as an optional boolean: an absent key is `Unset`, which makes
/// "follow the global setting" a real, round-trippable state instead of a
/// null check. `Off` and `Unset` behave differently by construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tristate {
    #[default]
    Unset,
    On,
    Off,
}

impl Tristate {
    /// Collapse to a boolean, falling back to `default` when unset.
    pub fn resolve(self, default: bool) -> bool {
        match self {
            Tristate::Unset => default,
            Tristate::On => true,
            Tristate::Off => false,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Tristate::Unset)
    }

    pub fn as_option(self) -> Option<bool> {
        match self {
            Tristate::Unset => None,
            Tristate::On => Some(true),
            Tristate::Off => Some(false),
        }
    }
}

impl From<Option<bool>> for Tristate {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => Tristate::Unset,
            Some(true) => Tristate::On,
            Some(false) => Tristate::Off,
        }
    }
}

impl Serialize for Tristate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Tristate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<bool>::deserialize(deserializer).map(Tristate::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_unset_follows_default() {
        assert!(Tristate::Unset.resolve(true));
        assert!(!Tristate::Unset.resolve(false));
    }

    #[test]
    fn test_resolve_explicit_wins_over_default() {
        assert!(Tristate::On.resolve(false));
        assert!(!Tristate::Off.resolve(true));
    }

    #[test]
    fn test_off_and_unset_stay_distinct() {
        assert_ne!(Tristate::Off, Tristate::Unset);
        assert_ne!(Tristate::Off.resolve(true), Tristate::Unset.resolve(true));
    }

    #[test]
    fn test_option_round_trip() {
        for t in [Tristate::Unset, Tristate::On, Tristate::Off] {
            assert_eq!(Tristate::from(t.as_option()), t);
        }
    }
}
