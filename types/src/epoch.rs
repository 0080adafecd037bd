//! Epoch tiers — sequential protocol-rule upgrades applied per account.
//!
//! An epoch upgrade is a state block with unchanged balance whose `link`
//! matches a registered sentinel value, signed by that epoch's designated
//! signer key rather than the account holder. Epoch tiers are strictly
//! ordered; an account may only advance one tier at a time.

use serde::{Deserialize, Serialize};

/// A protocol-rule tier. `Epoch0` is the original, pre-upgrade ruleset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Epoch {
    #[default]
    Epoch0,
    Epoch1,
    Epoch2,
}

impl Epoch {
    /// All tiers in ascending order.
    pub const ALL: [Epoch; 3] = [Epoch::Epoch0, Epoch::Epoch1, Epoch::Epoch2];

    /// The tier immediately following this one, if any.
    pub fn next(self) -> Option<Epoch> {
        match self {
            Epoch::Epoch0 => Some(Epoch::Epoch1),
            Epoch::Epoch1 => Some(Epoch::Epoch2),
            Epoch::Epoch2 => None,
        }
    }

    /// Whether `to` is the tier immediately following `self`.
    pub fn is_sequential_to(self, to: Epoch) -> bool {
        self.next() == Some(to)
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Epoch::Epoch0 => 0,
            Epoch::Epoch1 => 1,
            Epoch::Epoch2 => 2,
        }
    }
}

impl std::fmt::Display for Epoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "epoch_{}", self.as_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_upgrades_only() {
        assert!(Epoch::Epoch0.is_sequential_to(Epoch::Epoch1));
        assert!(Epoch::Epoch1.is_sequential_to(Epoch::Epoch2));
        assert!(!Epoch::Epoch0.is_sequential_to(Epoch::Epoch2));
        assert!(!Epoch::Epoch1.is_sequential_to(Epoch::Epoch0));
    }

    #[test]
    fn epoch2_is_terminal() {
        assert_eq!(Epoch::Epoch2.next(), None);
    }

    #[test]
    fn ordering_matches_tier() {
        assert!(Epoch::Epoch0 < Epoch::Epoch1);
        assert!(Epoch::Epoch1 < Epoch::Epoch2);
    }
}
