//! Representative — an account that votes on behalf of delegators for consensus.

use bln_types::Account;
use serde::{Deserialize, Serialize};

/// A consensus representative.
///
/// Unlike governance delegation (one-person-one-vote), consensus weight is
/// proportional to delegated account balance (Nano-style ORV).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Representative {
    pub address: Account,
    /// Total weight delegated to this representative.
    pub delegated_weight: u128,
    /// Whether this representative is considered "online" (responsive).
    pub online: bool,
}
