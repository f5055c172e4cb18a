use crate::time::TimestampSeconds;
use serde::{Deserialize, Serialize};

/// One immutable observation of the savings contract state for an account
///
/// Each refresh produces a fresh value, a snapshot is never mutated in place.
/// `unlock_time` of zero means the contract has no lock configured for this
/// account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Balance in the smallest unit
    pub balance: u64,
    /// Unix timestamp in seconds after which withdrawal is permitted
    pub unlock_time: TimestampSeconds,
    /// When the read producing this snapshot completed
    pub observed_at: TimestampSeconds,
}

impl LedgerSnapshot {
    pub fn has_lock(&self) -> bool {
        self.unlock_time > 0
    }
}
