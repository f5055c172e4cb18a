use crate::{address::Address, time::TimestampSeconds};
use serde::{Deserialize, Serialize};

// Wire types for the narrow read contract exposed by the ledger collaborator.
// The core depends only on these, not on transaction-construction details.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAccountStateParams {
    pub address: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAccountStateResult {
    /// Balance held in the savings contract, smallest unit
    pub balance: u64,
    /// Unix timestamp in seconds, zero when no lock is configured
    #[serde(default)]
    pub unlock_time: TimestampSeconds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetVersionResult {
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_unlock_time_defaults_to_zero() {
        // A ledger without any lock configured may omit the field entirely
        let result: GetAccountStateResult = serde_json::from_str(r#"{"balance": 42}"#).unwrap();
        assert_eq!(result.balance, 42);
        assert_eq!(result.unlock_time, 0);
    }
}
