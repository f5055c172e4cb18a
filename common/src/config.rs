use crate::address::{Address, AddressError};
use serde::{Deserialize, Serialize};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Smallest-unit denomination of the savings asset
pub const COIN_DECIMALS: u8 = 18;
pub const COIN_VALUE: u64 = 10u64.pow(COIN_DECIMALS as u32);
pub const COIN_SYMBOL: &str = "ETH";

// Ledger address by default when no specified
pub const DEFAULT_LEDGER_ADDRESS: &str = "http://127.0.0.1:8545";
// Interval in seconds between two background ledger reads
pub const REFRESH_INTERVAL: u64 = 10;
// Countdown recomputation period in seconds
pub const COUNTDOWN_TICK_INTERVAL: u64 = 1;
// Timeout in seconds for a single ledger RPC call
pub const LEDGER_REQUEST_TIMEOUT: u64 = 10;
// Minimum plausible length for a wallet-connection project identifier
pub const MIN_PROJECT_ID_LENGTH: usize = 32;

/// Result of the one-shot startup configuration check
///
/// Errors disable the related feature, warnings are informative only.
/// Neither ever aborts the process: the core keeps running in a degraded
/// mode on a misconfigured contract address or project id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Validate the startup configuration once
///
/// - missing project id is an error (wallet connection cannot work at all),
///   a suspiciously short one only a warning
/// - missing contract address is a warning (contract features are disabled
///   until one is configured), a malformed one an error carrying the exact
///   parse failure
pub fn validate_startup_config(
    project_id: Option<&str>,
    contract_address: Option<&str>,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    match project_id {
        None => report.errors.push(
            "--project-id is not set. Get one from your wallet-connection provider.".to_owned(),
        ),
        Some(id) if id.len() < MIN_PROJECT_ID_LENGTH => report
            .warnings
            .push("--project-id seems too short. Verify it is correct.".to_owned()),
        Some(_) => {}
    }

    match contract_address {
        None => report.warnings.push(
            "--contract-address is not set. Smart contract features will not work until you deploy and configure the contract address.".to_owned(),
        ),
        Some(candidate) => {
            if let Err(e) = candidate.parse::<Address>() {
                report.errors.push(format!("--contract-address is invalid: {}", e));
            }
        }
    }

    report
}

/// Validate a single candidate contract address
pub fn validate_contract_address(candidate: &str) -> Result<Address, AddressError> {
    candidate.parse()
}
