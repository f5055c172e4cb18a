use ajo_common::{
    address::Address,
    config::{validate_startup_config, ValidationReport, DEFAULT_LEDGER_ADDRESS, REFRESH_INTERVAL, VERSION},
    prompt::LogLevel,
};
use clap::Parser;
use serde::{Deserialize, Serialize};

// Functions Helpers
fn default_ledger_address() -> String {
    DEFAULT_LEDGER_ADDRESS.to_owned()
}

fn default_refresh_interval() -> u64 {
    REFRESH_INTERVAL
}

#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Ledger RPC address to read account state from
    #[clap(long, default_value_t = String::from(DEFAULT_LEDGER_ADDRESS))]
    #[serde(default = "default_ledger_address")]
    pub ledger_address: String,
    /// Disable online mode
    #[clap(long)]
    #[serde(default)]
    pub offline_mode: bool,
    /// Seconds between two background ledger reads
    #[clap(long, default_value_t = REFRESH_INTERVAL)]
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
}

#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct ContractConfig {
    /// PiggyBank contract address ("0x" followed by 40 hex characters)
    #[clap(long)]
    pub contract_address: Option<String>,
    /// Project identifier for the wallet-connection collaborator
    #[clap(long)]
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct LogConfig {
    /// Set log level
    #[clap(long, value_enum, default_value_t)]
    #[serde(default)]
    pub log_level: LogLevel,
    /// Disable the usage of colors in log
    #[clap(long)]
    #[serde(default)]
    pub disable_log_color: bool,
}

#[derive(Parser, Serialize, Deserialize, Clone)]
#[clap(
    version = VERSION,
    about = "Ajo PiggyBank - watch your time-locked savings from the command line"
)]
pub struct Config {
    /// Network Configuration
    #[clap(flatten)]
    pub network: NetworkConfig,
    /// Contract configuration
    #[clap(flatten)]
    pub contract: ContractConfig,
    /// Log configuration
    #[clap(flatten)]
    pub log: LogConfig,
    /// Account address to watch, as supplied by the wallet connection
    #[clap(long)]
    pub account: Option<String>,
}

impl Config {
    /// Run the one-shot startup validation
    ///
    /// The report is logged by the caller and never aborts startup: a
    /// misconfigured contract address only disables contract features.
    pub fn validate(&self) -> ValidationReport {
        validate_startup_config(
            self.contract.project_id.as_deref(),
            self.contract.contract_address.as_deref(),
        )
    }

    /// Contract address, if one is configured and well-formed
    pub fn contract_address(&self) -> Option<Address> {
        self.contract
            .contract_address
            .as_deref()
            .and_then(|candidate| candidate.parse().ok())
    }
}
