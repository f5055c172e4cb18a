pub mod account_source;
pub mod config;
pub mod countdown;
pub mod error;
pub mod events;
pub mod ledger_api;
