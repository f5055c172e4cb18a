pub mod account;
pub mod address;
pub mod api;
pub mod config;
pub mod prompt;
pub mod time;
pub mod timelock;
pub mod utils;

pub mod tokio;
