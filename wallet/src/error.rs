use ajo_common::tokio::task::JoinError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("account state source is already running")]
    AlreadyRunning,
    #[error(transparent)]
    TaskError(#[from] JoinError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
