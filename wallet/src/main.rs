use std::sync::Arc;
use std::time::Duration;

use ajo_common::{
    address::Address,
    config::{COIN_SYMBOL, VERSION},
    prompt,
    timelock::LockStatus,
    tokio::{select, sync::broadcast},
    utils::format_coin,
};
use ajo_wallet::{
    account_source::AccountStateSource,
    config::Config,
    countdown::CountdownEngine,
    events::Event,
    ledger_api::LedgerClient,
};
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    prompt::init_logger(config.log.log_level, config.log.disable_log_color)
        .context("Failed to initialize logger")?;

    info!("Ajo PiggyBank v{}", VERSION);

    // One-shot configuration check: errors disable contract features,
    // they never abort startup
    let report = config.validate();
    for warning in &report.warnings {
        warn!("Configuration warning: {}", warning);
    }
    for err in &report.errors {
        error!("Configuration error: {}", err);
    }
    if !report.is_valid() {
        warn!("Running in degraded mode, contract features are disabled");
    }

    if config.network.offline_mode {
        info!("Offline mode enabled, no ledger connection will be made");
        return Ok(());
    }

    let api = Arc::new(
        LedgerClient::new(&config.network.ledger_address)
            .context("Failed to create ledger client")?,
    );
    let source = AccountStateSource::new(api, Duration::from_secs(config.network.refresh_interval));

    match config.account.as_deref() {
        Some(account) => {
            let address: Address = account
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid --account value: {}", e))?;
            info!("Watching account {}", address.shorten());
            source.set_account(Some(address)).await;
        }
        None => warn!("No account connected, balance will show as unavailable"),
    }

    source.start().await?;

    let engine = CountdownEngine::start(source.read().await.map(|s| s.unlock_time).unwrap_or(0));

    let mut events = source.subscribe();
    let mut countdown = engine.subscribe();

    loop {
        select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            },
            event = events.recv() => match event {
                Ok(Event::SnapshotUpdated { snapshot }) => {
                    info!("Balance: {} {}", format_coin(snapshot.balance), COIN_SYMBOL);
                    engine.set_unlock_time(snapshot.unlock_time);
                },
                Ok(Event::ReadFailed { message }) => {
                    debug!("Ledger read failed: {}", message);
                },
                Ok(Event::Online) => info!("Ledger connection is online"),
                Ok(Event::Offline) => warn!("Ledger connection lost, showing last known state"),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("Event stream lagged, {} events skipped", skipped);
                },
                Err(broadcast::error::RecvError::Closed) => break,
            },
            res = countdown.changed() => {
                if res.is_err() {
                    break;
                }
                let state = *countdown.borrow_and_update();
                match state.status {
                    LockStatus::NoLock => info!("No active time lock"),
                    LockStatus::Unlocked => info!("Unlocked - ready to withdraw!"),
                    LockStatus::Locked => {
                        if let Some(remaining) = state.remaining {
                            info!("Locked, {} until unlock", remaining);
                        }
                    },
                }
            }
        }
    }

    engine.stop().await;
    source.stop().await?;

    Ok(())
}
