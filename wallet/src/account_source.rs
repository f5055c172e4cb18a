use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

use ajo_common::{
    account::LedgerSnapshot,
    address::Address,
    time::get_current_time_in_seconds,
    tokio::{
        spawn_task,
        sync::{broadcast, Mutex, RwLock},
        task::JoinHandle,
        time::{interval, MissedTickBehavior},
    },
};
use log::{debug, trace, warn};

use crate::{error::WalletError, events::Event, ledger_api::LedgerApi};

// AccountStateSource must be behind a Arc to be accessed from the consuming
// view (to stop it) or from its own refresh task
pub type SharedAccountStateSource = Arc<AccountStateSource>;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Latest known ledger snapshot for the connected account
///
/// A background task re-reads the ledger on a fixed interval, an explicit
/// `refresh_now` covers the "state-changing action acknowledged" path. The
/// cache follows the stale-but-available policy: a failed read never clears
/// the previously known snapshot, it only emits a diagnostic event.
pub struct AccountStateSource {
    // api to communicate with the ledger
    // It is behind a Arc to be shared with custom services
    api: Arc<dyn LedgerApi>,
    refresh_interval: Duration,
    // account under observation, absent when no wallet is connected
    address: RwLock<Option<Address>>,
    // last good snapshot, None until a first read completed
    cache: RwLock<Option<LedgerSnapshot>>,
    // generation handed to each initiated read
    generation: AtomicU64,
    // generation of the last applied completion, completions below it are stale
    last_applied: AtomicU64,
    online: AtomicBool,
    // tokio task
    task: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<Event>,
}

impl AccountStateSource {
    pub fn new(api: Arc<dyn LedgerApi>, refresh_interval: Duration) -> SharedAccountStateSource {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            api,
            refresh_interval,
            address: RwLock::new(None),
            cache: RwLock::new(None),
            generation: AtomicU64::new(0),
            last_applied: AtomicU64::new(0),
            online: AtomicBool::new(false),
            task: Mutex::new(None),
            events,
        })
    }

    /// Subscribe to diagnostic events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Retrieve the ledger API used
    pub fn get_api(&self) -> &Arc<dyn LedgerApi> {
        &self.api
    }

    /// Update the observed account, as supplied by the wallet-connection
    /// collaborator
    ///
    /// `None` means no wallet is connected: reads are skipped and `read`
    /// degrades to its unavailable state.
    pub async fn set_account(&self, address: Option<Address>) {
        let mut current = self.address.write().await;
        if *current == address {
            return;
        }

        debug!("Switching observed account to {:?}", address);
        *current = address;

        // Snapshots of the previous account must not survive the switch,
        // and its in-flight reads must not land either
        let mut cache = self.cache.write().await;
        *cache = None;
        self.last_applied
            .store(self.generation.load(Ordering::SeqCst), Ordering::SeqCst);
    }

    /// Latest known snapshot, None when no read ever completed
    pub async fn read(&self) -> Option<LedgerSnapshot> {
        *self.cache.read().await
    }

    /// Whether the last read completed successfully
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    // check if the refresh task is running (that we have a task and its not finished)
    pub async fn is_running(&self) -> bool {
        let task = self.task.lock().await;
        task.as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Start the background refresh task
    pub async fn start(self: &Arc<Self>) -> Result<(), WalletError> {
        trace!("Starting account state source");

        if self.is_running().await {
            return Err(WalletError::AlreadyRunning);
        }

        // Connectivity probe, not fatal: the refresh loop retries on its own
        match self.api.get_version().await {
            Ok(version) => debug!("Connected to ledger running version {}", version),
            Err(e) => warn!("Ledger is not reachable yet: {:#}", e),
        }

        let zelf = Arc::clone(self);
        *self.task.lock().await = Some(spawn_task("account-state-source", async move {
            let mut ticker = interval(zelf.refresh_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                zelf.refresh_once().await;
            }
        }));

        Ok(())
    }

    /// Stop the background refresh task
    ///
    /// Deterministic teardown: once this returns, no read completion can
    /// mutate the cache anymore.
    pub async fn stop(&self) -> Result<(), WalletError> {
        trace!("Stopping account state source");
        if let Some(handle) = self.task.lock().await.take() {
            if handle.is_finished() {
                debug!("Account state source task is already finished");
                handle.await?;
            } else {
                handle.abort();
            }
        }

        Ok(())
    }

    /// Force an immediate re-read, to be called once a deposit or withdraw
    /// has been acknowledged by the ledger
    pub async fn refresh_now(&self) {
        trace!("refresh_now");
        self.refresh_once().await;
    }

    async fn refresh_once(&self) {
        let address = match *self.address.read().await {
            Some(address) => address,
            None => {
                trace!("No account connected, skipping ledger read");
                return;
            }
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        match self.api.get_account_state(&address).await {
            Ok(result) => {
                let snapshot = LedgerSnapshot {
                    balance: result.balance,
                    unlock_time: result.unlock_time,
                    observed_at: get_current_time_in_seconds(),
                };
                self.apply(generation, snapshot).await;
            }
            Err(e) => {
                warn!("Ledger read failed, keeping last known snapshot: {:#}", e);
                if self.online.swap(false, Ordering::SeqCst) {
                    self.propagate_event(Event::Offline);
                }
                self.propagate_event(Event::ReadFailed {
                    message: e.to_string(),
                });
            }
        }
    }

    // Apply a read completion unless a later-initiated read already landed
    async fn apply(&self, generation: u64, snapshot: LedgerSnapshot) {
        let mut cache = self.cache.write().await;
        if self.last_applied.load(Ordering::SeqCst) >= generation {
            debug!("Discarding superseded ledger read (generation {})", generation);
            return;
        }

        self.last_applied.store(generation, Ordering::SeqCst);
        *cache = Some(snapshot);
        drop(cache);

        if !self.online.swap(true, Ordering::SeqCst) {
            self.propagate_event(Event::Online);
        }
        self.propagate_event(Event::SnapshotUpdated { snapshot });
    }

    fn propagate_event(&self, event: Event) {
        trace!("Propagating event: {:?}", event);
        // No receiver is fine, events are a diagnostic side channel only
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ajo_common::api::ledger::GetAccountStateResult;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    struct StaticLedger {
        balance: u64,
        unlock_time: u64,
    }

    #[async_trait]
    impl LedgerApi for StaticLedger {
        async fn get_version(&self) -> Result<String> {
            Ok("test".to_owned())
        }

        async fn get_account_state(&self, _address: &Address) -> Result<GetAccountStateResult> {
            Ok(GetAccountStateResult {
                balance: self.balance,
                unlock_time: self.unlock_time,
            })
        }
    }

    struct FailingLedger;

    #[async_trait]
    impl LedgerApi for FailingLedger {
        async fn get_version(&self) -> Result<String> {
            Err(anyhow!("connection refused"))
        }

        async fn get_account_state(&self, _address: &Address) -> Result<GetAccountStateResult> {
            Err(anyhow!("connection refused"))
        }
    }

    fn test_address() -> Address {
        "0x1234567890abcdef1234567890abcdef12345678"
            .parse()
            .unwrap()
    }

    fn snapshot(balance: u64) -> LedgerSnapshot {
        LedgerSnapshot {
            balance,
            unlock_time: 0,
            observed_at: 1,
        }
    }

    #[tokio::test]
    async fn test_no_account_means_no_data() {
        let source = AccountStateSource::new(
            Arc::new(StaticLedger {
                balance: 100,
                unlock_time: 0,
            }),
            Duration::from_secs(10),
        );

        source.refresh_now().await;
        assert_eq!(source.read().await, None);
    }

    #[tokio::test]
    async fn test_refresh_populates_cache() {
        let source = AccountStateSource::new(
            Arc::new(StaticLedger {
                balance: 100,
                unlock_time: 5000,
            }),
            Duration::from_secs(10),
        );
        source.set_account(Some(test_address())).await;

        source.refresh_now().await;
        let snapshot = source.read().await.unwrap();
        assert_eq!(snapshot.balance, 100);
        assert_eq!(snapshot.unlock_time, 5000);
        assert!(source.is_online());
    }

    #[tokio::test]
    async fn test_superseded_completion_is_discarded() {
        let source = AccountStateSource::new(Arc::new(FailingLedger), Duration::from_secs(10));
        source.set_account(Some(test_address())).await;

        // Completion order differs from initiation order: the read of
        // generation 2 lands first, the straggler of generation 1 after
        source.apply(2, snapshot(200)).await;
        source.apply(1, snapshot(100)).await;

        assert_eq!(source.read().await.unwrap().balance, 200);
    }

    #[tokio::test]
    async fn test_account_switch_clears_cache_and_pending_reads() {
        let source = AccountStateSource::new(
            Arc::new(StaticLedger {
                balance: 100,
                unlock_time: 0,
            }),
            Duration::from_secs(10),
        );
        source.set_account(Some(test_address())).await;
        source.refresh_now().await;
        assert!(source.read().await.is_some());

        let other = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd"
            .parse()
            .unwrap();
        source.set_account(Some(other)).await;
        assert_eq!(source.read().await, None);

        // A straggler initiated before the switch must not land
        source.apply(1, snapshot(100)).await;
        assert_eq!(source.read().await, None);
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let source = AccountStateSource::new(
            Arc::new(StaticLedger {
                balance: 0,
                unlock_time: 0,
            }),
            Duration::from_secs(10),
        );

        source.start().await.unwrap();
        assert!(matches!(
            source.start().await,
            Err(WalletError::AlreadyRunning)
        ));
        source.stop().await.unwrap();
        assert!(!source.is_running().await);
    }
}
