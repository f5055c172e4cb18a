use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ajo_common::{
    address::Address,
    api::ledger::GetAccountStateResult,
    tokio::{
        sync::{broadcast, oneshot, Mutex},
        time::{sleep, timeout},
    },
};
use ajo_wallet::{account_source::AccountStateSource, events::Event, ledger_api::LedgerApi};
use anyhow::{anyhow, Result};
use async_trait::async_trait;

fn test_address() -> Address {
    "0x1234567890abcdef1234567890abcdef12345678"
        .parse()
        .unwrap()
}

async fn next_event(rx: &mut broadcast::Receiver<Event>) -> Event {
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("no event within one second")
        .expect("event channel closed")
}

/// Ledger that replays a scripted sequence of read outcomes
struct ScriptedLedger {
    script: Mutex<VecDeque<Result<GetAccountStateResult, String>>>,
}

impl ScriptedLedger {
    fn new(script: Vec<Result<GetAccountStateResult, String>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
        })
    }
}

#[async_trait]
impl LedgerApi for ScriptedLedger {
    async fn get_version(&self) -> Result<String> {
        Ok("scripted".to_owned())
    }

    async fn get_account_state(&self, _address: &Address) -> Result<GetAccountStateResult> {
        let outcome = self
            .script
            .lock()
            .await
            .pop_front()
            .expect("script exhausted");
        outcome.map_err(|message| anyhow!(message))
    }
}

/// Ledger whose reads stay pending until the test releases them,
/// to control completion order explicitly
#[derive(Default)]
struct BlockingLedger {
    pending: Mutex<Vec<oneshot::Sender<GetAccountStateResult>>>,
}

impl BlockingLedger {
    async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    async fn release(&self, index: usize, result: GetAccountStateResult) {
        let tx = self.pending.lock().await.remove(index);
        tx.send(result).expect("read was no longer awaited");
    }
}

#[async_trait]
impl LedgerApi for BlockingLedger {
    async fn get_version(&self) -> Result<String> {
        Ok("blocking".to_owned())
    }

    async fn get_account_state(&self, _address: &Address) -> Result<GetAccountStateResult> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.push(tx);
        rx.await.map_err(|_| anyhow!("ledger went away"))
    }
}

/// Ledger returning an incrementing balance on every read
#[derive(Default)]
struct CountingLedger {
    reads: AtomicU64,
}

#[async_trait]
impl LedgerApi for CountingLedger {
    async fn get_version(&self) -> Result<String> {
        Ok("counting".to_owned())
    }

    async fn get_account_state(&self, _address: &Address) -> Result<GetAccountStateResult> {
        let reads = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(GetAccountStateResult {
            balance: reads,
            unlock_time: 0,
        })
    }
}

fn state(balance: u64, unlock_time: u64) -> GetAccountStateResult {
    GetAccountStateResult {
        balance,
        unlock_time,
    }
}

#[tokio::test]
async fn test_failed_read_keeps_last_good_snapshot() {
    let ledger = ScriptedLedger::new(vec![
        Ok(state(100, 5000)),
        Err("connection reset".to_owned()),
    ]);
    let source = AccountStateSource::new(ledger, Duration::from_secs(60));
    source.set_account(Some(test_address())).await;
    let mut events = source.subscribe();

    source.refresh_now().await;
    assert_eq!(next_event(&mut events).await, Event::Online);
    let updated = next_event(&mut events).await;
    assert!(matches!(updated, Event::SnapshotUpdated { snapshot } if snapshot.balance == 100));

    // The failure is reported on the side channel but the cached snapshot
    // stays visible
    source.refresh_now().await;
    assert_eq!(next_event(&mut events).await, Event::Offline);
    assert!(matches!(
        next_event(&mut events).await,
        Event::ReadFailed { .. }
    ));

    let snapshot = source.read().await.expect("snapshot was cleared");
    assert_eq!(snapshot.balance, 100);
    assert_eq!(snapshot.unlock_time, 5000);
    assert!(!source.is_online());
}

#[tokio::test]
async fn test_refresh_after_action_acknowledgment() {
    let ledger = ScriptedLedger::new(vec![Ok(state(100, 5000)), Ok(state(250, 8000))]);
    let source = AccountStateSource::new(ledger, Duration::from_secs(60));
    source.set_account(Some(test_address())).await;

    source.refresh_now().await;
    assert_eq!(source.read().await.unwrap().balance, 100);

    // A deposit was acknowledged: the displayed state converges without
    // waiting for the next scheduled tick
    source.refresh_now().await;
    let snapshot = source.read().await.unwrap();
    assert_eq!(snapshot.balance, 250);
    assert_eq!(snapshot.unlock_time, 8000);
}

#[tokio::test]
async fn test_later_initiated_read_wins_over_straggler() {
    let ledger = Arc::new(BlockingLedger::default());
    let source = AccountStateSource::new(ledger.clone(), Duration::from_secs(60));
    source.set_account(Some(test_address())).await;

    let first = {
        let source = source.clone();
        tokio::spawn(async move { source.refresh_now().await })
    };
    wait_for_pending(&ledger, 1).await;

    let second = {
        let source = source.clone();
        tokio::spawn(async move { source.refresh_now().await })
    };
    wait_for_pending(&ledger, 2).await;

    // The second read completes first and must win
    ledger.release(1, state(250, 8000)).await;
    second.await.unwrap();
    assert_eq!(source.read().await.unwrap().balance, 250);

    // The straggler from the first read must not overwrite it
    ledger.release(0, state(100, 5000)).await;
    first.await.unwrap();
    assert_eq!(source.read().await.unwrap().balance, 250);
}

#[tokio::test]
async fn test_background_polling_and_teardown() {
    let ledger = Arc::new(CountingLedger::default());
    let source = AccountStateSource::new(ledger.clone(), Duration::from_millis(50));
    source.set_account(Some(test_address())).await;

    source.start().await.unwrap();
    timeout(Duration::from_secs(2), async {
        loop {
            if let Some(snapshot) = source.read().await {
                if snapshot.balance >= 2 {
                    break;
                }
            }
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("background refresh never ran");

    source.stop().await.unwrap();
    assert!(!source.is_running().await);

    // No read may complete after teardown
    let settled = source.read().await.unwrap().balance;
    sleep(Duration::from_millis(200)).await;
    assert_eq!(source.read().await.unwrap().balance, settled);
}

async fn wait_for_pending(ledger: &Arc<BlockingLedger>, count: usize) {
    timeout(Duration::from_secs(1), async {
        while ledger.pending_count().await < count {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("ledger read was never initiated");
}
