use std::time::Duration;

use ajo_common::{
    config::COUNTDOWN_TICK_INTERVAL,
    time::{get_current_time_in_seconds, TimestampSeconds},
    timelock::{self, CountdownState},
    tokio::{
        select, spawn_task,
        sync::{watch, Mutex},
        task::JoinHandle,
        time::{interval_at, Instant, MissedTickBehavior},
    },
};
use log::{debug, trace};

/// Tick-driven countdown over a single unlock timestamp
///
/// The engine owns the `(status, remaining)` pair and recomputes it once per
/// second while the lock is active. Consumers either poll `current` or
/// subscribe to the watch channel. Ticking is suspended while there is
/// nothing to count down (unlocked or no lock) and resumes as soon as a
/// fresh unlock timestamp arrives.
pub struct CountdownEngine {
    unlock_tx: watch::Sender<TimestampSeconds>,
    state_rx: watch::Receiver<CountdownState>,
    // tokio task
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CountdownEngine {
    /// Start the engine from the last known unlock timestamp (zero when none)
    ///
    /// The initial state is derived synchronously, so `current` is consistent
    /// before the first tick.
    pub fn start(unlock_time: TimestampSeconds) -> Self {
        let (unlock_tx, unlock_rx) = watch::channel(unlock_time);
        let initial = timelock::derive(unlock_time, get_current_time_in_seconds());
        let (state_tx, state_rx) = watch::channel(initial);

        let task = spawn_task("countdown-engine", Self::run(unlock_rx, state_tx));

        Self {
            unlock_tx,
            state_rx,
            task: Mutex::new(Some(task)),
        }
    }

    /// Feed the unlock timestamp of the freshest snapshot
    ///
    /// A changed value triggers an immediate recomputation, the engine never
    /// keeps counting down from a stale timestamp.
    pub fn set_unlock_time(&self, unlock_time: TimestampSeconds) {
        trace!("set_unlock_time: {}", unlock_time);
        self.unlock_tx.send_if_modified(|current| {
            if *current == unlock_time {
                false
            } else {
                *current = unlock_time;
                true
            }
        });
    }

    /// Latest consistent countdown state
    pub fn current(&self) -> CountdownState {
        *self.state_rx.borrow()
    }

    /// Subscribe to countdown updates
    pub fn subscribe(&self) -> watch::Receiver<CountdownState> {
        self.state_rx.clone()
    }

    /// Stop ticking, no update is delivered after this returns
    pub async fn stop(&self) {
        trace!("Stopping countdown engine");
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
        }
    }

    async fn run(
        mut unlock_rx: watch::Receiver<TimestampSeconds>,
        state_tx: watch::Sender<CountdownState>,
    ) {
        let period = Duration::from_secs(COUNTDOWN_TICK_INTERVAL);
        // First recomputation happens right away in the loop body, so the
        // ticker only needs to fire from one period in
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let unlock_time = *unlock_rx.borrow_and_update();
            // Status and digits from a single observation of now
            let state = timelock::derive(unlock_time, get_current_time_in_seconds());
            // Subscribers are only woken on actual changes
            state_tx.send_if_modified(|current| {
                if *current == state {
                    false
                } else {
                    *current = state;
                    true
                }
            });

            if state.is_locked() {
                select! {
                    biased;
                    res = unlock_rx.changed() => {
                        if res.is_err() {
                            break;
                        }
                        ticker.reset();
                    },
                    _ = ticker.tick() => {}
                }
            } else {
                // Nothing left to count down, park until the unlock time changes
                debug!("Countdown suspended ({:?})", state.status);
                if unlock_rx.changed().await.is_err() {
                    break;
                }
                ticker.reset();
            }
        }
    }
}

impl Drop for CountdownEngine {
    fn drop(&mut self) {
        // Dropping the handle must cancel ticking as surely as stop does
        if let Ok(mut task) = self.task.try_lock() {
            if let Some(handle) = task.take() {
                handle.abort();
            }
        }
    }
}
