use crate::time::TimestampSeconds;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SECONDS_PER_MINUTE: u64 = 60;
pub const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
pub const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

/// Lock state derived purely from the unlock timestamp and a wall clock
/// observation
///
/// - `NoLock`: the contract has no lock configured (`unlock_time == 0`)
/// - `Locked`: the unlock timestamp is still in the future
/// - `Unlocked`: the unlock timestamp has been reached (`now >= unlock_time`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockStatus {
    NoLock,
    Locked,
    Unlocked,
}

/// Remaining time until unlock, broken down into display units
///
/// Invariant: `days * 86400 + hours * 3600 + minutes * 60 + seconds`
/// reconstructs the exact whole-second delta `unlock_time - now` it was
/// derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRemaining {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeRemaining {
    /// Reconstruct the total delta in seconds this breakdown represents
    pub fn total_seconds(&self) -> u64 {
        self.days
            .saturating_mul(SECONDS_PER_DAY)
            .saturating_add(self.hours.saturating_mul(SECONDS_PER_HOUR))
            .saturating_add(self.minutes.saturating_mul(SECONDS_PER_MINUTE))
            .saturating_add(self.seconds)
    }
}

impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// One consistent observation of the time lock
///
/// Both fields are always computed from the same observation of now, so a
/// consumer can never see `Unlocked` next to positive countdown digits.
/// `remaining` is `Some` only while the lock is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownState {
    pub status: LockStatus,
    pub remaining: Option<TimeRemaining>,
}

impl CountdownState {
    pub fn no_lock() -> Self {
        Self {
            status: LockStatus::NoLock,
            remaining: None,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.status == LockStatus::Unlocked
    }

    pub fn is_locked(&self) -> bool {
        self.status == LockStatus::Locked
    }
}

/// Derive the lock status and remaining time from a single observation of now
///
/// Pure and total over all `u64` inputs:
/// - `unlock_time == 0` means no lock is configured
/// - `now >= unlock_time` means the lock has expired, no digits are returned
/// - otherwise the whole-second delta is split into days/hours/minutes/seconds
///
/// Unix timestamps fit comfortably in 64 bits so no overflow is possible here.
pub fn derive(unlock_time: TimestampSeconds, now: TimestampSeconds) -> CountdownState {
    if unlock_time == 0 {
        return CountdownState::no_lock();
    }

    if now >= unlock_time {
        return CountdownState {
            status: LockStatus::Unlocked,
            remaining: None,
        };
    }

    let delta = unlock_time - now;
    let remaining = TimeRemaining {
        days: delta / SECONDS_PER_DAY,
        hours: (delta % SECONDS_PER_DAY) / SECONDS_PER_HOUR,
        minutes: (delta % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE,
        seconds: delta % SECONDS_PER_MINUTE,
    };

    CountdownState {
        status: LockStatus::Locked,
        remaining: Some(remaining),
    }
}
