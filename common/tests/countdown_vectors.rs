use ajo_common::timelock::{derive, LockStatus, TimeRemaining};

struct CountdownVector {
    name: &'static str,
    unlock_time: u64,
    now: u64,
    expected_status: LockStatus,
    expected_remaining: Option<TimeRemaining>,
}

#[test]
fn test_countdown_vectors() {
    let vectors = [
        CountdownVector {
            name: "one of each unit",
            unlock_time: 1000 + 90061,
            now: 1000,
            expected_status: LockStatus::Locked,
            expected_remaining: Some(TimeRemaining {
                days: 1,
                hours: 1,
                minutes: 1,
                seconds: 1,
            }),
        },
        CountdownVector {
            name: "unlock boundary",
            unlock_time: 1000,
            now: 1000,
            expected_status: LockStatus::Unlocked,
            expected_remaining: None,
        },
        CountdownVector {
            name: "no lock configured",
            unlock_time: 0,
            now: 1000,
            expected_status: LockStatus::NoLock,
            expected_remaining: None,
        },
        CountdownVector {
            name: "one second left",
            unlock_time: 1000,
            now: 999,
            expected_status: LockStatus::Locked,
            expected_remaining: Some(TimeRemaining {
                days: 0,
                hours: 0,
                minutes: 0,
                seconds: 1,
            }),
        },
        CountdownVector {
            name: "exactly one day",
            unlock_time: 86400 * 2,
            now: 86400,
            expected_status: LockStatus::Locked,
            expected_remaining: Some(TimeRemaining {
                days: 1,
                hours: 0,
                minutes: 0,
                seconds: 0,
            }),
        },
        CountdownVector {
            name: "long past unlock stays unlocked",
            unlock_time: 1000,
            now: u64::MAX,
            expected_status: LockStatus::Unlocked,
            expected_remaining: None,
        },
    ];

    for vector in vectors {
        let state = derive(vector.unlock_time, vector.now);
        assert_eq!(state.status, vector.expected_status, "{}", vector.name);
        assert_eq!(state.remaining, vector.expected_remaining, "{}", vector.name);
    }
}
