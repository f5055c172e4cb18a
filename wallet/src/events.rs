use ajo_common::account::LedgerSnapshot;

/// Diagnostics propagated by the account state source
///
/// `ReadFailed` is a side channel only: a failed read never clears the last
/// good snapshot, consumers keep displaying stale-but-available data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A fresh snapshot superseded the cached one
    SnapshotUpdated { snapshot: LedgerSnapshot },
    /// A ledger read did not complete successfully
    ReadFailed { message: String },
    /// First successful read after being offline
    Online,
    /// A read failure after being online
    Offline,
}
