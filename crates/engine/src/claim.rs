//! Atomic claim of a rate-limited notification slot.
//!
//! Both state machines follow the same shape: read the last-sent timestamp,
//! check it against a window, and record `now` before dispatching. The
//! write is a compare-and-set against the value that was read, so of two
//! concurrent callers that both saw a stale timestamp only one wins.

use std::time::Duration;

use millguard_core::types::Timestamp;
use millguard_db::{StateKey, StateStore, StoreError};

#[derive(Debug)]
pub(crate) enum Claim {
    /// `now` was recorded; the caller owns this notification.
    Won,
    /// The window had elapsed but another caller recorded first.
    LostRace,
    /// The window is still open.
    Closed { last: Timestamp },
    /// The store could not be read or written.
    StoreUnavailable(StoreError),
}

/// Try to claim the slot under `key`. `window_open` decides, from the last
/// recorded timestamp, whether a new notification is allowed at `now`.
///
/// A value that does not decode as a timestamp never heals on its own, so it
/// is overwritten with `now` and the claim is won.
pub(crate) async fn claim_slot(
    store: &dyn StateStore,
    key: &StateKey,
    now: Timestamp,
    window: Duration,
    window_open: fn(Option<Timestamp>, Timestamp, Duration) -> bool,
) -> Claim {
    let last = match store.get(key).await {
        Ok(last) => last,
        Err(StoreError::Codec { value, .. }) => {
            tracing::error!(
                key = %key,
                value = %value,
                "Corrupt timestamp in state store, overwriting"
            );
            return match store.put(key, now).await {
                Ok(()) => Claim::Won,
                Err(e) => Claim::StoreUnavailable(e),
            };
        }
        Err(e) => return Claim::StoreUnavailable(e),
    };

    if !window_open(last, now, window) {
        if let Some(last) = last {
            return Claim::Closed { last };
        }
    }

    match store.compare_and_set(key, last, now).await {
        Ok(true) => Claim::Won,
        Ok(false) => Claim::LostRace,
        Err(e) => Claim::StoreUnavailable(e),
    }
}
