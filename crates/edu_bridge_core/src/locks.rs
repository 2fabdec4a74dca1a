//! crates/edu_bridge_core/src/locks.rs
//!
//! Per-tutor exclusive guards serializing check-then-act sequences.
//!
//! Booking creation, availability creation, and rating recomputation each
//! read state and then write based on what they saw. Two concurrent calls
//! for the same tutor could both pass the read phase before either writes
//! (e.g. a double booking). Holding the tutor's guard across the whole
//! sequence removes the race. Contention is scoped per tutor, so no
//! cross-tutor lock exists.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

/// A registry of per-tutor async mutexes, created lazily on first use.
///
/// Entries are never evicted; the map is bounded by the number of tutors
/// that have seen a guarded write since startup.
#[derive(Default)]
pub struct TutorLocks {
    guards: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl TutorLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the exclusive guard for one tutor, waiting if another
    /// request for the same tutor holds it.
    pub async fn acquire(&self, tutor_id: Uuid) -> OwnedMutexGuard<()> {
        let guard = {
            let mut map = self.guards.lock().unwrap_or_else(PoisonError::into_inner);
            map.entry(tutor_id)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        guard.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_tutor_is_mutually_exclusive() {
        let locks = Arc::new(TutorLocks::new());
        let tutor = Uuid::new_v4();

        let held = locks.acquire(tutor).await;
        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.acquire(tutor).await;
            })
        };
        // The second acquire cannot finish while the first guard is held.
        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(held);
        contender.await.expect("contender task panicked");
    }

    #[tokio::test]
    async fn different_tutors_do_not_contend() {
        let locks = TutorLocks::new();
        let _a = locks.acquire(Uuid::new_v4()).await;
        // Acquiring a different tutor's guard must not block.
        let _b = locks.acquire(Uuid::new_v4()).await;
    }
}
