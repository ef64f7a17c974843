//! Per-user async mutexes.

use dashmap::DashMap;
use mindcanvas_core::UserId;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = DashMap<UserId, Arc<Mutex<()>>>;

/// One async mutex per user id, created on first use and dropped again once
/// nobody holds or awaits it. Clones share the table.
#[derive(Debug, Clone, Default)]
pub struct UserLocks {
    locks: Arc<LockTable>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user_id`'s document.
    pub async fn lock(&self, user_id: &str) -> UserGuard {
        let mutex = self
            .locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        // The DashMap shard guard is released above, before awaiting.
        let guard = mutex.lock_owned().await;
        UserGuard {
            guard: Some(guard),
            user_id: user_id.to_string(),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Users with a live or awaited lock.
    pub fn tracked_users(&self) -> usize {
        self.locks.len()
    }
}

/// Held for the duration of one user's unit of work.
#[derive(Debug)]
pub struct UserGuard {
    guard: Option<OwnedMutexGuard<()>>,
    user_id: UserId,
    locks: Arc<LockTable>,
}

impl Drop for UserGuard {
    fn drop(&mut self) {
        // Release our reference first so an idle entry counts only the table's.
        drop(self.guard.take());
        self.locks
            .remove_if(&self.user_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
