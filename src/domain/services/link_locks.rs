use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per booking link. Booking submissions for the same link run
/// their final check-and-insert one at a time inside this process.
#[derive(Default)]
pub struct LinkLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LinkLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, link_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            // Only the map holds an idle entry; guards and waiters keep their own clone.
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
            map.entry(link_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
