use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::models::WorkerInfo;

/// Seconds of silence after which a worker is dropped by [`Registry::cleanup_expired`].
pub const DEFAULT_WORKER_TTL_SECS: i64 = 15;

/// In-memory worker membership table.
///
/// Every operation takes the same lock for its whole duration, so readers
/// always see a consistent snapshot. Starts empty on every process start.
pub struct Registry {
    workers: Mutex<HashMap<String, WorkerInfo>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            workers: Mutex::new(HashMap::new()),
            clock,
            ttl: Duration::seconds(DEFAULT_WORKER_TTL_SECS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Insert or overwrite `worker_id` with `last_seen = now` and zero load.
    pub async fn register(&self, worker_id: &str) -> WorkerInfo {
        let info = WorkerInfo::new(worker_id, self.clock.now());
        let mut workers = self.workers.lock().await;
        let replaced = workers.insert(worker_id.to_string(), info.clone()).is_some();

        info!(worker_id = %worker_id, replaced, total = workers.len(), "Worker registered");
        info
    }

    /// Refresh `last_seen`. Unknown ids are ignored; returns whether the
    /// worker was present.
    pub async fn heartbeat(&self, worker_id: &str) -> bool {
        let now = self.clock.now();
        let mut workers = self.workers.lock().await;
        match workers.get_mut(worker_id) {
            Some(info) => {
                info.last_seen = now;
                true
            }
            None => {
                debug!(worker_id = %worker_id, "Heartbeat from unknown worker ignored");
                false
            }
        }
    }

    /// Refresh `last_seen` and overwrite `load`. Unknown ids are ignored.
    pub async fn update_load(&self, worker_id: &str, load: i32) -> bool {
        let now = self.clock.now();
        let mut workers = self.workers.lock().await;
        match workers.get_mut(worker_id) {
            Some(info) => {
                info.last_seen = now;
                info.load = load;
                true
            }
            None => {
                debug!(worker_id = %worker_id, load, "Load update from unknown worker ignored");
                false
            }
        }
    }

    /// Point-in-time copy of all entries, ordered by worker id.
    pub async fn list(&self) -> Vec<WorkerInfo> {
        let workers = self.workers.lock().await;
        let mut list: Vec<WorkerInfo> = workers.values().cloned().collect();
        drop(workers);

        list.sort_by(|a, b| a.worker_id.cmp(&b.worker_id));
        list
    }

    pub async fn get(&self, worker_id: &str) -> Option<WorkerInfo> {
        self.workers.lock().await.get(worker_id).cloned()
    }

    /// Remove every worker silent for longer than the TTL. Returns the
    /// removed ids.
    pub async fn cleanup_expired(&self) -> Vec<String> {
        let now = self.clock.now();
        let ttl = self.ttl;
        let mut workers = self.workers.lock().await;

        let expired: Vec<String> = workers
            .values()
            .filter(|info| info.is_expired(now, ttl))
            .map(|info| info.worker_id.clone())
            .collect();

        for id in &expired {
            workers.remove(id);
            info!(worker_id = %id, "Worker expired");
        }
        expired
    }

    pub async fn len(&self) -> usize {
        self.workers.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.workers.lock().await.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::DateTime;
    use std::collections::HashSet;

    fn registry() -> (Registry, Arc<ManualClock>) {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        (Registry::with_clock(clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let (registry, clock) = registry();

        registry.register("w1").await;
        registry.update_load("w1", 4).await;
        clock.advance(Duration::seconds(3));
        let info = registry.register("w1").await;

        assert_eq!(registry.len().await, 1);
        assert_eq!(info.load, 0);
        assert_eq!(registry.get("w1").await, Some(info));
    }

    #[tokio::test]
    async fn test_heartbeat_refreshes_last_seen() {
        let (registry, clock) = registry();
        let registered = registry.register("w1").await;

        clock.advance(Duration::seconds(10));
        assert!(registry.heartbeat("w1").await);

        let info = registry.get("w1").await.unwrap();
        assert_eq!(info.last_seen, registered.last_seen + Duration::seconds(10));
        assert_eq!(info.load, 0);
    }

    #[tokio::test]
    async fn test_update_load_overwrites() {
        let (registry, _clock) = registry();
        registry.register("w1").await;

        registry.update_load("w1", 7).await;
        registry.update_load("w1", 2).await;

        assert_eq!(registry.get("w1").await.unwrap().load, 2);
    }

    #[tokio::test]
    async fn test_unknown_worker_is_a_noop() {
        let (registry, _clock) = registry();
        registry.register("w1").await;

        assert!(!registry.heartbeat("ghost").await);
        assert!(!registry.update_load("ghost", 3).await);

        assert_eq!(registry.len().await, 1);
        assert!(registry.get("ghost").await.is_none());
    }

    #[tokio::test]
    async fn test_cleanup_removes_only_silent_workers() {
        let (registry, clock) = registry();
        registry.register("w1").await;
        registry.register("w2").await;

        clock.advance(Duration::seconds(10));
        registry.heartbeat("w1").await;
        clock.advance(Duration::seconds(6));

        let removed = registry.cleanup_expired().await;

        assert_eq!(removed, vec!["w2".to_string()]);
        let ids: Vec<String> = registry.list().await.into_iter().map(|w| w.worker_id).collect();
        assert_eq!(ids, vec!["w1".to_string()]);
    }

    #[tokio::test]
    async fn test_entry_at_exactly_ttl_survives() {
        let (registry, clock) = registry();
        registry.register("w1").await;

        clock.advance(Duration::seconds(DEFAULT_WORKER_TTL_SECS));
        assert!(registry.cleanup_expired().await.is_empty());

        clock.advance(Duration::milliseconds(1));
        assert_eq!(registry.cleanup_expired().await, vec!["w1".to_string()]);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_is_sorted_snapshot() {
        let (registry, _clock) = registry();
        registry.register("w3").await;
        registry.register("w1").await;
        registry.register("w2").await;

        let snapshot = registry.list().await;
        registry.register("w4").await;

        let ids: Vec<&str> = snapshot.iter().map(|w| w.worker_id.as_str()).collect();
        assert_eq!(ids, vec!["w1", "w2", "w3"]);
    }

    #[tokio::test]
    async fn test_custom_ttl() {
        let (registry, clock) = registry();
        let registry = registry.with_ttl(Duration::seconds(2));
        registry.register("w1").await;

        clock.advance(Duration::seconds(3));
        assert_eq!(registry.cleanup_expired().await.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_operations_keep_table_consistent() {
        const WORKERS: i32 = 32;
        const ROUNDS: i32 = 20;

        let registry = Arc::new(Registry::new());
        let mut tasks = Vec::new();

        for i in 0..WORKERS {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                let id = format!("w{i}");
                registry.register(&id).await;

                for load in 1..=ROUNDS {
                    assert!(registry.update_load(&id, load).await);
                    assert!(registry.heartbeat(&id).await);
                    assert!(!registry.update_load(&format!("ghost-{i}"), load).await);

                    let snapshot = registry.list().await;
                    let ids: HashSet<&str> =
                        snapshot.iter().map(|w| w.worker_id.as_str()).collect();
                    assert_eq!(ids.len(), snapshot.len());
                    assert!(ids.contains(id.as_str()));
                    for worker in &snapshot {
                        let n: i32 = worker.worker_id.trim_start_matches('w').parse().unwrap();
                        assert!((0..WORKERS).contains(&n));
                        assert!((0..=ROUNDS).contains(&worker.load));
                    }

                    assert!(registry.cleanup_expired().await.is_empty());
                }
            }));
        }

        for task in tasks {
            task.await.unwrap();
        }

        let workers = registry.list().await;
        assert_eq!(workers.len(), WORKERS as usize);
        assert!(workers.iter().all(|w| w.load == ROUNDS));
    }
}
