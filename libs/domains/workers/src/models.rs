use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A worker process known to the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerInfo {
    pub worker_id: String,
    pub last_seen: DateTime<Utc>,
    /// Self-reported load, overwritten on every heartbeat that carries one
    pub load: i32,
}

impl WorkerInfo {
    pub fn new(worker_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            worker_id: worker_id.into(),
            last_seen: now,
            load: 0,
        }
    }

    /// Seconds since the Unix epoch of the last registration or heartbeat
    pub fn last_seen_unix(&self) -> i64 {
        self.last_seen.timestamp()
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.last_seen > ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_expiry_is_strictly_after_ttl() {
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let info = WorkerInfo::new("w1", start);
        let ttl = Duration::seconds(15);

        assert!(!info.is_expired(start + Duration::seconds(15), ttl));
        assert!(info.is_expired(start + Duration::milliseconds(15_001), ttl));
        assert_eq!(info.last_seen_unix(), 1_700_000_000);
        assert_eq!(info.load, 0);
    }
}
