//! Shell Replies
//!
//! One JSON object is written per executed command.

use serde::Serialize;

use crate::cache::StatsSnapshot;

/// Reply to a shell command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    /// PUT: stored, with the key evicted to make room if any
    Stored {
        ok: bool,
        key: String,
        evicted: Option<String>,
    },
    /// GET: value is null on a miss
    Value { key: String, value: Option<String> },
    /// DEL
    Deleted { key: String, deleted: bool },
    /// KEYS, most recently used first
    Keys { keys: Vec<String> },
    /// SIZE
    Size { size: usize, capacity: usize },
    /// STATS
    Stats {
        #[serde(flatten)]
        stats: StatsSnapshot,
        hit_rate_percent: String,
    },
    /// RESET
    Done { ok: bool },
    /// CLEANUP
    Removed { removed: usize },
    /// Any failure; the shell keeps running
    Error { error: String },
}

impl Reply {
    pub fn stats(stats: StatsSnapshot) -> Self {
        let hit_rate_percent = stats.hit_rate_percent();
        Reply::Stats {
            stats,
            hit_rate_percent,
        }
    }

    pub fn error(error: impl ToString) -> Self {
        Reply::Error {
            error: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStats;
    use crate::error::CacheError;

    #[test]
    fn test_stored_serialize() {
        let reply = Reply::Stored {
            ok: true,
            key: "a".to_string(),
            evicted: Some("b".to_string()),
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json, serde_json::json!({"ok": true, "key": "a", "evicted": "b"}));
    }

    #[test]
    fn test_value_miss_serializes_null() {
        let reply = Reply::Value {
            key: "missing".to_string(),
            value: None,
        };
        let json = serde_json::to_string(&reply).unwrap();
        assert_eq!(json, r#"{"key":"missing","value":null}"#);
    }

    #[test]
    fn test_stats_serialize_flattened() {
        let mut counters = CacheStats::new();
        counters.record_hit();
        counters.record_miss();
        let reply = Reply::stats(counters.snapshot(1, 3));

        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["hits"], 1);
        assert_eq!(json["misses"], 1);
        assert_eq!(json["hit_rate"], 0.5);
        assert_eq!(json["hit_rate_percent"], "50.00%");
        assert_eq!(json["capacity"], 3);
    }

    #[test]
    fn test_error_serialize() {
        let reply = Reply::error(CacheError::InvalidCommand("unknown command FLY".to_string()));
        let json = serde_json::to_string(&reply).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("unknown command FLY"));
    }
}
