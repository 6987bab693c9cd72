use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::debug;

/// Name of the persisted value the UI collaborator stores the log under.
pub const STORAGE_KEY: &str = "calculatorHistory";

/// The log never holds more than this many entries.
pub const HISTORY_CAPACITY: usize = 50;

/// One past calculation. Immutable once recorded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub expression: String,
    pub result: String,
    pub timestamp: String,
}

/// Append-only, capacity-bounded log of past calculations, most recent
/// first. The storage mechanism is the UI collaborator's concern; the log
/// only serializes to and from the persisted JSON shape.
#[derive(Default)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Default::default()
    }

    /// Restores a previously persisted log. A missing persisted value is an
    /// empty log, not an error.
    pub fn load(saved: Option<&str>) -> serde_json::Result<Self> {
        match saved {
            None => Ok(HistoryLog::new()),
            Some(s) => HistoryLog::from_json(s),
        }
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        let entries: Vec<HistoryEntry> = serde_json::from_str(s)?;
        Ok(HistoryLog { entries })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.entries)
    }

    /// Prepends a new entry stamped with the current UTC time, evicting the
    /// oldest entry once the capacity is exceeded.
    pub fn record(&mut self, expression: &str, result: &str) {
        self.entries.insert(
            0,
            HistoryEntry {
                expression: expression.to_string(),
                result: result.to_string(),
                timestamp: timestamp_now(),
            },
        );
        if self.entries.len() > HISTORY_CAPACITY {
            let evicted = self.entries.pop();
            if let Some(e) = evicted {
                debug!(expression = %e.expression, "history entry evicted");
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn timestamp_now() -> String {
    let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    OffsetDateTime::now_utc().format(&fmt).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_order() {
        let mut log = HistoryLog::new();
        log.record("2+2", "4");
        log.record("3*3", "9");
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].expression, "3*3");
        assert_eq!(log.entries()[1].expression, "2+2");
        assert_eq!(log.entries()[0].result, "9");
    }

    #[test]
    fn test_capacity_eviction() {
        let mut log = HistoryLog::new();
        for i in 0..51 {
            log.record(&format!("expr{}", i), "0");
        }
        assert_eq!(log.len(), 50);
        // newest first, the very first record evicted
        assert_eq!(log.entries()[0].expression, "expr50");
        assert_eq!(log.entries()[49].expression, "expr1");
        assert!(!log.entries().iter().any(|e| e.expression == "expr0"));
    }

    #[test]
    fn test_clear() {
        let mut log = HistoryLog::new();
        log.record("1+1", "2");
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_round_trip() {
        let mut log = HistoryLog::new();
        log.record("2+2", "4");
        log.record("sin(0)", "0");
        let json = log.to_json().unwrap();
        let restored = HistoryLog::load(Some(&json)).unwrap();
        assert_eq!(restored.entries(), log.entries());
    }

    #[test]
    fn test_load_missing_is_empty() {
        let log = HistoryLog::load(None).unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn test_load_garbage_fails() {
        assert!(HistoryLog::load(Some("not json")).is_err());
    }

    #[test]
    fn test_timestamp_shape() {
        let ts = timestamp_now();
        // 2026-08-31 12:00:00
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], " ");
    }
}
