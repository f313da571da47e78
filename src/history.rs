//! history.rs: per-brand score history.
//!
//! The engine never touches a store directly: callers take a
//! [`HistorySnapshot`] before evaluating and [`HistoryStore::record`] the new
//! score afterwards. Appends by concurrent evaluations of the same brand may
//! or may not be visible in a snapshot taken meanwhile.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::analyze::{round_to, SCORE_DECIMALS};
use crate::config::MAX_HISTORY_CAPACITY;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub ts_unix: u64,
    /// Visibility score in [0, 100].
    pub score: f64,
}

/// Immutable, point-in-time view of one brand's scores (oldest first).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistorySnapshot {
    pub entries: Vec<HistoryEntry>,
}

impl HistorySnapshot {
    pub fn from_scores<I: IntoIterator<Item = f64>>(scores: I) -> Self {
        Self {
            entries: scores
                .into_iter()
                .map(|score| HistoryEntry { ts_unix: 0, score })
                .collect(),
        }
    }

    pub fn scores(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.score).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Mean visibility and count over a brand's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandAggregate {
    pub brand_name: String,
    pub total_queries: usize,
    pub average_visibility_score: f64,
}

impl BrandAggregate {
    pub fn from_snapshot(brand_name: &str, snap: &HistorySnapshot) -> Self {
        let sum = snap.entries.iter().map(|e| e.score).sum::<f64>();
        Self::from_totals(brand_name, snap.len(), sum)
    }

    /// Mean of `count` scores adding up to `sum`; 0.0 when empty.
    pub fn from_totals(brand_name: &str, count: usize, sum: f64) -> Self {
        let avg = if count > 0 {
            round_to(sum / count as f64, SCORE_DECIMALS)
        } else {
            0.0
        };
        Self {
            brand_name: brand_name.to_string(),
            total_queries: count,
            average_visibility_score: avg,
        }
    }
}

/// Persistence collaborator: append a score, read all prior scores.
pub trait HistoryStore: Send + Sync {
    fn record(&self, brand: &str, score: f64);
    fn snapshot(&self, brand: &str) -> HistorySnapshot;

    /// Count and mean over every recorded score. The default only sees
    /// what the snapshot still holds.
    fn aggregate(&self, brand: &str) -> BrandAggregate {
        BrandAggregate::from_snapshot(brand, &self.snapshot(brand))
    }
}

/// Case-insensitive history key.
pub fn brand_key(brand: &str) -> String {
    brand.trim().to_lowercase()
}

/// One brand's retained window plus running totals over every recorded score.
#[derive(Debug, Default)]
struct BrandLog {
    entries: Vec<HistoryEntry>,
    total: usize,
    sum: f64,
}

/// In-process store. Snapshots hold at most `cap` recent scores per brand;
/// aggregates count every score ever recorded.
#[derive(Debug)]
pub struct InMemoryHistory {
    inner: Mutex<HashMap<String, BrandLog>>,
    cap: usize,
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::with_capacity(1_000)
    }
}

impl InMemoryHistory {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            cap: cap.clamp(1, MAX_HISTORY_CAPACITY),
        }
    }

    pub fn record_at(&self, brand: &str, score: f64, ts_unix: u64) {
        if !score.is_finite() {
            return;
        }
        let entry = HistoryEntry {
            ts_unix,
            score: score.clamp(0.0, 100.0),
        };

        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let log = map.entry(brand_key(brand)).or_default();
        log.total += 1;
        log.sum += entry.score;
        log.entries.push(entry);
        if log.entries.len() > self.cap {
            let excess = log.entries.len() - self.cap;
            log.entries.drain(0..excess);
        }
    }
}

impl HistoryStore for InMemoryHistory {
    fn record(&self, brand: &str, score: f64) {
        self.record_at(brand, score, now_unix());
    }

    fn snapshot(&self, brand: &str) -> HistorySnapshot {
        let map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        HistorySnapshot {
            entries: map
                .get(&brand_key(brand))
                .map(|log| log.entries.clone())
                .unwrap_or_default(),
        }
    }

    fn aggregate(&self, brand: &str) -> BrandAggregate {
        let map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match map.get(&brand_key(brand)) {
            Some(log) => BrandAggregate::from_totals(brand, log.total, log.sum),
            None => BrandAggregate::from_totals(brand, 0, 0.0),
        }
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
