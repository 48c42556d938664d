//! Running token count and cost estimate.
//!
//! The tracker keeps one [`UsageStats`] record in a [`UsageStorage`]. Every
//! mutation rereads the record, applies the change, recomputes the cost from
//! the [`RateTable`], persists the result and notifies observers, so
//! `cost == total / 1000 * rate(model)` holds after each call.

mod rates;
mod storage;

pub use rates::{FALLBACK_RATE, RateTable};
pub use storage::{FileUsageStorage, InMemoryUsageStorage, UsageStorage, default_usage_path};

use log::{debug, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use swiftdesk_protocol::UsageStats;
use thiserror::Error;

/// Errors raised while persisting usage stats.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("usage storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("usage record serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Receives the stats after every change.
pub trait UsageObserver: Send + Sync {
    fn on_update(&self, stats: &UsageStats);
}

/// Token usage accounting over a pluggable storage.
pub struct UsageTracker {
    storage: Arc<dyn UsageStorage>,
    rates: RateTable,
    observers: Vec<Arc<dyn UsageObserver>>,
    guard: Mutex<()>,
}

impl UsageTracker {
    pub fn new(storage: Arc<dyn UsageStorage>, rates: RateTable) -> Self {
        Self {
            storage,
            rates,
            observers: Vec::new(),
            guard: Mutex::new(()),
        }
    }

    /// Register an observer notified after each mutation.
    pub fn with_observer(mut self, observer: Arc<dyn UsageObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Current stats. A missing or unreadable record yields the zeroed
    /// default, which is persisted as the new record.
    pub fn get_stats(&self) -> UsageStats {
        let _guard = self.guard.lock();
        match self.read_stats() {
            Some(stats) => stats,
            None => {
                let stats = UsageStats::default();
                if let Err(err) = self.persist(&stats) {
                    warn!("failed to persist default usage stats: {err}");
                }
                stats
            }
        }
    }

    /// Add `count` tokens and reprice with the current model.
    pub fn add_tokens(&self, count: u64) -> Result<UsageStats, UsageError> {
        self.mutate(|stats| {
            stats.total = stats.total.saturating_add(count);
        })
    }

    /// Switch the model and reprice the unchanged total.
    pub fn set_model(&self, model: &str) -> Result<UsageStats, UsageError> {
        self.mutate(|stats| {
            stats.model = model.to_string();
        })
    }

    /// Switch to `model` when it differs, then add `tokens`, as one update.
    pub fn record(&self, model: &str, tokens: u64) -> Result<UsageStats, UsageError> {
        self.mutate(|stats| {
            if stats.model != model {
                stats.model = model.to_string();
            }
            stats.total = stats.total.saturating_add(tokens);
        })
    }

    /// Delete the record. Observers see the zeroed default.
    pub fn clear(&self) -> Result<UsageStats, UsageError> {
        {
            let _guard = self.guard.lock();
            self.storage.remove()?;
        }
        let stats = UsageStats::default();
        debug!("usage stats cleared");
        self.notify(&stats);
        Ok(stats)
    }

    /// Observers run after the lock is released so they may read the tracker.
    fn mutate(&self, apply: impl FnOnce(&mut UsageStats)) -> Result<UsageStats, UsageError> {
        let stats = {
            let _guard = self.guard.lock();
            let mut stats = self.read_stats().unwrap_or_default();
            apply(&mut stats);
            stats.cost = self.rates.cost(stats.total, &stats.model);
            self.persist(&stats)?;
            stats
        };
        debug!(
            "usage updated (model={}, total={}, cost={:.6})",
            stats.model, stats.total, stats.cost
        );
        self.notify(&stats);
        Ok(stats)
    }

    fn read_stats(&self) -> Option<UsageStats> {
        let raw = match self.storage.load() {
            Ok(raw) => raw?,
            Err(err) => {
                warn!("failed to read usage stats; using defaults: {err}");
                return None;
            }
        };
        match serde_json::from_str::<UsageStats>(&raw) {
            Ok(stats) => Some(stats),
            Err(err) => {
                warn!("corrupt usage stats record ignored: {err}");
                None
            }
        }
    }

    fn persist(&self, stats: &UsageStats) -> Result<(), UsageError> {
        let raw = serde_json::to_string(stats)?;
        self.storage.save(&raw)
    }

    fn notify(&self, stats: &UsageStats) {
        for observer in &self.observers {
            observer.on_update(stats);
        }
    }
}
