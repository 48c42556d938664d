//! Usage statistics record.

use serde::{Deserialize, Serialize};

/// Model assumed when no usage has been recorded yet.
pub const DEFAULT_USAGE_MODEL: &str = "gpt-4o";

/// Running token total and estimated cost for the selected model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    /// Tokens consumed since the last clear.
    pub total: u64,
    /// Estimated cost of `total` at the model's rate.
    pub cost: f64,
    /// Model used to price the total.
    pub model: String,
}

impl Default for UsageStats {
    fn default() -> Self {
        Self {
            total: 0,
            cost: 0.0,
            model: DEFAULT_USAGE_MODEL.to_string(),
        }
    }
}
