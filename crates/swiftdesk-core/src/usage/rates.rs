//! Model price table.

use std::collections::BTreeMap;
use swiftdesk_config::UsageConfig;

/// Price per 1000 tokens for models missing from the table.
pub const FALLBACK_RATE: f64 = 0.005;

const BUILTIN_RATES: [(&str, f64); 5] = [
    ("gpt-4o", 0.005),
    ("gpt-4o-mini", 0.00015),
    ("gpt-4-turbo", 0.01),
    ("gpt-4", 0.03),
    ("gpt-3.5-turbo", 0.0015),
];

/// Model name to price per 1000 tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    rates: BTreeMap<String, f64>,
    fallback: f64,
}

impl RateTable {
    /// Built-in rates with the default fallback.
    pub fn builtin() -> Self {
        Self {
            rates: BUILTIN_RATES
                .iter()
                .map(|(model, rate)| (model.to_string(), *rate))
                .collect(),
            fallback: FALLBACK_RATE,
        }
    }

    /// Built-in rates extended or overridden by the usage config.
    pub fn from_config(config: &UsageConfig) -> Self {
        let mut table = Self::builtin();
        table.fallback = config.fallback_rate;
        table
            .rates
            .extend(config.rates.iter().map(|(model, rate)| (model.clone(), *rate)));
        table
    }

    pub fn with_rate(mut self, model: impl Into<String>, rate: f64) -> Self {
        self.rates.insert(model.into(), rate);
        self
    }

    /// Rate for `model`, or the fallback when the model is unknown.
    pub fn rate(&self, model: &str) -> f64 {
        self.rates.get(model).copied().unwrap_or(self.fallback)
    }

    /// Estimated cost of `total` tokens billed at `model`'s rate.
    pub fn cost(&self, total: u64, model: &str) -> f64 {
        total as f64 / 1000.0 * self.rate(model)
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::builtin()
    }
}
