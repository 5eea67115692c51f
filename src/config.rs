//! Driver configuration.
//!
//! Plain structs with builder methods and explicit validation, loadable from
//! JSON so a harness can drive the core from a config file.

use std::collections::HashSet;

use serde::Deserialize;

use crate::operation::ShortReadKind;

/// Executor configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Number of long-lived worker threads
    pub worker_threads: usize,

    /// Capacity of the blocking work queue; the executor's only
    /// backpressure point
    pub queue_capacity: usize,
}

impl ExecutorConfig {
    pub fn new() -> Self {
        Self {
            worker_threads: 4,
            queue_capacity: 1024,
        }
    }

    /// Set the number of worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.worker_threads = count;
        self
    }

    /// Set the work queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Parse from a JSON document
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_threads == 0 {
            return Err("worker_threads must be > 0".to_string());
        }

        if self.queue_capacity == 0 {
            return Err("queue_capacity must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Short read derivation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShortReadConfig {
    /// Continuation probability at the start of each chain
    pub initial_probability: f64,

    /// Subtracted from the probability after every derivation attempt.
    /// Never clamped; once the state goes non-positive every coin toss
    /// rejects.
    pub probability_degradation_factor: f64,

    /// Base delay between a parent operation and its derived child,
    /// in milliseconds
    pub base_interleave_millis: u64,

    /// Workload time compression applied to the interleave
    pub compression_ratio: f64,

    /// Which short read kinds this run has enabled
    pub enabled: HashSet<ShortReadKind>,
}

impl ShortReadConfig {
    pub fn new(initial_probability: f64, probability_degradation_factor: f64) -> Self {
        Self {
            initial_probability,
            probability_degradation_factor,
            base_interleave_millis: 1000,
            compression_ratio: 1.0,
            enabled: ShortReadKind::ALL.into_iter().collect(),
        }
    }

    /// Set the base interleave in milliseconds
    pub fn base_interleave_millis(mut self, millis: u64) -> Self {
        self.base_interleave_millis = millis;
        self
    }

    /// Set the time compression ratio
    pub fn compression_ratio(mut self, ratio: f64) -> Self {
        self.compression_ratio = ratio;
        self
    }

    /// Enable exactly the given short read kinds
    pub fn enabled(mut self, kinds: impl IntoIterator<Item = ShortReadKind>) -> Self {
        self.enabled = kinds.into_iter().collect();
        self
    }

    /// Disable one short read kind
    pub fn disable(mut self, kind: ShortReadKind) -> Self {
        self.enabled.remove(&kind);
        self
    }

    /// Parse from a JSON document
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }

    /// The effective parent-to-child delay: the base interleave scaled by
    /// the compression ratio, rounded up.
    pub fn interleave_as_milli(&self) -> u64 {
        (self.compression_ratio * self.base_interleave_millis as f64).ceil() as u64
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.initial_probability) {
            return Err("initial_probability must be within [0, 1]".to_string());
        }

        if self.probability_degradation_factor < 0.0 {
            return Err("probability_degradation_factor cannot be negative".to_string());
        }

        if !self.compression_ratio.is_finite() || self.compression_ratio <= 0.0 {
            return Err("compression_ratio must be a positive finite number".to_string());
        }

        Ok(())
    }
}

impl Default for ShortReadConfig {
    fn default() -> Self {
        Self::new(1.0, 0.25)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_executor_config() {
        let config = ExecutorConfig::default();
        assert_eq!(config.worker_threads, 4);
        assert_eq!(config.queue_capacity, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_executor_builder_pattern() {
        let config = ExecutorConfig::new().worker_threads(2).queue_capacity(8);
        assert_eq!(config.worker_threads, 2);
        assert_eq!(config.queue_capacity, 8);
    }

    #[test]
    fn test_executor_validate() {
        assert!(ExecutorConfig::new().worker_threads(0).validate().is_err());
        assert!(ExecutorConfig::new().queue_capacity(0).validate().is_err());
    }

    #[test]
    fn test_executor_from_json() {
        let config =
            ExecutorConfig::from_json(r#"{"worker_threads": 16, "queue_capacity": 256}"#).unwrap();
        assert_eq!(config.worker_threads, 16);
        assert_eq!(config.queue_capacity, 256);
    }

    #[test]
    fn test_short_read_defaults_enable_all_kinds() {
        let config = ShortReadConfig::default();
        assert_eq!(config.enabled.len(), ShortReadKind::ALL.len());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_short_read_validate() {
        assert!(ShortReadConfig::new(1.5, 0.1).validate().is_err());
        assert!(ShortReadConfig::new(0.5, -0.1).validate().is_err());
        assert!(
            ShortReadConfig::new(0.5, 0.1)
                .compression_ratio(0.0)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_interleave_rounds_up() {
        let config = ShortReadConfig::new(1.0, 0.1)
            .base_interleave_millis(7)
            .compression_ratio(0.2);
        assert_eq!(config.interleave_as_milli(), 2);
    }

    #[test]
    fn test_short_read_from_json() {
        let config = ShortReadConfig::from_json(
            r#"{
                "initial_probability": 0.8,
                "probability_degradation_factor": 0.1,
                "enabled": ["PersonProfile", "MessageContent"]
            }"#,
        )
        .unwrap();
        assert_eq!(config.initial_probability, 0.8);
        assert_eq!(config.enabled.len(), 2);
        assert!(config.enabled.contains(&ShortReadKind::PersonProfile));
    }
}
