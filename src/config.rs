// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Engine configuration.
//!
//! Every section has a `Default` matching the reference constants, and every
//! field may be omitted from the JSON document.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("malformed engine config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Monte Carlo settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Trials per run (default 1000).
    pub iterations: usize,
    /// Fixed seed for reproducible runs; `None` draws a fresh seed per call.
    pub seed: Option<u64>,
    /// Worker shards; 1 runs every trial on the calling thread.
    pub shards: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            seed: None,
            shards: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Share of high/critical requirements above which technical risks are
    /// enhanced (default 0.30, strict comparison).
    pub complexity_share_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            complexity_share_threshold: 0.30,
        }
    }
}

/// Lower score bounds of the severity buckets; anything below `medium` is low.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityThresholds {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            critical: 4.0,
            high: 3.0,
            medium: 2.0,
        }
    }
}

/// Fallbacks for facts the project context may leave out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextDefaults {
    /// Budget used for cost impacts when the context names none.
    /// `None` leaves cost impacts unset.
    pub budget_total: Option<Decimal>,
}

impl Default for ContextDefaults {
    fn default() -> Self {
        Self {
            budget_total: Some(dec!(1000000)),
        }
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub simulation: SimulationConfig,
    pub scoring: ScoringConfig,
    pub matrix: SeverityThresholds,
    pub context_defaults: ContextDefaults,
}

impl EngineConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Same settings with a fixed simulation seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.simulation.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.iterations == 0 {
            return Err(ConfigError::Invalid {
                field: "simulation.iterations",
                reason: "must be at least 1",
            });
        }
        if self.simulation.shards == 0 {
            return Err(ConfigError::Invalid {
                field: "simulation.shards",
                reason: "must be at least 1",
            });
        }
        let share = self.scoring.complexity_share_threshold;
        if !(0.0..=1.0).contains(&share) {
            return Err(ConfigError::Invalid {
                field: "scoring.complexity_share_threshold",
                reason: "must lie in [0, 1]",
            });
        }
        let m = &self.matrix;
        if !(m.critical > m.high && m.high > m.medium && m.medium >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "matrix",
                reason: "thresholds must satisfy critical > high > medium >= 0",
            });
        }
        if matches!(self.context_defaults.budget_total, Some(b) if b.is_sign_negative()) {
            return Err(ConfigError::Invalid {
                field: "context_defaults.budget_total",
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.simulation.iterations, 1000);
        assert_eq!(config.simulation.shards, 1);
        assert!(config.simulation.seed.is_none());
        assert_eq!(config.scoring.complexity_share_threshold, 0.30);
        assert_eq!(config.matrix.critical, 4.0);
        assert_eq!(config.context_defaults.budget_total, Some(dec!(1000000)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = EngineConfig::from_json_str(r#"{"simulation": {"seed": 42, "shards": 4}}"#)
            .expect("test: partial config");
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.simulation.shards, 4);
        assert_eq!(config.simulation.iterations, 1000);
        assert_eq!(config.matrix, SeverityThresholds::default());
    }

    #[test]
    fn empty_document_is_default() {
        let config = EngineConfig::from_json_str("{}").expect("test: empty config");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn zero_iterations_rejected() {
        let err = EngineConfig::from_json_str(r#"{"simulation": {"iterations": 0}}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "simulation.iterations", .. }
        ));
    }

    #[test]
    fn unordered_thresholds_rejected() {
        let err = EngineConfig::from_json_str(r#"{"matrix": {"critical": 2.0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "matrix", .. }));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = EngineConfig::from_json_str("{simulation").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
