// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Risk matrix: severity buckets, distribution and the overall roll-up.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

use crate::config::SeverityThresholds;
use crate::types::{Risk, RiskCategory};

// ─── Severity ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Bucket a single score. Lower bounds are inclusive.
    pub fn from_score(score: f64, thresholds: &SeverityThresholds) -> Self {
        if score >= thresholds.critical {
            Severity::Critical
        } else if score >= thresholds.high {
            Severity::High
        } else if score >= thresholds.medium {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// Overall project level from the average score and the share (0-100)
    /// of risks in the high or critical bucket.
    pub fn rollup(average_score: f64, high_risk_percentage: f64) -> Self {
        if average_score >= 3.5 || high_risk_percentage >= 40.0 {
            Severity::Critical
        } else if average_score >= 2.5 || high_risk_percentage >= 25.0 {
            Severity::High
        } else if average_score >= 1.5 || high_risk_percentage >= 15.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Matrix ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Distribution {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl Distribution {
    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallMetrics {
    pub total_risks: usize,
    pub average_score: f64,
    /// (critical + high) / total, on a 0-100 scale.
    pub high_risk_percentage: f64,
    pub risk_level: Severity,
}

/// Risk ids partitioned by severity, in input order within each bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskMatrix {
    pub critical: Vec<String>,
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
    pub distribution: Distribution,
    pub category_breakdown: BTreeMap<RiskCategory, usize>,
    pub overall_metrics: OverallMetrics,
}

impl RiskMatrix {
    pub fn bucket(&self, severity: Severity) -> &[String] {
        match severity {
            Severity::Critical => &self.critical,
            Severity::High => &self.high,
            Severity::Medium => &self.medium,
            Severity::Low => &self.low,
        }
    }

    /// Which bucket holds `id`, if any.
    pub fn severity_of(&self, id: &str) -> Option<Severity> {
        [
            Severity::Critical,
            Severity::High,
            Severity::Medium,
            Severity::Low,
        ]
        .into_iter()
        .find(|s| self.bucket(*s).iter().any(|member| member == id))
    }
}

pub fn build_matrix(risks: &[Risk], thresholds: &SeverityThresholds) -> RiskMatrix {
    let mut critical = Vec::new();
    let mut high = Vec::new();
    let mut medium = Vec::new();
    let mut low = Vec::new();
    let mut category_breakdown: BTreeMap<RiskCategory, usize> = BTreeMap::new();

    for risk in risks {
        let id = risk.id().to_string();
        match Severity::from_score(risk.risk_score(), thresholds) {
            Severity::Critical => critical.push(id),
            Severity::High => high.push(id),
            Severity::Medium => medium.push(id),
            Severity::Low => low.push(id),
        }
        *category_breakdown.entry(risk.category()).or_insert(0) += 1;
    }

    let distribution = Distribution {
        critical: critical.len(),
        high: high.len(),
        medium: medium.len(),
        low: low.len(),
    };

    let total_risks = risks.len();
    let (average_score, high_risk_percentage) = if total_risks == 0 {
        (0.0, 0.0)
    } else {
        let n = total_risks as f64;
        let sum: f64 = risks.iter().map(Risk::risk_score).sum();
        let elevated = (distribution.critical + distribution.high) as f64;
        (sum / n, elevated / n * 100.0)
    };
    let risk_level = Severity::rollup(average_score, high_risk_percentage);

    info!(
        total = total_risks,
        critical = distribution.critical,
        high = distribution.high,
        average_score,
        level = %risk_level,
        "risk matrix built"
    );

    RiskMatrix {
        critical,
        high,
        medium,
        low,
        distribution,
        category_breakdown,
        overall_metrics: OverallMetrics {
            total_risks,
            average_score,
            high_risk_percentage,
            risk_level,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Impact, Probability, RiskCandidate};
    use approx::assert_relative_eq;

    fn risk(id: &str, category: RiskCategory, score: f64) -> Risk {
        Risk::scored(
            RiskCandidate::new(id, category, Probability::Medium, Impact::Medium),
            score,
            1.0,
            None,
            Some(15.0),
        )
    }

    #[test]
    fn thresholds_are_inclusive_lower_bounds() {
        let t = SeverityThresholds::default();
        assert_eq!(Severity::from_score(4.0, &t), Severity::Critical);
        assert_eq!(Severity::from_score(3.999, &t), Severity::High);
        assert_eq!(Severity::from_score(3.0, &t), Severity::High);
        assert_eq!(Severity::from_score(2.8, &t), Severity::Medium);
        assert_eq!(Severity::from_score(2.0, &t), Severity::Medium);
        assert_eq!(Severity::from_score(1.99, &t), Severity::Low);
        assert_eq!(Severity::from_score(0.0, &t), Severity::Low);
    }

    #[test]
    fn empty_matrix() {
        let m = build_matrix(&[], &SeverityThresholds::default());
        assert_eq!(m.distribution, Distribution::default());
        assert_eq!(m.overall_metrics.average_score, 0.0);
        assert_eq!(m.overall_metrics.high_risk_percentage, 0.0);
        assert_eq!(m.overall_metrics.risk_level, Severity::Low);
        assert!(m.category_breakdown.is_empty());
    }

    #[test]
    fn buckets_partition_input_in_order() {
        let risks = vec![
            risk("A", RiskCategory::Technical, 4.5),
            risk("B", RiskCategory::Technical, 1.0),
            risk("C", RiskCategory::Schedule, 3.2),
            risk("D", RiskCategory::Commercial, 4.0),
            risk("E", RiskCategory::Schedule, 2.5),
        ];
        let m = build_matrix(&risks, &SeverityThresholds::default());
        assert_eq!(m.critical, vec!["A", "D"]);
        assert_eq!(m.high, vec!["C"]);
        assert_eq!(m.medium, vec!["E"]);
        assert_eq!(m.low, vec!["B"]);
        assert_eq!(m.distribution.total(), risks.len());
        assert_eq!(m.category_breakdown[&RiskCategory::Technical], 2);
        assert_eq!(m.category_breakdown[&RiskCategory::Schedule], 2);
        assert_eq!(m.severity_of("C"), Some(Severity::High));
        assert_eq!(m.severity_of("nope"), None);

        assert_relative_eq!(m.overall_metrics.average_score, 3.04, epsilon = 1e-12);
        assert_relative_eq!(m.overall_metrics.high_risk_percentage, 60.0, epsilon = 1e-12);
        assert_eq!(m.overall_metrics.risk_level, Severity::Critical);
    }

    #[test]
    fn rollup_ladder() {
        assert_eq!(Severity::rollup(3.5, 0.0), Severity::Critical);
        assert_eq!(Severity::rollup(0.5, 40.0), Severity::Critical);
        assert_eq!(Severity::rollup(2.5, 0.0), Severity::High);
        assert_eq!(Severity::rollup(1.0, 25.0), Severity::High);
        assert_eq!(Severity::rollup(1.5, 0.0), Severity::Medium);
        assert_eq!(Severity::rollup(0.0, 15.0), Severity::Medium);
        assert_eq!(Severity::rollup(1.49, 14.9), Severity::Low);
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let risks = vec![
            risk("A", RiskCategory::External, 2.2),
            risk("B", RiskCategory::Resource, 3.7),
        ];
        let t = SeverityThresholds::default();
        assert_eq!(build_matrix(&risks, &t), build_matrix(&risks, &t));
    }

    #[test]
    fn custom_thresholds_move_buckets() {
        let t = SeverityThresholds {
            critical: 3.0,
            high: 2.0,
            medium: 1.0,
        };
        let m = build_matrix(&[risk("A", RiskCategory::Technical, 2.8)], &t);
        assert_eq!(m.high, vec!["A"]);
    }

    #[test]
    fn serializes_lowercase_levels() {
        let m = build_matrix(
            &[risk("A", RiskCategory::Compliance, 4.2)],
            &SeverityThresholds::default(),
        );
        let json = serde_json::to_value(&m).expect("test: serialize");
        assert_eq!(json["overall_metrics"]["risk_level"], "critical");
        assert_eq!(json["category_breakdown"]["compliance"], 1);
        assert_eq!(json["distribution"]["critical"], 1);
    }
}
