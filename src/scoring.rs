// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Risk scorer.
//!
//! ```text
//! base_score  = probability_weight × impact_weight          (0, 4.5]
//! risk_score  = min(base_score × Π triggered multipliers, 5.0)
//! ```
//!
//! Multipliers are evaluated independently and compound. The cap applies
//! once, to the final product. Any score supplied upstream has already been
//! discarded by the normalizer; scores only come from here.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::{EngineConfig, ScoringConfig};
use crate::types::{
    Impact, Probability, ProjectContext, RegulatoryComplexity, Requirement, ResourceAvailability,
    Risk, RiskCandidate, RiskCategory,
};

// -- Multipliers -----------------------------------------------------------

/// Technical risk over a requirement set heavy in high/critical complexity.
const COMPLEX_REQUIREMENTS_UPLIFT: f64 = 0.20;
/// Schedule risk under an aggressive timeline.
const AGGRESSIVE_TIMELINE_UPLIFT: f64 = 0.30;
/// Commercial risk under a constrained budget.
const CONSTRAINED_BUDGET_UPLIFT: f64 = 0.20;
/// Any risk when resources are limited.
const LIMITED_RESOURCES_UPLIFT: f64 = 0.15;
/// Compliance risk under high regulatory complexity.
const REGULATORY_UPLIFT: f64 = 0.25;

pub const MAX_RISK_SCORE: f64 = 5.0;

/// Unscaled probability × impact.
pub fn base_score(probability: Probability, impact: Impact) -> f64 {
    probability.weight() * f64::from(impact.weight())
}

/// Fraction of requirements with high or critical complexity (0 when empty).
pub fn high_complexity_share(requirements: &[Requirement]) -> f64 {
    if requirements.is_empty() {
        return 0.0;
    }
    let high = requirements
        .iter()
        .filter(|r| r.complexity().is_high())
        .count();
    high as f64 / requirements.len() as f64
}

// -- RiskScorer ------------------------------------------------------------

/// Scores candidates against one project context and requirement set.
#[derive(Debug, Clone)]
pub struct RiskScorer<'a> {
    context: &'a ProjectContext,
    scoring: &'a ScoringConfig,
    high_complexity_share: f64,
    budget_total: Option<Decimal>,
}

impl<'a> RiskScorer<'a> {
    pub fn new(
        context: &'a ProjectContext,
        requirements: &[Requirement],
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            context,
            scoring: &config.scoring,
            high_complexity_share: high_complexity_share(requirements),
            budget_total: context
                .budget
                .total
                .or(config.context_defaults.budget_total),
        }
    }

    /// Product of every multiplier whose condition holds for `category`.
    pub fn enhancement_factor(&self, category: RiskCategory) -> f64 {
        let ctx = self.context;
        let uplifts = [
            (
                category == RiskCategory::Technical
                    && self.high_complexity_share > self.scoring.complexity_share_threshold,
                COMPLEX_REQUIREMENTS_UPLIFT,
            ),
            (
                category == RiskCategory::Schedule && ctx.timeline.is_aggressive,
                AGGRESSIVE_TIMELINE_UPLIFT,
            ),
            (
                category == RiskCategory::Commercial && ctx.budget.is_constrained,
                CONSTRAINED_BUDGET_UPLIFT,
            ),
            (
                ctx.resources.availability == ResourceAvailability::Limited,
                LIMITED_RESOURCES_UPLIFT,
            ),
            (
                category == RiskCategory::Compliance
                    && ctx.regulatory_complexity == RegulatoryComplexity::High,
                REGULATORY_UPLIFT,
            ),
        ];

        uplifts
            .iter()
            .filter(|(triggered, _)| *triggered)
            .fold(1.0, |factor, (_, uplift)| factor * (1.0 + uplift))
    }

    pub fn score(&self, candidate: RiskCandidate) -> Risk {
        let base = base_score(candidate.probability(), candidate.impact());
        let factor = self.enhancement_factor(candidate.category());
        let risk_score = (base * factor).clamp(0.0, MAX_RISK_SCORE);

        let cost_impact = self
            .budget_total
            .map(|budget| budget * candidate.impact().cost_share());
        let schedule_impact_days = Some(candidate.impact().schedule_days());

        debug!(
            risk_id = candidate.id(),
            base, factor, risk_score, "scored risk"
        );
        Risk::scored(
            candidate,
            risk_score,
            factor,
            cost_impact,
            schedule_impact_days,
        )
    }

    pub fn score_all(&self, candidates: Vec<RiskCandidate>) -> Vec<Risk> {
        candidates.into_iter().map(|c| self.score(c)).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Complexity, Priority, RequirementType};
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    fn req(id: &str, complexity: Complexity) -> Requirement {
        Requirement::new(
            id,
            Priority::Mandatory,
            complexity,
            RequirementType::Technical,
            Vec::new(),
        )
        .expect("test: requirement")
    }

    fn candidate(category: RiskCategory, p: Probability, i: Impact) -> RiskCandidate {
        RiskCandidate::new("R-1", category, p, i)
    }

    #[test]
    fn plain_high_high_scores_2_8() {
        let ctx = ProjectContext::default();
        let config = EngineConfig::default();
        let scorer = RiskScorer::new(&ctx, &[], &config);
        let risk = scorer.score(candidate(
            RiskCategory::Compliance,
            Probability::High,
            Impact::High,
        ));
        assert_relative_eq!(risk.risk_score(), 2.8, epsilon = 1e-12);
        assert_eq!(risk.enhancement_factor(), 1.0);
    }

    #[test]
    fn regulatory_complexity_lifts_compliance_to_3_5() {
        let mut ctx = ProjectContext::default();
        ctx.regulatory_complexity = RegulatoryComplexity::High;
        let config = EngineConfig::default();
        let scorer = RiskScorer::new(&ctx, &[], &config);
        let risk = scorer.score(candidate(
            RiskCategory::Compliance,
            Probability::High,
            Impact::High,
        ));
        assert_relative_eq!(risk.enhancement_factor(), 1.25, epsilon = 1e-12);
        assert_relative_eq!(risk.risk_score(), 3.5, epsilon = 1e-12);
    }

    #[test]
    fn regulatory_flag_ignored_for_other_categories() {
        let mut ctx = ProjectContext::default();
        ctx.regulatory_complexity = RegulatoryComplexity::High;
        let config = EngineConfig::default();
        let scorer = RiskScorer::new(&ctx, &[], &config);
        assert_eq!(scorer.enhancement_factor(RiskCategory::Technical), 1.0);
    }

    #[test]
    fn multipliers_compound() {
        let mut ctx = ProjectContext::default();
        ctx.resources.availability = ResourceAvailability::Limited;
        ctx.timeline.is_aggressive = true;
        let config = EngineConfig::default();
        let scorer = RiskScorer::new(&ctx, &[], &config);
        assert_relative_eq!(
            scorer.enhancement_factor(RiskCategory::Schedule),
            1.3 * 1.15,
            epsilon = 1e-12
        );
        // resource limits apply to every category
        assert_relative_eq!(
            scorer.enhancement_factor(RiskCategory::External),
            1.15,
            epsilon = 1e-12
        );
    }

    #[test]
    fn complexity_share_must_exceed_threshold() {
        let ctx = ProjectContext::default();
        let config = EngineConfig::default();

        // 3 of 10 is exactly 30%: not more than 30%
        let mut reqs: Vec<Requirement> = (0..3)
            .map(|i| req(&format!("H{i}"), Complexity::Critical))
            .collect();
        reqs.extend((0..7).map(|i| req(&format!("L{i}"), Complexity::Low)));
        let scorer = RiskScorer::new(&ctx, &reqs, &config);
        assert_eq!(scorer.enhancement_factor(RiskCategory::Technical), 1.0);

        reqs.push(req("H3", Complexity::High));
        let scorer = RiskScorer::new(&ctx, &reqs, &config);
        assert_relative_eq!(
            scorer.enhancement_factor(RiskCategory::Technical),
            1.2,
            epsilon = 1e-12
        );
    }

    #[test]
    fn cap_applies_to_final_product() {
        let mut ctx = ProjectContext::default();
        ctx.budget.is_constrained = true;
        ctx.resources.availability = ResourceAvailability::Limited;
        let config = EngineConfig::default();
        let scorer = RiskScorer::new(&ctx, &[], &config);
        // 0.9 × 5 × 1.2 × 1.15 = 6.21
        let risk = scorer.score(candidate(
            RiskCategory::Commercial,
            Probability::VeryHigh,
            Impact::Critical,
        ));
        assert_eq!(risk.risk_score(), MAX_RISK_SCORE);
        assert_relative_eq!(risk.enhancement_factor(), 1.38, epsilon = 1e-12);
    }

    #[test]
    fn cost_and_schedule_follow_impact_tier() {
        let mut ctx = ProjectContext::default();
        ctx.budget.total = Some(dec!(200000));
        let config = EngineConfig::default();
        let scorer = RiskScorer::new(&ctx, &[], &config);
        let risk = scorer.score(candidate(
            RiskCategory::Technical,
            Probability::Low,
            Impact::High,
        ));
        assert_eq!(risk.cost_impact(), Some(dec!(60000)));
        assert_eq!(risk.schedule_impact_days(), Some(30.0));
    }

    #[test]
    fn budget_falls_back_to_config_default() {
        let ctx = ProjectContext::default();
        let config = EngineConfig::default();
        let scorer = RiskScorer::new(&ctx, &[], &config);
        let risk = scorer.score(candidate(
            RiskCategory::Schedule,
            Probability::Low,
            Impact::Negligible,
        ));
        assert_eq!(risk.cost_impact(), Some(dec!(10000)));

        let mut config = EngineConfig::default();
        config.context_defaults.budget_total = None;
        let scorer = RiskScorer::new(&ctx, &[], &config);
        let risk = scorer.score(candidate(
            RiskCategory::Schedule,
            Probability::Low,
            Impact::Negligible,
        ));
        assert_eq!(risk.cost_impact(), None);
    }

    #[test]
    fn base_score_range() {
        for p in Probability::ALL {
            for i in Impact::ALL {
                let s = base_score(*p, *i);
                assert!(s > 0.0 && s <= 4.5, "{p}/{i} -> {s}");
            }
        }
    }
}
