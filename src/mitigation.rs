// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Mitigation strategy selection.
//!
//! Risks are grouped by category in first-seen order. A category gets a block
//! only when at least one member reaches the high threshold; the block
//! carries that category's canned approaches, up to three priority actions
//! and a resource estimate. A cross-cutting block closes every list.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Serialize, Serializer};

use crate::config::SeverityThresholds;
use crate::types::{Risk, RiskCategory};

/// Extra mitigation budget per risk in a flagged category.
const BUDGET_PER_RISK: Decimal = dec!(5000);
/// Extra mitigation days per risk in a flagged category.
const DAYS_PER_RISK: u32 = 2;
const MAX_PRIORITY_ACTIONS: usize = 3;

// ---------------------------------------------------------------------------
// Canned approaches
// ---------------------------------------------------------------------------

const TECHNICAL: &[&str] = &[
    "Conduct early proof-of-concept development",
    "Implement robust testing and validation processes",
    "Plan for technical architecture reviews",
    "Establish fallback technical solutions",
];

const SCHEDULE: &[&str] = &[
    "Build schedule buffers for critical path items",
    "Implement agile project management practices",
    "Plan for resource augmentation if needed",
    "Establish milestone review and adjustment processes",
];

const COMMERCIAL: &[&str] = &[
    "Negotiate favorable contract terms and conditions",
    "Establish cost monitoring and control processes",
    "Plan for budget contingencies",
    "Diversify vendor and supplier relationships",
];

const COMPETITIVE: &[&str] = &[
    "Develop unique value propositions and differentiators",
    "Monitor competitive landscape continuously",
    "Build strong customer relationships",
    "Focus on solution quality and innovation",
];

const COMPLIANCE: &[&str] = &[
    "Engage compliance experts early in project",
    "Plan for regulatory review and approval cycles",
    "Establish audit trail and documentation processes",
    "Monitor regulatory changes and updates",
];

const OPERATIONAL: &[&str] = &[
    "Map operational skill gaps and schedule targeted training",
    "Define support and handover procedures before go-live",
    "Plan organizational change management with affected teams",
    "Add quality assurance checkpoints to operational workflows",
];

const GENERIC: &[&str] = &[
    "Regular monitoring and review processes",
    "Stakeholder communication and engagement",
    "Proactive risk management practices",
];

const CROSS_CUTTING_APPROACHES: &[&str] = &[
    "Establish regular risk monitoring and review processes",
    "Implement risk escalation procedures",
    "Create risk communication plan for stakeholders",
    "Develop risk response team with clear responsibilities",
];

const CROSS_CUTTING_ACTIONS: &[&str] = &[
    "Schedule weekly risk review meetings",
    "Create risk dashboard for real-time monitoring",
    "Establish risk thresholds for escalation",
];

/// Canned strategic approaches for a category.
pub fn category_strategies(category: RiskCategory) -> &'static [&'static str] {
    match category {
        RiskCategory::Technical => TECHNICAL,
        RiskCategory::Schedule => SCHEDULE,
        RiskCategory::Commercial => COMMERCIAL,
        RiskCategory::Competitive => COMPETITIVE,
        RiskCategory::Compliance => COMPLIANCE,
        RiskCategory::Operational => OPERATIONAL,
        RiskCategory::Resource | RiskCategory::External => GENERIC,
    }
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// What a block covers: one risk category, or the whole risk set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MitigationScope {
    Category(RiskCategory),
    CrossCutting,
}

impl MitigationScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            MitigationScope::Category(category) => category.as_str(),
            MitigationScope::CrossCutting => "cross_cutting",
        }
    }
}

impl Serialize for MitigationScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MitigationResources {
    pub additional_budget: Decimal,
    pub additional_days: u32,
}

impl MitigationResources {
    fn for_risk_count(count: usize) -> Self {
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        Self {
            additional_budget: BUDGET_PER_RISK * Decimal::from(count),
            additional_days: count.saturating_mul(DAYS_PER_RISK),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MitigationBlock {
    pub category: MitigationScope,
    pub risk_count: usize,
    pub high_impact_count: usize,
    pub strategic_approaches: &'static [&'static str],
    pub priority_actions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_requirements: Option<MitigationResources>,
}

pub fn select_mitigations(risks: &[Risk], thresholds: &SeverityThresholds) -> Vec<MitigationBlock> {
    let is_high = |r: &&Risk| r.risk_score() >= thresholds.high;

    let mut order: Vec<RiskCategory> = Vec::new();
    for risk in risks {
        if !order.contains(&risk.category()) {
            order.push(risk.category());
        }
    }

    let mut blocks: Vec<MitigationBlock> = order
        .into_iter()
        .filter_map(|category| {
            let members: Vec<&Risk> = risks.iter().filter(|r| r.category() == category).collect();
            let mut high: Vec<&Risk> = members.iter().copied().filter(is_high).collect();
            if high.is_empty() {
                return None;
            }
            high.sort_by(|a, b| b.risk_score().total_cmp(&a.risk_score()));

            let priority_actions = high
                .iter()
                .take(MAX_PRIORITY_ACTIONS)
                .filter_map(|r| r.candidate().mitigation_strategies().first().cloned())
                .collect();

            Some(MitigationBlock {
                category: MitigationScope::Category(category),
                risk_count: members.len(),
                high_impact_count: high.len(),
                strategic_approaches: category_strategies(category),
                priority_actions,
                resource_requirements: Some(MitigationResources::for_risk_count(members.len())),
            })
        })
        .collect();

    blocks.push(MitigationBlock {
        category: MitigationScope::CrossCutting,
        risk_count: risks.len(),
        high_impact_count: risks.iter().filter(is_high).count(),
        strategic_approaches: CROSS_CUTTING_APPROACHES,
        priority_actions: CROSS_CUTTING_ACTIONS.iter().map(|s| s.to_string()).collect(),
        resource_requirements: None,
    });
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Impact, Probability, RiskCandidate};

    fn risk(id: &str, category: RiskCategory, score: f64, first_strategy: Option<&str>) -> Risk {
        let candidate = RiskCandidate::new(id, category, Probability::High, Impact::High)
            .with_mitigation_strategies(
                first_strategy
                    .map(|s| vec![s.to_string(), format!("{id} secondary")])
                    .unwrap_or_default(),
            );
        Risk::scored(candidate, score, 1.0, None, Some(30.0))
    }

    #[test]
    fn only_categories_with_high_members_are_emitted() {
        let risks = vec![
            risk("T1", RiskCategory::Technical, 3.5, Some("prototype")),
            risk("S1", RiskCategory::Schedule, 2.9, Some("buffer")),
            risk("T2", RiskCategory::Technical, 1.0, Some("ignored")),
        ];
        let blocks = select_mitigations(&risks, &SeverityThresholds::default());
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].category, MitigationScope::Category(RiskCategory::Technical));
        assert_eq!(blocks[0].risk_count, 2);
        assert_eq!(blocks[0].high_impact_count, 1);
        assert_eq!(blocks[0].priority_actions, vec!["prototype"]);
        assert_eq!(blocks[0].strategic_approaches, TECHNICAL);
        assert_eq!(blocks[1].category, MitigationScope::CrossCutting);
    }

    #[test]
    fn priority_actions_follow_score_order_and_cap_at_three() {
        let risks = vec![
            risk("C1", RiskCategory::Compliance, 3.1, Some("c1")),
            risk("C2", RiskCategory::Compliance, 4.8, Some("c2")),
            risk("C3", RiskCategory::Compliance, 3.9, None),
            risk("C4", RiskCategory::Compliance, 4.1, Some("c4")),
            risk("C5", RiskCategory::Compliance, 3.0, Some("c5")),
        ];
        let blocks = select_mitigations(&risks, &SeverityThresholds::default());
        // top three by score are C2, C4, C3; C3 has nothing to offer
        assert_eq!(blocks[0].priority_actions, vec!["c2", "c4"]);
        assert_eq!(blocks[0].high_impact_count, 5);
    }

    #[test]
    fn cross_cutting_block_always_present() {
        let blocks = select_mitigations(&[], &SeverityThresholds::default());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].category.as_str(), "cross_cutting");
        assert_eq!(blocks[0].priority_actions.len(), 3);
        assert!(blocks[0].resource_requirements.is_none());
    }

    #[test]
    fn resources_scale_with_category_size() {
        let risks = vec![
            risk("O1", RiskCategory::Operational, 3.2, None),
            risk("O2", RiskCategory::Operational, 0.5, None),
            risk("O3", RiskCategory::Operational, 0.5, None),
        ];
        let blocks = select_mitigations(&risks, &SeverityThresholds::default());
        let resources = blocks[0].resource_requirements.as_ref().expect("test: resources");
        assert_eq!(resources.additional_budget, dec!(15000));
        assert_eq!(resources.additional_days, 6);
        assert_eq!(blocks[0].strategic_approaches, OPERATIONAL);
    }

    #[test]
    fn unlisted_categories_use_generic_approaches() {
        assert_eq!(category_strategies(RiskCategory::External), GENERIC);
        assert_eq!(category_strategies(RiskCategory::Resource), GENERIC);
        assert_ne!(category_strategies(RiskCategory::Operational), GENERIC);
    }

    #[test]
    fn scope_serializes_as_plain_string() {
        let blocks = select_mitigations(
            &[risk("X", RiskCategory::Schedule, 4.0, Some("crash the schedule"))],
            &SeverityThresholds::default(),
        );
        let json = serde_json::to_value(&blocks).expect("test: serialize");
        assert_eq!(json[0]["category"], "schedule");
        assert_eq!(json[0]["resource_requirements"]["additional_days"], 2);
        assert_eq!(json[1]["category"], "cross_cutting");
        assert!(json[1].get("resource_requirements").is_none());
    }
}
