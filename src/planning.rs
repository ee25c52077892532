// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Contingency and monitoring plans derived from the scored risk set.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::SeverityThresholds;
use crate::matrix::Severity;
use crate::types::Risk;

/// Share of high-impact cost exposure held back as contingency.
const CONTINGENCY_SHARE: Decimal = dec!(0.20);

// ─── Contingency ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAuthority {
    ExecutiveSponsor,
    ProjectManager,
    TeamLead,
}

impl DecisionAuthority {
    pub fn for_score(score: f64, thresholds: &SeverityThresholds) -> Self {
        if score >= thresholds.critical {
            DecisionAuthority::ExecutiveSponsor
        } else if score >= thresholds.high {
            DecisionAuthority::ProjectManager
        } else {
            DecisionAuthority::TeamLead
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContingencyReserves {
    pub budget_reserve: Option<Decimal>,
    pub time_reserve_days: Option<f64>,
}

/// Who hears about an activated contingency, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommunicationPlan {
    pub immediate_notification: &'static str,
    pub detailed_briefing: &'static str,
    pub regular_updates: &'static str,
    pub resolution_communication: &'static str,
}

pub const COMMUNICATION_PLAN: CommunicationPlan = CommunicationPlan {
    immediate_notification: "Project team, key stakeholders",
    detailed_briefing: "Executive sponsor, client representative",
    regular_updates: "Weekly status reports, risk dashboard",
    resolution_communication: "All stakeholders, lessons learned",
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioPlanning {
    pub best_case: &'static str,
    pub most_likely: &'static str,
    pub worst_case: &'static str,
    pub contingency_budget: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContingencyPlan {
    pub risk_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_title: Option<String>,
    pub trigger_conditions: Vec<String>,
    /// The risk's own contingency plans, verbatim.
    pub response_actions: Vec<String>,
    pub reserves: ContingencyReserves,
    pub decision_authority: DecisionAuthority,
    pub communication_plan: CommunicationPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContingencyPlanning {
    pub critical_risk_plans: Vec<ContingencyPlan>,
    /// 20% of the summed cost impact of every high or critical risk.
    pub recommended_contingency: Decimal,
    pub scenario_planning: ScenarioPlanning,
}

fn trigger_conditions(risk: &Risk) -> Vec<String> {
    vec![
        "Risk probability exceeds 70%".to_string(),
        "Early warning signs detected".to_string(),
        format!("Impact assessment confirms {} level", risk.impact()),
        "Mitigation strategies prove insufficient".to_string(),
    ]
}

pub fn plan_contingencies(risks: &[Risk], thresholds: &SeverityThresholds) -> ContingencyPlanning {
    let critical_risk_plans = risks
        .iter()
        .filter(|r| r.risk_score() >= thresholds.critical)
        .map(|r| ContingencyPlan {
            risk_id: r.id().to_string(),
            risk_title: r.candidate().title().map(str::to_string),
            trigger_conditions: trigger_conditions(r),
            response_actions: r.candidate().contingency_plans().to_vec(),
            reserves: ContingencyReserves {
                budget_reserve: r.cost_impact(),
                time_reserve_days: r.schedule_impact_days(),
            },
            decision_authority: DecisionAuthority::for_score(r.risk_score(), thresholds),
            communication_plan: COMMUNICATION_PLAN,
        })
        .collect();

    let high_impact_cost: Decimal = risks
        .iter()
        .filter(|r| r.risk_score() >= thresholds.high)
        .filter_map(Risk::cost_impact)
        .sum();

    let recommended_contingency = high_impact_cost * CONTINGENCY_SHARE;
    ContingencyPlanning {
        critical_risk_plans,
        recommended_contingency,
        scenario_planning: ScenarioPlanning {
            best_case: "Few risks materialize, project proceeds smoothly",
            most_likely: "Some medium risks occur, manageable with standard mitigation",
            worst_case: "Multiple high-impact risks materialize simultaneously",
            contingency_budget: recommended_contingency,
        },
    }
}

// ─── Monitoring ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    Daily,
    Weekly,
    BiWeekly,
    Monthly,
}

impl Cadence {
    pub fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Critical => Cadence::Daily,
            Severity::High => Cadence::Weekly,
            Severity::Medium => Cadence::BiWeekly,
            Severity::Low => Cadence::Monthly,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyRiskIndicator {
    pub risk_id: String,
    /// An early warning sign of the risk, verbatim.
    pub indicator: String,
    pub measurement: &'static str,
    pub threshold: &'static str,
    pub review: Cadence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportingStructure {
    pub risk_dashboard: &'static str,
    pub weekly_reports: &'static str,
    pub monthly_reports: &'static str,
    pub escalation_reports: &'static str,
}

pub const REPORTING_STRUCTURE: ReportingStructure = ReportingStructure {
    risk_dashboard: "Real-time risk status visualization",
    weekly_reports: "Risk status summary for project team",
    monthly_reports: "Comprehensive risk analysis for stakeholders",
    escalation_reports: "Immediate notification for critical risk events",
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitoringPlan {
    pub frequency: BTreeMap<Severity, Cadence>,
    pub key_risk_indicators: Vec<KeyRiskIndicator>,
    pub reporting_structure: ReportingStructure,
}

pub fn plan_monitoring(risks: &[Risk], thresholds: &SeverityThresholds) -> MonitoringPlan {
    let frequency = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ]
    .into_iter()
    .map(|s| (s, Cadence::for_severity(s)))
    .collect();

    let key_risk_indicators = risks
        .iter()
        .filter(|r| r.risk_score() >= thresholds.high)
        .flat_map(|r| {
            r.candidate()
                .early_warning_signs()
                .iter()
                .map(move |sign| KeyRiskIndicator {
                    risk_id: r.id().to_string(),
                    indicator: sign.clone(),
                    measurement: "Qualitative assessment",
                    threshold: "Any occurrence",
                    review: Cadence::Weekly,
                })
        })
        .collect();

    MonitoringPlan {
        frequency,
        key_risk_indicators,
        reporting_structure: REPORTING_STRUCTURE,
    }
}
