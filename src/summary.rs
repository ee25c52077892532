// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Requirement-set summary: breakdowns, set-level risk score, traceability
//! matrix and critical success factors.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::{Complexity, Priority, Requirement, RequirementType};

/// Normalizes priority_weight × complexity_weight into [0, 1].
const MAX_REQUIREMENT_WEIGHT: f64 = 12.0;
/// Dependency count above which a requirement is called interconnected.
const INTERCONNECTED_DEPENDENCIES: usize = 3;
/// Section key for requirements that carry no section.
const UNKNOWN_SECTION: &str = "unknown";

fn priority_weight(priority: Priority) -> f64 {
    match priority {
        Priority::Mandatory => 3.0,
        Priority::Important => 2.0,
        Priority::Preferred => 1.5,
        Priority::Optional => 1.0,
    }
}

fn complexity_weight(complexity: Complexity) -> f64 {
    match complexity {
        Complexity::Low => 1.0,
        Complexity::Medium => 2.0,
        Complexity::High => 3.0,
        Complexity::Critical => 4.0,
    }
}

// ─── Verification ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    FunctionalTesting,
    IntegrationTesting,
    TechnicalReviewAndTesting,
    PerformanceTesting,
    SecurityAuditAndPenetrationTesting,
    ComplianceAuditAndDocumentationReview,
    ReviewAndAcceptanceTesting,
}

impl VerificationMethod {
    pub fn for_requirement(requirement: &Requirement) -> Self {
        match requirement.requirement_type() {
            RequirementType::Functional if requirement.complexity().is_high() => {
                VerificationMethod::IntegrationTesting
            }
            RequirementType::Functional => VerificationMethod::FunctionalTesting,
            RequirementType::Technical => VerificationMethod::TechnicalReviewAndTesting,
            RequirementType::Performance => VerificationMethod::PerformanceTesting,
            RequirementType::Security => VerificationMethod::SecurityAuditAndPenetrationTesting,
            RequirementType::Compliance => VerificationMethod::ComplianceAuditAndDocumentationReview,
            RequirementType::Business | RequirementType::Operational => {
                VerificationMethod::ReviewAndAcceptanceTesting
            }
        }
    }
}

// ─── Traceability ───────────────────────────────────────────────────────────

/// Requirement ids grouped by section, type and priority. Every id list keeps
/// input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TraceabilityMatrix {
    pub requirements_by_section: BTreeMap<String, Vec<String>>,
    pub type_mapping: BTreeMap<RequirementType, Vec<String>>,
    pub priority_mapping: BTreeMap<Priority, Vec<String>>,
    pub verification_methods: BTreeMap<String, VerificationMethod>,
}

pub fn traceability_matrix(requirements: &[Requirement]) -> TraceabilityMatrix {
    let mut matrix = TraceabilityMatrix::default();
    for r in requirements {
        let id = r.id().to_string();
        matrix
            .requirements_by_section
            .entry(r.section().unwrap_or(UNKNOWN_SECTION).to_string())
            .or_default()
            .push(id.clone());
        matrix
            .type_mapping
            .entry(r.requirement_type())
            .or_default()
            .push(id.clone());
        matrix
            .priority_mapping
            .entry(r.priority())
            .or_default()
            .push(id.clone());
        matrix
            .verification_methods
            .insert(id, VerificationMethod::for_requirement(r));
    }
    matrix
}

// ─── Success factors ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SuccessFactor {
    /// Mandatory and high or critical complexity.
    HighRiskRequirement {
        requirement_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// Among the top fifth of requirements by declared dependency count.
    HighDependencyRequirement {
        requirement_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        dependency_count: usize,
    },
    /// Mandatory compliance requirement.
    ComplianceRequirement {
        requirement_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl SuccessFactor {
    pub fn requirement_id(&self) -> &str {
        match self {
            SuccessFactor::HighRiskRequirement { requirement_id, .. }
            | SuccessFactor::HighDependencyRequirement { requirement_id, .. }
            | SuccessFactor::ComplianceRequirement { requirement_id, .. } => requirement_id,
        }
    }
}

pub fn critical_success_factors(requirements: &[Requirement]) -> Vec<SuccessFactor> {
    let describe = |r: &Requirement| r.text().map(str::to_string);
    let mut factors: Vec<SuccessFactor> = requirements
        .iter()
        .filter(|r| r.priority() == Priority::Mandatory && r.complexity().is_high())
        .map(|r| SuccessFactor::HighRiskRequirement {
            requirement_id: r.id().to_string(),
            description: describe(r),
        })
        .collect();

    let mut counts: Vec<usize> = requirements
        .iter()
        .map(|r| r.dependencies().len())
        .filter(|&n| n > 0)
        .collect();
    if !counts.is_empty() {
        counts.sort_unstable_by(|a, b| b.cmp(a));
        let cutoff = counts[counts.len() / 5];
        factors.extend(
            requirements
                .iter()
                .filter(|r| !r.dependencies().is_empty() && r.dependencies().len() >= cutoff)
                .map(|r| SuccessFactor::HighDependencyRequirement {
                    requirement_id: r.id().to_string(),
                    description: describe(r),
                    dependency_count: r.dependencies().len(),
                }),
        );
    }

    factors.extend(
        requirements
            .iter()
            .filter(|r| {
                r.requirement_type() == RequirementType::Compliance
                    && r.priority() == Priority::Mandatory
            })
            .map(|r| SuccessFactor::ComplianceRequirement {
                requirement_id: r.id().to_string(),
                description: describe(r),
            }),
    );
    factors
}

// ─── Summary ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementSummary {
    pub total_requirements: usize,
    pub type_breakdown: BTreeMap<RequirementType, usize>,
    pub priority_breakdown: BTreeMap<Priority, usize>,
    pub complexity_breakdown: BTreeMap<Complexity, usize>,
    /// 0-100.
    pub high_complexity_percentage: f64,
    /// 0-100.
    pub mandatory_percentage: f64,
    /// Mean of priority_weight × complexity_weight / 12, capped at 1.
    pub risk_score: f64,
    pub traceability: TraceabilityMatrix,
    pub critical_success_factors: Vec<SuccessFactor>,
    pub recommendations: Vec<&'static str>,
}

pub fn summarize_requirements(requirements: &[Requirement]) -> RequirementSummary {
    let mut type_breakdown = BTreeMap::new();
    let mut priority_breakdown = BTreeMap::new();
    let mut complexity_breakdown = BTreeMap::new();
    for r in requirements {
        *type_breakdown.entry(r.requirement_type()).or_insert(0) += 1;
        *priority_breakdown.entry(r.priority()).or_insert(0) += 1;
        *complexity_breakdown.entry(r.complexity()).or_insert(0) += 1;
    }

    let total = requirements.len();
    let denominator = total.max(1) as f64;
    let high_complexity = requirements
        .iter()
        .filter(|r| r.complexity().is_high())
        .count();
    let mandatory = priority_breakdown
        .get(&Priority::Mandatory)
        .copied()
        .unwrap_or(0);

    let risk_score = if total == 0 {
        0.0
    } else {
        let sum: f64 = requirements
            .iter()
            .map(|r| {
                priority_weight(r.priority()) * complexity_weight(r.complexity())
                    / MAX_REQUIREMENT_WEIGHT
            })
            .sum();
        (sum / total as f64).min(1.0)
    };

    let mut recommendations = Vec::new();
    if high_complexity as f64 > total as f64 * 0.3 {
        recommendations.push(
            "Consider phased implementation approach due to high number of complex requirements",
        );
    }
    if requirements
        .iter()
        .any(|r| r.dependencies().len() > INTERCONNECTED_DEPENDENCIES)
    {
        recommendations.push(
            "Prioritize dependency management and coordination for interconnected requirements",
        );
    }
    if type_breakdown.contains_key(&RequirementType::Compliance) {
        recommendations
            .push("Establish compliance validation checkpoints throughout development");
    }
    if mandatory as f64 > total as f64 * 0.7 {
        recommendations
            .push("Allocate additional resources for high number of mandatory requirements");
    }

    RequirementSummary {
        total_requirements: total,
        type_breakdown,
        priority_breakdown,
        complexity_breakdown,
        high_complexity_percentage: high_complexity as f64 / denominator * 100.0,
        mandatory_percentage: mandatory as f64 / denominator * 100.0,
        risk_score,
        traceability: traceability_matrix(requirements),
        critical_success_factors: critical_success_factors(requirements),
        recommendations,
    }
}
