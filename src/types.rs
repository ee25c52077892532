// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Canonical entity shapes for requirements, risks and project context.
//!
//! Every categorical field is a closed enum. Entities are built either by the
//! normalizer (from untyped candidate records) or through the validating
//! constructors below, and are read-only afterwards.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::normalizer::NormalizeError;

// ─── Vocabularies ───────────────────────────────────────────────────────────

/// A closed set of categorical values with fixed wire names.
pub trait Vocabulary: Sized {
    /// Look up a variant by its exact wire name.
    fn from_wire(s: &str) -> Option<Self>;
}

/// Declares a closed string vocabulary: the enum, its wire names, and its
/// [`Vocabulary`] lookup.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }

        }

        impl Vocabulary for $name {
            fn from_wire(s: &str) -> Option<Self> {
                match s {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary! {
    /// How binding a requirement is.
    pub enum Priority {
        Mandatory => "mandatory",
        Important => "important",
        Optional => "optional",
        Preferred => "preferred",
    }
}

vocabulary! {
    /// Implementation difficulty of a requirement.
    pub enum Complexity {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

vocabulary! {
    pub enum RequirementType {
        Functional => "functional",
        Technical => "technical",
        Compliance => "compliance",
        Performance => "performance",
        Security => "security",
        Business => "business",
        Operational => "operational",
    }
}

vocabulary! {
    pub enum RiskCategory {
        Technical => "technical",
        Schedule => "schedule",
        Commercial => "commercial",
        Competitive => "competitive",
        Operational => "operational",
        Compliance => "compliance",
        Resource => "resource",
        External => "external",
    }
}

vocabulary! {
    /// Likelihood that a risk materializes.
    pub enum Probability {
        VeryLow => "very_low",
        Low => "low",
        Medium => "medium",
        High => "high",
        VeryHigh => "very_high",
    }
}

vocabulary! {
    /// Consequence of a risk if it materializes.
    pub enum Impact {
        Negligible => "negligible",
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

impl Complexity {
    pub fn is_high(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl Probability {
    /// Numeric likelihood in (0, 1).
    pub fn weight(&self) -> f64 {
        match self {
            Self::VeryLow => 0.1,
            Self::Low => 0.3,
            Self::Medium => 0.5,
            Self::High => 0.7,
            Self::VeryHigh => 0.9,
        }
    }

    /// Exact decimal twin of [`weight`](Self::weight) for money arithmetic.
    pub fn weight_decimal(&self) -> Decimal {
        match self {
            Self::VeryLow => dec!(0.1),
            Self::Low => dec!(0.3),
            Self::Medium => dec!(0.5),
            Self::High => dec!(0.7),
            Self::VeryHigh => dec!(0.9),
        }
    }
}

impl Impact {
    /// Integer severity weight, 1 (negligible) through 5 (critical).
    pub fn weight(&self) -> u8 {
        match self {
            Self::Negligible => 1,
            Self::Low => 2,
            Self::Medium => 3,
            Self::High => 4,
            Self::Critical => 5,
        }
    }

    /// Fraction of the project budget lost if the risk materializes.
    pub fn cost_share(&self) -> Decimal {
        match self {
            Self::Negligible => dec!(0.01),
            Self::Low => dec!(0.05),
            Self::Medium => dec!(0.15),
            Self::High => dec!(0.30),
            Self::Critical => dec!(0.50),
        }
    }

    /// Schedule slip in days if the risk materializes.
    pub fn schedule_days(&self) -> f64 {
        match self {
            Self::Negligible => 1.0,
            Self::Low => 5.0,
            Self::Medium => 15.0,
            Self::High => 30.0,
            Self::Critical => 60.0,
        }
    }
}

// ─── Requirement ────────────────────────────────────────────────────────────

/// A validated requirement. Never depends on itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Requirement {
    id: String,
    priority: Priority,
    complexity: Complexity,
    #[serde(rename = "type")]
    requirement_type: RequirementType,
    dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    section: Option<String>,
}

impl Requirement {
    /// Build a requirement, rejecting a dependency list that names `id`.
    pub fn new(
        id: impl Into<String>,
        priority: Priority,
        complexity: Complexity,
        requirement_type: RequirementType,
        dependencies: Vec<String>,
    ) -> Result<Self, NormalizeError> {
        let id = id.into();
        if dependencies.iter().any(|dep| *dep == id) {
            return Err(NormalizeError::SelfDependency { id });
        }
        Ok(Self {
            id,
            priority,
            complexity,
            requirement_type,
            dependencies,
            text: None,
            section: None,
        })
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn complexity(&self) -> Complexity {
        self.complexity
    }

    pub fn requirement_type(&self) -> RequirementType {
        self.requirement_type
    }

    /// Declared dependency ids in input order; may name ids outside the batch.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }
}

// ─── Risk candidate ─────────────────────────────────────────────────────────

/// A validated but unscored risk. Free-text lists are carried verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskCandidate {
    id: String,
    category: RiskCategory,
    probability: Probability,
    impact: Impact,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<String>,
    mitigation_strategies: Vec<String>,
    contingency_plans: Vec<String>,
    early_warning_signs: Vec<String>,
}

impl RiskCandidate {
    pub fn new(
        id: impl Into<String>,
        category: RiskCategory,
        probability: Probability,
        impact: Impact,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            probability,
            impact,
            title: None,
            description: None,
            owner: None,
            mitigation_strategies: Vec::new(),
            contingency_plans: Vec::new(),
            early_warning_signs: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_mitigation_strategies(mut self, strategies: Vec<String>) -> Self {
        self.mitigation_strategies = strategies;
        self
    }

    pub fn with_contingency_plans(mut self, plans: Vec<String>) -> Self {
        self.contingency_plans = plans;
        self
    }

    pub fn with_early_warning_signs(mut self, signs: Vec<String>) -> Self {
        self.early_warning_signs = signs;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> RiskCategory {
        self.category
    }

    pub fn probability(&self) -> Probability {
        self.probability
    }

    pub fn impact(&self) -> Impact {
        self.impact
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn mitigation_strategies(&self) -> &[String] {
        &self.mitigation_strategies
    }

    pub fn contingency_plans(&self) -> &[String] {
        &self.contingency_plans
    }

    pub fn early_warning_signs(&self) -> &[String] {
        &self.early_warning_signs
    }
}

// ─── Scored risk ────────────────────────────────────────────────────────────

/// A risk with its score and derived impacts. Only the scorer builds these.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Risk {
    #[serde(flatten)]
    candidate: RiskCandidate,
    risk_score: f64,
    enhancement_factor: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    cost_impact: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule_impact_days: Option<f64>,
}

impl Risk {
    pub(crate) fn scored(
        candidate: RiskCandidate,
        risk_score: f64,
        enhancement_factor: f64,
        cost_impact: Option<Decimal>,
        schedule_impact_days: Option<f64>,
    ) -> Self {
        Self {
            candidate,
            risk_score,
            enhancement_factor,
            cost_impact,
            schedule_impact_days,
        }
    }

    pub fn candidate(&self) -> &RiskCandidate {
        &self.candidate
    }

    pub fn id(&self) -> &str {
        self.candidate.id()
    }

    pub fn category(&self) -> RiskCategory {
        self.candidate.category()
    }

    pub fn probability(&self) -> Probability {
        self.candidate.probability()
    }

    pub fn impact(&self) -> Impact {
        self.candidate.impact()
    }

    /// Score in [0, 5].
    pub fn risk_score(&self) -> f64 {
        self.risk_score
    }

    pub fn enhancement_factor(&self) -> f64 {
        self.enhancement_factor
    }

    pub fn cost_impact(&self) -> Option<Decimal> {
        self.cost_impact
    }

    pub fn schedule_impact_days(&self) -> Option<f64> {
        self.schedule_impact_days
    }
}

// ─── Project context ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceAvailability {
    #[default]
    Adequate,
    Limited,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegulatoryComplexity {
    #[default]
    Low,
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetContext {
    pub is_constrained: bool,
    /// Total project budget; cost impacts are fractions of it.
    pub total: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineContext {
    pub is_aggressive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceContext {
    pub availability: ResourceAvailability,
}

/// Caller-supplied project facts. The sole source of the scorer's
/// contextual flags; nothing here is inferred from free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectContext {
    pub budget: BudgetContext,
    pub timeline: TimelineContext,
    pub resources: ResourceContext,
    pub regulatory_complexity: RegulatoryComplexity,
}

// ─── Tests ──────────────────────────────────────────────────────────────────
