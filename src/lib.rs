// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Risk and dependency analysis engine.
//!
//! Turns raw requirement and risk candidate records into a dependency
//! structure (graph, cycles, levels) and a quantified risk picture (scores,
//! severity matrix, closed-form and Monte Carlo impact, mitigation,
//! contingency and monitoring plans). Every call is a pure function of its
//! inputs; nothing is cached between calls.

pub mod config;
pub mod dependency;
pub mod matrix;
pub mod mitigation;
pub mod normalizer;
pub mod planning;
pub mod scoring;
pub mod simulation;
pub mod summary;
pub mod types;

pub use config::{ConfigError, EngineConfig};
pub use dependency::{analyze_dependencies, DependencyAnalysisResult};
pub use matrix::{build_matrix, RiskMatrix, Severity};
pub use mitigation::{select_mitigations, MitigationBlock};
pub use normalizer::{
    normalize_requirements, normalize_risks, NormalizeError, NormalizedBatch, Rejection,
};
pub use planning::{ContingencyPlanning, MonitoringPlan};
pub use scoring::RiskScorer;
pub use simulation::{QuantitativeAnalysis, SimulationResult};
pub use summary::{
    summarize_requirements, traceability_matrix, RequirementSummary, TraceabilityMatrix,
};
pub use types::*;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

// ─── Risk analysis ──────────────────────────────────────────────────────────

/// Everything the risk half of the engine produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAnalysisResult {
    pub risks: Vec<Risk>,
    pub matrix: RiskMatrix,
    pub quantitative: QuantitativeAnalysis,
    pub mitigations: Vec<MitigationBlock>,
    pub contingency: ContingencyPlanning,
    pub monitoring: MonitoringPlan,
}

/// Score `candidates` against the project context, then bucket, quantify and
/// plan over the scored set.
pub fn analyze_risks(
    candidates: Vec<RiskCandidate>,
    requirements: &[Requirement],
    context: &ProjectContext,
    config: &EngineConfig,
) -> RiskAnalysisResult {
    let scorer = RiskScorer::new(context, requirements, config);
    let risks = scorer.score_all(candidates);

    let matrix = build_matrix(&risks, &config.matrix);
    let quantitative = simulation::quantify(&risks, &config.simulation);
    let mitigations = select_mitigations(&risks, &config.matrix);
    let contingency = planning::plan_contingencies(&risks, &config.matrix);
    let monitoring = planning::plan_monitoring(&risks, &config.matrix);

    RiskAnalysisResult {
        risks,
        matrix,
        quantitative,
        mitigations,
        contingency,
        monitoring,
    }
}

// ─── Full run ───────────────────────────────────────────────────────────────

/// Raw input of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisInput {
    pub requirements: Vec<Value>,
    pub risks: Vec<Value>,
    pub context: ProjectContext,
}

/// Counters for a single call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStatistics {
    pub requirements_accepted: usize,
    pub requirements_rejected: usize,
    pub risks_accepted: usize,
    pub risks_rejected: usize,
    pub dangling_references: usize,
    pub cycles: usize,
    /// Mean risk score of this call's risks (0 when there are none).
    pub average_risk_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub dependency: DependencyAnalysisResult,
    pub risk: RiskAnalysisResult,
    pub requirement_summary: RequirementSummary,
    pub rejected_requirements: Vec<Rejection>,
    pub rejected_risks: Vec<Rejection>,
    pub statistics: RunStatistics,
}

/// Normalize both batches, run the dependency and risk halves in parallel,
/// and merge the results. Fails only when `config` does not validate; bad
/// records are reported in the result.
pub fn analyze(
    input: &AnalysisInput,
    config: &EngineConfig,
) -> Result<AnalysisReport, ConfigError> {
    config.validate()?;
    let requirements = normalize_requirements(&input.requirements);
    let risks = normalize_risks(&input.risks);
    let accepted = &requirements.accepted;

    let risks_accepted = risks.accepted.len();
    let (dependency, risk) = rayon::join(
        || analyze_dependencies(accepted),
        || analyze_risks(risks.accepted, accepted, &input.context, config),
    );
    let requirement_summary = summarize_requirements(accepted);

    let statistics = RunStatistics {
        requirements_accepted: accepted.len(),
        requirements_rejected: requirements.rejected.len(),
        risks_accepted,
        risks_rejected: risks.rejected.len(),
        dangling_references: dependency.dangling_references.len(),
        cycles: dependency.cycles.len(),
        average_risk_score: risk.matrix.overall_metrics.average_score,
    };
    info!(
        requirements = statistics.requirements_accepted,
        risks = statistics.risks_accepted,
        rejected = statistics.requirements_rejected + statistics.risks_rejected,
        level = %risk.matrix.overall_metrics.risk_level,
        "analysis complete"
    );

    Ok(AnalysisReport {
        dependency,
        risk,
        requirement_summary,
        rejected_requirements: requirements.rejected,
        rejected_risks: risks.rejected,
        statistics,
    })
}
