// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Quantitative risk analysis.
//!
//! Two independent views over one scored risk set:
//!
//! - a closed-form expectation of cost and schedule impact, with a fixed
//!   ×1.5 "at risk" multiplier (a linear approximation, not a percentile);
//! - a Monte Carlo run. Per trial, each risk fires when a uniform draw in
//!   [0, 1) falls below its probability weight and then adds
//!   `impact_weight × U(0.5, 1.5)` to the trial total.
//!
//! Trials can be sharded over rayon workers. Shards return raw totals which
//! are concatenated and summarized once; per-shard percentiles are never
//! combined.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::debug;

use crate::config::SimulationConfig;
use crate::types::Risk;

/// Multiplier behind the `*_at_risk_p90` approximations.
const AT_RISK_MULTIPLIER: f64 = 1.5;
const AT_RISK_MULTIPLIER_DEC: Decimal = dec!(1.5);

/// Range of the multiplicative noise applied to a fired risk.
const NOISE_LOW: f64 = 0.5;
const NOISE_HIGH: f64 = 1.5;

// ─── Closed form ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedFormEstimate {
    /// Σ p(r) × cost_impact(r) over risks with a cost impact.
    pub expected_cost_impact: Decimal,
    pub cost_at_risk_p90: Decimal,
    pub cost_risk_count: usize,
    /// Σ p(r) × schedule_impact_days(r), in days.
    pub expected_schedule_delay: f64,
    pub schedule_at_risk_p90: f64,
    pub schedule_risk_count: usize,
}

pub fn closed_form(risks: &[Risk]) -> ClosedFormEstimate {
    let mut expected_cost_impact = Decimal::ZERO;
    let mut cost_risk_count = 0;
    let mut expected_schedule_delay = 0.0;
    let mut schedule_risk_count = 0;

    for risk in risks {
        if let Some(cost) = risk.cost_impact().filter(|c| !c.is_zero()) {
            expected_cost_impact += risk.probability().weight_decimal() * cost;
            cost_risk_count += 1;
        }
        if let Some(days) = risk.schedule_impact_days().filter(|d| *d > 0.0) {
            expected_schedule_delay += risk.probability().weight() * days;
            schedule_risk_count += 1;
        }
    }

    ClosedFormEstimate {
        expected_cost_impact,
        cost_at_risk_p90: expected_cost_impact * AT_RISK_MULTIPLIER_DEC,
        cost_risk_count,
        expected_schedule_delay,
        schedule_at_risk_p90: expected_schedule_delay * AT_RISK_MULTIPLIER,
        schedule_risk_count,
    }
}

// ─── Exposure ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ExposureLevel {
    pub fn from_average(average: f64) -> Self {
        if average >= 3.0 {
            ExposureLevel::VeryHigh
        } else if average >= 2.0 {
            ExposureLevel::High
        } else if average >= 1.0 {
            ExposureLevel::Medium
        } else {
            ExposureLevel::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskExposure {
    /// Σ p(r) × impact_weight(r); context multipliers do not apply.
    pub total_exposure: f64,
    pub average_exposure: f64,
    pub exposure_level: ExposureLevel,
}

pub fn exposure(risks: &[Risk]) -> RiskExposure {
    let total_exposure: f64 = risks.iter().map(expected_weight).sum();
    let average_exposure = total_exposure / risks.len().max(1) as f64;
    RiskExposure {
        total_exposure,
        average_exposure,
        exposure_level: ExposureLevel::from_average(average_exposure),
    }
}

fn expected_weight(risk: &Risk) -> f64 {
    risk.probability().weight() * f64::from(risk.impact().weight())
}

// ─── Monte Carlo ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub mean_impact: f64,
    pub p50_impact: f64,
    pub p90_impact: f64,
    pub p95_impact: f64,
    pub max_impact: f64,
    /// Trials actually run (0 when there was nothing to simulate).
    pub iterations: usize,
}

impl SimulationResult {
    pub fn empty() -> Self {
        Self {
            mean_impact: 0.0,
            p50_impact: 0.0,
            p90_impact: 0.0,
            p95_impact: 0.0,
            max_impact: 0.0,
            iterations: 0,
        }
    }
}

/// (probability weight, impact weight) per risk, resolved once per run.
fn trial_inputs(risks: &[Risk]) -> Vec<(f64, f64)> {
    risks
        .iter()
        .map(|r| (r.probability().weight(), f64::from(r.impact().weight())))
        .collect()
}

fn run_trials<R: Rng>(inputs: &[(f64, f64)], trials: usize, rng: &mut R) -> Vec<f64> {
    (0..trials)
        .map(|_| {
            let mut total = 0.0;
            for &(probability, impact) in inputs {
                if rng.gen::<f64>() < probability {
                    total += impact * rng.gen_range(NOISE_LOW..NOISE_HIGH);
                }
            }
            total
        })
        .collect()
}

/// Sort once and read mean, percentiles (index `floor(n·p)`) and max.
fn summarize(mut totals: Vec<f64>) -> SimulationResult {
    let n = totals.len();
    if n == 0 {
        return SimulationResult::empty();
    }
    totals.sort_by(f64::total_cmp);

    let at = |p: f64| totals[((n as f64 * p).floor() as usize).min(n - 1)];
    SimulationResult {
        mean_impact: totals.iter().sum::<f64>() / n as f64,
        p50_impact: at(0.50),
        p90_impact: at(0.90),
        p95_impact: at(0.95),
        max_impact: totals[n - 1],
        iterations: n,
    }
}

/// Single-stream run driven by the caller's RNG.
pub fn simulate<R: Rng>(risks: &[Risk], iterations: usize, rng: &mut R) -> SimulationResult {
    if risks.is_empty() || iterations == 0 {
        return SimulationResult::empty();
    }
    summarize(run_trials(&trial_inputs(risks), iterations, rng))
}

/// Split `iterations` over `shards` rayon tasks. Shard `i` runs on
/// `ChaCha8Rng::seed_from_u64(seed)` with stream `i`, so the outcome depends
/// only on (seed, shards, iterations). One shard matches [`simulate`] over
/// `ChaCha8Rng::seed_from_u64(seed)`.
pub fn simulate_sharded(
    risks: &[Risk],
    iterations: usize,
    shards: usize,
    seed: u64,
) -> SimulationResult {
    if risks.is_empty() || iterations == 0 {
        return SimulationResult::empty();
    }
    let shards = shards.clamp(1, iterations);
    if shards == 1 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        return simulate(risks, iterations, &mut rng);
    }

    let inputs = trial_inputs(risks);
    let base = iterations / shards;
    let extra = iterations % shards;
    debug!(iterations, shards, seed, "sharding monte carlo trials");

    let partials: Vec<Vec<f64>> = (0..shards)
        .into_par_iter()
        .map(|shard| {
            let trials = base + usize::from(shard < extra);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.set_stream(shard as u64);
            run_trials(&inputs, trials, &mut rng)
        })
        .collect();

    summarize(partials.concat())
}

// ─── Combined ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantitativeAnalysis {
    pub closed_form: ClosedFormEstimate,
    pub exposure: RiskExposure,
    pub monte_carlo: SimulationResult,
    /// Seed the Monte Carlo run used, so a run can be replayed.
    pub seed: u64,
}

pub fn quantify(risks: &[Risk], config: &SimulationConfig) -> QuantitativeAnalysis {
    let seed = config.seed.unwrap_or_else(rand::random::<u64>);
    QuantitativeAnalysis {
        closed_form: closed_form(risks),
        exposure: exposure(risks),
        monte_carlo: simulate_sharded(risks, config.iterations, config.shards, seed),
        seed,
    }
}
