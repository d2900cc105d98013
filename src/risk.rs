//! Schedule risk: PERT estimates and Monte Carlo simulation.
//!
//! Each milestone's min/typical/max lead time is treated as a three-point
//! estimate. [`PertEstimate`] gives the classic closed-form mean and
//! spread; [`simulate`] samples every duration from a triangular
//! distribution and reruns the timing passes to estimate finish-week
//! percentiles and how often each milestone is critical.
//!
//! Iterations run in parallel. Iteration `k` draws from its own generator
//! seeded with `seed + k`, so results are reproducible regardless of
//! thread count.
//!
//! # References
//!
//! - Malcolm et al. (1959), "Application of a Technique for R&D Program Evaluation"
//! - Van Slyke (1963), "Monte Carlo Methods and the PERT Problem"

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::models::{LeadTime, ScheduleResult, Week};
use crate::scheduler::{compute_schedule, run_passes};

/// PERT three-point duration estimate (weeks).
///
/// Mean = (O + 4M + P) / 6, StdDev = (P - O) / 6
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PertEstimate {
    pub optimistic: u32,
    pub most_likely: u32,
    pub pessimistic: u32,
}

impl PertEstimate {
    pub fn new(optimistic: u32, most_likely: u32, pessimistic: u32) -> Self {
        Self {
            optimistic,
            most_likely,
            pessimistic,
        }
    }

    /// PERT mean (expected duration): `(O + 4M + P) / 6`.
    pub fn mean(&self) -> f64 {
        (f64::from(self.optimistic) + 4.0 * f64::from(self.most_likely) + f64::from(self.pessimistic))
            / 6.0
    }

    /// PERT standard deviation: `(P - O) / 6`.
    pub fn std_dev(&self) -> f64 {
        (f64::from(self.pessimistic) - f64::from(self.optimistic)) / 6.0
    }

    pub fn variance(&self) -> f64 {
        let sd = self.std_dev();
        sd * sd
    }

    /// Inverse CDF of the triangular distribution over (O, M, P).
    ///
    /// `q` is clamped to `[0, 1]`.
    pub fn triangular_quantile(&self, q: f64) -> f64 {
        let (lo, mode, hi) = (
            f64::from(self.optimistic),
            f64::from(self.most_likely),
            f64::from(self.pessimistic),
        );
        if hi <= lo {
            return mode;
        }
        let q = q.clamp(0.0, 1.0);
        let fc = (mode - lo) / (hi - lo);
        if q < fc {
            lo + ((hi - lo) * (mode - lo) * q).sqrt()
        } else {
            hi - ((hi - lo) * (hi - mode) * (1.0 - q)).sqrt()
        }
    }
}

impl From<LeadTime> for PertEstimate {
    fn from(lt: LeadTime) -> Self {
        Self::new(lt.min, lt.typical, lt.max)
    }
}

/// Mean and spread of a chain of milestones, summing PERT moments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathEstimate {
    pub mean_weeks: f64,
    pub std_dev_weeks: f64,
}

/// PERT estimate of the reported critical path.
pub fn critical_path_estimate(graph: &DependencyGraph, schedule: &ScheduleResult) -> PathEstimate {
    let (mean, variance) = schedule
        .critical_path
        .iter()
        .filter_map(|id| graph.node(id))
        .map(|node| PertEstimate::from(node.lead_time))
        .fold((0.0, 0.0), |(m, v), p| (m + p.mean(), v + p.variance()));
    PathEstimate {
        mean_weeks: mean,
        std_dev_weeks: variance.sqrt(),
    }
}

/// Simulation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    pub iterations: usize,
    pub seed: u64,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            iterations: 1000,
            seed: 42,
        }
    }
}

/// Outcome of a Monte Carlo run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub iterations: usize,
    /// Finish using typical durations.
    pub deterministic_finish: Week,
    pub mean_finish: f64,
    pub p50_finish: Week,
    pub p80_finish: Week,
    pub p95_finish: Week,
    pub min_finish: Week,
    pub max_finish: Week,
    /// PERT estimate of the deterministic critical path.
    pub critical_path: PathEstimate,
    /// Fraction of iterations in which each milestone had zero slack.
    pub criticality: BTreeMap<String, f64>,
}

impl RiskProfile {
    /// Criticality index of one milestone; zero if unknown.
    pub fn criticality_of(&self, milestone_id: &str) -> f64 {
        self.criticality.get(milestone_id).copied().unwrap_or(0.0)
    }
}

/// Runs a seeded Monte Carlo simulation over `graph`.
///
/// # Errors
/// [`Error::Configuration`] if `settings.iterations` is zero.
pub fn simulate(graph: &DependencyGraph, project_start: Week, settings: &RiskSettings) -> Result<RiskProfile> {
    if settings.iterations == 0 {
        return Err(Error::configuration("risk.iterations", "must be at least 1"));
    }

    let estimates: Vec<PertEstimate> = graph
        .nodes()
        .iter()
        .map(|n| PertEstimate::from(n.lead_time))
        .collect();

    let samples: Vec<(Week, Vec<bool>)> = (0..settings.iterations)
        .into_par_iter()
        .map(|k| {
            let mut rng = StdRng::seed_from_u64(settings.seed.wrapping_add(k as u64));
            let durations: Vec<u32> = estimates
                .iter()
                .map(|e| e.triangular_quantile(rng.random::<f64>()).round() as u32)
                .collect();
            let passes = run_passes(graph, project_start, &durations);
            let critical = (0..durations.len()).map(|i| passes.is_critical(i)).collect();
            (passes.project_finish, critical)
        })
        .collect();

    let mut finishes: Vec<Week> = samples.iter().map(|(f, _)| *f).collect();
    finishes.sort_unstable();

    let n = settings.iterations as f64;
    let mut critical_counts = vec![0usize; graph.len()];
    for (_, flags) in &samples {
        for (count, &flag) in critical_counts.iter_mut().zip(flags) {
            *count += usize::from(flag);
        }
    }
    let criticality = graph
        .nodes()
        .iter()
        .zip(&critical_counts)
        .map(|(node, &count)| (node.id.clone(), count as f64 / n))
        .collect();

    let deterministic = compute_schedule(graph, project_start);
    let profile = RiskProfile {
        iterations: settings.iterations,
        deterministic_finish: deterministic.project_finish,
        mean_finish: finishes.iter().sum::<Week>() as f64 / n,
        p50_finish: percentile(&finishes, 0.50),
        p80_finish: percentile(&finishes, 0.80),
        p95_finish: percentile(&finishes, 0.95),
        min_finish: finishes.first().copied().unwrap_or(project_start),
        max_finish: finishes.last().copied().unwrap_or(project_start),
        critical_path: critical_path_estimate(graph, &deterministic),
        criticality,
    };

    debug!(
        iterations = profile.iterations,
        p50 = profile.p50_finish,
        p95 = profile.p95_finish,
        "risk simulation complete"
    );
    Ok(profile)
}

/// Nearest-rank percentile of sorted, non-empty samples.
fn percentile(sorted: &[Week], p: f64) -> Week {
    let rank = (p * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::models::{
        LeadTimeTable, MilestoneTemplate, Owner, Phase, ProjectConfiguration, Workstream,
    };
    use crate::resolver::LeadTimeResolver;

    fn graph(templates: Vec<MilestoneTemplate>) -> DependencyGraph {
        let catalog = Catalog::new(templates).unwrap();
        let table = LeadTimeTable::new();
        DependencyGraph::build(
            &catalog,
            &LeadTimeResolver::new(&table),
            &ProjectConfiguration::default(),
            &BTreeMap::new(),
        )
        .unwrap()
    }

    fn template(id: &str, (min, typ, max): (u32, u32, u32), preds: &[&str]) -> MilestoneTemplate {
        MilestoneTemplate::new(id, id, Workstream::SiteControl, Phase::PreTransaction, Owner::Seller)
            .with_duration(min, typ, max)
            .with_predecessors(preds.iter().copied())
    }

    #[test]
    fn test_pert_calculation() {
        let pert = PertEstimate::new(4, 6, 14);
        // mean = (4 + 24 + 14) / 6 = 7
        assert!((pert.mean() - 7.0).abs() < 1e-10);
        assert!((pert.std_dev() - 10.0 / 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_triangular_quantile_bounds() {
        let pert = PertEstimate::new(2, 4, 10);
        assert!((pert.triangular_quantile(0.0) - 2.0).abs() < 1e-10);
        assert!((pert.triangular_quantile(1.0) - 10.0).abs() < 1e-10);
        // CDF at the mode is (4-2)/(10-2) = 0.25
        assert!((pert.triangular_quantile(0.25) - 4.0).abs() < 1e-10);
        assert!((PertEstimate::new(5, 5, 5).triangular_quantile(0.7) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_fixed_durations_are_deterministic() {
        let g = graph(vec![
            template("A", (4, 4, 4), &[]),
            template("B", (6, 6, 6), &["A"]),
        ]);
        let profile = simulate(&g, 0, &RiskSettings { iterations: 50, seed: 7 }).unwrap();
        assert_eq!(profile.deterministic_finish, 10);
        assert_eq!(profile.p50_finish, 10);
        assert_eq!(profile.p95_finish, 10);
        assert!((profile.mean_finish - 10.0).abs() < 1e-10);
        assert!((profile.criticality_of("A") - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_simulation_is_reproducible() {
        let g = graph(vec![
            template("A", (2, 4, 10), &[]),
            template("B", (3, 6, 12), &["A"]),
            template("C", (1, 5, 20), &["A"]),
        ]);
        let settings = RiskSettings { iterations: 200, seed: 11 };
        let first = simulate(&g, 0, &settings).unwrap();
        let second = simulate(&g, 0, &settings).unwrap();
        assert_eq!(first, second);

        assert!(first.min_finish >= 3);
        assert!(first.max_finish <= 30);
        assert!(first.p50_finish <= first.p80_finish);
        assert!(first.p80_finish <= first.p95_finish);
        assert!((first.criticality_of("A") - 1.0).abs() < 1e-10);
        let b = first.criticality_of("B");
        let c = first.criticality_of("C");
        assert!(b > 0.0 && c > 0.0);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let g = graph(vec![template("A", (1, 2, 3), &[])]);
        assert!(simulate(&g, 0, &RiskSettings { iterations: 0, seed: 1 }).is_err());
    }

    #[test]
    fn test_percentile_nearest_rank() {
        let samples = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        assert_eq!(percentile(&samples, 0.5), 5);
        assert_eq!(percentile(&samples, 0.8), 8);
        assert_eq!(percentile(&samples, 0.95), 10);
        assert_eq!(percentile(&[3], 0.5), 3);
    }

    #[test]
    fn test_critical_path_estimate() {
        let g = graph(vec![
            template("A", (4, 6, 14), &[]),
            template("B", (4, 6, 14), &["A"]),
        ]);
        let schedule = compute_schedule(&g, 0);
        let est = critical_path_estimate(&g, &schedule);
        assert!((est.mean_weeks - 14.0).abs() < 1e-10);
        let sd: f64 = 10.0 / 6.0;
        assert!((est.std_dev_weeks - (2.0 * sd * sd).sqrt()).abs() < 1e-10);
    }
}
