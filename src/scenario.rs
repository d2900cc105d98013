//! Scenario overlay: copy-on-write what-if evaluation.
//!
//! A scenario is applied to a clone of the baseline project, so the
//! baseline is never touched. Overrides apply in order; the first failure
//! rejects the whole scenario with [`Error::ScenarioApplication`] carrying
//! the failing override's index.
//!
//! Batches run on `rayon`, one task per scenario, with results in input
//! order. A [`CancellationToken`] is checked before each scenario starts.

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::models::{
    MilestoneShift, MilestoneStatus, Override, OverrideChange, Project, Scenario, ScheduleDiff,
    ScheduleResult,
};

/// A scenario applied to a baseline: the forked project and its schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRun {
    pub scenario_id: String,
    pub scenario_name: String,
    pub project: Project,
    pub schedule: ScheduleResult,
}

/// A scenario run compared against the baseline schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub run: ScenarioRun,
    pub diff: ScheduleDiff,
}

/// Shared flag for abandoning a batch.
///
/// Clones share the flag. Scenarios already running finish normally.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of scenarios not yet started.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Applies `scenario` to a copy of `baseline` and schedules the result.
///
/// # Errors
/// [`Error::ScenarioApplication`] wrapping the cause: an unknown milestone,
/// an unordered duration range, a self-reference, or a cycle introduced by
/// a predecessor change (`index` points at the override). If every
/// override applies but the project no longer builds, `index` is `None`.
pub fn apply_scenario(engine: &Engine, baseline: &Project, scenario: &Scenario) -> Result<ScenarioRun> {
    let reject = |index: Option<usize>, source: Error| Error::ScenarioApplication {
        scenario_id: scenario.id().to_string(),
        index,
        source: Box::new(source),
    };

    let mut project = baseline.clone();
    for (index, over) in scenario.overrides().iter().enumerate() {
        apply_override(engine.catalog(), &mut project, over)
            .map_err(|source| reject(Some(index), source))?;

        if matches!(over.change, OverrideChange::PredecessorSet(_)) {
            engine
                .build_graph(&project)
                .map_err(|source| reject(Some(index), source))?;
        }
    }

    let schedule = engine
        .schedule(&project)
        .map_err(|source| reject(None, source))?;

    info!(
        scenario = scenario.id(),
        overrides = scenario.overrides().len(),
        project_finish = schedule.project_finish,
        "scenario applied"
    );

    Ok(ScenarioRun {
        scenario_id: scenario.id().to_string(),
        scenario_name: scenario.name().to_string(),
        project,
        schedule,
    })
}

fn apply_override(catalog: &Catalog, project: &mut Project, over: &Override) -> Result<()> {
    let id = over.milestone_id.as_str();
    if !catalog.contains(id) {
        return Err(Error::unknown_milestone(id, "scenario override"));
    }

    let instance = project.instance_mut(id);
    match &over.change {
        OverrideChange::Duration(duration) => {
            let lead_time = duration.lead_time();
            lead_time.check(id)?;
            instance.duration_override = Some(lead_time);
        }
        OverrideChange::Status(status) => {
            if *status != MilestoneStatus::Blocked {
                instance.resume_status = None;
            } else if instance.status != MilestoneStatus::Blocked {
                instance.resume_status = Some(instance.status);
            }
            instance.status = *status;
        }
        OverrideChange::PredecessorSet(ids) => {
            if ids.iter().any(|p| p == id) {
                return Err(Error::CyclicDependency {
                    cycle: vec![id.to_string(), id.to_string()],
                });
            }
            if let Some(unknown) = ids.iter().find(|p| !catalog.contains(p)) {
                return Err(Error::unknown_milestone(unknown.as_str(), id));
            }
            instance.predecessor_override = Some(ids.clone());
        }
        OverrideChange::Owner(owner) => instance.owner_override = Some(*owner),
        OverrideChange::Active(active) => instance.active = *active,
    }
    Ok(())
}

/// Compares a scenario schedule against its baseline.
pub fn diff(baseline: &ScheduleResult, scenario: &ScheduleResult) -> ScheduleDiff {
    let baseline_cp: HashSet<&str> = baseline.critical_path.iter().map(String::as_str).collect();
    let scenario_cp: HashSet<&str> = scenario.critical_path.iter().map(String::as_str).collect();

    let joined_critical_path = scenario
        .critical_path
        .iter()
        .filter(|id| !baseline_cp.contains(id.as_str()))
        .cloned()
        .collect();
    let left_critical_path = baseline
        .critical_path
        .iter()
        .filter(|id| !scenario_cp.contains(id.as_str()))
        .cloned()
        .collect();

    let scenario_finishes = scenario.finishes();
    let shifts = baseline
        .timings
        .iter()
        .filter_map(|t| {
            let &after = scenario_finishes.get(t.milestone_id.as_str())?;
            (after != t.earliest_finish).then(|| MilestoneShift {
                milestone_id: t.milestone_id.clone(),
                baseline_finish: t.earliest_finish,
                scenario_finish: after,
            })
        })
        .collect();

    ScheduleDiff {
        baseline_finish: baseline.project_finish,
        scenario_finish: scenario.project_finish,
        finish_delta_weeks: scenario.project_finish - baseline.project_finish,
        joined_critical_path,
        left_critical_path,
        shifts,
    }
}

/// Evaluates scenarios in parallel against one baseline.
///
/// `workers` of `None` uses the global `rayon` pool; `Some(n)` builds a
/// dedicated pool of `n` threads. Results match input order.
///
/// # Errors
/// The outer error is a [`Error::Configuration`] if the pool can't be
/// built. Each scenario reports its own outcome, including
/// [`Error::Cancelled`] for scenarios skipped after cancellation.
pub fn evaluate_batch(
    engine: &Engine,
    baseline: &Project,
    scenarios: &[Scenario],
    workers: Option<usize>,
    cancel: &CancellationToken,
) -> Result<Vec<Result<ScenarioRun>>> {
    let run = || {
        scenarios
            .par_iter()
            .map(|scenario| {
                if cancel.is_cancelled() {
                    debug!(scenario = scenario.id(), "skipping cancelled scenario");
                    return Err(Error::Cancelled {
                        scenario_id: scenario.id().to_string(),
                    });
                }
                apply_scenario(engine, baseline, scenario)
            })
            .collect::<Vec<_>>()
    };

    match workers {
        None => Ok(run()),
        Some(threads) => {
            let pool = ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| Error::configuration("batch_threads", e.to_string()))?;
            Ok(pool.install(run))
        }
    }
}

/// Evaluates scenarios in parallel and diffs each against `baseline_schedule`.
pub fn compare_batch(
    engine: &Engine,
    baseline: &Project,
    baseline_schedule: &ScheduleResult,
    scenarios: &[Scenario],
    workers: Option<usize>,
    cancel: &CancellationToken,
) -> Result<Vec<Result<ScenarioComparison>>> {
    let runs = evaluate_batch(engine, baseline, scenarios, workers, cancel)?;
    Ok(runs
        .into_iter()
        .map(|run| {
            run.map(|run| {
                let diff = diff(baseline_schedule, &run.schedule);
                ScenarioComparison { run, diff }
            })
        })
        .collect())
}
