//! Forward/backward timing passes.
//!
//! # Algorithm
//!
//! Forward pass (topological order):
//! - `es = max(ef of predecessors)`, or the project start for roots
//! - `ef = es + duration`
//! - recorded actuals override: finish pins `ef` (and `es` to the actual
//!   start, else `ef - duration`); a start alone pins `es`
//!
//! Backward pass (reverse topological order):
//! - `project_finish = max(ef)` over terminal milestones; an out-of-order
//!   actual that leaves a predecessor finishing later counts too
//! - `lf = min(ls of successors)`, or `project_finish` for terminals
//! - `lf` is never earlier than `ef`: a successor recorded as starting
//!   before this node finished cannot push its slack negative
//! - `ls = lf - (ef - es)`
//!
//! `slack = ls - es`, never negative. A node is critical when slack is zero.
//!
//! # Reference
//! Kelley & Walker (1959), "Critical-Path Planning and Scheduling"

use tracing::debug;

use super::critical::critical_path;
use crate::graph::DependencyGraph;
use crate::models::{NodeTiming, ScheduleResult, Week};

/// Runs timing passes from a fixed start week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingEngine {
    project_start: Week,
}

impl TimingEngine {
    pub fn new(project_start: Week) -> Self {
        Self { project_start }
    }

    pub fn project_start(&self) -> Week {
        self.project_start
    }

    /// Computes the schedule of `graph`.
    pub fn compute(&self, graph: &DependencyGraph) -> ScheduleResult {
        compute_schedule(graph, self.project_start)
    }
}

/// Computes earliest/latest dates, slack, and the critical path.
///
/// Deterministic: the same graph always yields the same result. An empty
/// graph finishes at `project_start` with an empty critical path.
pub fn compute_schedule(graph: &DependencyGraph, project_start: Week) -> ScheduleResult {
    let durations: Vec<u32> = graph.nodes().iter().map(|n| n.effective_duration()).collect();
    compute_with_durations(graph, project_start, &durations)
}

/// Per-node dates from both passes, indexed by node.
#[derive(Debug, Clone)]
pub(crate) struct Passes {
    pub es: Vec<Week>,
    pub ef: Vec<Week>,
    pub ls: Vec<Week>,
    pub lf: Vec<Week>,
    pub project_finish: Week,
}

impl Passes {
    pub fn slack(&self, i: usize) -> Week {
        self.ls[i] - self.es[i]
    }

    pub fn is_critical(&self, i: usize) -> bool {
        self.slack(i) == 0
    }
}

/// Both passes with explicit per-node durations.
pub(crate) fn run_passes(graph: &DependencyGraph, project_start: Week, durations: &[u32]) -> Passes {
    let nodes = graph.nodes();
    let n = nodes.len();
    let order = graph.topological_order();

    let mut es = vec![project_start; n];
    let mut ef = vec![project_start; n];
    for &i in order {
        let node = &nodes[i];
        let duration = Week::from(durations[i]);
        let ready = node
            .predecessors()
            .iter()
            .map(|&p| ef[p])
            .max()
            .unwrap_or(project_start);

        (es[i], ef[i]) = match (node.actual_start, node.actual_finish) {
            (Some(start), Some(finish)) => (start, finish),
            (None, Some(finish)) => (finish - duration, finish),
            (Some(start), None) => (start, start + duration),
            (None, None) => (ready, ready + duration),
        };
    }

    // Equals the max over terminals unless recorded actuals are out of order.
    let project_finish = ef.iter().copied().max().unwrap_or(project_start);

    let mut ls = vec![project_finish; n];
    let mut lf = vec![project_finish; n];
    for &i in order.iter().rev() {
        let bound = nodes[i]
            .successors()
            .iter()
            .map(|&s| ls[s])
            .min()
            .unwrap_or(project_finish);
        lf[i] = bound.max(ef[i]);
        ls[i] = lf[i] - (ef[i] - es[i]);
    }

    Passes {
        es,
        ef,
        ls,
        lf,
        project_finish,
    }
}

fn compute_with_durations(
    graph: &DependencyGraph,
    project_start: Week,
    durations: &[u32],
) -> ScheduleResult {
    let passes = run_passes(graph, project_start, durations);
    let nodes = graph.nodes();

    let timings = graph
        .topological_order()
        .iter()
        .map(|&i| {
            let node = &nodes[i];
            NodeTiming {
                milestone_id: node.id.clone(),
                earliest_start: passes.es[i],
                earliest_finish: passes.ef[i],
                latest_start: passes.ls[i],
                latest_finish: passes.lf[i],
                slack: passes.slack(i),
                is_critical: passes.is_critical(i),
                effective_duration: durations[i],
                owner: node.owner,
                workstream: node.workstream,
                anchored: node.is_anchored(),
            }
        })
        .collect();

    let critical_path: Vec<String> = critical_path(graph, &passes)
        .into_iter()
        .map(|i| nodes[i].id.clone())
        .collect();

    debug!(
        milestones = nodes.len(),
        project_finish = passes.project_finish,
        critical = critical_path.len(),
        "timing passes complete"
    );

    ScheduleResult {
        timings,
        project_start,
        project_finish: passes.project_finish,
        critical_path,
    }
}
