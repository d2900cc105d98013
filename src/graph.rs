//! Dependency graph of enabled milestones.
//!
//! # Algorithm
//!
//! 1. Select enabled templates: workstream toggled on, not skipped, and the
//!    instance (if any) active.
//! 2. Resolve each node's lead time (instance override, else the resolver).
//! 3. Materialize predecessor edges. Edges from disabled milestones are
//!    dropped, so a disabled predecessor counts as already satisfied.
//! 4. Depth-first cycle check with recursion-stack marking.
//! 5. Topological order by Kahn's algorithm with a min-heap ready queue, so
//!    ties release in lexical id order.
//!
//! Nodes are stored in lexical id order; node index order equals id order.
//!
//! # Reference
//! Kahn (1962), "Topological sorting of large networks", CACM 5(11)

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use tracing::debug;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::models::{
    LeadTime, MilestoneInstance, MilestoneStatus, Owner, Phase, ProjectConfiguration, Week,
    Workstream,
};
use crate::resolver::{LeadTimeResolver, LeadTimeSource};

/// One enabled milestone with its resolved duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    pub workstream: Workstream,
    pub phase: Phase,
    /// Template owner, or the instance's override.
    pub owner: Owner,
    pub lead_time: LeadTime,
    pub lead_time_source: LeadTimeSource,
    pub status: MilestoneStatus,
    pub actual_start: Option<Week>,
    pub actual_finish: Option<Week>,
    predecessors: Vec<usize>,
    successors: Vec<usize>,
}

impl GraphNode {
    /// Typical duration used by the timing passes.
    pub fn effective_duration(&self) -> u32 {
        self.lead_time.typical
    }

    /// Whether actual dates pin this node.
    pub fn is_anchored(&self) -> bool {
        self.actual_start.is_some() || self.actual_finish.is_some()
    }

    /// Indices of enabled predecessors.
    pub fn predecessors(&self) -> &[usize] {
        &self.predecessors
    }

    /// Indices of enabled successors.
    pub fn successors(&self) -> &[usize] {
        &self.successors
    }
}

/// Acyclic graph of one project's enabled milestones.
///
/// Only obtainable through [`DependencyGraph::build`], so every value is
/// validated and topologically ordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraph {
    nodes: Vec<GraphNode>,
    index: HashMap<String, usize>,
    order: Vec<usize>,
}

impl DependencyGraph {
    /// Builds the graph for a project.
    ///
    /// # Errors
    /// - [`Error::UnknownMilestone`] for instances, skips, overrides, or
    ///   predecessors naming ids outside the catalog
    /// - [`Error::Configuration`] for unordered lead times or skipping a
    ///   non-skippable milestone
    /// - [`Error::CyclicDependency`] naming the cycle
    pub fn build(
        catalog: &Catalog,
        resolver: &LeadTimeResolver<'_>,
        config: &ProjectConfiguration,
        instances: &BTreeMap<String, MilestoneInstance>,
    ) -> Result<Self> {
        check_configuration(catalog, config)?;
        if let Some(id) = instances.keys().find(|id| !catalog.contains(id)) {
            return Err(Error::unknown_milestone(id.as_str(), "project instances"));
        }

        let enabled: Vec<_> = catalog
            .iter()
            .filter(|t| config.is_workstream_enabled(t.workstream))
            .filter(|t| !config.skipped_milestones.contains(&t.id))
            .filter(|t| instances.get(&t.id).map_or(true, |i| i.active))
            .collect();

        let index: HashMap<String, usize> = enabled
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();

        let mut nodes = Vec::with_capacity(enabled.len());
        for template in &enabled {
            let instance = instances.get(&template.id);
            let (lead_time, lead_time_source) = match instance.and_then(|i| i.duration_override) {
                Some(lt) => {
                    lt.check(&template.id)?;
                    (lt, LeadTimeSource::InstanceOverride)
                }
                None => {
                    let r = resolver.resolve_with_source(template, config)?;
                    (r.lead_time, r.source)
                }
            };
            let default_instance;
            let instance = match instance {
                Some(i) => i,
                None => {
                    default_instance = MilestoneInstance::new(template.id.as_str());
                    &default_instance
                }
            };

            let declared = instance
                .predecessor_override
                .as_ref()
                .unwrap_or(&template.predecessors);
            let mut predecessors = Vec::with_capacity(declared.len());
            for pred in declared {
                if pred == &template.id {
                    return Err(Error::CyclicDependency {
                        cycle: vec![template.id.clone(), template.id.clone()],
                    });
                }
                if !catalog.contains(pred) {
                    return Err(Error::unknown_milestone(pred.as_str(), template.id.as_str()));
                }
                match index.get(pred) {
                    Some(&p) => predecessors.push(p),
                    None => debug!(
                        milestone = %template.id,
                        predecessor = %pred,
                        "dropping edge from disabled predecessor"
                    ),
                }
            }
            predecessors.sort_unstable();
            predecessors.dedup();

            nodes.push(GraphNode {
                id: template.id.clone(),
                name: template.name.clone(),
                workstream: template.workstream,
                phase: template.phase,
                owner: instance.owner_override.unwrap_or(template.owner),
                lead_time,
                lead_time_source,
                status: instance.status,
                actual_start: instance.actual_start,
                actual_finish: instance.actual_finish,
                predecessors,
                successors: Vec::new(),
            });
        }

        for i in 0..nodes.len() {
            for p in nodes[i].predecessors.clone() {
                nodes[p].successors.push(i);
            }
        }

        let successors: Vec<Vec<usize>> = nodes.iter().map(|n| n.successors.clone()).collect();
        if let Some(cycle) = find_cycle(&successors) {
            return Err(Error::CyclicDependency {
                cycle: cycle.into_iter().map(|i| nodes[i].id.clone()).collect(),
            });
        }
        let order = topological_order(&nodes);

        debug!(
            project = %config.project_id,
            nodes = nodes.len(),
            edges = nodes.iter().map(|n| n.predecessors.len()).sum::<usize>(),
            "dependency graph built"
        );

        Ok(Self {
            nodes,
            index,
            order,
        })
    }

    /// Number of enabled milestones.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in lexical id order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Node by index.
    pub fn node_at(&self, index: usize) -> Option<&GraphNode> {
        self.nodes.get(index)
    }

    /// Node by id.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Node indices in topological order.
    pub fn topological_order(&self) -> &[usize] {
        &self.order
    }

    /// Ids in topological order.
    pub fn ordered_ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|&i| self.nodes[i].id.as_str())
    }
}

fn check_configuration(catalog: &Catalog, config: &ProjectConfiguration) -> Result<()> {
    for id in &config.skipped_milestones {
        let template = catalog
            .get(id)
            .ok_or_else(|| Error::unknown_milestone(id.as_str(), "skipped milestones"))?;
        if !template.skippable {
            return Err(Error::configuration(id.as_str(), "milestone cannot be skipped"));
        }
    }
    if let Some(id) = config
        .milestone_overrides
        .keys()
        .find(|id| !catalog.contains(id))
    {
        return Err(Error::unknown_milestone(id.as_str(), "milestone overrides"));
    }
    config.check()
}

fn topological_order(nodes: &[GraphNode]) -> Vec<usize> {
    let mut in_degree: Vec<usize> = nodes.iter().map(|n| n.predecessors.len()).collect();
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some(Reverse(i)) = ready.pop() {
        order.push(i);
        for &s in &nodes[i].successors {
            in_degree[s] -= 1;
            if in_degree[s] == 0 {
                ready.push(Reverse(s));
            }
        }
    }
    order
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    New,
    Active,
    Done,
}

/// Finds a cycle by depth-first search, following successor edges.
///
/// Returns the node indices along the cycle with the first node repeated at
/// the end, or `None` for a DAG. Starts are tried in index order.
pub(crate) fn find_cycle(successors: &[Vec<usize>]) -> Option<Vec<usize>> {
    let mut marks = vec![Mark::New; successors.len()];
    let mut stack = Vec::new();
    (0..successors.len()).find_map(|start| {
        if marks[start] == Mark::New {
            visit(start, successors, &mut marks, &mut stack)
        } else {
            None
        }
    })
}

fn visit(
    node: usize,
    successors: &[Vec<usize>],
    marks: &mut [Mark],
    stack: &mut Vec<usize>,
) -> Option<Vec<usize>> {
    marks[node] = Mark::Active;
    stack.push(node);

    for &next in &successors[node] {
        match marks[next] {
            Mark::Active => {
                // Back edge → cycle
                let pos = stack.iter().position(|&n| n == next)?;
                let mut cycle = stack[pos..].to_vec();
                cycle.push(next);
                return Some(cycle);
            }
            Mark::New => {
                if let Some(cycle) = visit(next, successors, marks, stack) {
                    return Some(cycle);
                }
            }
            Mark::Done => {}
        }
    }

    stack.pop();
    marks[node] = Mark::Done;
    None
}
