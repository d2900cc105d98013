//! Update ingestion: validated changes to milestone state.
//!
//! Updates arrive from people or from a text extractor; both go through the
//! same validation. Every accepted batch rebuilds the graph and recomputes
//! the schedule from scratch.
//!
//! # Status Rules
//!
//! - Forward one step: `NotStarted → InProgress → Complete`
//! - Any state → `Blocked`, remembering the prior state
//! - `Blocked` resumes only to the state it was blocked from
//! - Repeating the current status is a no-op
//!
//! # Date Rules
//!
//! An actual finish before the actual start is rejected. An actual finish
//! earlier than a predecessor's actual finish is accepted with a warning,
//! whichever of the two finishes is recorded last.

use serde::{Deserialize, Serialize};
use std::fmt;

use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::models::{
    LeadTime, MilestoneStatus, MilestoneTemplate, Project, ScheduleResult, Week,
};

/// A proposed change to one milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub milestone_id: String,
    pub change: UpdateChange,
    pub source: UpdateSource,
}

impl UpdateRequest {
    /// A manual update with no recorded author.
    pub fn new(milestone_id: impl Into<String>, change: UpdateChange) -> Self {
        Self {
            milestone_id: milestone_id.into(),
            change,
            source: UpdateSource::Manual {
                author: String::new(),
            },
        }
    }

    pub fn with_source(mut self, source: UpdateSource) -> Self {
        self.source = source;
        self
    }

    pub fn status(milestone_id: impl Into<String>, status: MilestoneStatus) -> Self {
        Self::new(milestone_id, UpdateChange::Status(status))
    }

    pub fn actual_start(milestone_id: impl Into<String>, week: Week) -> Self {
        Self::new(milestone_id, UpdateChange::ActualStart(week))
    }

    pub fn actual_finish(milestone_id: impl Into<String>, week: Week) -> Self {
        Self::new(milestone_id, UpdateChange::ActualFinish(week))
    }
}

/// What an update changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum UpdateChange {
    Status(MilestoneStatus),
    ActualStart(Week),
    ActualFinish(Week),
    /// Fixed duration in weeks.
    DurationOverride(u32),
    PredecessorSet(Vec<String>),
    Notes(String),
}

/// Where an update came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateSource {
    Manual { author: String },
    Extracted { extractor: String, confidence: Confidence },
}

/// Extractor confidence in a proposed update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Non-fatal findings from an accepted update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpdateWarning {
    /// Finished before a predecessor's recorded finish.
    FinishBeforePredecessor {
        milestone_id: String,
        predecessor_id: String,
        finish: Week,
        predecessor_finish: Week,
    },
    /// Accepted from an extractor that was unsure.
    LowConfidence { milestone_id: String },
}

impl fmt::Display for UpdateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FinishBeforePredecessor {
                milestone_id,
                predecessor_id,
                finish,
                predecessor_finish,
            } => write!(
                f,
                "{milestone_id} finished in week {finish}, before predecessor {predecessor_id} (week {predecessor_finish})"
            ),
            Self::LowConfidence { milestone_id } => {
                write!(f, "low-confidence extracted update for {milestone_id}")
            }
        }
    }
}

/// The updated project, its fresh schedule, and any warnings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    pub project: Project,
    pub schedule: ScheduleResult,
    pub warnings: Vec<UpdateWarning>,
}

/// Applies one update.
pub fn apply_update(engine: &Engine, project: &Project, update: &UpdateRequest) -> Result<UpdateOutcome> {
    apply_updates(engine, project, std::slice::from_ref(update))
}

/// Applies updates in order, all or nothing, with one recomputation.
///
/// # Errors
/// - [`Error::UnknownMilestone`] for ids outside the catalog
/// - [`Error::InvalidTransition`] for illegal status moves or date order
/// - any graph-build error the changed project produces (e.g. a cycle)
pub fn apply_updates(
    engine: &Engine,
    project: &Project,
    updates: &[UpdateRequest],
) -> Result<UpdateOutcome> {
    let mut next = project.clone();
    let mut warnings = Vec::new();
    for update in updates {
        apply_change(engine.catalog(), &mut next, update, &mut warnings)?;
    }

    let schedule = engine.schedule(&next)?;
    info!(
        project = %next.config.project_id,
        updates = updates.len(),
        warnings = warnings.len(),
        project_finish = schedule.project_finish,
        "updates accepted"
    );

    Ok(UpdateOutcome {
        project: next,
        schedule,
        warnings,
    })
}

fn apply_change(
    catalog: &Catalog,
    project: &mut Project,
    update: &UpdateRequest,
    warnings: &mut Vec<UpdateWarning>,
) -> Result<()> {
    let id = update.milestone_id.as_str();
    let template = catalog
        .get(id)
        .ok_or_else(|| Error::unknown_milestone(id, "update"))?;

    if let UpdateSource::Extracted {
        confidence: Confidence::Low,
        ..
    } = update.source
    {
        warnings.push(UpdateWarning::LowConfidence {
            milestone_id: id.to_string(),
        });
    }

    match &update.change {
        UpdateChange::Status(status) => transition(project, id, *status)?,
        UpdateChange::ActualStart(week) => {
            let instance = project.instance_mut(id);
            if let Some(finish) = instance.actual_finish {
                if *week > finish {
                    return Err(Error::invalid_transition(
                        id,
                        format!("actual start (week {week}) is after actual finish (week {finish})"),
                    ));
                }
            }
            instance.actual_start = Some(*week);
        }
        UpdateChange::ActualFinish(week) => {
            let week = *week;
            let instance = project.instance_mut(id);
            if let Some(start) = instance.actual_start {
                if week < start {
                    return Err(Error::invalid_transition(
                        id,
                        format!("actual finish (week {week}) is before actual start (week {start})"),
                    ));
                }
            }
            instance.actual_finish = Some(week);

            // Warn whichever side of the edge is recorded last.
            let mut out_of_order = Vec::new();
            for pred in effective_predecessors(project, template) {
                if let Some(pred_finish) = project.instance(&pred).and_then(|i| i.actual_finish) {
                    if week < pred_finish {
                        out_of_order.push((id.to_string(), pred, week, pred_finish));
                    }
                }
            }
            for succ in catalog.iter() {
                let Some(succ_finish) = project.instance(&succ.id).and_then(|i| i.actual_finish) else {
                    continue;
                };
                if succ_finish < week && effective_predecessors(project, succ).iter().any(|p| p == id) {
                    out_of_order.push((succ.id.clone(), id.to_string(), succ_finish, week));
                }
            }

            for (milestone_id, predecessor_id, finish, predecessor_finish) in out_of_order {
                warn!(
                    milestone = %milestone_id,
                    predecessor = %predecessor_id,
                    finish,
                    predecessor_finish,
                    "actual finish precedes predecessor finish"
                );
                warnings.push(UpdateWarning::FinishBeforePredecessor {
                    milestone_id,
                    predecessor_id,
                    finish,
                    predecessor_finish,
                });
            }
        }
        UpdateChange::DurationOverride(weeks) => {
            project.instance_mut(id).duration_override = Some(LeadTime::fixed(*weeks));
        }
        UpdateChange::PredecessorSet(ids) => {
            if ids.iter().any(|p| p == id) {
                return Err(Error::CyclicDependency {
                    cycle: vec![id.to_string(), id.to_string()],
                });
            }
            if let Some(unknown) = ids.iter().find(|p| !catalog.contains(p)) {
                return Err(Error::unknown_milestone(unknown.as_str(), id));
            }
            project.instance_mut(id).predecessor_override = Some(ids.clone());
        }
        UpdateChange::Notes(notes) => project.instance_mut(id).notes = notes.clone(),
    }
    Ok(())
}

/// Predecessor ids in effect for a milestone: its override, else the template's.
fn effective_predecessors(project: &Project, template: &MilestoneTemplate) -> Vec<String> {
    project
        .instance(&template.id)
        .and_then(|i| i.predecessor_override.clone())
        .unwrap_or_else(|| template.predecessors.clone())
}

fn transition(project: &mut Project, id: &str, to: MilestoneStatus) -> Result<()> {
    let instance = project.instance_mut(id);
    let from = instance.status;
    if from == to {
        return Ok(());
    }

    if to == MilestoneStatus::Blocked {
        instance.resume_status = Some(from);
    } else if from == MilestoneStatus::Blocked {
        let resume = instance.resume_status.unwrap_or_default();
        if to != resume {
            return Err(Error::invalid_transition(
                id,
                format!("blocked milestone can only resume to {resume}, not {to}"),
            ));
        }
        instance.resume_status = None;
    } else if from.next() != Some(to) {
        return Err(Error::invalid_transition(
            id,
            format!("cannot move from {from} to {to}"),
        ));
    }

    instance.status = to;
    Ok(())
}
