//! Per-project milestone state.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{LeadTime, Owner, Week};

/// Progress status of a milestone instance.
///
/// # State Machine
///
/// ```text
/// NotStarted ──► InProgress ──► Complete
///      │              │             │
///      └──────────────┴─────────────┴──► Blocked ──► (back to prior state)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MilestoneStatus {
    #[default]
    NotStarted,
    InProgress,
    Complete,
    Blocked,
}

impl MilestoneStatus {
    /// The single forward step from this status, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::NotStarted => Some(Self::InProgress),
            Self::InProgress => Some(Self::Complete),
            Self::Complete | Self::Blocked => None,
        }
    }

    /// Whether work has finished.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotStarted => "not-started",
            Self::InProgress => "in-progress",
            Self::Complete => "complete",
            Self::Blocked => "blocked",
        };
        f.write_str(label)
    }
}

/// Mutable state of one template within one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneInstance {
    /// Template this instance tracks.
    pub template_id: String,
    #[serde(default)]
    pub status: MilestoneStatus,
    /// Status to return to when leaving `Blocked`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_status: Option<MilestoneStatus>,
    /// Highest-precedence duration, bypassing the resolver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_override: Option<LeadTime>,
    /// Replaces the template's predecessor list when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predecessor_override: Option<Vec<String>>,
    /// Replaces the template's owner when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_override: Option<Owner>,
    /// Recorded start week.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_start: Option<Week>,
    /// Recorded finish week. Once set the milestone is a fact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_finish: Option<Week>,
    /// Inactive instances drop out of the graph.
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub notes: String,
}

fn default_active() -> bool {
    true
}

impl MilestoneInstance {
    /// Creates a fresh, not-started instance.
    pub fn new(template_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            status: MilestoneStatus::NotStarted,
            resume_status: None,
            duration_override: None,
            predecessor_override: None,
            owner_override: None,
            actual_start: None,
            actual_finish: None,
            active: true,
            notes: String::new(),
        }
    }

    /// Sets the status.
    pub fn with_status(mut self, status: MilestoneStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets a fixed duration override.
    pub fn with_duration_override(mut self, weeks: u32) -> Self {
        self.duration_override = Some(LeadTime::fixed(weeks));
        self
    }

    /// Replaces the predecessor list.
    pub fn with_predecessors<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predecessor_override = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Records an actual start week.
    pub fn with_actual_start(mut self, week: Week) -> Self {
        self.actual_start = Some(week);
        self
    }

    /// Records an actual finish week.
    pub fn with_actual_finish(mut self, week: Week) -> Self {
        self.actual_finish = Some(week);
        self
    }

    /// Deactivates the instance.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Whether any actual date has been recorded.
    pub fn is_anchored(&self) -> bool {
        self.actual_start.is_some() || self.actual_finish.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_forward_steps() {
        assert_eq!(MilestoneStatus::NotStarted.next(), Some(MilestoneStatus::InProgress));
        assert_eq!(MilestoneStatus::InProgress.next(), Some(MilestoneStatus::Complete));
        assert_eq!(MilestoneStatus::Complete.next(), None);
        assert_eq!(MilestoneStatus::Blocked.next(), None);
    }

    #[test]
    fn test_instance_defaults_from_minimal_json() {
        let inst: MilestoneInstance =
            serde_json::from_str(r#"{"template_id":"PS-SC-01"}"#).unwrap();
        assert_eq!(inst, MilestoneInstance::new("PS-SC-01"));
        assert!(inst.active);
        assert!(!inst.is_anchored());
    }

    #[test]
    fn test_anchored() {
        let inst = MilestoneInstance::new("A").with_actual_finish(5);
        assert!(inst.is_anchored());
        assert_eq!(inst.actual_start, None);
    }
}
