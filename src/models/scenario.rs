//! What-if scenario definitions.
//!
//! A [`Scenario`] is an ordered list of [`Override`]s applied to a copy of
//! a baseline project. Scenarios are immutable once built; application
//! lives in [`crate::scenario`].

use serde::{Deserialize, Serialize};

use super::{LeadTime, MilestoneStatus, Owner};

/// A named, immutable set of overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    overrides: Vec<Override>,
}

impl Scenario {
    /// Starts building a scenario.
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> ScenarioBuilder {
        ScenarioBuilder {
            scenario: Scenario {
                id: id.into(),
                name: name.into(),
                description: String::new(),
                overrides: Vec::new(),
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Overrides in application order.
    pub fn overrides(&self) -> &[Override] {
        &self.overrides
    }
}

/// Builder for [`Scenario`].
#[derive(Debug, Clone)]
pub struct ScenarioBuilder {
    scenario: Scenario,
}

impl ScenarioBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.scenario.description = description.into();
        self
    }

    /// Appends an override.
    pub fn with_override(mut self, over: Override) -> Self {
        self.scenario.overrides.push(over);
        self
    }

    /// Replaces a milestone's duration with a fixed number of weeks.
    pub fn duration(self, milestone_id: impl Into<String>, weeks: u32) -> Self {
        self.with_override(Override::new(
            milestone_id,
            OverrideChange::Duration(DurationOverride::Weeks(weeks)),
        ))
    }

    /// Replaces a milestone's duration with a range.
    pub fn duration_range(self, milestone_id: impl Into<String>, range: LeadTime) -> Self {
        self.with_override(Override::new(
            milestone_id,
            OverrideChange::Duration(DurationOverride::Range(range)),
        ))
    }

    /// Replaces a milestone's predecessors.
    pub fn predecessors<I, S>(self, milestone_id: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_override(Override::new(
            milestone_id,
            OverrideChange::PredecessorSet(ids.into_iter().map(Into::into).collect()),
        ))
    }

    /// Reassigns a milestone's owner.
    pub fn owner(self, milestone_id: impl Into<String>, owner: Owner) -> Self {
        self.with_override(Override::new(milestone_id, OverrideChange::Owner(owner)))
    }

    /// Forces a milestone's status.
    pub fn status(self, milestone_id: impl Into<String>, status: MilestoneStatus) -> Self {
        self.with_override(Override::new(milestone_id, OverrideChange::Status(status)))
    }

    /// Enables or disables a milestone.
    pub fn active(self, milestone_id: impl Into<String>, active: bool) -> Self {
        self.with_override(Override::new(milestone_id, OverrideChange::Active(active)))
    }

    pub fn build(self) -> Scenario {
        self.scenario
    }
}

/// One change to one milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Override {
    pub milestone_id: String,
    #[serde(flatten)]
    pub change: OverrideChange,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
}

impl Override {
    pub fn new(milestone_id: impl Into<String>, change: OverrideChange) -> Self {
        Self {
            milestone_id: milestone_id.into(),
            change,
            note: String::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

/// The field an override replaces, with its new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "new_value", rename_all = "kebab-case")]
pub enum OverrideChange {
    Duration(DurationOverride),
    Status(MilestoneStatus),
    PredecessorSet(Vec<String>),
    Owner(Owner),
    Active(bool),
}

/// New duration: whole weeks or a full range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationOverride {
    Weeks(u32),
    Range(LeadTime),
}

impl DurationOverride {
    /// As a lead-time range.
    pub fn lead_time(self) -> LeadTime {
        match self {
            Self::Weeks(w) => LeadTime::fixed(w),
            Self::Range(range) => range,
        }
    }
}
