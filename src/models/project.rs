//! Project configuration and state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{
    GridOperator, LeadTime, LeadTimeTable, MilestoneInstance, Scenario, ScheduleResult,
    VoltageClass, Workstream,
};
use crate::error::Result;

/// Per-project settings that shape which milestones exist and how long they take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfiguration {
    pub project_id: String,
    /// Target load (MW).
    pub target_capacity_mw: u32,
    /// Interconnection voltage; selects transformer lead times.
    pub voltage_class: VoltageClass,
    /// Grid operator; selects system impact study lead times.
    pub grid_operator: GridOperator,
    /// Include the on-site generation workstream.
    pub on_site_generation: bool,
    /// Include the equipment procurement workstream.
    pub buyer_supplies_equipment: bool,
    /// Workstreams switched off regardless of the toggles above.
    pub disabled_workstreams: BTreeSet<Workstream>,
    /// Skippable templates this project omits.
    pub skipped_milestones: BTreeSet<String>,
    /// Category lead times overriding the engine defaults.
    pub lead_time_overrides: LeadTimeTable,
    /// Per-milestone lead times, keyed by template id.
    pub milestone_overrides: BTreeMap<String, LeadTime>,
    /// Calendar date of week 0.
    pub start_date: Option<NaiveDate>,
    /// Date the project must be energized by.
    pub target_energization: Option<NaiveDate>,
}

impl Default for ProjectConfiguration {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            target_capacity_mw: 100,
            voltage_class: VoltageClass::default(),
            grid_operator: GridOperator::default(),
            on_site_generation: false,
            buyer_supplies_equipment: true,
            disabled_workstreams: BTreeSet::new(),
            skipped_milestones: BTreeSet::new(),
            lead_time_overrides: LeadTimeTable::new(),
            milestone_overrides: BTreeMap::new(),
            start_date: None,
            target_energization: None,
        }
    }
}

impl ProjectConfiguration {
    /// Creates a configuration with defaults.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Self::default()
        }
    }

    /// Sets the target capacity and derives the voltage class from it.
    pub fn with_capacity_mw(mut self, mw: u32) -> Self {
        self.target_capacity_mw = mw;
        self.voltage_class = VoltageClass::for_capacity_mw(mw);
        self
    }

    pub fn with_voltage_class(mut self, voltage_class: VoltageClass) -> Self {
        self.voltage_class = voltage_class;
        self
    }

    pub fn with_grid_operator(mut self, grid_operator: GridOperator) -> Self {
        self.grid_operator = grid_operator;
        self
    }

    pub fn with_on_site_generation(mut self, enabled: bool) -> Self {
        self.on_site_generation = enabled;
        self
    }

    pub fn with_buyer_supplies_equipment(mut self, enabled: bool) -> Self {
        self.buyer_supplies_equipment = enabled;
        self
    }

    /// Switches a workstream off.
    pub fn without_workstream(mut self, workstream: Workstream) -> Self {
        self.disabled_workstreams.insert(workstream);
        self
    }

    /// Skips a (skippable) milestone.
    pub fn skipping(mut self, milestone_id: impl Into<String>) -> Self {
        self.skipped_milestones.insert(milestone_id.into());
        self
    }

    /// Adds a per-milestone lead-time override.
    pub fn with_milestone_override(
        mut self,
        milestone_id: impl Into<String>,
        lead_time: LeadTime,
    ) -> Self {
        self.milestone_overrides.insert(milestone_id.into(), lead_time);
        self
    }

    /// Replaces the category override table.
    pub fn with_lead_time_overrides(mut self, table: LeadTimeTable) -> Self {
        self.lead_time_overrides = table;
        self
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn with_target_energization(mut self, date: NaiveDate) -> Self {
        self.target_energization = Some(date);
        self
    }

    /// Whether milestones of `workstream` belong in this project.
    pub fn is_workstream_enabled(&self, workstream: Workstream) -> bool {
        let toggled_on = match workstream {
            Workstream::OnSiteGeneration => self.on_site_generation,
            Workstream::EquipmentProcurement => self.buyer_supplies_equipment,
            _ => true,
        };
        toggled_on && !self.disabled_workstreams.contains(&workstream)
    }

    /// Target energization as a week offset, when both dates are known.
    pub fn target_week(&self) -> Option<super::Week> {
        match (self.start_date, self.target_energization) {
            (Some(start), Some(target)) => Some(super::weeks_between(start, target)),
            _ => None,
        }
    }

    /// Checks every lead time the project supplies is ordered.
    pub fn check(&self) -> Result<()> {
        self.lead_time_overrides.check()?;
        self.milestone_overrides
            .iter()
            .try_for_each(|(id, lt)| lt.check(id))
    }
}

/// A project: configuration, instance state, and saved what-if scenarios.
///
/// This is the document handed to and from the persistence layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub config: ProjectConfiguration,
    /// Instances keyed by template id.
    #[serde(default)]
    pub instances: BTreeMap<String, MilestoneInstance>,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

impl Project {
    /// Creates a project with no instances.
    pub fn new(config: ProjectConfiguration) -> Self {
        Self {
            config,
            instances: BTreeMap::new(),
            scenarios: Vec::new(),
        }
    }

    /// Adds an instance (builder style).
    pub fn with_instance(mut self, instance: MilestoneInstance) -> Self {
        self.instances.insert(instance.template_id.clone(), instance);
        self
    }

    /// Adds a saved scenario.
    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenarios.push(scenario);
        self
    }

    pub fn instance(&self, milestone_id: &str) -> Option<&MilestoneInstance> {
        self.instances.get(milestone_id)
    }

    /// Instance for `milestone_id`, created with defaults if missing.
    pub fn instance_mut(&mut self, milestone_id: &str) -> &mut MilestoneInstance {
        self.instances
            .entry(milestone_id.to_string())
            .or_insert_with(|| MilestoneInstance::new(milestone_id))
    }

    /// Saved scenario by id.
    pub fn scenario(&self, scenario_id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id() == scenario_id)
    }
}

/// A project bundled with the last computed schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedProject {
    pub project: Project,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_toggles() {
        let config = ProjectConfiguration::new("p1");
        assert!(config.is_workstream_enabled(Workstream::SiteControl));
        assert!(config.is_workstream_enabled(Workstream::EquipmentProcurement));
        assert!(!config.is_workstream_enabled(Workstream::OnSiteGeneration));
    }

    #[test]
    fn test_disabled_workstreams_win() {
        let config = ProjectConfiguration::new("p1")
            .with_on_site_generation(true)
            .without_workstream(Workstream::OnSiteGeneration)
            .without_workstream(Workstream::Water);
        assert!(!config.is_workstream_enabled(Workstream::OnSiteGeneration));
        assert!(!config.is_workstream_enabled(Workstream::Water));
        assert!(config.is_workstream_enabled(Workstream::Zoning));
    }

    #[test]
    fn test_capacity_sets_voltage() {
        let config = ProjectConfiguration::new("p1").with_capacity_mw(600);
        assert_eq!(config.voltage_class, VoltageClass::Kv345);
    }

    #[test]
    fn test_target_week() {
        let config = ProjectConfiguration::new("p1")
            .with_start_date(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap())
            .with_target_energization(NaiveDate::from_ymd_opt(2030, 12, 29).unwrap());
        assert_eq!(config.target_week(), Some(311));
        assert_eq!(ProjectConfiguration::default().target_week(), None);
    }

    #[test]
    fn test_check_rejects_unordered_override() {
        let config = ProjectConfiguration::new("p1")
            .with_milestone_override("POST-EQ-05", LeadTime::new(10, 5, 20));
        assert!(config.check().is_err());
    }

    #[test]
    fn test_instance_mut_creates_default() {
        let mut project = Project::new(ProjectConfiguration::new("p1"));
        project.instance_mut("A").notes.push_str("hello");
        assert_eq!(project.instance("A").unwrap().notes, "hello");
    }
}
