//! Engine facade.
//!
//! [`Engine`] owns the template catalog and the default lead-time table and
//! is the entry point for every operation: initializing projects, building
//! graphs, computing schedules, running scenarios, ingesting updates, and
//! risk analysis. It holds no per-project state, so one engine can serve
//! any number of projects from any number of threads.

use tracing::debug;

use crate::catalog::{standard_lead_times, Catalog};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::ingest::{self, UpdateOutcome, UpdateRequest};
use crate::models::{
    LeadTimeTable, MilestoneInstance, Project, ProjectConfiguration, SavedProject, Scenario,
    ScheduleDiff, ScheduleResult, Week,
};
use crate::resolver::LeadTimeResolver;
use crate::risk::{self, RiskProfile};
use crate::scenario::{self, CancellationToken, ScenarioComparison, ScenarioRun};
use crate::scheduler::{ScheduleKpi, TimingEngine};
use crate::validation::{self, ValidationResult};

/// Projects always start at week 0; calendar dates come from `start_date`.
const PROJECT_START: Week = 0;

/// Scheduling engine over one catalog and default lead-time table.
#[derive(Debug, Clone)]
pub struct Engine {
    catalog: Catalog,
    defaults: LeadTimeTable,
    settings: Settings,
}

impl Engine {
    /// Creates an engine with default settings.
    ///
    /// # Errors
    /// [`Error::Configuration`] if any default lead time is unordered.
    pub fn new(catalog: Catalog, defaults: LeadTimeTable) -> Result<Self> {
        defaults.check()?;
        Ok(Self {
            catalog,
            defaults,
            settings: Settings::default(),
        })
    }

    /// The standard catalog with the standard lead-time table.
    pub fn standard() -> Self {
        Self {
            catalog: Catalog::standard(),
            defaults: standard_lead_times(),
            settings: Settings::default(),
        }
    }

    /// The standard catalog with lead times and options from `settings`.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        settings.check()?;
        let defaults = settings.default_lead_times()?;
        Ok(Self {
            catalog: Catalog::standard(),
            defaults,
            settings,
        })
    }

    /// Replaces the settings, keeping catalog and defaults.
    pub fn with_settings(mut self, settings: Settings) -> Result<Self> {
        settings.check()?;
        self.settings = settings;
        Ok(self)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn defaults(&self) -> &LeadTimeTable {
        &self.defaults
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Resolver over the engine defaults.
    pub fn resolver(&self) -> LeadTimeResolver<'_> {
        LeadTimeResolver::new(&self.defaults)
    }

    /// Checks a configuration against the catalog, collecting every problem.
    pub fn validate_project(&self, config: &ProjectConfiguration) -> ValidationResult {
        validation::validate_project(config, &self.catalog)
    }

    /// Creates a project with one instance per enabled template.
    ///
    /// # Errors
    /// [`Error::Configuration`] summarizing every validation problem, or
    /// any error building the initial graph.
    pub fn initialize_project(&self, config: ProjectConfiguration) -> Result<Project> {
        if let Err(errors) = self.validate_project(&config) {
            let reason = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::configuration(config.project_id.as_str(), reason));
        }

        let instances = self
            .catalog
            .iter()
            .filter(|t| config.is_workstream_enabled(t.workstream))
            .filter(|t| !config.skipped_milestones.contains(&t.id))
            .map(|t| (t.id.clone(), MilestoneInstance::new(t.id.as_str())))
            .collect();
        let project = Project {
            config,
            instances,
            scenarios: Vec::new(),
        };

        let graph = self.build_graph(&project)?;
        debug!(
            project = %project.config.project_id,
            milestones = graph.len(),
            "project initialized"
        );
        Ok(project)
    }

    /// Builds the dependency graph of a project's enabled milestones.
    pub fn build_graph(&self, project: &Project) -> Result<DependencyGraph> {
        DependencyGraph::build(
            &self.catalog,
            &self.resolver(),
            &project.config,
            &project.instances,
        )
    }

    /// Computes the full schedule of a project.
    pub fn schedule(&self, project: &Project) -> Result<ScheduleResult> {
        let graph = self.build_graph(project)?;
        Ok(TimingEngine::new(PROJECT_START).compute(&graph))
    }

    /// Summary metrics, with margin measured against the configured target.
    pub fn kpi(&self, project: &Project, schedule: &ScheduleResult) -> ScheduleKpi {
        ScheduleKpi::calculate(schedule, project.config.target_week())
    }

    /// Applies one scenario to a copy of `baseline`.
    pub fn apply_scenario(&self, baseline: &Project, scenario: &Scenario) -> Result<ScenarioRun> {
        scenario::apply_scenario(self, baseline, scenario)
    }

    /// Schedule difference from `baseline` to `scenario`.
    pub fn diff(&self, baseline: &ScheduleResult, scenario: &ScheduleResult) -> ScheduleDiff {
        scenario::diff(baseline, scenario)
    }

    /// Evaluates scenarios in parallel on the configured worker count.
    pub fn evaluate_scenarios(
        &self,
        baseline: &Project,
        scenarios: &[Scenario],
        cancel: &CancellationToken,
    ) -> Result<Vec<Result<ScenarioRun>>> {
        scenario::evaluate_batch(self, baseline, scenarios, self.settings.batch_threads, cancel)
    }

    /// Evaluates scenarios in parallel and diffs each against the baseline.
    pub fn compare_scenarios(
        &self,
        baseline: &Project,
        scenarios: &[Scenario],
        cancel: &CancellationToken,
    ) -> Result<Vec<Result<ScenarioComparison>>> {
        let baseline_schedule = self.schedule(baseline)?;
        scenario::compare_batch(
            self,
            baseline,
            &baseline_schedule,
            scenarios,
            self.settings.batch_threads,
            cancel,
        )
    }

    pub fn apply_update(&self, project: &Project, update: &UpdateRequest) -> Result<UpdateOutcome> {
        ingest::apply_update(self, project, update)
    }

    pub fn apply_updates(&self, project: &Project, updates: &[UpdateRequest]) -> Result<UpdateOutcome> {
        ingest::apply_updates(self, project, updates)
    }

    /// Monte Carlo risk profile using the configured iterations and seed.
    pub fn risk_profile(&self, project: &Project) -> Result<RiskProfile> {
        let graph = self.build_graph(project)?;
        risk::simulate(&graph, PROJECT_START, &self.settings.risk)
    }

    /// Bundles a project with its freshly computed schedule.
    pub fn save(&self, project: &Project) -> Result<SavedProject> {
        let schedule = self.schedule(project)?;
        Ok(SavedProject {
            project: project.clone(),
            schedule: Some(schedule),
        })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::standard()
    }
}
