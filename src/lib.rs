//! Milestone dependency-graph scheduling.
//!
//! Models a development project as a network of milestones with
//! min/typical/max lead times, resolves each milestone's duration from
//! project settings, and runs the Critical Path Method to produce dates,
//! slack, and the critical path. What-if scenarios are evaluated on
//! copies of the baseline, in parallel, and diffed against it.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `MilestoneTemplate`, `MilestoneInstance`,
//!   `LeadTime`, `ProjectConfiguration`, `Scenario`, `ScheduleResult`
//! - **`catalog`**: Validated template library, including the standard one
//! - **`resolver`**: Lead-time resolution by precedence
//! - **`graph`**: Dependency graph construction and cycle detection
//! - **`scheduler`**: Forward/backward passes, critical path, KPIs
//! - **`scenario`**: Copy-on-write overrides, diffs, batch evaluation
//! - **`ingest`**: Status, date, and dependency updates
//! - **`risk`**: PERT estimates and Monte Carlo simulation
//! - **`config`**: TOML settings and project documents
//! - **`validation`**: Collect-all input checks
//!
//! # Example
//!
//! ```
//! use u_critpath::{Engine, ProjectConfiguration};
//!
//! let engine = Engine::standard();
//! let project = engine.initialize_project(ProjectConfiguration::new("campus")).unwrap();
//! let schedule = engine.schedule(&project).unwrap();
//! assert!(schedule.project_finish > 0);
//! assert!(!schedule.critical_path.is_empty());
//! ```
//!
//! # References
//!
//! - Kelley & Walker (1959), "Critical-Path Planning and Scheduling"
//! - Demeulemeester & Herroelen (2002), "Project Scheduling: A Research Handbook"

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod models;
pub mod resolver;
pub mod risk;
pub mod scenario;
pub mod scheduler;
pub mod validation;

pub use catalog::Catalog;
pub use config::Settings;
pub use engine::Engine;
pub use error::{Error, Result};
pub use ingest::{UpdateChange, UpdateOutcome, UpdateRequest, UpdateSource};
pub use models::{
    LeadTime, MilestoneInstance, MilestoneStatus, MilestoneTemplate, Project,
    ProjectConfiguration, SavedProject, Scenario, ScheduleDiff, ScheduleResult, Week,
};
pub use risk::{RiskProfile, RiskSettings};
pub use scenario::{CancellationToken, ScenarioComparison, ScenarioRun};
pub use scheduler::ScheduleKpi;
