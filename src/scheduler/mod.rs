//! Timing engine and KPI evaluation.
//!
//! Computes earliest/latest dates, slack, and the critical path of a
//! [`DependencyGraph`](crate::graph::DependencyGraph), plus summary metrics.
//!
//! # Algorithm
//!
//! The Critical Path Method: a forward pass in topological order for
//! earliest dates, a backward pass in reverse order for latest dates.
//! Milestones with recorded actuals are pinned to them.
//!
//! # KPI
//!
//! `ScheduleKpi` computes project duration, the primary driver,
//! critical-path weeks by owner, and margin to target energization.
//!
//! # References
//!
//! - Kelley & Walker (1959), "Critical-Path Planning and Scheduling"
//! - Demeulemeester & Herroelen (2002), "Project Scheduling: A Research Handbook", Ch. 4

mod critical;
mod kpi;
mod timing;

pub use kpi::{ScheduleKpi, ScheduleRisk, COMFORTABLE_MARGIN_WEEKS};
pub use timing::{compute_schedule, TimingEngine};

pub(crate) use timing::run_passes;
