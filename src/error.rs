//! Engine error taxonomy.
//!
//! Every failure is recoverable at the caller's discretion. Operations take
//! their inputs by shared reference, so a failed build, update, or scenario
//! never leaves partially mutated state behind.

use std::path::PathBuf;

use crate::validation::ValidationError;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the scheduling engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A lead-time range or project setting is invalid.
    #[error("configuration error for '{subject}': {reason}")]
    Configuration { subject: String, reason: String },

    /// A milestone id does not exist in the catalog.
    #[error("unknown milestone '{milestone_id}' referenced by {referenced_by}")]
    UnknownMilestone {
        milestone_id: String,
        referenced_by: String,
    },

    /// The dependency graph contains a cycle. The first and last ids are equal.
    #[error("cyclic dependency: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    /// An illegal status change or date ordering.
    #[error("invalid transition for milestone '{milestone_id}': {reason}")]
    InvalidTransition { milestone_id: String, reason: String },

    /// A scenario was rejected as a whole.
    ///
    /// `index` is the position of the failing override, or `None` when the
    /// overrides applied cleanly but the resulting graph did not build.
    #[error("scenario '{scenario_id}' rejected: {source}")]
    ScenarioApplication {
        scenario_id: String,
        index: Option<usize>,
        source: Box<Error>,
    },

    /// The template catalog failed validation.
    #[error("invalid catalog: {} problem(s)", .0.len())]
    InvalidCatalog(Vec<ValidationError>),

    /// A TOML document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),

    /// A configuration file could not be read.
    #[error("failed to read {}: {message}", path.display())]
    ConfigRead { path: PathBuf, message: String },

    /// A batch evaluation was cancelled before this scenario started.
    #[error("evaluation of scenario '{scenario_id}' cancelled")]
    Cancelled { scenario_id: String },
}

impl Error {
    /// Creates a configuration error.
    pub fn configuration(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// Creates an unknown-milestone error.
    pub fn unknown_milestone(
        milestone_id: impl Into<String>,
        referenced_by: impl Into<String>,
    ) -> Self {
        Self::UnknownMilestone {
            milestone_id: milestone_id.into(),
            referenced_by: referenced_by.into(),
        }
    }

    /// Creates an invalid-transition error.
    pub fn invalid_transition(milestone_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTransition {
            milestone_id: milestone_id.into(),
            reason: reason.into(),
        }
    }

    /// Milestone ids this error points at, for surfacing to users.
    pub fn milestone_ids(&self) -> Vec<&str> {
        match self {
            Self::UnknownMilestone { milestone_id, .. }
            | Self::InvalidTransition { milestone_id, .. } => vec![milestone_id.as_str()],
            Self::CyclicDependency { cycle } => {
                let mut ids: Vec<&str> = cycle.iter().map(String::as_str).collect();
                ids.dedup();
                if ids.len() > 1 && ids.first() == ids.last() {
                    ids.pop();
                }
                ids
            }
            Self::ScenarioApplication { source, .. } => source.milestone_ids(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_display() {
        let err = Error::CyclicDependency {
            cycle: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(err.to_string(), "cyclic dependency: A -> B -> A");
        assert_eq!(err.milestone_ids(), vec!["A", "B"]);
    }

    #[test]
    fn test_scenario_error_exposes_cause() {
        let err = Error::ScenarioApplication {
            scenario_id: "fast".into(),
            index: Some(1),
            source: Box::new(Error::unknown_milestone("X-01", "scenario override")),
        };
        assert!(err.to_string().contains("X-01"));
        assert_eq!(err.milestone_ids(), vec!["X-01"]);
        assert!(std::error::Error::source(&err).is_some());
    }
}
