//! Input validation for catalogs and project configurations.
//!
//! Checks structural integrity before any graph is built. Detects:
//! - Duplicate or empty template IDs
//! - Unordered lead-time ranges
//! - Predecessor references to unknown templates, and self-references
//! - Circular predecessor chains (DAG validation)
//! - Project settings naming unknown or non-skippable milestones
//!
//! All problems are collected rather than stopping at the first one.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::catalog::Catalog;
use crate::graph::find_cycle;
use crate::models::{MilestoneTemplate, ProjectConfiguration};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Two templates share the same ID, or an ID is blank.
    DuplicateId,
    /// A duration range violates min <= typical <= max.
    InvalidLeadTime,
    /// A predecessor references a template that doesn't exist.
    InvalidPredecessor,
    /// A template lists itself as a predecessor.
    SelfReference,
    /// Predecessor graph contains a cycle.
    CyclicDependency,
    /// A project setting names an unknown milestone.
    UnknownMilestone,
    /// A project skips a milestone that may not be skipped.
    NotSkippable,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a template catalog.
///
/// Checks:
/// 1. No blank or duplicate template IDs
/// 2. Every duration range is ordered
/// 3. No template lists itself as a predecessor
/// 4. All predecessor references point to existing templates
/// 5. No circular predecessor chains
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_catalog(templates: &[MilestoneTemplate]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut ids = HashSet::new();
    for t in templates {
        if t.id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Template '{}' has a blank ID", t.name),
            ));
        } else if !ids.insert(t.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate template ID: {}", t.id),
            ));
        }

        if !t.duration.is_ordered() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidLeadTime,
                format!("Template '{}' has unordered duration {}", t.id, t.duration),
            ));
        }
    }

    for t in templates {
        for pred in &t.predecessors {
            if pred == &t.id {
                errors.push(ValidationError::new(
                    ValidationErrorKind::SelfReference,
                    format!("Template '{}' lists itself as a predecessor", t.id),
                ));
            } else if !ids.contains(pred.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidPredecessor,
                    format!("Template '{}' references unknown predecessor '{}'", t.id, pred),
                ));
            }
        }
    }

    if let Some(cycle_err) = detect_cycles(templates) {
        errors.push(cycle_err);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects cycles among known, non-self predecessor links.
fn detect_cycles(templates: &[MilestoneTemplate]) -> Option<ValidationError> {
    // First occurrence wins when IDs are duplicated; that is reported above.
    let mut index: BTreeMap<&str, usize> = BTreeMap::new();
    for t in templates {
        let next = index.len();
        index.entry(t.id.as_str()).or_insert(next);
    }
    let names: Vec<&str> = {
        let mut names = vec![""; index.len()];
        for (&id, &i) in &index {
            names[i] = id;
        }
        names
    };

    let mut successors = vec![Vec::new(); index.len()];
    for t in templates {
        let Some(&to) = index.get(t.id.as_str()) else {
            continue;
        };
        for pred in &t.predecessors {
            if let Some(&from) = index.get(pred.as_str()) {
                if from != to {
                    successors[from].push(to);
                }
            }
        }
    }

    find_cycle(&successors).map(|cycle| {
        let path: Vec<&str> = cycle.iter().map(|&i| names[i]).collect();
        ValidationError::new(
            ValidationErrorKind::CyclicDependency,
            format!("Circular dependency: {}", path.join(" -> ")),
        )
    })
}

/// Validates a project configuration against a catalog.
///
/// Checks:
/// 1. Skipped milestones exist and are skippable
/// 2. Per-milestone overrides name existing templates and are ordered
/// 3. Category overrides are ordered
pub fn validate_project(config: &ProjectConfiguration, catalog: &Catalog) -> ValidationResult {
    let mut errors = Vec::new();

    for id in &config.skipped_milestones {
        match catalog.get(id) {
            None => errors.push(ValidationError::new(
                ValidationErrorKind::UnknownMilestone,
                format!("Skipped milestone '{id}' is not in the catalog"),
            )),
            Some(t) if !t.skippable => errors.push(ValidationError::new(
                ValidationErrorKind::NotSkippable,
                format!("Milestone '{id}' cannot be skipped"),
            )),
            Some(_) => {}
        }
    }

    for (id, lt) in &config.milestone_overrides {
        if !catalog.contains(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownMilestone,
                format!("Lead-time override for unknown milestone '{id}'"),
            ));
        }
        if !lt.is_ordered() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidLeadTime,
                format!("Override for '{id}' has unordered lead time {lt}"),
            ));
        }
    }

    for (key, lt) in config.lead_time_overrides.iter() {
        if !lt.is_ordered() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidLeadTime,
                format!("Category override '{key}' has unordered lead time {lt}"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
