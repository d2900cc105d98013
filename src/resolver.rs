//! Lead-time resolution.
//!
//! Determines the duration range of a milestone for one project. The first
//! matching rule wins:
//!
//! 1. Per-milestone override in [`ProjectConfiguration::milestone_overrides`]
//! 2. Project category override: qualified key, then bare category
//! 3. Default category table: qualified key, then bare category
//! 4. The template's static duration
//!
//! Instance-level overrides sit above all of these and are applied by the
//! graph builder.
//!
//! A qualified key refines a category by the project's voltage class
//! (transformers) or grid operator (system impact studies).

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{
    LeadTime, LeadTimeCategory, LeadTimeKey, LeadTimeTable, MilestoneTemplate,
    ProjectConfiguration, QualifierKind,
};

/// Where a resolved lead time came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum LeadTimeSource {
    /// The instance carries its own duration.
    InstanceOverride,
    /// `milestone_overrides` in the project configuration.
    MilestoneOverride,
    /// The project's category table.
    ProjectCategory(LeadTimeKey),
    /// The engine-wide default table.
    DefaultCategory(LeadTimeKey),
    /// The template's static duration.
    Template,
}

/// A resolved lead time and the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub lead_time: LeadTime,
    pub source: LeadTimeSource,
}

/// Resolves template durations against a default table.
///
/// Holds the default table by reference; resolution is pure.
#[derive(Debug, Clone, Copy)]
pub struct LeadTimeResolver<'a> {
    defaults: &'a LeadTimeTable,
}

impl<'a> LeadTimeResolver<'a> {
    pub fn new(defaults: &'a LeadTimeTable) -> Self {
        Self { defaults }
    }

    /// Default table in use.
    pub fn defaults(&self) -> &'a LeadTimeTable {
        self.defaults
    }

    /// Effective lead time of `template` under `config`.
    ///
    /// # Errors
    /// [`Error::Configuration`](crate::Error::Configuration) if the winning
    /// range is unordered.
    pub fn resolve(
        &self,
        template: &MilestoneTemplate,
        config: &ProjectConfiguration,
    ) -> Result<LeadTime> {
        self.resolve_with_source(template, config)
            .map(|r| r.lead_time)
    }

    /// Like [`resolve`](Self::resolve), also reporting which rule matched.
    pub fn resolve_with_source(
        &self,
        template: &MilestoneTemplate,
        config: &ProjectConfiguration,
    ) -> Result<Resolution> {
        let resolution = self.lookup(template, config);
        resolution.lead_time.check(&template.id)?;
        Ok(resolution)
    }

    fn lookup(&self, template: &MilestoneTemplate, config: &ProjectConfiguration) -> Resolution {
        if let Some(lt) = config.milestone_overrides.get(&template.id) {
            return Resolution {
                lead_time: *lt,
                source: LeadTimeSource::MilestoneOverride,
            };
        }

        if let Some(category) = template.lead_time_category {
            let keys = candidate_keys(category, config);
            for key in keys.iter().flatten() {
                if let Some(lt) = config.lead_time_overrides.get(key) {
                    return Resolution {
                        lead_time: *lt,
                        source: LeadTimeSource::ProjectCategory(*key),
                    };
                }
            }
            for key in keys.iter().flatten() {
                if let Some(lt) = self.defaults.get(key) {
                    return Resolution {
                        lead_time: *lt,
                        source: LeadTimeSource::DefaultCategory(*key),
                    };
                }
            }
        }

        Resolution {
            lead_time: template.duration,
            source: LeadTimeSource::Template,
        }
    }
}

/// Qualified key (if the category takes one), then the bare key.
fn candidate_keys(
    category: LeadTimeCategory,
    config: &ProjectConfiguration,
) -> [Option<LeadTimeKey>; 2] {
    let qualified = category.qualifier_kind().map(|kind| match kind {
        QualifierKind::Voltage => LeadTimeKey::voltage(category, config.voltage_class),
        QualifierKind::Operator => LeadTimeKey::operator(category, config.grid_operator),
    });
    [qualified, Some(LeadTimeKey::category(category))]
}
