//! Lead-time ranges and category tables.
//!
//! A [`LeadTime`] is a three-point duration estimate in calendar weeks.
//! A [`LeadTimeTable`] maps category keys (optionally qualified by voltage
//! class or grid operator) to lead times.
//!
//! # Key Format
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `hv_breakers` | HV breakers, any project |
//! | `transformer/345kv` | Power transformer for a 345 kV interconnection |
//! | `system_impact_study/pjm` | System impact study under PJM |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Three-point duration estimate in weeks.
///
/// # Invariant
/// `min <= typical <= max`, checked with [`LeadTime::check`]. Ranges are
/// never clamped into order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeadTime {
    /// Best case (weeks).
    pub min: u32,
    /// Expected case (weeks).
    pub typical: u32,
    /// Worst case (weeks).
    pub max: u32,
}

impl LeadTime {
    /// Creates a lead time. Call [`check`](Self::check) before trusting it.
    pub const fn new(min: u32, typical: u32, max: u32) -> Self {
        Self { min, typical, max }
    }

    /// A degenerate range where all three points are equal.
    pub const fn fixed(weeks: u32) -> Self {
        Self::new(weeks, weeks, weeks)
    }

    /// Whether `min <= typical <= max`.
    pub fn is_ordered(&self) -> bool {
        self.min <= self.typical && self.typical <= self.max
    }

    /// Fails with [`Error::Configuration`] naming `subject` if unordered.
    pub fn check(&self, subject: &str) -> Result<()> {
        if self.is_ordered() {
            Ok(())
        } else {
            Err(Error::configuration(
                subject,
                format!(
                    "lead time must satisfy min <= typical <= max, got {}/{}/{}",
                    self.min, self.typical, self.max
                ),
            ))
        }
    }

    /// Width of the range (max - min).
    pub fn spread(&self) -> u32 {
        self.max.saturating_sub(self.min)
    }
}

impl fmt::Display for LeadTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{} wk", self.min, self.typical, self.max)
    }
}

/// Interconnection voltage class, used to pick transformer lead times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VoltageClass {
    #[serde(rename = "69kv")]
    Kv69,
    #[default]
    #[serde(rename = "138kv")]
    Kv138,
    #[serde(rename = "230kv")]
    Kv230,
    #[serde(rename = "345kv")]
    Kv345,
    #[serde(rename = "500kv")]
    Kv500,
}

impl VoltageClass {
    /// All classes, ascending.
    pub const ALL: [Self; 5] = [Self::Kv69, Self::Kv138, Self::Kv230, Self::Kv345, Self::Kv500];

    /// Nominal voltage in kV.
    pub fn kv(self) -> u32 {
        match self {
            Self::Kv69 => 69,
            Self::Kv138 => 138,
            Self::Kv230 => 230,
            Self::Kv345 => 345,
            Self::Kv500 => 500,
        }
    }

    /// Highest class whose nominal voltage does not exceed `kv`.
    /// Anything below 138 kV maps to 69 kV.
    pub fn from_kv(kv: u32) -> Self {
        Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|class| kv >= class.kv())
            .unwrap_or(Self::Kv69)
    }

    /// Typical interconnection voltage for a load of the given size.
    pub fn for_capacity_mw(mw: u32) -> Self {
        if mw >= 500 {
            Self::Kv345
        } else if mw >= 200 {
            Self::Kv230
        } else if mw >= 100 {
            Self::Kv138
        } else {
            Self::Kv69
        }
    }

    /// Key token, e.g. `345kv`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kv69 => "69kv",
            Self::Kv138 => "138kv",
            Self::Kv230 => "230kv",
            Self::Kv345 => "345kv",
            Self::Kv500 => "500kv",
        }
    }
}

impl FromStr for VoltageClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|class| class.as_str() == lower)
            .ok_or_else(|| Error::configuration(s, "unknown voltage class"))
    }
}

/// Grid operator (ISO/RTO) administering the interconnection queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridOperator {
    Pjm,
    Ercot,
    #[default]
    Spp,
    Miso,
    Caiso,
    Nyiso,
    IsoNe,
}

impl GridOperator {
    /// All operators.
    pub const ALL: [Self; 7] = [
        Self::Pjm,
        Self::Ercot,
        Self::Spp,
        Self::Miso,
        Self::Caiso,
        Self::Nyiso,
        Self::IsoNe,
    ];

    /// Key token, e.g. `pjm`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pjm => "pjm",
            Self::Ercot => "ercot",
            Self::Spp => "spp",
            Self::Miso => "miso",
            Self::Caiso => "caiso",
            Self::Nyiso => "nyiso",
            Self::IsoNe => "isone",
        }
    }
}

impl FromStr for GridOperator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == lower)
            .ok_or_else(|| Error::configuration(s, "unknown grid operator"))
    }
}

/// Which project attribute refines a category lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualifierKind {
    /// Keyed by [`VoltageClass`].
    Voltage,
    /// Keyed by [`GridOperator`].
    Operator,
}

/// Lead-time category referenced by templates with a dynamic duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadTimeCategory {
    Transformer,
    HvBreakers,
    MvBreakers,
    Switchgear,
    GasTurbine,
    ReciprocatingEngine,
    ScreeningStudy,
    SystemImpactStudy,
    FacilitiesStudy,
}

impl LeadTimeCategory {
    /// All categories.
    pub const ALL: [Self; 9] = [
        Self::Transformer,
        Self::HvBreakers,
        Self::MvBreakers,
        Self::Switchgear,
        Self::GasTurbine,
        Self::ReciprocatingEngine,
        Self::ScreeningStudy,
        Self::SystemImpactStudy,
        Self::FacilitiesStudy,
    ];

    /// Project attribute that qualifies this category, if any.
    pub fn qualifier_kind(self) -> Option<QualifierKind> {
        match self {
            Self::Transformer => Some(QualifierKind::Voltage),
            Self::SystemImpactStudy => Some(QualifierKind::Operator),
            _ => None,
        }
    }

    /// Key token, e.g. `hv_breakers`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transformer => "transformer",
            Self::HvBreakers => "hv_breakers",
            Self::MvBreakers => "mv_breakers",
            Self::Switchgear => "switchgear",
            Self::GasTurbine => "gas_turbine",
            Self::ReciprocatingEngine => "reciprocating_engine",
            Self::ScreeningStudy => "screening_study",
            Self::SystemImpactStudy => "system_impact_study",
            Self::FacilitiesStudy => "facilities_study",
        }
    }
}

impl FromStr for LeadTimeCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::configuration(s, "unknown lead-time category"))
    }
}

/// Refinement of a category by a project attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Qualifier {
    Voltage(VoltageClass),
    Operator(GridOperator),
}

impl Qualifier {
    fn as_str(self) -> &'static str {
        match self {
            Self::Voltage(v) => v.as_str(),
            Self::Operator(op) => op.as_str(),
        }
    }
}

/// Key into a [`LeadTimeTable`]: a category, optionally qualified.
///
/// Serialized as `category` or `category/qualifier`. Parsing rejects
/// unknown tokens and qualifiers that don't apply to the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LeadTimeKey {
    pub category: LeadTimeCategory,
    pub qualifier: Option<Qualifier>,
}

impl LeadTimeKey {
    /// Unqualified key.
    pub fn category(category: LeadTimeCategory) -> Self {
        Self {
            category,
            qualifier: None,
        }
    }

    /// Key qualified by voltage class.
    pub fn voltage(category: LeadTimeCategory, voltage: VoltageClass) -> Self {
        Self {
            category,
            qualifier: Some(Qualifier::Voltage(voltage)),
        }
    }

    /// Key qualified by grid operator.
    pub fn operator(category: LeadTimeCategory, operator: GridOperator) -> Self {
        Self {
            category,
            qualifier: Some(Qualifier::Operator(operator)),
        }
    }
}

impl fmt::Display for LeadTimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.qualifier {
            Some(q) => write!(f, "{}/{}", self.category.as_str(), q.as_str()),
            None => f.write_str(self.category.as_str()),
        }
    }
}

impl FromStr for LeadTimeKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (category_token, qualifier_token) = match s.split_once('/') {
            Some((c, q)) => (c, Some(q)),
            None => (s, None),
        };
        let category: LeadTimeCategory = category_token.parse()?;

        let qualifier = match (qualifier_token, category.qualifier_kind()) {
            (None, _) => None,
            (Some(token), Some(QualifierKind::Voltage)) => {
                Some(Qualifier::Voltage(token.parse()?))
            }
            (Some(token), Some(QualifierKind::Operator)) => {
                Some(Qualifier::Operator(token.parse()?))
            }
            (Some(_), None) => {
                return Err(Error::configuration(
                    s,
                    format!("category '{}' takes no qualifier", category.as_str()),
                ))
            }
        };

        Ok(Self {
            category,
            qualifier,
        })
    }
}

impl TryFrom<String> for LeadTimeKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<LeadTimeKey> for String {
    fn from(key: LeadTimeKey) -> Self {
        key.to_string()
    }
}

/// Category key → lead time mapping.
///
/// Used both for the process-wide defaults and for per-project overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadTimeTable {
    entries: BTreeMap<LeadTimeKey, LeadTime>,
}

impl LeadTimeTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry (builder style).
    pub fn with_entry(mut self, key: LeadTimeKey, lead_time: LeadTime) -> Self {
        self.entries.insert(key, lead_time);
        self
    }

    /// Inserts or replaces an entry, returning the previous value.
    pub fn insert(&mut self, key: LeadTimeKey, lead_time: LeadTime) -> Option<LeadTime> {
        self.entries.insert(key, lead_time)
    }

    /// Exact-key lookup.
    pub fn get(&self, key: &LeadTimeKey) -> Option<&LeadTime> {
        self.entries.get(key)
    }

    /// Copies every entry of `other` over this table.
    pub fn merge(&mut self, other: &LeadTimeTable) {
        self.entries
            .extend(other.entries.iter().map(|(k, v)| (*k, *v)));
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&LeadTimeKey, &LeadTime)> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks every entry is ordered.
    pub fn check(&self) -> Result<()> {
        self.entries
            .iter()
            .try_for_each(|(key, lt)| lt.check(&key.to_string()))
    }
}
