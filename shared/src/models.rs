use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::error::ModelError;

// ═══════════════════════════════════════════════════════════════════════════
// REQUEST IDENTIFIERS
// ═══════════════════════════════════════════════════════════════════════════

/// Application identifier taken from the request path.
///
/// Never checked against any stored application record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApplicationId(pub u64);

impl FromStr for ApplicationId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(ApplicationId)
            .map_err(|_| ModelError::InvalidApplicationId(s.to_string()))
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Document types accepted under `/applications/:application_id/...`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Passport,
    Aadhaar,
    Pan,
    Vaccine,
    Other,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 5] = [
        DocumentKind::Passport,
        DocumentKind::Aadhaar,
        DocumentKind::Pan,
        DocumentKind::Vaccine,
        DocumentKind::Other,
    ];

    /// Route segment and metrics label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::Aadhaar => "aadhaar",
            Self::Pan => "pan",
            Self::Vaccine => "vaccine",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ENUMERATED FIELD VALUES
// ═══════════════════════════════════════════════════════════════════════════

/// Vaccination status reported by the applicant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VaccineType {
    SingleDose,
    DoubleDose,
    BoosterDose,
    None,
}

impl VaccineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleDose => "SINGLE_DOSE",
            Self::DoubleDose => "DOUBLE_DOSE",
            Self::BoosterDose => "BOOSTER_DOSE",
            Self::None => "NONE",
        }
    }
}

/// Drop-down values are matched exactly; callers upper-case first.
impl FromStr for VaccineType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SINGLE_DOSE" => Ok(Self::SingleDose),
            "DOUBLE_DOSE" => Ok(Self::DoubleDose),
            "BOOSTER_DOSE" => Ok(Self::BoosterDose),
            "NONE" => Ok(Self::None),
            other => Err(ModelError::UnknownVaccineType(other.to_string())),
        }
    }
}

/// Meal preference for the applicant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MealType {
    Veg,
    NonVeg,
    Jain,
}

impl FromStr for MealType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VEG" => Ok(Self::Veg),
            "NON_VEG" => Ok(Self::NonVeg),
            "JAIN" => Ok(Self::Jain),
            other => Err(ModelError::UnknownMealType(other.to_string())),
        }
    }
}

/// Reference-data collections that back drop-down fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceCategory {
    Division,
    State,
}

impl ReferenceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Division => "division",
            Self::State => "state",
        }
    }

    /// Collection path on the reference-data service
    pub fn path(&self) -> &'static str {
        match self {
            Self::Division => "divisions",
            Self::State => "states",
        }
    }

    /// Query parameter used to filter the collection
    pub fn query_param(&self) -> &'static str {
        match self {
            Self::Division => "division_name",
            Self::State => "state_name",
        }
    }
}

impl std::fmt::Display for ReferenceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PAYLOADS
// ═══════════════════════════════════════════════════════════════════════════

/// Raw document submission keyed by field name.
///
/// Values are kept as JSON so that fields the rule set does not know about
/// are echoed back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentPayload(Map<String, Value>);

impl DocumentPayload {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Read a field as text. Strings are returned verbatim, numbers and
    /// booleans through their JSON text. `null` and absent fields are `None`.
    pub fn text(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn set_text(&mut self, field: &str, value: impl Into<String>) {
        self.0.insert(field.to_string(), Value::String(value.into()));
    }

    pub fn set_null(&mut self, field: &str) {
        self.0.insert(field.to_string(), Value::Null);
    }

    /// Rename `<prefix><name>` keys to `<name>` unless `<name>` is already
    /// present. Renamed keys keep their position. Returns how many keys
    /// were renamed.
    pub fn adopt_prefixed_keys(&mut self, prefix: &str) -> usize {
        let renames: Vec<String> = self
            .0
            .keys()
            .filter(|key| {
                key.strip_prefix(prefix)
                    .map_or(false, |name| !name.is_empty() && !self.0.contains_key(name))
            })
            .cloned()
            .collect();

        if renames.is_empty() {
            return 0;
        }

        let original = std::mem::take(&mut self.0);
        for (key, value) in original {
            if renames.contains(&key) {
                self.0.insert(key[prefix.len()..].to_string(), value);
            } else {
                self.0.insert(key, value);
            }
        }
        renames.len()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for DocumentPayload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// VALIDATION SETTINGS
// ═══════════════════════════════════════════════════════════════════════════

/// Default passport expiry cutoff: expiry dates must fall after this day
pub const DEFAULT_PASSPORT_EXPIRY_CUTOFF: &str = "2025-02-28";

/// Process-wide constants consumed by the rule sets, loaded once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSettings {
    pub passport_expiry_cutoff: NaiveDate,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            passport_expiry_cutoff: NaiveDate::parse_from_str(
                DEFAULT_PASSPORT_EXPIRY_CUTOFF,
                "%Y-%m-%d",
            )
            .unwrap_or_default(),
        }
    }
}
