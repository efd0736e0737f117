//! Forageable domain model.
//!
//! # Responsibility
//! - Define the canonical forageable record and its write payload.
//! - Own the required-field gate shared by store and service.
//! - Derive the map lookup query from a location address.
//!
//! # Invariants
//! - `id` is assigned by storage and never changes afterward.
//! - `id <= 0` means "not yet persisted" in edit-flow addressing.
//! - `name` and `location_address` are non-empty after trimming for every
//!   persisted record.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

const MAP_QUERY_PREFIX: &str = "geo:0,0?q=";

/// Storage-assigned identifier. Values `<= 0` are the new-entry sentinel.
pub type ForageableId = i64;

/// Required-field validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForageableValidationError {
    /// `name` is empty or whitespace-only.
    EmptyName,
    /// `location_address` is empty or whitespace-only.
    EmptyLocationAddress,
}

impl Display for ForageableValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyLocationAddress => write!(f, "location_address must not be empty"),
        }
    }
}

impl Error for ForageableValidationError {}

/// Returns `true` iff both required fields are non-empty after trimming.
pub fn is_valid_entry(name: &str, location_address: &str) -> bool {
    validate_entry(name, location_address).is_ok()
}

/// Checks required fields, reporting the first one that is empty.
pub fn validate_entry(name: &str, location_address: &str) -> Result<(), ForageableValidationError> {
    if name.trim().is_empty() {
        return Err(ForageableValidationError::EmptyName);
    }
    if location_address.trim().is_empty() {
        return Err(ForageableValidationError::EmptyLocationAddress);
    }
    Ok(())
}

/// Write payload for add/update commands: every field except `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForageableInput {
    pub name: String,
    pub location_address: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub in_season: bool,
    #[serde(default)]
    pub remind_text: String,
}

impl ForageableInput {
    /// Builds a payload with the two required fields; optional fields start empty.
    pub fn new(name: impl Into<String>, location_address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location_address: location_address.into(),
            ..Self::default()
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_in_season(mut self, in_season: bool) -> Self {
        self.in_season = in_season;
        self
    }

    pub fn with_remind_text(mut self, remind_text: impl Into<String>) -> Self {
        self.remind_text = remind_text.into();
        self
    }

    /// Validates required fields.
    pub fn validate(&self) -> Result<(), ForageableValidationError> {
        validate_entry(&self.name, &self.location_address)
    }
}

/// Persisted forageable record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forageable {
    /// Storage-assigned stable id.
    pub id: ForageableId,
    pub name: String,
    /// Street address; also feeds [`Forageable::map_query`].
    pub location_address: String,
    pub notes: String,
    pub in_season: bool,
    pub remind_text: String,
}

impl Forageable {
    /// Combines a storage id with a write payload.
    pub fn from_input(id: ForageableId, input: ForageableInput) -> Self {
        Self {
            id,
            name: input.name,
            location_address: input.location_address,
            notes: input.notes,
            in_season: input.in_season,
            remind_text: input.remind_text,
        }
    }

    /// Returns the write payload for this record, dropping `id`.
    pub fn to_input(&self) -> ForageableInput {
        ForageableInput {
            name: self.name.clone(),
            location_address: self.location_address.clone(),
            notes: self.notes.clone(),
            in_season: self.in_season,
            remind_text: self.remind_text.clone(),
        }
    }

    /// Whether this record carries a storage-assigned id.
    pub fn is_persisted(&self) -> bool {
        is_persisted_id(self.id)
    }

    /// Map lookup URI for this record's location.
    pub fn map_query(&self) -> String {
        map_query(&self.location_address)
    }
}

/// `true` for ids that storage could have assigned.
pub fn is_persisted_id(id: ForageableId) -> bool {
    id > 0
}

/// Builds a `geo:` lookup URI from a free-form address.
///
/// Rules:
/// - `", "` collapses to `","`.
/// - `". "` collapses to `" "`.
/// - Each remaining whitespace run becomes one `+`.
pub fn map_query(location_address: &str) -> String {
    let compact = location_address
        .trim()
        .replace(", ", ",")
        .replace(". ", " ");
    let query = WHITESPACE_RUN_RE.replace_all(&compact, "+");
    format!("{MAP_QUERY_PREFIX}{query}")
}
