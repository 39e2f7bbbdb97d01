use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Mapping of field name to extracted value, as produced by one extraction.
///
/// Sorted so the persisted store serializes deterministically.
pub type FieldSet = BTreeMap<String, FieldValue>;

/// A captured value, or the explicit marker for a field whose value was
/// empty or couldn't be interpreted. Persisted as a string or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum FieldValue {
    Present(String),
    Missing,
}

impl FieldValue {
    /// Trims `raw`; an empty result becomes [`FieldValue::Missing`].
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            FieldValue::Missing
        } else {
            FieldValue::Present(trimmed.to_string())
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, FieldValue::Present(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Present(s) => Some(s),
            FieldValue::Missing => None,
        }
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(s) => FieldValue::Present(s),
            None => FieldValue::Missing,
        }
    }
}

impl From<FieldValue> for Option<String> {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Present(s) => Some(s),
            FieldValue::Missing => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Pending,
    Complete,
    FailedNotFound,
    FailedNoData,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 4] = [
        ItemStatus::Pending,
        ItemStatus::Complete,
        ItemStatus::FailedNotFound,
        ItemStatus::FailedNoData,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Complete => "complete",
            ItemStatus::FailedNotFound => "failed-not-found",
            ItemStatus::FailedNoData => "failed-no-data",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One film (or other entity) being enriched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub identity: String,
    pub locator: String,
    #[serde(default)]
    pub fields: FieldSet,
    #[serde(default)]
    pub status: ItemStatus,
}

impl Item {
    pub fn new(identity: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            locator: locator.into(),
            fields: FieldSet::new(),
            status: ItemStatus::Pending,
        }
    }

    /// True if `name` is set to a non-missing value.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(FieldValue::is_present)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(FieldValue::as_str)
    }
}
