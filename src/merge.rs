use crate::error::FetchError;
use crate::item::{FieldSet, FieldValue, Item, ItemStatus};

/// Result of one fetch-extract attempt, as handed to [`merge`].
pub type Outcome = core::result::Result<FieldSet, FetchError>;

/// The fields that must be present before an item counts as complete.
///
/// An empty policy accepts any item with at least one non-missing field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionPolicy {
    anchor_fields: Vec<String>,
}

impl CompletionPolicy {
    pub fn new<I, S>(anchor_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            anchor_fields: anchor_fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_satisfied(&self, item: &Item) -> bool {
        if self.anchor_fields.is_empty() {
            return item.fields.values().any(FieldValue::is_present);
        }
        self.anchor_fields.iter().all(|name| item.has_field(name))
    }
}

/// Folds `outcome` into `item` and returns the updated record.
///
/// Present values are never overwritten or removed, so merging the same
/// outcome twice is the same as merging it once. A complete item keeps its
/// status whatever the outcome.
pub fn merge(mut item: Item, outcome: &Outcome, policy: &CompletionPolicy) -> Item {
    match outcome {
        Ok(fields) => {
            for (name, value) in fields {
                if item.has_field(name) {
                    continue;
                }
                item.fields.insert(name.clone(), value.clone());
            }
            if item.status != ItemStatus::Complete {
                item.status = if policy.is_satisfied(&item) {
                    ItemStatus::Complete
                } else {
                    ItemStatus::Pending
                };
            }
        }
        Err(err) => {
            if item.status == ItemStatus::Complete {
                return item;
            }
            match err {
                FetchError::NotFound(_) => item.status = ItemStatus::FailedNotFound,
                FetchError::NoData(_) => item.status = ItemStatus::FailedNoData,
                FetchError::Transient(_) => {}
            }
        }
    }
    item
}
