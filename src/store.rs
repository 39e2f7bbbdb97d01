use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::StorageError;
use crate::item::{Item, ItemStatus};
use crate::merge::{merge, CompletionPolicy, Outcome};
use crate::{Error, Result};

#[derive(Deserialize)]
struct StoreFile {
    items: Vec<Item>,
}

#[derive(Serialize)]
struct StoreFileRef<'a> {
    items: &'a [Item],
}

/// The persisted worklist: every item in insertion order, keyed by identity.
#[derive(Debug)]
pub struct WorklistStore {
    path: PathBuf,
    items: Vec<Item>,
    index: HashMap<String, usize>,
}

impl WorklistStore {
    /// An empty store that will be saved to `path`.
    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            items: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn load(path: impl Into<PathBuf>) -> core::result::Result<Self, StorageError> {
        let path = path.into();
        let text = fs::read_to_string(&path).map_err(|source| StorageError::Read {
            path: path.clone(),
            source,
        })?;
        let file: StoreFile = serde_json::from_str(&text).map_err(|source| StorageError::Corrupt {
            path: path.clone(),
            source,
        })?;

        let mut index = HashMap::with_capacity(file.items.len());
        for (pos, item) in file.items.iter().enumerate() {
            if index.insert(item.identity.clone(), pos).is_some() {
                return Err(StorageError::DuplicateIdentity {
                    path,
                    identity: item.identity.clone(),
                });
            }
        }

        Ok(Self {
            path,
            items: file.items,
            index,
        })
    }

    /// Loads `path` if it exists, otherwise starts an empty store there.
    pub fn open_or_create(path: impl Into<PathBuf>) -> core::result::Result<Self, StorageError> {
        let path = path.into();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::create(path))
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items.iter()
    }

    pub fn get(&self, identity: &str) -> Option<&Item> {
        self.index.get(identity).map(|&pos| &self.items[pos])
    }

    /// Items still waiting to be fetched, in insertion order.
    ///
    /// Calling it again starts over from the beginning.
    pub fn pending_items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items
            .iter()
            .filter(|item| item.status == ItemStatus::Pending)
    }

    /// Appends a new item. An existing identity is never replaced.
    pub fn insert(&mut self, item: Item) -> Result<()> {
        if self.index.contains_key(&item.identity) {
            return Err(Error::DuplicateItem(item.identity));
        }
        self.index.insert(item.identity.clone(), self.items.len());
        self.items.push(item);
        Ok(())
    }

    /// Merges `outcome` into the item and returns its new status.
    pub fn mark(
        &mut self,
        identity: &str,
        outcome: &Outcome,
        policy: &CompletionPolicy,
    ) -> Result<ItemStatus> {
        let pos = *self
            .index
            .get(identity)
            .ok_or_else(|| Error::UnknownItem(identity.to_string()))?;
        let slot = &mut self.items[pos];
        let updated = merge(slot.clone(), outcome, policy);
        let status = updated.status;
        *slot = updated;
        Ok(status)
    }

    /// Puts every item with `status` back to pending. Returns how many changed.
    pub fn reset(&mut self, status: ItemStatus) -> usize {
        let mut changed = 0;
        for item in self.items.iter_mut().filter(|i| i.status == status) {
            item.status = ItemStatus::Pending;
            changed += 1;
        }
        changed
    }

    pub fn summary(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for item in &self.items {
            counts.add(item.status);
        }
        counts
    }

    pub fn to_json(&self) -> core::result::Result<String, StorageError> {
        let mut json = serde_json::to_string_pretty(&StoreFileRef { items: &self.items })?;
        json.push('\n');
        Ok(json)
    }

    /// Writes the store next to its target and renames it into place.
    ///
    /// The temporary file is removed on every failure path, so the previous
    /// contents survive an error or interruption.
    pub fn save(&self) -> core::result::Result<(), StorageError> {
        let json = self.to_json()?;
        let write_err = |source: std::io::Error| StorageError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

/// Number of items per status.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub complete: usize,
    pub failed_not_found: usize,
    pub failed_no_data: usize,
}

impl StatusCounts {
    pub fn add(&mut self, status: ItemStatus) {
        match status {
            ItemStatus::Pending => self.pending += 1,
            ItemStatus::Complete => self.complete += 1,
            ItemStatus::FailedNotFound => self.failed_not_found += 1,
            ItemStatus::FailedNoData => self.failed_no_data += 1,
        }
    }

    pub fn get(&self, status: ItemStatus) -> usize {
        match status {
            ItemStatus::Pending => self.pending,
            ItemStatus::Complete => self.complete,
            ItemStatus::FailedNotFound => self.failed_not_found,
            ItemStatus::FailedNoData => self.failed_no_data,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.complete + self.failed_not_found + self.failed_no_data
    }
}

impl fmt::Display for StatusCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for status in ItemStatus::ALL {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{}: {}", status, self.get(status))?;
        }
        Ok(())
    }
}
