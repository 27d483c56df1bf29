//! Widget record store trait and the in-memory implementation

use super::record::{WidgetId, WidgetRecord};
use anyhow::Result;
use std::collections::HashMap;

/// Durable CRUD for widget layout records, keyed by widget identifier.
///
/// Implementations are expected to be fast and local; callers treat every
/// operation as synchronous. `FileStore` in the config module persists to
/// disk, `MemoryStore` below backs tests and the demo shell.
pub trait WidgetStore {
    /// All persisted records, in unspecified order.
    fn list(&self) -> Result<Vec<WidgetRecord>>;

    /// Insert or replace the record for its widget identifier.
    fn insert(&mut self, record: &WidgetRecord) -> Result<WidgetId>;

    /// Delete the record and its persisted data. Deleting an absent
    /// identifier is not an error.
    fn delete(&mut self, id: WidgetId) -> Result<()>;
}

impl<T: WidgetStore + ?Sized> WidgetStore for Box<T> {
    fn list(&self) -> Result<Vec<WidgetRecord>> {
        (**self).list()
    }

    fn insert(&mut self, record: &WidgetRecord) -> Result<WidgetId> {
        (**self).insert(record)
    }

    fn delete(&mut self, id: WidgetId) -> Result<()> {
        (**self).delete(id)
    }
}

/// HashMap-backed store with no persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<WidgetId, WidgetRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl WidgetStore for MemoryStore {
    fn list(&self) -> Result<Vec<WidgetRecord>> {
        Ok(self.records.values().copied().collect())
    }

    fn insert(&mut self, record: &WidgetRecord) -> Result<WidgetId> {
        self.records.insert(record.widget_id, *record);
        Ok(record.widget_id)
    }

    fn delete(&mut self, id: WidgetId) -> Result<()> {
        self.records.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_by_id() {
        let mut store = MemoryStore::new();
        store.insert(&WidgetRecord::new(7, 100, 100)).unwrap();
        store.insert(&WidgetRecord::new(7, 200, 50)).unwrap();

        let records = store.list().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].width, 200);
    }

    #[test]
    fn delete_missing_is_ok() {
        let mut store = MemoryStore::new();
        assert!(store.delete(99).is_ok());
    }
}
