use std::path::PathBuf;

use crate::infra::sqlite::queries::{apply_slot_changes, delete_slot, read_slot, upsert_slot};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::store::{Slot, SlotStore, StoreError};

/// Slots stored as rows of a single SQLite table. Each call opens its own
/// connection.
pub struct SqliteSlotStore {
    pub db_path: PathBuf,
}

impl SqliteSlotStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

fn backend(err: anyhow::Error) -> StoreError {
    StoreError::Backend(format!("{err:#}"))
}

impl SlotStore for SqliteSlotStore {
    fn init(&self) -> Result<(), StoreError> {
        init_db(&self.db_path).map_err(backend)
    }

    fn read(&self, slot: Slot) -> Result<Option<String>, StoreError> {
        read_slot(&self.db_path, slot.key()).map_err(backend)
    }

    fn write(&self, slot: Slot, value: &str) -> Result<(), StoreError> {
        upsert_slot(&self.db_path, slot.key(), value).map_err(backend)
    }

    fn remove(&self, slot: Slot) -> Result<(), StoreError> {
        delete_slot(&self.db_path, slot.key()).map_err(backend)
    }

    fn write_batch(&self, changes: &[(Slot, Option<String>)]) -> Result<(), StoreError> {
        let changes: Vec<(&str, Option<&str>)> = changes
            .iter()
            .map(|(slot, value)| (slot.key(), value.as_deref()))
            .collect();
        apply_slot_changes(&self.db_path, &changes).map_err(backend)
    }
}
