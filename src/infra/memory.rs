use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::usecase::ports::store::{Slot, SlotStore, StoreError};

/// Slot store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemorySlotStore {
    slots: Mutex<BTreeMap<Slot, String>>,
}

impl MemorySlotStore {
    fn with_slots<T>(&self, f: impl FnOnce(&mut BTreeMap<Slot, String>) -> T) -> Result<T, StoreError> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| StoreError::Backend("memory slot store poisoned".to_string()))?;
        Ok(f(&mut slots))
    }
}

impl SlotStore for MemorySlotStore {
    fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn read(&self, slot: Slot) -> Result<Option<String>, StoreError> {
        self.with_slots(|slots| slots.get(&slot).cloned())
    }

    fn write(&self, slot: Slot, value: &str) -> Result<(), StoreError> {
        self.with_slots(|slots| {
            slots.insert(slot, value.to_string());
        })
    }

    fn remove(&self, slot: Slot) -> Result<(), StoreError> {
        self.with_slots(|slots| {
            slots.remove(&slot);
        })
    }

    fn write_batch(&self, changes: &[(Slot, Option<String>)]) -> Result<(), StoreError> {
        self.with_slots(|slots| {
            for (slot, value) in changes {
                match value {
                    Some(value) => slots.insert(*slot, value.clone()),
                    None => slots.remove(slot),
                };
            }
        })
    }
}
