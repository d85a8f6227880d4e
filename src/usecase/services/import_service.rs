use std::path::Path;
use std::sync::Arc;

use crate::domain::entities::selection::SelectionState;
use crate::domain::entities::table::RawTable;
use crate::infra::import::{read_table, ImportError};
use crate::usecase::ports::store::{encode_slot, load_slot, Slot, SlotStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub columns: Vec<String>,
    pub row_count: usize,
}

pub struct ImportService {
    slots: Arc<dyn SlotStore>,
}

impl ImportService {
    pub fn new(slots: Arc<dyn SlotStore>) -> Self {
        Self { slots }
    }

    pub fn import_file(&self, path: &Path) -> Result<ImportSummary, ImportError> {
        let table = read_table(path)?;
        self.commit(&table)
    }

    /// Replaces the stored table. Everything keyed by the previous data set's
    /// unit ids is cleared in the same batch; report metadata is kept.
    pub fn commit(&self, table: &RawTable) -> Result<ImportSummary, ImportError> {
        if table.columns.is_empty() {
            return Err(ImportError::MissingHeader);
        }
        if table.is_empty() {
            return Err(ImportError::Empty);
        }

        let mut changes = vec![(Slot::RawTable, Some(encode_slot(Slot::RawTable, table)?))];
        changes.extend(Slot::PER_IMPORT.iter().map(|slot| (*slot, None)));
        self.slots.write_batch(&changes)?;

        tracing::info!(
            columns = table.columns.len(),
            rows = table.rows.len(),
            "import committed"
        );
        Ok(ImportSummary {
            columns: table.columns.clone(),
            row_count: table.rows.len(),
        })
    }

    pub fn load_table(&self) -> RawTable {
        load_slot(self.slots.as_ref(), Slot::RawTable)
    }

    pub fn load_selection(&self) -> SelectionState {
        SelectionState {
            selected_notes_columns: load_slot(self.slots.as_ref(), Slot::SelectedNotesColumns),
            selected_cells: load_slot(self.slots.as_ref(), Slot::SelectedCells),
        }
    }

    pub fn save_selection(&self, selection: &SelectionState) -> Result<(), StoreError> {
        self.slots.write_batch(&[
            (
                Slot::SelectedNotesColumns,
                Some(encode_slot(
                    Slot::SelectedNotesColumns,
                    &selection.selected_notes_columns,
                )?),
            ),
            (
                Slot::SelectedCells,
                Some(encode_slot(Slot::SelectedCells, &selection.selected_cells)?),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::table::RawRow;
    use crate::infra::memory::MemorySlotStore;

    fn table() -> RawTable {
        RawTable::new(
            vec!["Unit".to_string(), "Kitchen".to_string()],
            vec![RawRow::from_pairs([("Unit", "101"), ("Kitchen", "Insert")])],
        )
    }

    #[test]
    fn commit_clears_per_import_slots_but_keeps_metadata() {
        let slots = Arc::new(MemorySlotStore::default());
        slots.write(Slot::NoteOverrides, r#"{"101":"x"}"#).expect("should write");
        slots.write(Slot::CustomerInfo, r#"{"customerName":"Acme"}"#).expect("should write");
        let service = ImportService::new(slots.clone());

        let summary = service.commit(&table()).expect("should commit");
        assert_eq!(summary.row_count, 1);
        assert_eq!(service.load_table(), table());
        assert_eq!(slots.read(Slot::NoteOverrides).expect("should read"), None);
        assert!(slots.read(Slot::CustomerInfo).expect("should read").is_some());
    }

    #[test]
    fn empty_table_commits_nothing() {
        let slots = Arc::new(MemorySlotStore::default());
        slots.write(Slot::NoteOverrides, "{}").expect("should write");
        let service = ImportService::new(slots.clone());

        let empty = RawTable::new(vec!["Unit".to_string()], Vec::new());
        assert!(matches!(service.commit(&empty), Err(ImportError::Empty)));
        assert_eq!(slots.read(Slot::RawTable).expect("should read"), None);
        assert!(slots.read(Slot::NoteOverrides).expect("should read").is_some());
    }

    #[test]
    fn selection_round_trips_through_slots() {
        let service = ImportService::new(Arc::new(MemorySlotStore::default()));
        let mut selection = SelectionState::default();
        selection.toggle_column("Comments");
        selection.toggle_cell("101", "Running toilet");
        service.save_selection(&selection).expect("should save");
        assert_eq!(service.load_selection(), selection);
    }
}
