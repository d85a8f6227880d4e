use serde::de::DeserializeOwned;
use serde::Serialize;

/// Named persisted slots. Each is read and written independently; a missing
/// slot means "use defaults".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    RawTable,
    CustomerInfo,
    NoteOverrides,
    InstallationOverrides,
    UnitRenames,
    AdditionalRows,
    ColumnHeaders,
    SectionTitles,
    ReportText,
    SelectedNotesColumns,
    SelectedCells,
}

impl Slot {
    pub const ALL: [Slot; 11] = [
        Slot::RawTable,
        Slot::CustomerInfo,
        Slot::NoteOverrides,
        Slot::InstallationOverrides,
        Slot::UnitRenames,
        Slot::AdditionalRows,
        Slot::ColumnHeaders,
        Slot::SectionTitles,
        Slot::ReportText,
        Slot::SelectedNotesColumns,
        Slot::SelectedCells,
    ];

    /// Slots keyed by the unit identifiers of one import.
    pub const PER_IMPORT: [Slot; 6] = [
        Slot::NoteOverrides,
        Slot::InstallationOverrides,
        Slot::UnitRenames,
        Slot::AdditionalRows,
        Slot::SelectedNotesColumns,
        Slot::SelectedCells,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Slot::RawTable => "raw_table",
            Slot::CustomerInfo => "customer_info",
            Slot::NoteOverrides => "note_overrides",
            Slot::InstallationOverrides => "installation_overrides",
            Slot::UnitRenames => "unit_renames",
            Slot::AdditionalRows => "additional_rows",
            Slot::ColumnHeaders => "column_headers",
            Slot::SectionTitles => "section_titles",
            Slot::ReportText => "report_text",
            Slot::SelectedNotesColumns => "selected_notes_columns",
            Slot::SelectedCells => "selected_cells",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("slot store failed: {0}")]
    Backend(String),
    #[error("failed to encode slot {slot}: {source}")]
    Encode {
        slot: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub trait SlotStore: Send + Sync {
    fn init(&self) -> Result<(), StoreError>;

    fn read(&self, slot: Slot) -> Result<Option<String>, StoreError>;
    fn write(&self, slot: Slot, value: &str) -> Result<(), StoreError>;
    fn remove(&self, slot: Slot) -> Result<(), StoreError>;

    /// Applies every write (`Some`) and removal (`None`) together.
    fn write_batch(&self, changes: &[(Slot, Option<String>)]) -> Result<(), StoreError> {
        for (slot, value) in changes {
            match value {
                Some(value) => self.write(*slot, value)?,
                None => self.remove(*slot)?,
            }
        }
        Ok(())
    }
}

/// Reads a JSON slot. Absent, unreadable or malformed slots fall back to the
/// default so a corrupt entry never blocks the report.
pub fn load_slot<T>(store: &dyn SlotStore, slot: Slot) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match store.read(slot) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(err) => {
            tracing::warn!(slot = slot.key(), error = %err, "failed to read slot, using defaults");
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(slot = slot.key(), error = %err, "malformed slot, using defaults");
            T::default()
        }
    }
}

pub fn encode_slot<T: Serialize>(slot: Slot, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|source| StoreError::Encode {
        slot: slot.key(),
        source,
    })
}

pub fn save_slot<T: Serialize>(store: &dyn SlotStore, slot: Slot, value: &T) -> Result<(), StoreError> {
    let encoded = encode_slot(slot, value)?;
    store.write(slot, &encoded)
}
