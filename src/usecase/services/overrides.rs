//! User edits layered over the imported data.
//!
//! The store owns the four override maps, mirrors each mutation to its slot
//! and tells every subscriber that derived views are stale.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::domain::entities::mapping::Fixture;
use crate::domain::entities::unit::AdditionalRow;
use crate::usecase::ports::store::{encode_slot, load_slot, Slot, SlotStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideEvent {
    NoteChanged { unit: String },
    InstallationChanged { unit: String, fixture: Fixture },
    UnitRenamed { from: String, to: String },
    UnitDeleted { unit: String },
    UnitAdded { unit: String },
    Reset,
}

#[derive(Debug, thiserror::Error)]
pub enum OverrideError {
    #[error("unit id must not be blank")]
    BlankUnit,
    #[error("unit {0} already exists")]
    DuplicateUnit(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&OverrideEvent)>;

pub struct OverrideStore {
    slots: Arc<dyn SlotStore>,
    notes: BTreeMap<String, String>,
    installations: BTreeMap<String, BTreeMap<Fixture, String>>,
    /// Imported unit id → current id; an empty value marks the unit deleted.
    renames: BTreeMap<String, String>,
    additional: Vec<AdditionalRow>,
    /// Unit ids of the current import, as grouped.
    imported: BTreeSet<String>,
    revision: u64,
    next_listener: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl OverrideStore {
    pub fn load(slots: Arc<dyn SlotStore>) -> Self {
        let mut store = Self {
            slots,
            notes: BTreeMap::new(),
            installations: BTreeMap::new(),
            renames: BTreeMap::new(),
            additional: Vec::new(),
            imported: BTreeSet::new(),
            revision: 0,
            next_listener: 0,
            listeners: Vec::new(),
        };
        store.read_slots();
        store
    }

    /// Registers the imported unit ids so renames and additions cannot
    /// collide with a unit that is already shown.
    pub fn with_imported_units<I, S>(mut self, units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.imported = units.into_iter().map(Into::into).collect();
        self
    }

    /// Re-reads every slot, e.g. after an import cleared them.
    pub fn reload(&mut self) {
        self.read_slots();
        self.revision += 1;
        self.notify(&OverrideEvent::Reset);
    }

    fn read_slots(&mut self) {
        let slots = self.slots.as_ref();
        self.notes = load_slot(slots, Slot::NoteOverrides);
        self.installations = load_slot(slots, Slot::InstallationOverrides);
        self.renames = load_slot(slots, Slot::UnitRenames);
        self.additional = load_slot(slots, Slot::AdditionalRows);
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&OverrideEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    /// `Some("")` is an explicit clear and still beats the compiled note.
    pub fn note(&self, unit: &str) -> Option<&str> {
        self.notes.get(unit).map(String::as_str)
    }

    pub fn merge_note(&self, unit: &str, compiled: &str) -> String {
        self.note(unit).unwrap_or(compiled).to_string()
    }

    pub fn has_note_override(&self, unit: &str) -> bool {
        self.notes.contains_key(unit)
    }

    pub fn set_note(&mut self, unit: &str, note: &str) -> Result<(), OverrideError> {
        self.notes.insert(unit.to_string(), note.to_string());
        tracing::debug!(unit, "note override set");
        self.commit(
            &[Slot::NoteOverrides],
            OverrideEvent::NoteChanged {
                unit: unit.to_string(),
            },
        )
    }

    /// Drops the override so the compiled note shows again.
    pub fn clear_note(&mut self, unit: &str) -> Result<(), OverrideError> {
        if self.notes.remove(unit).is_none() {
            return Ok(());
        }
        tracing::debug!(unit, "note override cleared");
        self.commit(
            &[Slot::NoteOverrides],
            OverrideEvent::NoteChanged {
                unit: unit.to_string(),
            },
        )
    }

    pub fn installation(&self, unit: &str, fixture: Fixture) -> Option<&str> {
        self.installations
            .get(unit)
            .and_then(|fixtures| fixtures.get(&fixture))
            .map(String::as_str)
    }

    pub fn installations_for(&self, unit: &str) -> Option<&BTreeMap<Fixture, String>> {
        self.installations.get(unit)
    }

    /// Hand-added units store the value on their row; imported units get an
    /// installation override.
    pub fn set_installation(
        &mut self,
        unit: &str,
        fixture: Fixture,
        value: &str,
    ) -> Result<(), OverrideError> {
        let slot = match self.additional_mut(unit) {
            Some(row) => {
                row.set_fixture(fixture, value);
                Slot::AdditionalRows
            }
            None => {
                self.installations
                    .entry(unit.to_string())
                    .or_default()
                    .insert(fixture, value.to_string());
                Slot::InstallationOverrides
            }
        };
        tracing::debug!(unit, fixture = fixture.as_str(), value, "installation override set");
        self.commit(
            &[slot],
            OverrideEvent::InstallationChanged {
                unit: unit.to_string(),
                fixture,
            },
        )
    }

    pub fn additional_rows(&self) -> &[AdditionalRow] {
        &self.additional
    }

    pub fn is_additional(&self, unit: &str) -> bool {
        self.additional.iter().any(|row| row.unit == unit)
    }

    /// New units go to the top of the table. An id already shown is
    /// rejected.
    pub fn add_unit(&mut self, unit: &str) -> Result<(), OverrideError> {
        let unit = unit.trim();
        if unit.is_empty() {
            return Err(OverrideError::BlankUnit);
        }
        if self.is_live_unit(unit) {
            return Err(OverrideError::DuplicateUnit(unit.to_string()));
        }
        self.additional.insert(0, AdditionalRow::new(unit));
        tracing::debug!(unit, "unit added");
        self.commit(
            &[Slot::AdditionalRows],
            OverrideEvent::UnitAdded {
                unit: unit.to_string(),
            },
        )
    }

    /// Current id of an imported unit, `None` once deleted.
    pub fn effective_unit_id<'a>(&'a self, imported: &'a str) -> Option<&'a str> {
        match self.renames.get(imported) {
            Some(current) if current.is_empty() => None,
            Some(current) => Some(current.as_str()),
            None => Some(imported),
        }
    }

    pub fn is_deleted(&self, imported: &str) -> bool {
        self.effective_unit_id(imported).is_none()
    }

    /// True when some shown unit, imported or added, currently has this id.
    pub fn is_live_unit(&self, unit: &str) -> bool {
        self.is_additional(unit)
            || self.renames.values().any(|current| current == unit)
            || self
                .imported
                .iter()
                .any(|imported| self.effective_unit_id(imported) == Some(unit))
    }

    /// Moves every override keyed by `from` to `to`. Renaming to a blank id
    /// deletes the unit; renaming onto a shown unit fails and changes nothing.
    pub fn rename_unit(&mut self, from: &str, to: &str) -> Result<(), OverrideError> {
        let to = to.trim();
        if to.is_empty() {
            return self.delete_unit(from);
        }
        if from == to {
            return Ok(());
        }
        if self.is_live_unit(to) {
            return Err(OverrideError::DuplicateUnit(to.to_string()));
        }

        if let Some(note) = self.notes.remove(from) {
            self.notes.insert(to.to_string(), note);
        }
        if let Some(fixtures) = self.installations.remove(from) {
            self.installations.insert(to.to_string(), fixtures);
        }

        let renamed_slot = match self.additional_mut(from) {
            Some(row) => {
                row.unit = to.to_string();
                Slot::AdditionalRows
            }
            None => {
                let imported = self.imported_id_of(from);
                if imported == to {
                    self.renames.remove(&imported);
                } else {
                    self.renames.insert(imported, to.to_string());
                }
                Slot::UnitRenames
            }
        };

        tracing::debug!(from, to, "unit renamed");
        self.commit(
            &[Slot::NoteOverrides, Slot::InstallationOverrides, renamed_slot],
            OverrideEvent::UnitRenamed {
                from: from.to_string(),
                to: to.to_string(),
            },
        )
    }

    pub fn delete_unit(&mut self, unit: &str) -> Result<(), OverrideError> {
        self.notes.remove(unit);
        self.installations.remove(unit);

        let before = self.additional.len();
        self.additional.retain(|row| row.unit != unit);
        let removed_slot = if self.additional.len() != before {
            Slot::AdditionalRows
        } else {
            let imported = self.imported_id_of(unit);
            self.renames.insert(imported, String::new());
            Slot::UnitRenames
        };

        tracing::debug!(unit, "unit deleted");
        self.commit(
            &[Slot::NoteOverrides, Slot::InstallationOverrides, removed_slot],
            OverrideEvent::UnitDeleted {
                unit: unit.to_string(),
            },
        )
    }

    fn additional_mut(&mut self, unit: &str) -> Option<&mut AdditionalRow> {
        self.additional.iter_mut().find(|row| row.unit == unit)
    }

    /// The imported id currently displayed as `current`.
    fn imported_id_of(&self, current: &str) -> String {
        self.renames
            .iter()
            .find(|(_, renamed)| renamed.as_str() == current)
            .map(|(imported, _)| imported.clone())
            .unwrap_or_else(|| current.to_string())
    }

    fn commit(&mut self, touched: &[Slot], event: OverrideEvent) -> Result<(), OverrideError> {
        self.revision += 1;
        self.notify(&event);
        self.persist(touched)
    }

    fn persist(&self, touched: &[Slot]) -> Result<(), OverrideError> {
        let mut changes = Vec::with_capacity(touched.len());
        for slot in touched {
            let encoded = match slot {
                Slot::NoteOverrides => encode_slot(*slot, &self.notes)?,
                Slot::InstallationOverrides => encode_slot(*slot, &self.installations)?,
                Slot::UnitRenames => encode_slot(*slot, &self.renames)?,
                Slot::AdditionalRows => encode_slot(*slot, &self.additional)?,
                _ => continue,
            };
            changes.push((*slot, Some(encoded)));
        }
        self.slots.write_batch(&changes)?;
        Ok(())
    }

    fn notify(&mut self, event: &OverrideEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }
}
