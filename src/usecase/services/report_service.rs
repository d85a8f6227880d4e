//! Reconciles grouped units, compiled notes and overrides into the rows both
//! report tables show, and assembles the exported document.

use crate::domain::entities::mapping::{ColumnMapping, Fixture, Role, RoleSynonyms};
use crate::domain::entities::report::{
    ColumnHeaders, CoverPage, CustomerInfo, DetailColumn, DetailRow, DetailSection, LetterPage,
    NoteRow, NotesSection, ReportDocument, ReportText, SectionTitles,
};
use crate::domain::entities::selection::SelectionState;
use crate::domain::entities::table::RawTable;
use crate::domain::entities::unit::UnitRecord;
use crate::domain::rules::{compare_units, is_installation_value};
use crate::usecase::ports::store::{encode_slot, load_slot, Slot, SlotStore, StoreError};
use crate::usecase::services::column_resolver::resolve_columns;
use crate::usecase::services::grouper::group_units;
use crate::usecase::services::note_compiler::{CompiledNote, NoteCompiler};
use crate::usecase::services::overrides::OverrideStore;
use crate::usecase::services::row_filter::filter_rows;

/// The imported table after column resolution, filtering and grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedImport {
    pub mapping: ColumnMapping,
    pub units: Vec<UnitRecord>,
    /// Total stated in a `Toilets Installed: N` header.
    pub toilet_total: Option<u32>,
}

pub fn prepare(table: &RawTable, synonyms: &RoleSynonyms) -> PreparedImport {
    let mapping = resolve_columns(table, synonyms);
    let rows = filter_rows(&table.rows, &mapping);
    let units = group_units(&rows, &Fixture::ALL);
    let toilet_total = mapping
        .column(Role::ToiletInstalled)
        .and_then(toilet_total_from_header);

    tracing::debug!(
        rows = rows.len(),
        units = units.len(),
        ?toilet_total,
        "prepared import"
    );
    PreparedImport {
        mapping,
        units,
        toilet_total,
    }
}

impl PreparedImport {
    pub fn unit_ids(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(|unit| unit.unit_id.as_str())
    }
}

/// `"Toilets Installed: 42"` → `Some(42)`.
pub fn toilet_total_from_header(header: &str) -> Option<u32> {
    let (_, rest) = header.split_once(':')?;
    let digits: String = rest
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Shown in the toilet column of units with a toilet installation.
    pub toilet_label: String,
    /// List units whose only note is the not-accessed fallback.
    pub list_not_accessed: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            toilet_label: "0.8 GPF".to_string(),
            list_not_accessed: false,
        }
    }
}

/// Editable report metadata, each part in its own slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportMeta {
    pub customer: CustomerInfo,
    pub text: ReportText,
    pub headers: ColumnHeaders,
    pub titles: SectionTitles,
}

impl ReportMeta {
    pub fn load(slots: &dyn SlotStore) -> Self {
        Self {
            customer: load_slot(slots, Slot::CustomerInfo),
            text: load_slot(slots, Slot::ReportText),
            headers: load_slot(slots, Slot::ColumnHeaders),
            titles: load_slot(slots, Slot::SectionTitles),
        }
    }

    pub fn save(&self, slots: &dyn SlotStore) -> Result<(), StoreError> {
        slots.write_batch(&[
            (Slot::CustomerInfo, Some(encode_slot(Slot::CustomerInfo, &self.customer)?)),
            (Slot::ReportText, Some(encode_slot(Slot::ReportText, &self.text)?)),
            (Slot::ColumnHeaders, Some(encode_slot(Slot::ColumnHeaders, &self.headers)?)),
            (Slot::SectionTitles, Some(encode_slot(Slot::SectionTitles, &self.titles)?)),
        ])
    }
}

pub struct ReportService<'a> {
    prepared: &'a PreparedImport,
    overrides: &'a OverrideStore,
    selection: &'a SelectionState,
    options: &'a ReportOptions,
}

impl<'a> ReportService<'a> {
    pub fn new(
        prepared: &'a PreparedImport,
        overrides: &'a OverrideStore,
        selection: &'a SelectionState,
        options: &'a ReportOptions,
    ) -> Self {
        Self {
            prepared,
            overrides,
            selection,
            options,
        }
    }

    /// Units as currently edited: renamed, deleted ones dropped, installation
    /// overrides applied, hand-added units included. Each carries the note
    /// compiled before overrides.
    fn reconciled_units(&self) -> Vec<(UnitRecord, CompiledNote, bool)> {
        let compiler = NoteCompiler::new(&self.prepared.mapping, self.selection);
        let mut units = Vec::new();

        for imported in &self.prepared.units {
            let Some(current) = self.overrides.effective_unit_id(&imported.unit_id) else {
                continue;
            };
            let mut unit = imported.clone();
            if let Some(fixtures) = self.overrides.installations_for(current) {
                for (fixture, value) in fixtures {
                    unit.set_fixture(*fixture, value.clone());
                }
            }
            // selected cells are keyed by the imported id
            let compiled = compiler.compile_unit(&unit);
            unit.unit_id = current.to_string();
            units.push((unit, compiled, false));
        }

        for row in self.overrides.additional_rows() {
            let unit = row.to_unit_record();
            let compiled = compiler.compile_unit(&unit);
            units.push((unit, compiled, true));
        }

        units.sort_by(|(a, ..), (b, ..)| compare_units(&a.unit_id, &b.unit_id));
        units
    }

    pub fn detail_rows(&self) -> Vec<DetailRow> {
        self.reconciled_units()
            .into_iter()
            .map(|(unit, compiled, added)| {
                let note = self.overrides.merge_note(&unit.unit_id, &compiled.text);
                let not_accessed =
                    compiled.not_accessed && !self.overrides.has_note_override(&unit.unit_id);
                let toilet = if is_installation_value(&unit.toilet) {
                    self.options.toilet_label.clone()
                } else {
                    String::new()
                };
                DetailRow {
                    unit: unit.unit_id,
                    kitchen: unit.kitchen,
                    bathroom: unit.bathroom,
                    shower: unit.shower,
                    toilet,
                    note,
                    not_accessed,
                    added,
                }
            })
            .collect()
    }

    /// Units with something to say. Bare not-accessed fallbacks are left out
    /// unless configured otherwise.
    pub fn note_rows(&self) -> Vec<NoteRow> {
        note_rows_from(&self.detail_rows(), self.options.list_not_accessed)
    }

    /// Unit and notes always show; a fixture column shows when its column was
    /// found and some unit has an installation there, or when units were
    /// added by hand.
    pub fn visible_columns(&self, rows: &[DetailRow]) -> Vec<DetailColumn> {
        let has_added = !self.overrides.additional_rows().is_empty();
        let mut columns = vec![DetailColumn::Unit];
        for fixture in Fixture::ALL {
            let column = DetailColumn::Fixture(fixture);
            let installed = self.prepared.mapping.is_resolved(fixture.role())
                && rows.iter().any(|row| is_installation_value(row.cell(column)));
            if installed || has_added {
                columns.push(column);
            }
        }
        columns.push(DetailColumn::Notes);
        columns
    }

    pub fn toilet_count(&self, rows: &[DetailRow]) -> u32 {
        self.prepared.toilet_total.unwrap_or_else(|| {
            rows.iter()
                .filter(|row| is_installation_value(&row.toilet))
                .count() as u32
        })
    }

    pub fn build_document(&self, meta: &ReportMeta) -> ReportDocument {
        let rows = self.detail_rows();
        let columns = self
            .visible_columns(&rows)
            .into_iter()
            .map(|column| (column, meta.headers.label(column).to_string()))
            .collect();
        let toilet_count = self.toilet_count(&rows);
        let customer = &meta.customer;
        let location = customer.location_line();
        let first_name = customer
            .customer_name
            .split_whitespace()
            .next()
            .unwrap_or("");

        ReportDocument {
            cover: CoverPage {
                title: meta.text.title.clone(),
                property_name: customer.property_name.clone(),
                location: location.clone(),
                customer_name: customer.customer_name.clone(),
                date: customer.date.clone(),
            },
            letter: LetterPage {
                date: customer.date.clone(),
                customer_name: customer.customer_name.clone(),
                property_name: customer.property_name.clone(),
                location,
                re_line: format!("{} {}", meta.text.re_prefix, customer.address)
                    .trim()
                    .to_string(),
                salutation: format!("{} {},", meta.text.dear_prefix, first_name)
                    .trim()
                    .to_string(),
                paragraphs: meta.text.paragraphs_with_count(toilet_count),
                signature_name: meta.text.signature_name.clone(),
                signature_title: meta.text.signature_title.clone(),
            },
            notes: NotesSection {
                title: meta.titles.notes.clone(),
                unit_header: meta.headers.unit.clone(),
                note_header: meta.headers.notes.clone(),
                rows: note_rows_from(&rows, self.options.list_not_accessed),
            },
            detail: DetailSection {
                title: meta.titles.details_title.clone(),
                columns,
                rows,
            },
        }
    }
}

fn note_rows_from(rows: &[DetailRow], list_not_accessed: bool) -> Vec<NoteRow> {
    rows.iter()
        .filter(|row| !row.note.trim().is_empty())
        .filter(|row| list_not_accessed || !row.not_accessed)
        .map(|row| NoteRow {
            unit: row.unit.clone(),
            note: row.note.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::entities::table::RawRow;
    use crate::domain::entities::unit::NO_TOUCH;
    use crate::infra::memory::MemorySlotStore;

    fn table(columns: &[&str], rows: &[&[&str]]) -> RawTable {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .iter()
            .map(|values| {
                RawRow::from_pairs(
                    columns
                        .iter()
                        .zip(values.iter())
                        .map(|(c, v)| (c.clone(), v.to_string())),
                )
            })
            .collect();
        RawTable::new(columns, rows)
    }

    fn overrides() -> OverrideStore {
        OverrideStore::load(Arc::new(MemorySlotStore::default()))
    }

    #[test]
    fn blank_unit_sentinel_and_grouping() {
        let prepared = prepare(
            &table(
                &["Unit", "Kitchen"],
                &[&["101", "Insert"], &["101", "Insert"], &["102", ""], &["", "x"]],
            ),
            &RoleSynonyms::default(),
        );
        let units: Vec<(&str, &str)> = prepared
            .units
            .iter()
            .map(|unit| (unit.unit_id.as_str(), unit.kitchen.as_str()))
            .collect();
        assert_eq!(units, vec![("101", "Insert (2)"), ("102", NO_TOUCH)]);
    }

    #[test]
    fn empty_override_renders_as_empty_note() {
        let prepared = prepare(
            &table(
                &["Unit", "Kitchen", "Leak Issue Bath Faucet"],
                &[&["310", "Insert", "Light"]],
            ),
            &RoleSynonyms::default(),
        );
        let mut store = overrides();
        let selection = SelectionState::default();
        let options = ReportOptions::default();

        let rows = ReportService::new(&prepared, &store, &selection, &options).detail_rows();
        assert_eq!(rows[0].note, "Light leak from bathroom faucet.");

        store.set_note("310", "").expect("should set note");
        let service = ReportService::new(&prepared, &store, &selection, &options);
        assert_eq!(service.detail_rows()[0].note, "");
        assert!(service.note_rows().is_empty());
    }

    #[test]
    fn not_accessed_units_stay_out_of_notes_table() {
        let prepared = prepare(
            &table(&["Apt#", "Kitchen"], &[&["205", ""], &["206", "Insert"]]),
            &RoleSynonyms::default(),
        );
        let store = overrides();
        let selection = SelectionState::default();
        let mut options = ReportOptions::default();

        let service = ReportService::new(&prepared, &store, &selection, &options);
        let rows = service.detail_rows();
        assert_eq!(rows[0].note, "Apt not accessed.");
        assert!(rows[0].not_accessed);
        assert!(service.note_rows().is_empty());

        options.list_not_accessed = true;
        let service = ReportService::new(&prepared, &store, &selection, &options);
        assert_eq!(
            service.note_rows(),
            vec![NoteRow {
                unit: "205".to_string(),
                note: "Apt not accessed.".to_string()
            }]
        );
    }

    #[test]
    fn installation_override_changes_access_and_toilet_label() {
        let prepared = prepare(
            &table(&["Unit", "Kitchen", "Toilet"], &[&["7", "", ""], &["8", "Insert", "1"]]),
            &RoleSynonyms::default(),
        );
        let mut store = overrides();
        store
            .set_installation("7", Fixture::Toilet, "1")
            .expect("should set installation");
        let selection = SelectionState::default();
        let options = ReportOptions::default();
        let service = ReportService::new(&prepared, &store, &selection, &options);

        let rows = service.detail_rows();
        assert_eq!(rows[0].toilet, "0.8 GPF");
        assert_eq!(rows[0].note, "");
        assert!(!rows[0].not_accessed);
        assert_eq!(service.toilet_count(&rows), 2);
    }

    #[test]
    fn renamed_deleted_and_added_units_are_reconciled() {
        let prepared = prepare(
            &table(&["Unit", "Kitchen"], &[&["1", "Insert"], &["2", "Insert"], &["3", "Insert"]]),
            &RoleSynonyms::default(),
        );
        let mut store = overrides();
        store.rename_unit("1", "10").expect("should rename");
        store.delete_unit("2").expect("should delete");
        store.add_unit("4").expect("should add");
        store
            .set_installation("4", Fixture::Kitchen, "Male")
            .expect("should set installation");
        let selection = SelectionState::default();
        let options = ReportOptions::default();
        let service = ReportService::new(&prepared, &store, &selection, &options);

        let rows = service.detail_rows();
        let units: Vec<&str> = rows.iter().map(|row| row.unit.as_str()).collect();
        assert_eq!(units, vec!["3", "4", "10"]);
        assert!(rows[1].added);
        assert_eq!(rows[1].kitchen, "Male");
        assert_eq!(rows[1].bathroom, NO_TOUCH);
    }

    #[test]
    fn fixture_columns_hide_without_installations() {
        let prepared = prepare(
            &table(&["Unit", "Kitchen", "Shower"], &[&["1", "Insert", ""]]),
            &RoleSynonyms::default(),
        );
        let mut store = overrides();
        let selection = SelectionState::default();
        let options = ReportOptions::default();

        let service = ReportService::new(&prepared, &store, &selection, &options);
        let rows = service.detail_rows();
        assert_eq!(
            service.visible_columns(&rows),
            vec![
                DetailColumn::Unit,
                DetailColumn::Fixture(Fixture::Kitchen),
                DetailColumn::Notes
            ]
        );

        store.add_unit("2").expect("should add");
        let service = ReportService::new(&prepared, &store, &selection, &options);
        let rows = service.detail_rows();
        assert_eq!(service.visible_columns(&rows).len(), 6);
    }

    #[test]
    fn toilet_total_comes_from_header_when_present() {
        assert_eq!(toilet_total_from_header("Toilets Installed: 42"), Some(42));
        assert_eq!(toilet_total_from_header("Toilet"), None);

        let prepared = prepare(
            &table(&["Unit", "Toilets Installed: 42"], &[&["1", "1"]]),
            &RoleSynonyms::default(),
        );
        let store = overrides();
        let selection = SelectionState::default();
        let options = ReportOptions::default();
        let service = ReportService::new(&prepared, &store, &selection, &options);

        let mut meta = ReportMeta::default();
        meta.customer.customer_name = "Dana Reyes".to_string();
        meta.customer.address = "12 Elm St".to_string();
        let document = service.build_document(&meta);
        assert!(document.letter.paragraphs[1].contains("installed 42 toilets"));
        assert_eq!(document.letter.salutation, "Dear Dana,");
        assert_eq!(document.letter.re_line, "RE: 12 Elm St");
    }

    #[test]
    fn selected_cells_follow_renamed_units() {
        let prepared = prepare(
            &table(&["Unit", "Kitchen"], &[&["1", "Insert"]]),
            &RoleSynonyms::default(),
        );
        let mut store = overrides();
        store.rename_unit("1", "1A").expect("should rename");
        let mut selection = SelectionState::default();
        selection.toggle_cell("1", "Replaced flapper");
        let options = ReportOptions::default();
        let service = ReportService::new(&prepared, &store, &selection, &options);
        assert_eq!(service.detail_rows()[0].note, "Replaced flapper.");
    }

    #[test]
    fn meta_round_trips_through_slots() {
        let slots = MemorySlotStore::default();
        let mut meta = ReportMeta::default();
        meta.titles.notes = "Remarks".to_string();
        meta.save(&slots).expect("should save");
        assert_eq!(ReportMeta::load(&slots).titles.notes, "Remarks");
    }
}
