//! Turns leak observations and preview selections into a unit's default note.

use crate::domain::entities::mapping::ColumnMapping;
use crate::domain::entities::selection::SelectionState;
use crate::domain::entities::unit::{InstallRecord, UnitRecord};
use crate::domain::rules::is_blank;

pub const UNIT_NOT_ACCESSED: &str = "Unit not accessed.";
pub const APT_NOT_ACCESSED: &str = "Apt not accessed.";

/// Auto-generated note before any override is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledNote {
    pub text: String,
    /// `text` is the not-accessed fallback.
    pub not_accessed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeakSite {
    KitchenFaucet,
    BathroomFaucet,
    TubSpout,
}

impl LeakSite {
    fn label(self) -> &'static str {
        match self {
            LeakSite::KitchenFaucet => "kitchen faucet",
            LeakSite::BathroomFaucet => "bathroom faucet",
            LeakSite::TubSpout => "tub spout/diverter",
        }
    }

    fn accepts_dripping(self) -> bool {
        !matches!(self, LeakSite::TubSpout)
    }
}

fn leak_sentence(site: LeakSite, value: &str) -> Option<String> {
    if is_blank(value) {
        return None;
    }
    let label = site.label();
    let sentence = match value.trim().to_lowercase().as_str() {
        "light" => format!("Light leak from {label}."),
        "moderate" => format!("Moderate leak from {label}."),
        "heavy" => format!("Heavy leak from {label}."),
        "dripping" | "driping" if site.accepts_dripping() => format!("Dripping from {label}."),
        _ => format!("Leak from {label}."),
    };
    Some(sentence)
}

/// "Apt not accessed." when the unit column is apartment-flavoured.
pub fn not_accessed_message(unit_column: Option<&str>) -> &'static str {
    let Some(column) = unit_column else {
        return UNIT_NOT_ACCESSED;
    };
    let lower = column.to_lowercase();
    if lower.contains("apt") || lower.contains("apartment") {
        APT_NOT_ACCESSED
    } else {
        UNIT_NOT_ACCESSED
    }
}

/// Capitalises the first letter of each sentence and lower-cases the rest.
/// A trailing period survives only if the input ended with one.
pub fn format_note(note: &str) -> String {
    if note.is_empty() {
        return String::new();
    }

    let sentences: Vec<String> = note
        .split('.')
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .map(sentence_case)
        .collect();

    let mut formatted = sentences.join(". ");
    if note.ends_with('.') && !formatted.is_empty() {
        formatted.push('.');
    }
    formatted
}

fn sentence_case(sentence: &str) -> String {
    let mut chars = sentence.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}

pub struct NoteCompiler<'a> {
    mapping: &'a ColumnMapping,
    selection: &'a SelectionState,
}

impl<'a> NoteCompiler<'a> {
    pub fn new(mapping: &'a ColumnMapping, selection: &'a SelectionState) -> Self {
        Self { mapping, selection }
    }

    /// Compiles the note for a single source row.
    pub fn compile(&self, record: &InstallRecord) -> CompiledNote {
        let mut sentences = Vec::new();
        self.push_row_sentences(record, &mut sentences);
        self.push_cell_snippets(&record.unit, &mut sentences);
        self.finish(sentences, record.has_installation())
    }

    /// Compiles the note for a grouped unit. Sentences repeated across the
    /// unit's rows appear once; the access check uses the unit's effective
    /// fixture values.
    pub fn compile_unit(&self, unit: &UnitRecord) -> CompiledNote {
        let mut sentences = Vec::new();
        for row in &unit.rows {
            self.push_row_sentences(row, &mut sentences);
        }
        self.push_cell_snippets(&unit.unit_id, &mut sentences);
        self.finish(sentences, unit.has_installation())
    }

    fn push_row_sentences(&self, record: &InstallRecord, sentences: &mut Vec<String>) {
        let leaks = [
            (LeakSite::KitchenFaucet, record.leak_kitchen.as_str()),
            (LeakSite::BathroomFaucet, record.leak_bath.as_str()),
            (LeakSite::TubSpout, record.leak_tub.as_str()),
        ];
        for (site, value) in leaks {
            if let Some(sentence) = leak_sentence(site, value) {
                push_unique(sentences, sentence);
            }
        }

        for column in &self.selection.selected_notes_columns {
            let Some(value) = record.column(column, self.mapping) else {
                continue;
            };
            if is_blank(value) {
                continue;
            }
            push_unique(sentences, format!("{}.", sentence_case(value.trim())));
        }
    }

    fn push_cell_snippets(&self, unit: &str, sentences: &mut Vec<String>) {
        for snippet in self.selection.cells_for(unit) {
            if is_blank(snippet) {
                continue;
            }
            sentences.push(format!("{}.", snippet.trim()));
        }
    }

    fn finish(&self, sentences: Vec<String>, installed: bool) -> CompiledNote {
        let joined = sentences.join(" ");
        if joined.trim().is_empty() && !installed {
            return CompiledNote {
                text: not_accessed_message(self.mapping.unit_column()).to_string(),
                not_accessed: true,
            };
        }
        CompiledNote {
            text: format_note(joined.trim()),
            not_accessed: false,
        }
    }
}

fn push_unique(sentences: &mut Vec<String>, sentence: String) {
    if !sentences.contains(&sentence) {
        sentences.push(sentence);
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::domain::entities::mapping::RoleSynonyms;
    use crate::domain::entities::table::{RawRow, RawTable};
    use crate::usecase::services::column_resolver::resolve_columns;

    fn mapping(columns: &[&str]) -> ColumnMapping {
        let table = RawTable::new(columns.iter().map(|column| column.to_string()).collect(), Vec::new());
        resolve_columns(&table, &RoleSynonyms::default())
    }

    fn record(unit: &str) -> InstallRecord {
        InstallRecord {
            unit: unit.to_string(),
            ..InstallRecord::default()
        }
    }

    #[test]
    fn moderate_kitchen_leak_with_installation() {
        let mapping = mapping(&["Unit", "Kitchen Aerator", "Leak Issue Kitchen Faucet"]);
        let selection = SelectionState::default();
        let compiler = NoteCompiler::new(&mapping, &selection);
        let row = InstallRecord {
            kitchen: "Insert".to_string(),
            leak_kitchen: "Moderate".to_string(),
            ..record("101")
        };
        let note = compiler.compile(&row);
        assert_eq!(note.text, "Moderate leak from kitchen faucet.");
        assert!(!note.not_accessed);
    }

    #[test]
    fn apt_column_yields_apt_not_accessed() {
        let mapping = mapping(&["Apt#", "Kitchen"]);
        let selection = SelectionState::default();
        let compiler = NoteCompiler::new(&mapping, &selection);
        let note = compiler.compile(&record("205"));
        assert_eq!(note.text, "Apt not accessed.");
        assert!(note.not_accessed);
    }

    #[test]
    fn unit_column_yields_unit_not_accessed() {
        let mapping = mapping(&["Bldg/Unit"]);
        let selection = SelectionState::default();
        let compiler = NoteCompiler::new(&mapping, &selection);
        assert_eq!(compiler.compile(&record("1-101")).text, "Unit not accessed.");
    }

    #[test]
    fn toilet_only_unit_counts_as_accessed() {
        let mapping = mapping(&["Unit", "Toilets Installed: 3"]);
        let selection = SelectionState::default();
        let compiler = NoteCompiler::new(&mapping, &selection);
        let row = InstallRecord {
            toilet: "1".to_string(),
            ..record("4")
        };
        let note = compiler.compile(&row);
        assert_eq!(note.text, "");
        assert!(!note.not_accessed);
    }

    #[test]
    fn leak_severities_are_case_insensitive_for_every_site() {
        let mapping = mapping(&["Unit"]);
        let selection = SelectionState::default();
        let compiler = NoteCompiler::new(&mapping, &selection);
        let row = InstallRecord {
            leak_kitchen: " DRIPING ".to_string(),
            leak_bath: "yes".to_string(),
            leak_tub: "heavy".to_string(),
            ..record("9")
        };
        assert_eq!(
            compiler.compile(&row).text,
            "Dripping from kitchen faucet. Leak from bathroom faucet. Heavy leak from tub spout/diverter."
        );
    }

    #[test]
    fn selected_columns_and_cells_are_appended_in_order() {
        let mapping = mapping(&["Unit", "Comments", "Tech"]);
        let mut selection = SelectionState::default();
        selection.toggle_column("Tech");
        selection.toggle_column("Comments");
        selection.toggle_cell("12", "Replaced FLAPPER");
        let compiler = NoteCompiler::new(&mapping, &selection);

        let mut extra = RawRow::new();
        extra.insert("Unit", "12");
        extra.insert("Comments", "TENANT ASKED for callback");
        extra.insert("Tech", "");
        let row = InstallRecord::from_raw(&extra, &mapping);

        assert_eq!(
            compiler.compile(&row).text,
            "Tenant asked for callback. Replaced flapper."
        );
    }

    #[test]
    fn unit_compilation_deduplicates_repeated_leaks() {
        let mapping = mapping(&["Unit"]);
        let selection = SelectionState::default();
        let compiler = NoteCompiler::new(&mapping, &selection);
        let leak = InstallRecord {
            leak_bath: "Light".to_string(),
            ..record("310")
        };
        let unit = UnitRecord {
            unit_id: "310".to_string(),
            kitchen: "Insert".to_string(),
            rows: vec![leak.clone(), leak],
            ..UnitRecord::default()
        };
        assert_eq!(compiler.compile_unit(&unit).text, "Light leak from bathroom faucet.");
    }

    #[test]
    fn format_note_sentence_cases_and_keeps_trailing_period() {
        assert_eq!(format_note("hello WORLD. second ONE."), "Hello world. Second one.");
        assert_eq!(format_note("no period"), "No period");
        assert_eq!(format_note(""), "");
    }

    proptest! {
        #[test]
        fn format_note_is_idempotent(note in "[a-zA-Z0-9éÉ ,!?'.]{0,80}") {
            let once = format_note(&note);
            prop_assert_eq!(format_note(&once), once);
        }
    }
}
