use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Extra note material picked during the preview step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    /// Columns whose value is appended to every unit's note.
    pub selected_notes_columns: Vec<String>,
    /// Unit identifier → snippets appended to that unit's note, in order.
    pub selected_cells: BTreeMap<String, Vec<String>>,
}

impl SelectionState {
    pub fn cells_for(&self, unit: &str) -> &[String] {
        self.selected_cells
            .get(unit)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Adds the snippet, or removes it when already selected. Returns whether
    /// the snippet is selected afterwards.
    pub fn toggle_cell(&mut self, unit: &str, snippet: &str) -> bool {
        let cells = self.selected_cells.entry(unit.to_string()).or_default();
        let selected = match cells.iter().position(|cell| cell == snippet) {
            Some(idx) => {
                cells.remove(idx);
                false
            }
            None => {
                cells.push(snippet.to_string());
                true
            }
        };
        if cells.is_empty() {
            self.selected_cells.remove(unit);
        }
        selected
    }

    pub fn toggle_column(&mut self, column: &str) -> bool {
        match self
            .selected_notes_columns
            .iter()
            .position(|selected| selected == column)
        {
            Some(idx) => {
                self.selected_notes_columns.remove(idx);
                false
            }
            None => {
                self.selected_notes_columns.push(column.to_string());
                true
            }
        }
    }
}
