use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One source row, keyed by the header text the value appeared under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(BTreeMap<String, String>);

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(column, value)| (column.into(), value.into()))
                .collect(),
        )
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    /// Value under an optional column; absent columns read as empty.
    pub fn value(&self, column: Option<&str>) -> &str {
        column.and_then(|column| self.get(column)).unwrap_or("")
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(column, value)| (column.as_str(), value.as_str()))
    }
}

/// An imported sheet: header names in source order plus every data row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.rows.iter().map(move |row| row.get(column).unwrap_or(""))
    }
}
