use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::entities::mapping::{ColumnMapping, Fixture, Role};
use crate::domain::entities::table::RawRow;
use crate::domain::rules::{is_blank, is_installation_value};

/// Display value for a fixture column with no installation.
pub const NO_TOUCH: &str = "No Touch";

/// One source row projected onto the semantic roles. Columns no role
/// claimed stay available through `extra`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRecord {
    pub unit: String,
    pub kitchen: String,
    pub bathroom: String,
    pub shower: String,
    pub toilet: String,
    pub leak_kitchen: String,
    pub leak_bath: String,
    pub leak_tub: String,
    pub notes: String,
    pub extra: BTreeMap<String, String>,
}

impl InstallRecord {
    pub fn from_raw(row: &RawRow, mapping: &ColumnMapping) -> Self {
        let field = |role: Role| row.value(mapping.column(role)).to_string();
        let extra = row
            .iter()
            .filter(|(column, _)| !mapping.claims(column))
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();

        Self {
            unit: row.value(mapping.unit_column()).trim().to_string(),
            kitchen: field(Role::KitchenInstalled),
            bathroom: field(Role::BathroomInstalled),
            shower: field(Role::ShowerInstalled),
            toilet: field(Role::ToiletInstalled),
            leak_kitchen: field(Role::LeakKitchen),
            leak_bath: field(Role::LeakBath),
            leak_tub: field(Role::LeakTub),
            notes: field(Role::NotesExtra),
            extra,
        }
    }

    pub fn role_value(&self, role: Role) -> &str {
        match role {
            Role::Unit => &self.unit,
            Role::KitchenInstalled => &self.kitchen,
            Role::BathroomInstalled => &self.bathroom,
            Role::ShowerInstalled => &self.shower,
            Role::ToiletInstalled => &self.toilet,
            Role::LeakKitchen => &self.leak_kitchen,
            Role::LeakBath => &self.leak_bath,
            Role::LeakTub => &self.leak_tub,
            Role::NotesExtra => &self.notes,
        }
    }

    pub fn fixture(&self, fixture: Fixture) -> &str {
        self.role_value(fixture.role())
    }

    /// Looks a source column up by name, whether a role claimed it or not.
    pub fn column<'a>(&'a self, column: &str, mapping: &ColumnMapping) -> Option<&'a str> {
        match mapping.role_of(column) {
            Some(role) => Some(self.role_value(role)),
            None => self.extra.get(column).map(String::as_str),
        }
    }

    pub fn has_installation(&self) -> bool {
        Fixture::ALL
            .iter()
            .any(|fixture| is_installation_value(self.fixture(*fixture)))
    }

    pub fn has_leak(&self) -> bool {
        [&self.leak_kitchen, &self.leak_bath, &self.leak_tub]
            .iter()
            .any(|value| !is_blank(value))
    }
}

/// One physical unit after grouping: fixture columns hold display strings
/// such as `"Insert"`, `"Insert (2)"` or [`NO_TOUCH`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub unit_id: String,
    pub kitchen: String,
    pub bathroom: String,
    pub shower: String,
    pub toilet: String,
    pub remarks: String,
    pub note: String,
    pub rows: Vec<InstallRecord>,
}

impl UnitRecord {
    pub fn fixture(&self, fixture: Fixture) -> &str {
        match fixture {
            Fixture::Kitchen => &self.kitchen,
            Fixture::Bathroom => &self.bathroom,
            Fixture::Shower => &self.shower,
            Fixture::Toilet => &self.toilet,
        }
    }

    pub fn set_fixture(&mut self, fixture: Fixture, value: impl Into<String>) {
        let value = value.into();
        match fixture {
            Fixture::Kitchen => self.kitchen = value,
            Fixture::Bathroom => self.bathroom = value,
            Fixture::Shower => self.shower = value,
            Fixture::Toilet => self.toilet = value,
        }
    }

    pub fn has_installation(&self) -> bool {
        Fixture::ALL
            .iter()
            .any(|fixture| is_installation_value(self.fixture(*fixture)))
    }

    /// Flattens the grouped display values back into a single record, the
    /// shape the grouper consumes.
    pub fn to_install_record(&self) -> InstallRecord {
        InstallRecord {
            unit: self.unit_id.clone(),
            kitchen: self.kitchen.clone(),
            bathroom: self.bathroom.clone(),
            shower: self.shower.clone(),
            toilet: self.toilet.clone(),
            notes: self.remarks.clone(),
            ..InstallRecord::default()
        }
    }
}

/// A unit the operator added by hand; it has no source rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalRow {
    pub unit: String,
    #[serde(default)]
    pub kitchen: String,
    #[serde(default)]
    pub bathroom: String,
    #[serde(default)]
    pub shower: String,
    #[serde(default)]
    pub toilet: String,
}

impl AdditionalRow {
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            ..Self::default()
        }
    }

    pub fn set_fixture(&mut self, fixture: Fixture, value: impl Into<String>) {
        let value = value.into();
        match fixture {
            Fixture::Kitchen => self.kitchen = value,
            Fixture::Bathroom => self.bathroom = value,
            Fixture::Shower => self.shower = value,
            Fixture::Toilet => self.toilet = value,
        }
    }

    pub fn to_unit_record(&self) -> UnitRecord {
        let display = |value: &str| {
            if is_installation_value(value) {
                value.trim().to_string()
            } else {
                NO_TOUCH.to_string()
            }
        };
        UnitRecord {
            unit_id: self.unit.clone(),
            kitchen: display(&self.kitchen),
            bathroom: display(&self.bathroom),
            shower: display(&self.shower),
            toilet: if is_installation_value(&self.toilet) {
                self.toilet.trim().to_string()
            } else {
                String::new()
            },
            ..UnitRecord::default()
        }
    }
}
