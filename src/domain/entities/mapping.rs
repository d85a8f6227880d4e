use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Semantic column roles the resolver looks for in an imported sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Unit,
    KitchenInstalled,
    BathroomInstalled,
    ShowerInstalled,
    ToiletInstalled,
    LeakKitchen,
    LeakBath,
    LeakTub,
    NotesExtra,
}

impl Role {
    pub const ALL: [Role; 9] = [
        Role::Unit,
        Role::KitchenInstalled,
        Role::BathroomInstalled,
        Role::ShowerInstalled,
        Role::ToiletInstalled,
        Role::LeakKitchen,
        Role::LeakBath,
        Role::LeakTub,
        Role::NotesExtra,
    ];

    /// Narrow roles claim their columns before the broad fixture roles see them.
    pub const RESOLUTION_ORDER: [Role; 9] = [
        Role::Unit,
        Role::LeakKitchen,
        Role::LeakBath,
        Role::LeakTub,
        Role::ToiletInstalled,
        Role::KitchenInstalled,
        Role::BathroomInstalled,
        Role::ShowerInstalled,
        Role::NotesExtra,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Unit => "unit",
            Role::KitchenInstalled => "kitchenInstalled",
            Role::BathroomInstalled => "bathroomInstalled",
            Role::ShowerInstalled => "showerInstalled",
            Role::ToiletInstalled => "toiletInstalled",
            Role::LeakKitchen => "leakKitchen",
            Role::LeakBath => "leakBath",
            Role::LeakTub => "leakTub",
            Role::NotesExtra => "notesExtra",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(value.trim()))
    }

    pub fn is_leak(self) -> bool {
        matches!(self, Role::LeakKitchen | Role::LeakBath | Role::LeakTub)
    }
}

/// Installed fixture kinds shown as columns of the detail table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fixture {
    Kitchen,
    Bathroom,
    Shower,
    Toilet,
}

impl Fixture {
    pub const ALL: [Fixture; 4] = [
        Fixture::Kitchen,
        Fixture::Bathroom,
        Fixture::Shower,
        Fixture::Toilet,
    ];

    pub fn role(self) -> Role {
        match self {
            Fixture::Kitchen => Role::KitchenInstalled,
            Fixture::Bathroom => Role::BathroomInstalled,
            Fixture::Shower => Role::ShowerInstalled,
            Fixture::Toilet => Role::ToiletInstalled,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Fixture::Kitchen => "kitchen",
            Fixture::Bathroom => "bathroom",
            Fixture::Shower => "shower",
            Fixture::Toilet => "toilet",
        }
    }

    pub fn parse(value: &str) -> Option<Fixture> {
        Fixture::ALL
            .into_iter()
            .find(|fixture| fixture.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// Matching rule for one role.
///
/// A column is a candidate when it matches a synonym, contains at least one
/// of `require_any` (when non-empty) and none of `exclude_any`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleRule {
    pub synonyms: Vec<String>,
    pub require_any: Vec<String>,
    pub exclude_any: Vec<String>,
}

impl RoleRule {
    fn new(synonyms: &[&str], require_any: &[&str], exclude_any: &[&str]) -> Self {
        let owned = |items: &[&str]| items.iter().map(|item| item.to_string()).collect();
        Self {
            synonyms: owned(synonyms),
            require_any: owned(require_any),
            exclude_any: owned(exclude_any),
        }
    }

    pub fn admits(&self, column: &str) -> bool {
        let lower = column.to_lowercase();
        let required = self.require_any.is_empty()
            || self
                .require_any
                .iter()
                .any(|token| lower.contains(&token.to_lowercase()));
        let excluded = self
            .exclude_any
            .iter()
            .any(|token| lower.contains(&token.to_lowercase()));
        required && !excluded
    }
}

/// Candidate synonyms per role. The unit role is resolved by its own
/// priority rules and has no entry here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSynonyms(BTreeMap<Role, RoleRule>);

impl Default for RoleSynonyms {
    fn default() -> Self {
        let mut rules = BTreeMap::new();
        rules.insert(
            Role::KitchenInstalled,
            RoleRule::new(
                &["Kitchen Aerator", "kitchen aerator", "kitchen", "kitchen aerators"],
                &[],
                &["leak"],
            ),
        );
        rules.insert(
            Role::BathroomInstalled,
            RoleRule::new(
                &[
                    "Bathroom aerator",
                    "bathroom aerator",
                    "bathroom",
                    "bathroom aerators",
                    "bath aerator",
                ],
                &[],
                &["leak"],
            ),
        );
        rules.insert(
            Role::ShowerInstalled,
            RoleRule::new(
                &["Shower Head", "shower head", "shower", "shower heads", "shwr"],
                &[],
                &["leak"],
            ),
        );
        rules.insert(
            Role::ToiletInstalled,
            RoleRule::new(
                &[
                    "Toilets Installed",
                    "toilet",
                    "toilets installed",
                    "toilet installed",
                    "toilet install",
                ],
                &[],
                &["leak"],
            ),
        );
        rules.insert(
            Role::LeakKitchen,
            RoleRule::new(
                &["Leak Issue Kitchen Faucet", "kitchen faucet leak", "kitchen leak"],
                &["leak"],
                &[],
            ),
        );
        rules.insert(
            Role::LeakBath,
            RoleRule::new(
                &[
                    "Leak Issue Bath Faucet",
                    "bath faucet leak",
                    "bathroom faucet leak",
                    "bath leak",
                ],
                &["leak"],
                &["tub", "diverter"],
            ),
        );
        rules.insert(
            Role::LeakTub,
            RoleRule::new(
                &["Tub Spout/Diverter Leak Issue", "tub spout leak", "diverter leak"],
                &["leak"],
                &[],
            ),
        );
        rules.insert(
            Role::NotesExtra,
            RoleRule::new(&["Notes", "notes", "note", "comments", "comment", "remarks"], &[], &[]),
        );
        Self(rules)
    }
}

impl RoleSynonyms {
    pub fn rule(&self, role: Role) -> Option<&RoleRule> {
        self.0.get(&role)
    }

    /// Adds extra synonyms for a role, keeping the built-in ones.
    pub fn extend<I, S>(&mut self, role: Role, synonyms: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rule = self.0.entry(role).or_default();
        for synonym in synonyms {
            let synonym = synonym.into();
            if !rule.synonyms.contains(&synonym) {
                rule.synonyms.push(synonym);
            }
        }
    }
}

/// Role → column resolved for one import. A role maps to a column only if
/// that column exists in the import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    columns: BTreeMap<Role, String>,
}

impl ColumnMapping {
    pub fn column(&self, role: Role) -> Option<&str> {
        self.columns.get(&role).map(String::as_str)
    }

    pub fn unit_column(&self) -> Option<&str> {
        self.column(Role::Unit)
    }

    pub fn is_resolved(&self, role: Role) -> bool {
        self.columns.contains_key(&role)
    }

    pub fn role_of(&self, column: &str) -> Option<Role> {
        self.columns
            .iter()
            .find(|(_, mapped)| mapped.as_str() == column)
            .map(|(role, _)| *role)
    }

    pub fn claims(&self, column: &str) -> bool {
        self.role_of(column).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &str)> {
        self.columns
            .iter()
            .map(|(role, column)| (*role, column.as_str()))
    }

    pub(crate) fn assign(&mut self, role: Role, column: impl Into<String>) {
        self.columns.insert(role, column.into());
    }
}
