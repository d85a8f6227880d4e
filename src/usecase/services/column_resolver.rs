//! Heuristic detection of the semantic columns of an uploaded sheet.
//!
//! Every consumer resolves columns through [`resolve_columns`]; nothing else
//! in the crate matches header text.

use crate::domain::entities::mapping::{ColumnMapping, Role, RoleRule, RoleSynonyms};
use crate::domain::entities::table::RawTable;
use crate::domain::rules::is_meaningful;

const UNIT_EXACT: [&str; 3] = ["bldg/unit", "building/unit", "unit"];
const UNIT_KEYWORDS: [&str; 5] = ["unit", "apt", "apartment", "room", "number"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchKind {
    Exact,
    CaseInsensitive,
    Substring,
}

/// Resolves every role against the table. Roles without a candidate column
/// are simply absent from the mapping.
pub fn resolve_columns(table: &RawTable, synonyms: &RoleSynonyms) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();

    if let Some(unit) = resolve_unit_column(&table.columns) {
        mapping.assign(Role::Unit, unit);
    }

    for role in Role::RESOLUTION_ORDER {
        if role == Role::Unit {
            continue;
        }
        let Some(rule) = synonyms.rule(role) else {
            continue;
        };
        if let Some(column) = resolve_role(table, rule, &mapping) {
            tracing::debug!(role = role.as_str(), column = %column, "resolved column");
            mapping.assign(role, column);
        } else {
            tracing::debug!(role = role.as_str(), "no column matched");
        }
    }

    mapping
}

/// Unit column priority: an exact `bldg/unit`-style header, then a header
/// naming both building and unit, then any unit-like keyword, then the first
/// column.
pub fn resolve_unit_column(columns: &[String]) -> Option<String> {
    let usable: Vec<&String> = columns
        .iter()
        .filter(|column| !column.trim().is_empty())
        .collect();

    let lower = |column: &str| column.trim().to_lowercase();

    for exact in UNIT_EXACT {
        if let Some(column) = usable.iter().find(|column| lower(column) == exact) {
            return Some(column.to_string());
        }
    }

    if let Some(column) = usable.iter().find(|column| {
        let lowered = lower(column);
        lowered.contains("bldg") && lowered.contains("unit")
    }) {
        return Some(column.to_string());
    }

    if let Some(column) = usable.iter().find(|column| {
        let lowered = lower(column);
        UNIT_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
    }) {
        return Some(column.to_string());
    }

    let fallback = columns.first().cloned();
    if let Some(column) = &fallback {
        tracing::debug!(column = %column, "no unit-like column, using first column");
    }
    fallback
}

/// Number of rows whose value in `column` carries real data.
pub fn meaningful_count(table: &RawTable, column: &str) -> usize {
    table
        .column_values(column)
        .filter(|value| is_meaningful(value))
        .count()
}

fn resolve_role(table: &RawTable, rule: &RoleRule, taken: &ColumnMapping) -> Option<String> {
    let mut best: Option<(&String, usize)> = None;

    for column in &table.columns {
        if column.trim().is_empty() || taken.claims(column) || !rule.admits(column) {
            continue;
        }
        let Some(kind) = match_column(column, &rule.synonyms) else {
            continue;
        };
        let count = meaningful_count(table, column);
        tracing::debug!(column = %column, ?kind, count, "candidate column");
        // strictly greater keeps the first-encountered column on ties
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((column, count));
        }
    }

    best.map(|(column, _)| column.clone())
}

fn match_column(column: &str, synonyms: &[String]) -> Option<MatchKind> {
    if synonyms.iter().any(|synonym| synonym == column) {
        return Some(MatchKind::Exact);
    }

    let column_lower = column.trim().to_lowercase();
    if synonyms
        .iter()
        .any(|synonym| synonym.trim().to_lowercase() == column_lower)
    {
        return Some(MatchKind::CaseInsensitive);
    }

    synonyms
        .iter()
        .map(|synonym| synonym.trim().to_lowercase())
        .filter(|synonym| !synonym.is_empty())
        .any(|synonym| column_lower.contains(&synonym) || synonym.contains(&column_lower))
        .then_some(MatchKind::Substring)
}
