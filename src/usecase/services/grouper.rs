use std::collections::HashMap;

use crate::domain::entities::mapping::Fixture;
use crate::domain::entities::unit::{InstallRecord, UnitRecord, NO_TOUCH};
use crate::domain::rules::{is_blank, is_installation_value};

/// Collapses rows sharing a unit into one [`UnitRecord`].
///
/// Output follows the first appearance of each unit. For every fixture in
/// `fixtures` the installed values are counted and rendered as `"value"` or
/// `"value (N)"`; the remaining fixtures keep the first row's value.
pub fn group_units(rows: &[InstallRecord], fixtures: &[Fixture]) -> Vec<UnitRecord> {
    let mut order: Vec<String> = Vec::new();
    let mut members: HashMap<&str, Vec<&InstallRecord>> = HashMap::new();

    for row in rows {
        if is_blank(&row.unit) {
            continue;
        }
        let entry = members.entry(row.unit.as_str()).or_default();
        if entry.is_empty() {
            order.push(row.unit.clone());
        }
        entry.push(row);
    }

    order
        .into_iter()
        .filter_map(|unit| {
            let items = members.remove(unit.as_str())?;
            Some(summarize(unit, &items, fixtures))
        })
        .collect()
}

fn summarize(unit_id: String, items: &[&InstallRecord], fixtures: &[Fixture]) -> UnitRecord {
    let mut record = UnitRecord {
        unit_id,
        remarks: combine_notes(items.iter().map(|item| item.notes.as_str())),
        rows: items.iter().map(|item| (*item).clone()).collect(),
        ..UnitRecord::default()
    };

    for fixture in Fixture::ALL {
        let display = if fixtures.contains(&fixture) {
            let counts = count_installations(items.iter().map(|item| item.fixture(fixture)));
            render_counts(&counts, sentinel(fixture))
        } else {
            items
                .first()
                .map(|item| item.fixture(fixture).to_string())
                .unwrap_or_default()
        };
        record.set_fixture(fixture, display);
    }

    record
}

/// Toilets render as a yes/no column, so an empty toilet cell stays empty.
fn sentinel(fixture: Fixture) -> &'static str {
    match fixture {
        Fixture::Toilet => "",
        _ => NO_TOUCH,
    }
}

/// Counts installed values by their literal text, in first-seen order.
pub fn count_installations<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in values {
        if !is_installation_value(value) {
            continue;
        }
        let value = value.trim();
        match counts.iter_mut().find(|(seen, _)| seen == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value.to_string(), 1)),
        }
    }
    counts
}

pub fn render_counts(counts: &[(String, usize)], sentinel: &str) -> String {
    if counts.is_empty() {
        return sentinel.to_string();
    }
    counts
        .iter()
        .map(|(value, count)| {
            if *count > 1 {
                format!("{value} ({count})")
            } else {
                value.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Unique non-blank notes joined by a space, first-seen order.
pub fn combine_notes<'a>(notes: impl Iterator<Item = &'a str>) -> String {
    let mut unique: Vec<&str> = Vec::new();
    for note in notes {
        if is_blank(note) || unique.contains(&note) {
            continue;
        }
        unique.push(note);
    }
    unique.join(" ")
}
