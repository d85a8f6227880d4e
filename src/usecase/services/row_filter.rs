use crate::domain::entities::mapping::ColumnMapping;
use crate::domain::entities::table::RawRow;
use crate::domain::entities::unit::InstallRecord;
use crate::domain::rules::{compare_units, is_summary_unit};

/// Walks rows in order and keeps the real unit rows.
///
/// The first row with a blank unit ends the data: it and everything after it
/// are dropped. Summary-looking rows ("Total", "Average", ...) are skipped
/// unless they carry installation or leak data. Survivors are sorted by unit.
pub fn filter_rows(rows: &[RawRow], mapping: &ColumnMapping) -> Vec<InstallRecord> {
    let Some(unit_column) = mapping.unit_column() else {
        tracing::debug!("no unit column, nothing to keep");
        return Vec::new();
    };

    let mut kept = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        let unit = row.get(unit_column).map(str::trim).unwrap_or("");
        if unit.is_empty() {
            tracing::debug!(row = idx + 1, kept = kept.len(), "blank unit, stopping");
            break;
        }

        let record = InstallRecord::from_raw(row, mapping);
        if is_summary_unit(unit) && !record.has_installation() && !record.has_leak() {
            tracing::debug!(row = idx + 1, unit, "skipping summary row");
            continue;
        }

        kept.push(record);
    }

    sort_records(&mut kept);
    kept
}

/// Stable sort by unit, so repeated units keep their source order.
pub fn sort_records(records: &mut [InstallRecord]) {
    records.sort_by(|a, b| compare_units(&a.unit, &b.unit));
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::domain::entities::mapping::RoleSynonyms;
    use crate::domain::entities::table::RawTable;
    use crate::usecase::services::column_resolver::resolve_columns;

    fn rows(pairs: &[&[(&str, &str)]]) -> Vec<RawRow> {
        pairs
            .iter()
            .map(|row| RawRow::from_pairs(row.iter().copied()))
            .collect()
    }

    fn mapping_for(columns: &[&str], rows: &[RawRow]) -> ColumnMapping {
        let table = RawTable::new(
            columns.iter().map(|column| column.to_string()).collect(),
            rows.to_vec(),
        );
        resolve_columns(&table, &RoleSynonyms::default())
    }

    fn units(records: &[InstallRecord]) -> Vec<&str> {
        records.iter().map(|record| record.unit.as_str()).collect()
    }

    #[test]
    fn blank_unit_stops_processing() {
        let rows = rows(&[
            &[("Unit", "101"), ("Kitchen", "Insert")],
            &[("Unit", "  "), ("Kitchen", "Insert")],
            &[("Unit", "102"), ("Kitchen", "Insert")],
        ]);
        let mapping = mapping_for(&["Unit", "Kitchen"], &rows);
        assert_eq!(units(&filter_rows(&rows, &mapping)), vec!["101"]);
    }

    #[test]
    fn missing_unit_cell_stops_processing() {
        let rows = rows(&[
            &[("Unit", "101")],
            &[("Kitchen", "Insert")],
            &[("Unit", "102")],
        ]);
        let mapping = mapping_for(&["Unit", "Kitchen"], &rows);
        assert_eq!(units(&filter_rows(&rows, &mapping)), vec!["101"]);
    }

    #[test]
    fn summary_rows_without_data_are_skipped_not_stopped() {
        let rows = rows(&[
            &[("Unit", "101"), ("Kitchen", "Insert")],
            &[("Unit", "Total"), ("Kitchen", "")],
            &[("Unit", "102"), ("Kitchen", "")],
        ]);
        let mapping = mapping_for(&["Unit", "Kitchen"], &rows);
        assert_eq!(units(&filter_rows(&rows, &mapping)), vec!["101", "102"]);
    }

    #[test]
    fn summary_like_rows_with_data_are_kept() {
        let rows = rows(&[
            &[("Unit", "Community Room"), ("Kitchen", ""), ("Leak Issue Kitchen Faucet", "")],
            &[("Unit", "Manager Avg"), ("Kitchen", "Insert"), ("Leak Issue Kitchen Faucet", "")],
            &[("Unit", "Counter"), ("Kitchen", ""), ("Leak Issue Kitchen Faucet", "Light")],
        ]);
        let mapping = mapping_for(&["Unit", "Kitchen", "Leak Issue Kitchen Faucet"], &rows);
        assert_eq!(
            units(&filter_rows(&rows, &mapping)),
            vec!["Community Room", "Counter", "Manager Avg"]
        );
    }

    #[test]
    fn survivors_are_sorted_and_trimmed() {
        let rows = rows(&[
            &[("Unit", " 10 ")],
            &[("Unit", "9")],
            &[("Unit", "B2")],
            &[("Unit", "101")],
        ]);
        let mapping = mapping_for(&["Unit"], &rows);
        assert_eq!(units(&filter_rows(&rows, &mapping)), vec!["9", "10", "101", "B2"]);
    }

    proptest! {
        #[test]
        fn nothing_after_the_first_blank_unit_survives(
            before in prop::collection::vec("[1-9][0-9]{0,2}[A-C]?", 0..12),
            blank in prop_oneof![Just(""), Just(" "), Just("\t")],
            after in prop::collection::vec("[A-Za-z0-9 ]{0,6}", 0..12)
        ) {
            let mut raw: Vec<RawRow> = before
                .iter()
                .map(|unit| RawRow::from_pairs([("Unit", unit.as_str()), ("Kitchen", "Insert")]))
                .collect();
            raw.push(RawRow::from_pairs([("Unit", blank), ("Kitchen", "Insert")]));
            raw.extend(
                after
                    .iter()
                    .map(|unit| RawRow::from_pairs([("Unit", unit.as_str()), ("Kitchen", "Insert")])),
            );
            let mapping = mapping_for(&["Unit", "Kitchen"], &raw);

            let mut expected: Vec<&str> = before.iter().map(String::as_str).collect();
            expected.sort_by(|a, b| compare_units(a, b));
            let kept = filter_rows(&raw, &mapping);
            prop_assert_eq!(units(&kept), expected);
        }
    }
}
