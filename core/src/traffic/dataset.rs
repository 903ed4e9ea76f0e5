use super::record::TrafficRecord;
use crate::geodesy::Coordinate;
use std::collections::BTreeMap;

/// Resolved coordinate per tower address. `None` marks an address the
/// geocoder could not resolve; such holes stay in the book so the caller
/// can report them.
pub type AddressBook = BTreeMap<String, Option<Coordinate>>;

/// Sorted unique tower addresses present in the table.
pub fn unique_tower_addresses(records: &[TrafficRecord]) -> Vec<String> {
    let mut addresses: Vec<String> = records
        .iter()
        .map(|record| record.tower_address.clone())
        .collect();
    addresses.sort();
    addresses.dedup();
    addresses
}

/// Copies resolved coordinates onto the records.
///
/// Unresolved addresses leave the coordinate hole in place; a hole never
/// aborts the batch, the row just skips the downstream computations.
pub fn apply_coordinates(records: &mut [TrafficRecord], book: &AddressBook) {
    for record in records.iter_mut() {
        if let Some(Some(coord)) = book.get(&record.tower_address) {
            record.tower_coord = Some(*coord);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(address: &str) -> TrafficRecord {
        let timestamp = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 28, 4)
            .unwrap();
        TrafficRecord::new(timestamp, address, 290.0)
    }

    #[test]
    fn unique_addresses_are_sorted_and_deduplicated() {
        let records = vec![record("b street 2"), record("a street 1"), record("b street 2")];
        assert_eq!(
            unique_tower_addresses(&records),
            vec!["a street 1".to_string(), "b street 2".to_string()]
        );
    }

    #[test]
    fn apply_coordinates_leaves_holes_for_unresolved() {
        let mut records = vec![record("resolved"), record("unresolved")];
        let mut book = AddressBook::new();
        book.insert("resolved".to_string(), Some(Coordinate::new(50.0, 30.0)));
        book.insert("unresolved".to_string(), None);

        apply_coordinates(&mut records, &book);
        assert_eq!(records[0].tower_coord, Some(Coordinate::new(50.0, 30.0)));
        assert!(records[1].tower_coord.is_none());
    }
}
