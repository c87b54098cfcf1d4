use super::normalizer::{is_booked_flag, normalize_sheet_date};
use super::AvailabilitySnapshot;
use std::io::Read;

/// Reads the sheet export. The first row is a header; every later row is
/// `date, booked` with any extra columns ignored. Rows missing either value
/// or carrying an unreadable date are dropped without failing the parse.
pub(crate) fn parse_snapshot<R: Read>(reader: R) -> Result<AvailabilitySnapshot, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut snapshot = AvailabilitySnapshot::default();

    for record in csv_reader.records() {
        let record = record?;
        let (Some(raw_date), Some(raw_flag)) = (record.get(0), record.get(1)) else {
            continue;
        };
        if raw_date.is_empty() || raw_flag.is_empty() {
            continue;
        }

        if let Some(date) = normalize_sheet_date(raw_date) {
            snapshot.insert(date, is_booked_flag(raw_flag));
        }
    }

    Ok(snapshot)
}
