use std::sync::Arc;

use chrono::NaiveDate;
use holiday_booking::config::BookingConfig;
use holiday_booking::workflows::availability::{
    parse_availability_csv, AvailabilityRepository, FileAvailabilitySource,
};
use holiday_booking::workflows::booking::{BookingSession, Calendar};

const EXPORT: &str = include_str!("fixtures/availability_2025.csv");

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
}

#[test]
fn season_export_builds_a_full_calendar() {
    let config = BookingConfig::defaults().expect("default booking config");
    let snapshot = parse_availability_csv(EXPORT).expect("export parses");

    assert_eq!(snapshot.len(), 23);
    assert_eq!(snapshot.get(date(12, 15)), Some(true));

    let calendar = Calendar::build(config.season, &snapshot);
    assert_eq!(calendar.days().len(), 22);
    assert_eq!(calendar.available_count(), 18);
    for booked in [date(11, 22), date(11, 28), date(11, 29), date(12, 6)] {
        assert!(calendar.is_date_booked(booked), "{booked} should be booked");
    }
    assert!(!calendar.is_date_booked(date(12, 15)));
}

#[test]
fn session_view_lists_only_open_dates_in_order() {
    let config = BookingConfig::defaults().expect("default booking config");
    let snapshot = parse_availability_csv(EXPORT).expect("export parses");
    let session = BookingSession::new(
        Calendar::build(config.season, &snapshot),
        config.storefront(),
    );

    let view = session.view();
    let values: Vec<NaiveDate> = view
        .availability
        .date_options
        .iter()
        .map(|option| option.value)
        .collect();
    assert_eq!(values.len(), 18);
    assert_eq!(values.first(), Some(&date(11, 20)));
    assert_eq!(values.last(), Some(&date(12, 11)));
    assert!(values.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(view.availability.slots_label, "18 slots available");
}

#[tokio::test]
async fn file_source_feeds_the_repository() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/availability_2025.csv");
    let repository = AvailabilityRepository::new(Arc::new(FileAvailabilitySource::new(path)));

    let snapshot = repository.load_availability().await;

    assert!(snapshot.is_booked(date(11, 28)));
    assert!(!snapshot.is_booked(date(11, 20)));
}
