mod normalizer;
mod parser;
mod source;

pub use source::{
    AvailabilitySource, FileAvailabilitySource, HttpAvailabilitySource, StaticAvailabilitySource,
};

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;
use tracing::{info, warn};

/// Booked flags keyed by date, as read from the availability sheet.
/// Dates the sheet does not mention count as open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilitySnapshot {
    booked: BTreeMap<NaiveDate, bool>,
}

impl AvailabilitySnapshot {
    pub fn get(&self, date: NaiveDate) -> Option<bool> {
        self.booked.get(&date).copied()
    }

    pub fn is_booked(&self, date: NaiveDate) -> bool {
        self.get(date).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.booked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.booked.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, bool)> + '_ {
        self.booked.iter().map(|(date, booked)| (*date, *booked))
    }

    pub(crate) fn insert(&mut self, date: NaiveDate, booked: bool) {
        self.booked.insert(date, booked);
    }
}

impl FromIterator<(NaiveDate, bool)> for AvailabilitySnapshot {
    fn from_iter<T: IntoIterator<Item = (NaiveDate, bool)>>(iter: T) -> Self {
        Self {
            booked: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AvailabilityError {
    #[error("availability request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("availability source answered with status {status}")]
    Status { status: u16 },
    #[error("failed to read availability export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid availability CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Loads the season's booked dates from the configured source.
#[derive(Debug, Clone)]
pub struct AvailabilityRepository {
    source: Arc<dyn AvailabilitySource>,
}

impl AvailabilityRepository {
    pub fn new(source: Arc<dyn AvailabilitySource>) -> Self {
        Self { source }
    }

    /// One fetch, no retries. Any failure yields an empty snapshot so the
    /// calendar still renders with every date open.
    pub async fn load_availability(&self) -> AvailabilitySnapshot {
        match self.try_load().await {
            Ok(snapshot) => {
                info!(dates = snapshot.len(), "availability snapshot loaded");
                snapshot
            }
            Err(err) => {
                warn!(error = %err, "availability unavailable, treating every date as open");
                AvailabilitySnapshot::default()
            }
        }
    }

    pub async fn try_load(&self) -> Result<AvailabilitySnapshot, AvailabilityError> {
        let csv = self.source.fetch_csv().await?;
        Ok(parse_availability_csv(&csv)?)
    }
}

pub fn parse_availability_csv(csv: &str) -> Result<AvailabilitySnapshot, csv::Error> {
    parser::parse_snapshot(Cursor::new(csv.as_bytes()))
}
