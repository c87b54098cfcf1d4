use crate::workflows::availability::AvailabilitySnapshot;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Inclusive range of dates during which installations are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeasonWindow {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeasonError {
    #[error("season start {start} falls after season end {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },
}

impl SeasonWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, SeasonError> {
        if start > end {
            return Err(SeasonError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn day_count(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.day_count() as i64).map(move |offset| start + Duration::days(offset))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_booked: bool,
}

/// Session-local view of the season. The length is fixed at build time; only
/// the booked flags change, and only through [`Calendar::mark_booked`].
///
/// Marks applied here are an optimistic reflection of a successful submission.
/// They are never written back to the availability source and other sessions
/// will not see them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Calendar {
    window: SeasonWindow,
    days: Vec<CalendarDay>,
}

impl Calendar {
    pub fn build(window: SeasonWindow, snapshot: &AvailabilitySnapshot) -> Self {
        let days = window
            .dates()
            .map(|date| CalendarDay {
                date,
                is_booked: snapshot.is_booked(date),
            })
            .collect();

        Self { window, days }
    }

    pub fn window(&self) -> SeasonWindow {
        self.window
    }

    pub fn days(&self) -> &[CalendarDay] {
        &self.days
    }

    pub fn available_count(&self) -> usize {
        self.days.iter().filter(|day| !day.is_booked).count()
    }

    pub fn is_sold_out(&self) -> bool {
        self.available_count() == 0
    }

    /// Dates outside the season read as available.
    pub fn is_date_booked(&self, date: NaiveDate) -> bool {
        self.day(date).map(|day| day.is_booked).unwrap_or(false)
    }

    pub fn available_dates(&self) -> Vec<NaiveDate> {
        self.days
            .iter()
            .filter(|day| !day.is_booked)
            .map(|day| day.date)
            .collect()
    }

    #[must_use]
    pub fn mark_booked(&self, date: NaiveDate) -> Self {
        let days = self
            .days
            .iter()
            .map(|day| {
                if day.date == date {
                    CalendarDay {
                        date: day.date,
                        is_booked: true,
                    }
                } else {
                    *day
                }
            })
            .collect();

        Self {
            window: self.window,
            days,
        }
    }

    fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        if !self.window.contains(date) {
            return None;
        }
        let offset = (date - self.window.start).num_days() as usize;
        self.days.get(offset)
    }
}
