use chrono::NaiveDate;

/// Turns a sheet date written as month/day/year into a calendar date.
/// Single-digit months and days are accepted; anything that does not name a
/// real day yields `None`.
pub(crate) fn normalize_sheet_date(value: &str) -> Option<NaiveDate> {
    let mut parts = value.trim().splitn(3, '/').map(str::trim);
    let month = parts.next().filter(|part| !part.is_empty())?;
    let day = parts.next().filter(|part| !part.is_empty())?;
    let year = parts.next().filter(|part| !part.is_empty())?;

    NaiveDate::from_ymd_opt(
        year.parse().ok()?,
        month.parse().ok()?,
        day.parse().ok()?,
    )
}

pub(crate) fn is_booked_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

#[cfg(test)]
pub(crate) fn normalize_for_tests(value: &str) -> Option<NaiveDate> {
    normalize_sheet_date(value)
}
