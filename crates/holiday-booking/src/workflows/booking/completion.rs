use super::domain::{long_date, us_date, RequestedDate};
use super::submission::SubmittedBooking;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use url::Url;

const WAITLIST_DATE_LABEL: &str = "Waitlist (next available date)";
const NO_DATE: &str = "N/A";

/// URI component escaping: spaces become `%20`, never form-style `+`.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'(')
    .remove(b')');

/// Confirmation shown once the webhook accepted the booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionSummary {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_label: String,
    pub light_option_label: &'static str,
    pub on_waitlist: bool,
    pub deposit_amount: String,
    pub payment_url: String,
}

impl CompletionSummary {
    pub fn from_submitted(
        booking: &SubmittedBooking,
        payment_base: &Url,
        deposit_amount: &str,
    ) -> Self {
        let date_label = match booking.date {
            RequestedDate::Date(date) => long_date(date),
            RequestedDate::WaitlistOnly => WAITLIST_DATE_LABEL.to_string(),
        };

        Self {
            name: booking.name.clone(),
            email: booking.email.clone(),
            phone: booking.phone.clone(),
            date_label,
            light_option_label: booking.light_option.label(),
            on_waitlist: booking.on_waitlist,
            deposit_amount: deposit_amount.to_string(),
            payment_url: payment_url(payment_base, booking).to_string(),
        }
    }

    pub fn render_text(&self) -> String {
        let status = if self.on_waitlist {
            "Added to the Waitlist"
        } else {
            "Booking Confirmed!"
        };
        let mut lines = vec![
            status.to_string(),
            "Installation Details".to_string(),
            format!("  Name: {}", self.name),
            format!("  Email: {}", self.email),
            format!("  Phone: {}", self.phone),
            format!("  Installation Date: {}", self.date_label),
            format!("  Light Options: {}", self.light_option_label),
            format!(
                "Complete your booking by paying the {} deposit: {}",
                self.deposit_amount, self.payment_url
            ),
        ];
        lines.push(format!(
            "A confirmation email will be sent to {}.",
            self.email
        ));
        lines.join("\n")
    }
}

/// Payment link carrying the customer and date as escaped query parameters.
pub fn payment_url(base: &Url, booking: &SubmittedBooking) -> Url {
    let booking_date = booking
        .date
        .date()
        .map(us_date)
        .unwrap_or_else(|| NO_DATE.to_string());

    let params = [
        ("customerName", booking.name.as_str()),
        ("customerEmail", booking.email.as_str()),
        ("bookingDate", booking_date.as_str()),
    ]
    .iter()
    .map(|(key, value)| format!("{key}={}", utf8_percent_encode(value, QUERY_VALUE)))
    .collect::<Vec<_>>()
    .join("&");

    let mut url = base.clone();
    let query = match base.query() {
        Some(existing) if !existing.is_empty() => format!("{existing}&{params}"),
        _ => params,
    };
    url.set_query(Some(&query));
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::booking::domain::LightOption;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn booking(date: RequestedDate) -> SubmittedBooking {
        SubmittedBooking {
            name: "Ana & Luis O'Neil".to_string(),
            email: "ana+lights@example.com".to_string(),
            phone: "555-0100".to_string(),
            date,
            light_option: LightOption::ClearWarm,
            on_waitlist: false,
            submitted_at: Utc.with_ymd_and_hms(2025, 11, 1, 12, 0, 0).unwrap(),
        }
    }

    fn base() -> Url {
        Url::parse("https://pay.example.com/u/abc").expect("valid base")
    }

    #[test]
    fn payment_url_escapes_every_parameter() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 20).unwrap();
        let url = payment_url(&base(), &booking(RequestedDate::Date(date)));

        assert_eq!(
            url.as_str(),
            "https://pay.example.com/u/abc?customerName=Ana%20%26%20Luis%20O%27Neil&customerEmail=ana%2Blights%40example.com&bookingDate=11%2F20%2F2025"
        );
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0].1, "Ana & Luis O'Neil");
        assert_eq!(pairs[2].1, "11/20/2025");
    }

    #[test]
    fn payment_url_keeps_existing_query_and_escapes_spaces_as_percent_twenty() {
        let base = Url::parse("https://pay.example.com/u/abc?ref=lights").expect("valid base");
        let mut customer = booking(RequestedDate::WaitlistOnly);
        customer.name = "Mary Jo (Annex)".to_string();
        let url = payment_url(&base, &customer);

        assert_eq!(
            url.query(),
            Some("ref=lights&customerName=Mary%20Jo%20(Annex)&customerEmail=ana%2Blights%40example.com&bookingDate=N%2FA")
        );
        assert!(!url.as_str().contains('+'));
    }

    #[test]
    fn summary_uses_long_date_and_light_label() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 20).unwrap();
        let summary =
            CompletionSummary::from_submitted(&booking(RequestedDate::Date(date)), &base(), "$200");

        assert_eq!(summary.date_label, "Thursday, November 20, 2025");
        assert_eq!(summary.light_option_label, "C9 Clear Bulb Warm White");
        assert!(summary.render_text().contains("Booking Confirmed!"));
        assert!(summary.render_text().contains("$200 deposit"));
    }

    #[test]
    fn waitlist_only_summary_has_placeholder_date() {
        let mut waitlisted = booking(RequestedDate::WaitlistOnly);
        waitlisted.on_waitlist = true;
        let summary = CompletionSummary::from_submitted(&waitlisted, &base(), "$200");

        assert_eq!(summary.date_label, WAITLIST_DATE_LABEL);
        assert!(summary.payment_url.ends_with("bookingDate=N%2FA"));
        assert!(summary.render_text().starts_with("Added to the Waitlist"));
    }
}
