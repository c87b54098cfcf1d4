use crate::workflows::booking::domain::{us_date, BookingRequest, LightOption, RequestedDate};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

const NOT_APPLICABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingAction {
    Book,
    Waitlist,
}

/// JSON body posted to the workflow webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    /// MM/DD/YYYY, or "N/A" for a date-less waitlist request.
    pub date: String,
    pub light_option: LightOption,
    pub tip_color: String,
    pub on_waitlist: bool,
    pub timestamp: String,
    pub deposit_amount: String,
    pub action: BookingAction,
}

impl BookingPayload {
    pub fn new(
        request: &BookingRequest,
        on_waitlist: bool,
        submitted_at: DateTime<Utc>,
        deposit_amount: &str,
    ) -> Self {
        let date = match request.installation_date {
            RequestedDate::Date(date) => us_date(date),
            RequestedDate::WaitlistOnly => NOT_APPLICABLE.to_string(),
        };

        Self {
            name: request.full_name.clone(),
            address: request.address.clone(),
            phone: request.phone.clone(),
            email: request.email.clone(),
            date,
            light_option: request.light_option,
            tip_color: request
                .tip_color
                .map(|color| color.as_str().to_string())
                .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
            on_waitlist,
            timestamp: submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            deposit_amount: deposit_amount.to_string(),
            action: if on_waitlist {
                BookingAction::Waitlist
            } else {
                BookingAction::Book
            },
        }
    }
}
