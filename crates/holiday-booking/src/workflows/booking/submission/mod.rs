mod gateway;
mod payload;

pub use gateway::{GatewayError, SubmissionGateway, WebhookGateway};
pub use payload::{BookingAction, BookingPayload};

use super::calendar::Calendar;
use super::domain::{BookingDraft, BookingRequest, DateChoice, LightOption, RequestedDate};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Why a submission attempt did not go through. Local state is untouched
/// whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionFailure {
    #[error("missing fields")]
    MissingFields,
    #[error("terms not agreed")]
    TermsNotAgreed,
    #[error("installation date '{0}' is not a bookable season date")]
    InvalidDate(String),
    #[error("submission rejected")]
    Rejected { status: u16 },
    #[error("submission failed: {0}")]
    Transport(String),
}

impl SubmissionFailure {
    /// Copy shown inline on the review step.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingFields => "Please fill in all required fields",
            Self::TermsNotAgreed => "Please agree to the terms and conditions",
            Self::InvalidDate(_) => "Please choose an installation date within the season",
            Self::Rejected { .. } | Self::Transport(_) => {
                "Failed to submit booking. Please try again."
            }
        }
    }
}

impl From<GatewayError> for SubmissionFailure {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected { status } => Self::Rejected { status },
            GatewayError::Transport(detail) => Self::Transport(detail),
        }
    }
}

/// What the completion view needs from an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmittedBooking {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: RequestedDate,
    pub light_option: LightOption,
    pub on_waitlist: bool,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Booked(SubmittedBooking),
    Waitlisted(SubmittedBooking),
    Failed(SubmissionFailure),
}

impl SubmissionOutcome {
    pub fn submitted(&self) -> Option<&SubmittedBooking> {
        match self {
            Self::Booked(booking) | Self::Waitlisted(booking) => Some(booking),
            Self::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&SubmissionFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// The outcome together with the calendar the session should keep. On
/// failure the calendar is the one passed in.
#[derive(Debug, Clone)]
pub struct SubmissionAttempt {
    pub outcome: SubmissionOutcome,
    pub calendar: Calendar,
}

/// Checks the final form, decides book vs waitlist, and calls the webhook
/// exactly once per attempt.
#[derive(Debug, Clone)]
pub struct SubmissionCoordinator {
    gateway: Arc<dyn SubmissionGateway>,
    deposit_amount: String,
}

impl SubmissionCoordinator {
    pub fn new(gateway: Arc<dyn SubmissionGateway>, deposit_amount: impl Into<String>) -> Self {
        Self {
            gateway,
            deposit_amount: deposit_amount.into(),
        }
    }

    pub fn deposit_amount(&self) -> &str {
        &self.deposit_amount
    }

    pub async fn submit(&self, draft: &BookingDraft, calendar: &Calendar) -> SubmissionAttempt {
        self.submit_at(draft, calendar, Utc::now()).await
    }

    pub async fn submit_at(
        &self,
        draft: &BookingDraft,
        calendar: &Calendar,
        submitted_at: DateTime<Utc>,
    ) -> SubmissionAttempt {
        let request = match validate_request(draft, calendar) {
            Ok(request) => request,
            Err(failure) => return unchanged(calendar, failure),
        };

        let on_waitlist = match request.installation_date {
            RequestedDate::Date(date) => calendar.is_date_booked(date),
            RequestedDate::WaitlistOnly => true,
        };
        let payload =
            BookingPayload::new(&request, on_waitlist, submitted_at, &self.deposit_amount);

        if let Err(err) = self.gateway.submit(&payload).await {
            warn!(error = %err, date = %payload.date, "booking submission failed");
            return unchanged(calendar, err.into());
        }

        let calendar = match request.installation_date {
            RequestedDate::Date(date) if !on_waitlist => calendar.mark_booked(date),
            _ => calendar.clone(),
        };
        info!(
            action = ?payload.action,
            date = %payload.date,
            "booking accepted by workflow webhook"
        );

        let submitted = SubmittedBooking {
            name: request.full_name,
            email: request.email,
            phone: request.phone,
            date: request.installation_date,
            light_option: request.light_option,
            on_waitlist,
            submitted_at,
        };
        let outcome = if on_waitlist {
            SubmissionOutcome::Waitlisted(submitted)
        } else {
            SubmissionOutcome::Booked(submitted)
        };

        SubmissionAttempt { outcome, calendar }
    }
}

fn unchanged(calendar: &Calendar, failure: SubmissionFailure) -> SubmissionAttempt {
    SubmissionAttempt {
        outcome: SubmissionOutcome::Failed(failure),
        calendar: calendar.clone(),
    }
}

/// Preconditions, first failure wins: required fields, terms, then a usable
/// date and light selection.
pub fn validate_request(
    draft: &BookingDraft,
    calendar: &Calendar,
) -> Result<BookingRequest, SubmissionFailure> {
    if !draft.has_contact_details() || draft.date.is_empty() {
        return Err(SubmissionFailure::MissingFields);
    }
    if !draft.agree_terms {
        return Err(SubmissionFailure::TermsNotAgreed);
    }

    let installation_date = match draft.date_choice() {
        DateChoice::Date(date) if calendar.window().contains(date) => RequestedDate::Date(date),
        DateChoice::Date(_) | DateChoice::Unreadable => {
            return Err(SubmissionFailure::InvalidDate(draft.date.trim().to_string()));
        }
        DateChoice::Waitlist if calendar.is_sold_out() => RequestedDate::WaitlistOnly,
        DateChoice::Waitlist | DateChoice::Unselected => {
            return Err(SubmissionFailure::MissingFields);
        }
    };

    let light_option = draft
        .light_option
        .ok_or(SubmissionFailure::MissingFields)?;
    let tip_color = if light_option.needs_tip_color() {
        Some(draft.tip_color().ok_or(SubmissionFailure::MissingFields)?)
    } else {
        None
    };

    Ok(BookingRequest {
        full_name: draft.name.clone(),
        address: draft.address.clone(),
        phone: draft.phone.clone(),
        email: draft.email.clone(),
        installation_date,
        light_option,
        tip_color,
        agreed_to_terms: true,
    })
}
