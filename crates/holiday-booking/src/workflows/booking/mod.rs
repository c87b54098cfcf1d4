//! Five-step booking funnel: date, lights, contact details, review, then a
//! webhook submission that either books the date or joins the waitlist.

pub mod calendar;
pub mod completion;
pub mod domain;
pub mod flow;
pub mod repository;
pub mod router;
pub mod service;
pub mod session;
pub mod submission;

#[cfg(test)]
mod tests;

pub use calendar::{Calendar, CalendarDay, SeasonError, SeasonWindow};
pub use completion::{payment_url, CompletionSummary};
pub use domain::{
    BookingDraft, BookingRequest, DateChoice, FieldValue, FormField, LightOption, RequestedDate,
    TipColor, UnknownValue, WAITLIST_MARKER,
};
pub use flow::{Advance, FlowError, Step, StepFlow};
pub use repository::{RepositoryError, SessionId, SessionRepository};
pub use router::{booking_router, FieldUpdate, LightOptionRequest};
pub use service::{BookingService, BookingServiceError, SessionResponse};
pub use session::{BookingSession, PendingSubmission, SessionView, StorefrontSettings};
pub use submission::{
    validate_request, BookingAction, BookingPayload, GatewayError, SubmissionAttempt,
    SubmissionCoordinator, SubmissionFailure, SubmissionGateway, SubmissionOutcome,
    SubmittedBooking, WebhookGateway,
};
