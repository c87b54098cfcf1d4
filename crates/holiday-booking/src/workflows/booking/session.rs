use super::calendar::Calendar;
use super::completion::CompletionSummary;
use super::domain::{
    long_date, BookingDraft, DateChoice, FieldValue, FormField, LightOption, WAITLIST_MARKER,
};
use super::flow::{Advance, FlowError, Step, StepFlow};
use super::submission::{SubmissionAttempt, SubmissionCoordinator, SubmissionOutcome};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;
use url::Url;

const WAITLIST_NOTICE: &str =
    "All installation dates are currently booked. You can join the waitlist below.";

/// Customer-facing copy and links shared by every session.
#[derive(Debug, Clone)]
pub struct StorefrontSettings {
    pub payment_url: Url,
    pub deposit_amount: String,
    pub price_per_foot: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Collecting,
    Completed(CompletionSummary),
}

/// Snapshot of the draft and calendar handed to the webhook call while the
/// session stays marked as submitting.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub draft: BookingDraft,
    pub calendar: Calendar,
}

/// One customer's pass through the funnel.
#[derive(Debug, Clone)]
pub struct BookingSession {
    calendar: Calendar,
    flow: StepFlow,
    phase: Phase,
    settings: StorefrontSettings,
}

impl BookingSession {
    pub fn new(calendar: Calendar, settings: StorefrontSettings) -> Self {
        Self {
            calendar,
            flow: StepFlow::new(),
            phase: Phase::Collecting,
            settings,
        }
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn flow(&self) -> &StepFlow {
        &self.flow
    }

    pub fn completion(&self) -> Option<&CompletionSummary> {
        match &self.phase {
            Phase::Completed(summary) => Some(summary),
            Phase::Collecting => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.phase, Phase::Completed(_))
    }

    pub fn set_field(&mut self, field: FormField, value: FieldValue) -> Result<(), FlowError> {
        self.ensure_collecting()?;
        self.flow.set_field(field, value)
    }

    pub fn select_light_option(&mut self, option: LightOption) -> Result<(), FlowError> {
        self.ensure_collecting()?;
        self.flow.select_light_option(option);
        Ok(())
    }

    /// On the review step a passing gate hands back `SubmitRequested`; the
    /// caller then runs [`BookingSession::submit`] or the begin/finish pair.
    pub fn advance(&mut self) -> Result<Advance, FlowError> {
        self.ensure_collecting()?;
        if self.flow.is_submitting() {
            return Err(FlowError::SubmissionInFlight);
        }
        Ok(self.flow.advance())
    }

    pub fn retreat(&mut self) -> Result<Step, FlowError> {
        self.ensure_collecting()?;
        if self.flow.is_submitting() {
            return Err(FlowError::SubmissionInFlight);
        }
        Ok(self.flow.retreat())
    }

    /// Marks the session as submitting and returns what the webhook call needs.
    /// A second call before [`BookingSession::finish_submission`] is rejected.
    pub fn begin_submission(&mut self) -> Result<PendingSubmission, FlowError> {
        self.ensure_collecting()?;
        self.flow.begin_submission()?;
        Ok(PendingSubmission {
            draft: self.flow.draft().clone(),
            calendar: self.calendar.clone(),
        })
    }

    pub fn finish_submission(&mut self, attempt: SubmissionAttempt) -> SubmissionOutcome {
        let SubmissionAttempt { outcome, calendar } = attempt;
        match &outcome {
            SubmissionOutcome::Failed(failure) => {
                self.flow.fail_submission(failure.user_message().to_string());
            }
            SubmissionOutcome::Booked(booking) | SubmissionOutcome::Waitlisted(booking) => {
                self.flow.finish_submission();
                self.calendar = calendar;
                let summary = CompletionSummary::from_submitted(
                    booking,
                    &self.settings.payment_url,
                    &self.settings.deposit_amount,
                );
                info!(
                    waitlisted = booking.on_waitlist,
                    remaining_slots = self.calendar.available_count(),
                    "booking session completed"
                );
                self.phase = Phase::Completed(summary);
            }
        }
        outcome
    }

    pub async fn submit(
        &mut self,
        coordinator: &SubmissionCoordinator,
    ) -> Result<SubmissionOutcome, FlowError> {
        let pending = self.begin_submission()?;
        let attempt = coordinator.submit(&pending.draft, &pending.calendar).await;
        Ok(self.finish_submission(attempt))
    }

    /// Back to the landing step with an empty form. The calendar, including
    /// dates this session marked booked, carries over; availability is not
    /// fetched again.
    pub fn start_new_booking(&mut self) -> Result<(), FlowError> {
        if self.flow.is_submitting() {
            return Err(FlowError::SubmissionInFlight);
        }
        self.flow = StepFlow::new();
        self.phase = Phase::Collecting;
        Ok(())
    }

    pub fn view(&self) -> SessionView {
        let step = self.flow.step();
        let sold_out = self.calendar.is_sold_out();
        let available_slots = self.calendar.available_count();
        let draft = self.flow.draft();

        let date_options = if sold_out {
            Vec::new()
        } else {
            self.calendar
                .available_dates()
                .into_iter()
                .map(|date| DateOptionView {
                    value: date,
                    label: long_date(date),
                    selected: draft.date_choice() == DateChoice::Date(date),
                })
                .collect()
        };

        SessionView {
            phase: if self.is_completed() {
                PhaseView::Completed
            } else {
                PhaseView::Collecting
            },
            step: StepView {
                number: step.number(),
                key: step,
                label: step.label(),
                progress_percent: step.progress_percent(),
            },
            controls: ControlsView {
                can_go_back: step.previous().is_some() && !self.flow.is_submitting(),
                primary_label: primary_label(step, self.flow.is_submitting()),
                primary_enabled: !self.flow.is_submitting(),
            },
            draft: draft.clone(),
            error: self.flow.error().map(str::to_string),
            submitting: self.flow.is_submitting(),
            landing: LandingView {
                price_per_foot: self.settings.price_per_foot.clone(),
                deposit_amount: self.settings.deposit_amount.clone(),
            },
            availability: AvailabilityView {
                available_slots,
                slots_label: slots_label(available_slots),
                date_options,
                waitlist_notice: sold_out.then(|| WAITLIST_NOTICE.to_string()),
                waitlist_marker: sold_out.then_some(WAITLIST_MARKER),
            },
            review: review_lines(draft),
            completion: self.completion().cloned(),
        }
    }

    fn ensure_collecting(&self) -> Result<(), FlowError> {
        if self.is_completed() {
            return Err(FlowError::AlreadyCompleted);
        }
        Ok(())
    }
}

fn primary_label(step: Step, submitting: bool) -> &'static str {
    match step {
        _ if submitting => "Processing...",
        Step::Landing => "Get Started",
        Step::ReviewAndPay => "Complete Booking",
        _ => "Next",
    }
}

fn slots_label(count: usize) -> String {
    if count == 1 {
        "1 slot available".to_string()
    } else {
        format!("{count} slots available")
    }
}

fn review_lines(draft: &BookingDraft) -> Vec<ReviewLine> {
    let date = match draft.date_choice() {
        DateChoice::Date(date) => long_date(date),
        DateChoice::Waitlist => "Waitlist".to_string(),
        DateChoice::Unselected | DateChoice::Unreadable => draft.date.clone(),
    };
    let lights = match draft.light_option {
        Some(option) if option.needs_tip_color() => match draft.tip_color() {
            Some(color) => format!("{} ({})", option.label(), color.label()),
            None => option.label().to_string(),
        },
        Some(option) => option.label().to_string(),
        None => String::new(),
    };

    vec![
        ReviewLine::new("Date", date),
        ReviewLine::new("Lights", lights),
        ReviewLine::new("Name", draft.name.clone()),
        ReviewLine::new("Email", draft.email.clone()),
        ReviewLine::new("Phone", draft.phone.clone()),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseView {
    Collecting,
    Completed,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepView {
    pub number: u8,
    pub key: Step,
    pub label: &'static str,
    pub progress_percent: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct ControlsView {
    pub can_go_back: bool,
    pub primary_label: &'static str,
    pub primary_enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LandingView {
    pub price_per_foot: String,
    pub deposit_amount: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateOptionView {
    pub value: NaiveDate,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityView {
    pub available_slots: usize,
    pub slots_label: String,
    pub date_options: Vec<DateOptionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waitlist_notice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waitlist_marker: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewLine {
    pub label: &'static str,
    pub value: String,
}

impl ReviewLine {
    fn new(label: &'static str, value: String) -> Self {
        Self { label, value }
    }
}

/// Everything a client needs to render the current screen.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub phase: PhaseView,
    pub step: StepView,
    pub controls: ControlsView,
    pub draft: BookingDraft,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub submitting: bool,
    pub landing: LandingView,
    pub availability: AvailabilityView,
    pub review: Vec<ReviewLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<CompletionSummary>,
}
