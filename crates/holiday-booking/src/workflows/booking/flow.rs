use super::domain::{BookingDraft, FieldValue, FormField, LightOption, UnknownValue};
use serde::Serialize;
use tracing::debug;

pub const INCOMPLETE_STEP_MESSAGE: &str = "Please complete all required fields before continuing";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Landing,
    DateSelection,
    LightOptions,
    ContactInfo,
    ReviewAndPay,
}

impl Step {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Landing,
            Self::DateSelection,
            Self::LightOptions,
            Self::ContactInfo,
            Self::ReviewAndPay,
        ]
    }

    pub const fn number(self) -> u8 {
        match self {
            Self::Landing => 1,
            Self::DateSelection => 2,
            Self::LightOptions => 3,
            Self::ContactInfo => 4,
            Self::ReviewAndPay => 5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Landing => "Welcome",
            Self::DateSelection => "Select Installation Date",
            Self::LightOptions => "Choose Your Lights",
            Self::ContactInfo => "Your Information",
            Self::ReviewAndPay => "Review Your Booking",
        }
    }

    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Landing => Some(Self::DateSelection),
            Self::DateSelection => Some(Self::LightOptions),
            Self::LightOptions => Some(Self::ContactInfo),
            Self::ContactInfo => Some(Self::ReviewAndPay),
            Self::ReviewAndPay => None,
        }
    }

    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Landing => None,
            Self::DateSelection => Some(Self::Landing),
            Self::LightOptions => Some(Self::DateSelection),
            Self::ContactInfo => Some(Self::LightOptions),
            Self::ReviewAndPay => Some(Self::ContactInfo),
        }
    }

    /// Share of the progress bar filled while this step is shown.
    pub fn progress_percent(self) -> u8 {
        (u16::from(self.number() - 1) * 100 / 4) as u8
    }

    pub fn gate_passes(self, draft: &BookingDraft) -> bool {
        match self {
            Self::DateSelection => !draft.date.is_empty(),
            Self::LightOptions => draft.has_light_selection(),
            Self::ContactInfo => draft.has_contact_details(),
            Self::Landing | Self::ReviewAndPay => true,
        }
    }
}

/// Result of pressing the primary control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved(Step),
    Blocked,
    /// The review step was confirmed; the caller owns the submission.
    SubmitRequested,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Unknown(#[from] UnknownValue),
    #[error("field {field} expects {expected}")]
    WrongValueKind {
        field: FormField,
        expected: &'static str,
    },
    #[error("a submission is already in progress")]
    SubmissionInFlight,
    #[error("submission is only available from the review step")]
    NotReadyToSubmit,
    #[error("booking already completed; start a new booking first")]
    AlreadyCompleted,
}

/// Step-indexed form state for one customer session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFlow {
    step: Step,
    draft: BookingDraft,
    error: Option<String>,
    submitting: bool,
}

impl Default for StepFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl StepFlow {
    pub fn new() -> Self {
        Self {
            step: Step::Landing,
            draft: BookingDraft::default(),
            error: None,
            submitting: false,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn validate(&self, step: Step) -> bool {
        step.gate_passes(&self.draft)
    }

    pub fn advance(&mut self) -> Advance {
        if !self.validate(self.step) {
            self.error = Some(INCOMPLETE_STEP_MESSAGE.to_string());
            debug!(step = self.step.number(), "step gate blocked advance");
            return Advance::Blocked;
        }

        self.error = None;
        match self.step.next() {
            Some(next) => {
                debug!(from = self.step.number(), to = next.number(), "advanced step");
                self.step = next;
                Advance::Moved(next)
            }
            None => Advance::SubmitRequested,
        }
    }

    /// Backward moves skip validation.
    pub fn retreat(&mut self) -> Step {
        self.error = None;
        if let Some(previous) = self.step.previous() {
            debug!(from = self.step.number(), to = previous.number(), "retreated step");
            self.step = previous;
        }
        self.step
    }

    /// Alternating keeps an earlier tip color; the plain options clear it so a
    /// stale tip color never reaches the webhook.
    pub fn select_light_option(&mut self, option: LightOption) {
        self.draft.light_option = Some(option);
        if !option.needs_tip_color() {
            self.draft.tip_color.clear();
        }
    }

    pub fn set_field(&mut self, field: FormField, value: FieldValue) -> Result<(), FlowError> {
        match (field, value) {
            (FormField::AgreeTerms, FieldValue::Checked(checked)) => {
                self.draft.agree_terms = checked;
            }
            (FormField::AgreeTerms, FieldValue::Text(_)) => {
                return Err(FlowError::WrongValueKind {
                    field,
                    expected: "a checkbox value",
                });
            }
            (_, FieldValue::Checked(_)) => {
                return Err(FlowError::WrongValueKind {
                    field,
                    expected: "text",
                });
            }
            (FormField::LightOption, FieldValue::Text(text)) => {
                self.select_light_option(text.parse()?);
            }
            (FormField::Name, FieldValue::Text(text)) => self.draft.name = text,
            (FormField::Address, FieldValue::Text(text)) => self.draft.address = text,
            (FormField::Phone, FieldValue::Text(text)) => self.draft.phone = text,
            (FormField::Email, FieldValue::Text(text)) => self.draft.email = text,
            (FormField::Date, FieldValue::Text(text)) => self.draft.date = text,
            (FormField::TipColor, FieldValue::Text(text)) => self.draft.tip_color = text,
        }
        Ok(())
    }

    pub(crate) fn begin_submission(&mut self) -> Result<(), FlowError> {
        if self.submitting {
            return Err(FlowError::SubmissionInFlight);
        }
        if self.step != Step::ReviewAndPay {
            return Err(FlowError::NotReadyToSubmit);
        }
        self.error = None;
        self.submitting = true;
        Ok(())
    }

    pub(crate) fn fail_submission(&mut self, message: String) {
        self.submitting = false;
        self.error = Some(message);
    }

    pub(crate) fn finish_submission(&mut self) {
        self.submitting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_is_closed() {
        assert_eq!(Step::Landing.previous(), None);
        assert_eq!(Step::ReviewAndPay.next(), None);
        for pair in Step::ordered().windows(2) {
            assert_eq!(pair[0].next(), Some(pair[1]));
            assert_eq!(pair[1].previous(), Some(pair[0]));
            assert_eq!(pair[0].number() + 1, pair[1].number());
        }
    }

    #[test]
    fn progress_tracks_step_number() {
        let percents: Vec<u8> = Step::ordered()
            .iter()
            .map(|step| step.progress_percent())
            .collect();
        assert_eq!(percents, vec![0, 25, 50, 75, 100]);
    }

    #[test]
    fn checkbox_and_text_kinds_are_enforced() {
        let mut flow = StepFlow::new();
        assert!(matches!(
            flow.set_field(FormField::AgreeTerms, "yes".into()),
            Err(FlowError::WrongValueKind { .. })
        ));
        assert!(matches!(
            flow.set_field(FormField::Name, true.into()),
            Err(FlowError::WrongValueKind { .. })
        ));
        flow.set_field(FormField::AgreeTerms, true.into())
            .expect("checkbox accepted");
        assert!(flow.draft().agree_terms);
    }

    #[test]
    fn light_option_field_routes_through_selection() {
        let mut flow = StepFlow::new();
        flow.set_field(FormField::LightOption, "alternating".into())
            .expect("valid option");
        flow.set_field(FormField::TipColor, "red".into())
            .expect("tip color");
        flow.set_field(FormField::LightOption, "clear-warm".into())
            .expect("valid option");
        assert_eq!(flow.draft().light_option, Some(LightOption::ClearWarm));
        assert!(flow.draft().tip_color.is_empty());
        assert!(matches!(
            flow.set_field(FormField::LightOption, "rainbow".into()),
            Err(FlowError::Unknown(_))
        ));
    }

    #[test]
    fn begin_submission_requires_review_step_and_no_pending_call() {
        let mut flow = StepFlow::new();
        assert_eq!(flow.begin_submission(), Err(FlowError::NotReadyToSubmit));

        flow.step = Step::ReviewAndPay;
        flow.begin_submission().expect("first submission starts");
        assert_eq!(flow.begin_submission(), Err(FlowError::SubmissionInFlight));

        flow.fail_submission("Failed to submit booking. Please try again.".to_string());
        assert!(!flow.is_submitting());
        assert!(flow.error().is_some());
        flow.begin_submission().expect("retry allowed after failure");
        assert!(flow.error().is_none());
    }
}
