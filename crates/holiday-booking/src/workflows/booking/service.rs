use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::calendar::{Calendar, SeasonWindow};
use super::domain::{FieldValue, FormField, LightOption};
use super::flow::{Advance, FlowError};
use super::repository::{RepositoryError, SessionId, SessionRepository};
use super::session::{BookingSession, PendingSubmission, SessionView, StorefrontSettings};
use super::submission::SubmissionCoordinator;
use crate::workflows::availability::AvailabilityRepository;

/// Session view tagged with the id the client addresses it by.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub session_id: SessionId,
    #[serde(flatten)]
    pub view: SessionView,
}

/// Creates sessions from fresh availability and drives them through the
/// funnel. The webhook call runs outside the repository lock.
pub struct BookingService<R> {
    repository: Arc<R>,
    availability: AvailabilityRepository,
    coordinator: SubmissionCoordinator,
    season: SeasonWindow,
    storefront: StorefrontSettings,
}

impl<R> BookingService<R>
where
    R: SessionRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        availability: AvailabilityRepository,
        coordinator: SubmissionCoordinator,
        season: SeasonWindow,
        storefront: StorefrontSettings,
    ) -> Self {
        Self {
            repository,
            availability,
            coordinator,
            season,
            storefront,
        }
    }

    pub fn season(&self) -> &SeasonWindow {
        &self.season
    }

    /// Loads availability once and opens a session on the landing step.
    pub async fn start_session(&self) -> Result<SessionResponse, BookingServiceError> {
        let snapshot = self.availability.load_availability().await;
        let calendar = Calendar::build(self.season, &snapshot);
        let session = BookingSession::new(calendar, self.storefront.clone());
        let view = session.view();

        let session_id = SessionId::new();
        self.repository.insert(session_id, session)?;
        info!(
            %session_id,
            available_slots = view.availability.available_slots,
            "booking session started"
        );

        Ok(SessionResponse { session_id, view })
    }

    pub fn view(&self, id: &SessionId) -> Result<SessionResponse, BookingServiceError> {
        let view = self.repository.with_session(id, |session| session.view())?;
        Ok(respond(id, view))
    }

    /// `field` is the form name (`name`, `lightOption`, `agreeTerms`, ...).
    pub fn set_field(
        &self,
        id: &SessionId,
        field: &str,
        value: FieldValue,
    ) -> Result<SessionResponse, BookingServiceError> {
        let field: FormField = field.parse().map_err(FlowError::from)?;
        let view = self.repository.with_session(id, |session| {
            session.set_field(field, value).map(|()| session.view())
        })??;
        Ok(respond(id, view))
    }

    pub fn select_light_option(
        &self,
        id: &SessionId,
        option: &str,
    ) -> Result<SessionResponse, BookingServiceError> {
        let option: LightOption = option.parse().map_err(FlowError::from)?;
        let view = self.repository.with_session(id, |session| {
            session.select_light_option(option).map(|()| session.view())
        })??;
        Ok(respond(id, view))
    }

    /// A blocked gate is not an error: the view carries the message. On the
    /// review step a passing gate submits.
    pub async fn advance(&self, id: &SessionId) -> Result<SessionResponse, BookingServiceError> {
        let pending = self.repository.with_session(
            id,
            |session| -> Result<Option<PendingSubmission>, FlowError> {
                match session.advance()? {
                    Advance::SubmitRequested => session.begin_submission().map(Some),
                    Advance::Moved(_) | Advance::Blocked => Ok(None),
                }
            },
        )??;

        match pending {
            Some(pending) => self.complete_submission(id, pending).await,
            None => self.view(id),
        }
    }

    pub fn retreat(&self, id: &SessionId) -> Result<SessionResponse, BookingServiceError> {
        let view = self.repository.with_session(id, |session| {
            session.retreat().map(|_| session.view())
        })??;
        Ok(respond(id, view))
    }

    pub async fn submit(&self, id: &SessionId) -> Result<SessionResponse, BookingServiceError> {
        let pending = self
            .repository
            .with_session(id, |session| session.begin_submission())??;
        self.complete_submission(id, pending).await
    }

    pub fn restart(&self, id: &SessionId) -> Result<SessionResponse, BookingServiceError> {
        let view = self.repository.with_session(id, |session| {
            session.start_new_booking().map(|()| session.view())
        })??;
        Ok(respond(id, view))
    }

    async fn complete_submission(
        &self,
        id: &SessionId,
        pending: PendingSubmission,
    ) -> Result<SessionResponse, BookingServiceError> {
        let attempt = self
            .coordinator
            .submit(&pending.draft, &pending.calendar)
            .await;
        let view = self.repository.with_session(id, |session| {
            session.finish_submission(attempt);
            session.view()
        })?;
        Ok(respond(id, view))
    }
}

fn respond(id: &SessionId, view: SessionView) -> SessionResponse {
    SessionResponse {
        session_id: *id,
        view,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookingServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Flow(#[from] FlowError),
}
