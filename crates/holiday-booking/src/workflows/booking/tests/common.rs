use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;
use tokio::sync::Notify;

use crate::config::BookingConfig;
use crate::workflows::availability::{
    AvailabilityRepository, AvailabilitySnapshot, StaticAvailabilitySource,
};
use crate::workflows::booking::calendar::{Calendar, SeasonWindow};
use crate::workflows::booking::domain::{BookingDraft, LightOption};
use crate::workflows::booking::repository::{RepositoryError, SessionId, SessionRepository};
use crate::workflows::booking::service::BookingService;
use crate::workflows::booking::session::{BookingSession, StorefrontSettings};
use crate::workflows::booking::submission::{
    BookingPayload, GatewayError, SubmissionCoordinator, SubmissionGateway,
};

pub(super) const FAILED_SUBMISSION_MESSAGE: &str = "Failed to submit booking. Please try again.";

pub(super) fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
}

pub(super) fn submitted_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 1, 12, 0, 0).unwrap()
}

pub(super) fn season() -> SeasonWindow {
    BookingConfig::defaults().expect("default booking config").season
}

pub(super) fn storefront() -> StorefrontSettings {
    BookingConfig::defaults().expect("default booking config").storefront()
}

pub(super) fn open_calendar() -> Calendar {
    Calendar::build(season(), &AvailabilitySnapshot::default())
}

pub(super) fn sold_out_calendar() -> Calendar {
    let snapshot: AvailabilitySnapshot = season().dates().map(|day| (day, true)).collect();
    Calendar::build(season(), &snapshot)
}

/// Every date booked except the one given.
pub(super) fn calendar_with_only(open: NaiveDate) -> Calendar {
    let snapshot: AvailabilitySnapshot = season()
        .dates()
        .map(|day| (day, day != open))
        .collect();
    Calendar::build(season(), &snapshot)
}

pub(super) fn complete_draft() -> BookingDraft {
    BookingDraft {
        name: "Dana Whitfield".to_string(),
        address: "14 Juniper Lane".to_string(),
        phone: "555-0142".to_string(),
        email: "dana@example.com".to_string(),
        date: "2025-11-20".to_string(),
        light_option: Some(LightOption::ClearWarm),
        tip_color: String::new(),
        agree_terms: true,
    }
}

/// Accepts every booking and keeps the payloads it was handed.
#[derive(Debug, Default, Clone)]
pub(super) struct RecordingGateway {
    payloads: Arc<Mutex<Vec<BookingPayload>>>,
}

impl RecordingGateway {
    pub(super) fn payloads(&self) -> Vec<BookingPayload> {
        self.payloads
            .lock()
            .expect("gateway mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl SubmissionGateway for RecordingGateway {
    async fn submit(&self, payload: &BookingPayload) -> Result<(), GatewayError> {
        self.payloads
            .lock()
            .expect("gateway mutex poisoned")
            .push(payload.clone());
        Ok(())
    }
}

#[derive(Debug)]
pub(super) struct RejectingGateway {
    pub(super) status: u16,
}

#[async_trait]
impl SubmissionGateway for RejectingGateway {
    async fn submit(&self, _payload: &BookingPayload) -> Result<(), GatewayError> {
        Err(GatewayError::Rejected {
            status: self.status,
        })
    }
}

/// Holds every call open until the test releases it.
#[derive(Debug, Default, Clone)]
pub(super) struct GatedGateway {
    pub(super) entered: Arc<Notify>,
    pub(super) release: Arc<Notify>,
}

#[async_trait]
impl SubmissionGateway for GatedGateway {
    async fn submit(&self, _payload: &BookingPayload) -> Result<(), GatewayError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(())
    }
}

pub(super) fn coordinator(gateway: Arc<dyn SubmissionGateway>) -> SubmissionCoordinator {
    SubmissionCoordinator::new(gateway, "$200")
}

pub(super) fn session(calendar: Calendar) -> BookingSession {
    BookingSession::new(calendar, storefront())
}

#[derive(Default)]
pub(super) struct MemorySessions {
    sessions: Mutex<HashMap<SessionId, BookingSession>>,
}

impl SessionRepository for MemorySessions {
    fn insert(&self, id: SessionId, session: BookingSession) -> Result<(), RepositoryError> {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        if guard.contains_key(&id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(id, session);
        Ok(())
    }

    fn with_session<T, F>(&self, id: &SessionId, apply: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut BookingSession) -> T,
    {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        let session = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        Ok(apply(session))
    }
}

pub(super) struct OfflineSessions;

impl SessionRepository for OfflineSessions {
    fn insert(&self, _id: SessionId, _session: BookingSession) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn with_session<T, F>(&self, _id: &SessionId, _apply: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut BookingSession) -> T,
    {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }
}

/// Store that has no room left for new sessions.
pub(super) struct FullSessions;

impl SessionRepository for FullSessions {
    fn insert(&self, _id: SessionId, _session: BookingSession) -> Result<(), RepositoryError> {
        Err(RepositoryError::AtCapacity)
    }

    fn with_session<T, F>(&self, _id: &SessionId, _apply: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut BookingSession) -> T,
    {
        Err(RepositoryError::NotFound)
    }
}

pub(super) fn build_service_with<R>(
    repository: R,
    csv: &str,
    gateway: Arc<dyn SubmissionGateway>,
) -> Arc<BookingService<R>>
where
    R: SessionRepository + 'static,
{
    let config = BookingConfig::defaults().expect("default booking config");
    let availability = AvailabilityRepository::new(Arc::new(StaticAvailabilitySource::new(csv)));
    Arc::new(BookingService::new(
        Arc::new(repository),
        availability,
        coordinator(gateway),
        config.season,
        config.storefront(),
    ))
}

pub(super) fn build_service(
    csv: &str,
    gateway: Arc<dyn SubmissionGateway>,
) -> Arc<BookingService<MemorySessions>> {
    build_service_with(MemorySessions::default(), csv, gateway)
}

pub(super) const BOOKED_FIRST_DAY_CSV: &str = "Date,Booked\n11/20/2025,TRUE\n11/21/2025,FALSE\n";

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
