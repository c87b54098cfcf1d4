use async_trait::async_trait;
use holiday_booking::config::BookingConfig;
use holiday_booking::workflows::availability::{
    AvailabilityRepository, AvailabilitySource, FileAvailabilitySource, HttpAvailabilitySource,
};
use holiday_booking::workflows::booking::{
    BookingPayload, BookingService, BookingSession, GatewayError, RepositoryError, SessionId,
    SessionRepository, SubmissionCoordinator, SubmissionGateway,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const DEFAULT_MAX_SESSIONS: usize = 10_000;

struct StoredSession {
    session: BookingSession,
    last_seen: Instant,
}

/// Process-local sessions. Entries idle longer than `idle_timeout` are
/// dropped on access or when the store is full; a full store of live
/// sessions refuses new ones.
#[derive(Clone)]
pub(crate) struct InMemorySessionRepository {
    sessions: Arc<Mutex<HashMap<SessionId, StoredSession>>>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS)
    }
}

impl InMemorySessionRepository {
    pub(crate) fn new(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::default(),
            idle_timeout,
            max_sessions,
        }
    }

    pub(crate) fn from_config(config: &BookingConfig) -> Self {
        Self::new(config.session_idle_timeout, config.max_sessions)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.sessions.lock().expect("session mutex poisoned").len()
    }

    fn is_idle(&self, entry: &StoredSession, now: Instant) -> bool {
        now.saturating_duration_since(entry.last_seen) >= self.idle_timeout
    }
}

impl SessionRepository for InMemorySessionRepository {
    fn insert(&self, id: SessionId, session: BookingSession) -> Result<(), RepositoryError> {
        let now = Instant::now();
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        if guard.contains_key(&id) {
            return Err(RepositoryError::Conflict);
        }
        if guard.len() >= self.max_sessions {
            let before = guard.len();
            guard.retain(|_, entry| !self.is_idle(entry, now));
            debug!(evicted = before - guard.len(), "swept idle booking sessions");
            if guard.len() >= self.max_sessions {
                warn!(active = guard.len(), "session store full, refusing new session");
                return Err(RepositoryError::AtCapacity);
            }
        }
        guard.insert(
            id,
            StoredSession {
                session,
                last_seen: now,
            },
        );
        Ok(())
    }

    fn with_session<T, F>(&self, id: &SessionId, apply: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut BookingSession) -> T,
    {
        let now = Instant::now();
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        let entry = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if self.is_idle(entry, now) {
            guard.remove(id);
            return Err(RepositoryError::NotFound);
        }
        entry.last_seen = now;
        Ok(apply(&mut entry.session))
    }
}

/// Stand-in for the workflow webhook when the demo runs offline.
#[derive(Debug, Default, Clone)]
pub(crate) struct RecordingGateway {
    payloads: Arc<Mutex<Vec<BookingPayload>>>,
}

impl RecordingGateway {
    pub(crate) fn payloads(&self) -> Vec<BookingPayload> {
        self.payloads
            .lock()
            .expect("gateway mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl SubmissionGateway for RecordingGateway {
    async fn submit(&self, payload: &BookingPayload) -> Result<(), GatewayError> {
        info!(action = ?payload.action, date = %payload.date, "recorded booking locally");
        self.payloads
            .lock()
            .expect("gateway mutex poisoned")
            .push(payload.clone());
        Ok(())
    }
}

/// A local export when given, otherwise the configured spreadsheet URL.
pub(crate) fn availability_source(
    config: &BookingConfig,
    client: &reqwest::Client,
    csv: Option<PathBuf>,
) -> Arc<dyn AvailabilitySource> {
    match csv {
        Some(path) => Arc::new(FileAvailabilitySource::new(path)),
        None => Arc::new(HttpAvailabilitySource::new(
            client.clone(),
            config.availability_url.clone(),
        )),
    }
}

pub(crate) fn booking_service(
    config: &BookingConfig,
    repository: Arc<InMemorySessionRepository>,
    source: Arc<dyn AvailabilitySource>,
    gateway: Arc<dyn SubmissionGateway>,
) -> BookingService<InMemorySessionRepository> {
    BookingService::new(
        repository,
        AvailabilityRepository::new(source),
        SubmissionCoordinator::new(gateway, config.deposit_amount.clone()),
        config.season,
        config.storefront(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use holiday_booking::workflows::availability::StaticAvailabilitySource;
    use holiday_booking::workflows::booking::BookingServiceError;

    fn service_over(
        repository: InMemorySessionRepository,
    ) -> BookingService<InMemorySessionRepository> {
        booking_service(
            &BookingConfig::defaults().expect("default booking config"),
            Arc::new(repository),
            Arc::new(StaticAvailabilitySource::new("Date,Booked\n")),
            Arc::new(RecordingGateway::default()),
        )
    }

    #[tokio::test]
    async fn idle_sessions_expire_and_read_as_not_found() {
        let service = service_over(InMemorySessionRepository::new(Duration::ZERO, 10));

        let started = service.start_session().await.expect("session starts");

        assert!(matches!(
            service.view(&started.session_id),
            Err(BookingServiceError::Repository(RepositoryError::NotFound))
        ));
    }

    #[tokio::test]
    async fn active_sessions_stay_reachable() {
        let service = service_over(InMemorySessionRepository::default());

        let started = service.start_session().await.expect("session starts");

        let view = service.view(&started.session_id).expect("session still stored");
        assert_eq!(view.session_id, started.session_id);
    }

    #[tokio::test]
    async fn full_store_of_live_sessions_refuses_new_ones() {
        let repository = InMemorySessionRepository::new(Duration::from_secs(600), 2);
        let service = service_over(repository.clone());

        let first = service.start_session().await.expect("first session");
        service.start_session().await.expect("second session");

        assert!(matches!(
            service.start_session().await,
            Err(BookingServiceError::Repository(RepositoryError::AtCapacity))
        ));
        assert_eq!(repository.len(), 2);
        service.view(&first.session_id).expect("existing sessions untouched");
    }

    #[tokio::test]
    async fn full_store_makes_room_by_dropping_idle_sessions() {
        let repository = InMemorySessionRepository::new(Duration::ZERO, 1);
        let service = service_over(repository.clone());

        let stale = service.start_session().await.expect("first session");
        let fresh = service.start_session().await.expect("idle entry evicted");

        assert_eq!(repository.len(), 1);
        assert_ne!(stale.session_id, fresh.session_id);
        assert!(matches!(
            service.view(&stale.session_id),
            Err(BookingServiceError::Repository(RepositoryError::NotFound))
        ));
    }

    #[tokio::test]
    async fn thousand_abandoned_starts_stay_within_the_cap() {
        let repository = InMemorySessionRepository::new(Duration::from_secs(600), 100);
        let service = service_over(repository.clone());

        let mut refused = 0;
        for _ in 0..1000 {
            if service.start_session().await.is_err() {
                refused += 1;
            }
        }

        assert_eq!(repository.len(), 100);
        assert_eq!(refused, 900);
    }
}
