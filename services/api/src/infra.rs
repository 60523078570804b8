use assessment_scoring::config::SessionConfig;
use assessment_scoring::workflows::scaled_score::{
    Profile, SessionHandle, SessionId, SessionStore,
};
use chrono::{DateTime, Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

const MAX_IDLE_SECS: u64 = 100 * 365 * 24 * 60 * 60;

struct StoredSession {
    handle: SessionHandle,
    last_used: DateTime<Utc>,
}

/// Open sessions, kept in memory until closed or left idle past the timeout.
#[derive(Clone)]
pub(crate) struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, StoredSession>>>,
    idle_timeout: Duration,
}

impl InMemorySessionStore {
    pub(crate) fn new(idle_timeout_secs: u64) -> Self {
        let idle_timeout = Duration::seconds(idle_timeout_secs.min(MAX_IDLE_SECS) as i64);
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            idle_timeout,
        }
    }

    fn guard(&self) -> MutexGuard<'_, HashMap<SessionId, StoredSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop every session not touched since `now - idle_timeout`. Returns how many went.
    pub(crate) fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        evict_idle_locked(&mut self.guard(), now, self.idle_timeout)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.guard().len()
    }
}

fn evict_idle_locked(
    sessions: &mut HashMap<SessionId, StoredSession>,
    now: DateTime<Utc>,
    idle_timeout: Duration,
) -> usize {
    let before = sessions.len();
    sessions.retain(|_, stored| now.signed_duration_since(stored.last_used) < idle_timeout);
    let evicted = before - sessions.len();
    if evicted > 0 {
        info!(evicted, remaining = sessions.len(), "idle editing sessions evicted");
    }
    evicted
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default().idle_timeout_secs)
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, id: SessionId, handle: SessionHandle) {
        let now = Utc::now();
        let mut guard = self.guard();
        evict_idle_locked(&mut guard, now, self.idle_timeout);
        guard.insert(
            id,
            StoredSession {
                handle,
                last_used: now,
            },
        );
    }

    fn fetch(&self, id: &SessionId) -> Option<SessionHandle> {
        let mut guard = self.guard();
        let stored = guard.get_mut(id)?;
        stored.last_used = Utc::now();
        Some(stored.handle.clone())
    }

    fn remove(&self, id: &SessionId) -> Option<SessionHandle> {
        self.guard().remove(id).map(|stored| stored.handle)
    }
}

pub(crate) fn parse_profile(raw: &str) -> Result<Profile, String> {
    Profile::from_label(raw).ok_or_else(|| {
        format!("unknown profile '{raw}' (expected one of GENERIC, SAT, ACT)")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assessment_scoring::workflows::scaled_score::SectionCatalog;

    #[test]
    fn parse_profile_is_case_insensitive() {
        assert_eq!(parse_profile(" sat "), Ok(Profile::Sat));
        assert!(parse_profile("lsat").is_err());
    }

    #[tokio::test]
    async fn store_round_trips_handles() {
        let store = InMemorySessionStore::default();
        let id = SessionId("session-test".to_string());
        store.insert(
            id.clone(),
            SessionHandle::spawn(Arc::new(SectionCatalog::standard())),
        );

        assert!(store.fetch(&id).is_some());
        assert_eq!(store.len(), 1);
        assert!(store.remove(&id).is_some());
        assert!(store.fetch(&id).is_none());
    }

    fn spawn_handle() -> SessionHandle {
        SessionHandle::spawn(Arc::new(SectionCatalog::standard()))
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted_on_insert() {
        let store = InMemorySessionStore::new(0);
        let abandoned = SessionId("session-abandoned".to_string());
        let fresh = SessionId("session-fresh".to_string());

        store.insert(abandoned.clone(), spawn_handle());
        store.insert(fresh.clone(), spawn_handle());

        assert!(store.fetch(&abandoned).is_none());
        assert!(store.fetch(&fresh).is_some());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn recently_used_sessions_survive_eviction() {
        let store = InMemorySessionStore::new(60);
        let id = SessionId("session-active".to_string());
        store.insert(id.clone(), spawn_handle());

        assert_eq!(store.evict_idle(Utc::now() + Duration::seconds(30)), 0);
        assert!(store.fetch(&id).is_some());

        assert_eq!(store.evict_idle(Utc::now() + Duration::seconds(61)), 1);
        assert!(store.fetch(&id).is_none());
    }

    #[tokio::test]
    async fn in_flight_handles_outlive_eviction() {
        let store = InMemorySessionStore::new(0);
        let id = SessionId("session-in-flight".to_string());
        store.insert(id.clone(), spawn_handle());
        let in_flight = store.fetch(&id).expect("session stored");

        assert_eq!(store.evict_idle(Utc::now()), 1);
        assert!(in_flight.snapshot().await.is_ok());
    }
}
