use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncRead;
use tracing::info;

use super::catalog::SectionCatalog;
use super::defaults::defaults_for;
use super::document::validate_document;
use super::domain::{Configuration, MappingEntry, Profile};
use super::editor::{EditAction, EditorSnapshot, UnitKey};
use super::mapping::parse_mapping;
use super::session::{EditResult, SessionError, SessionHandle, SessionId, SessionStore};
use super::validation::ErrorTree;

/// Service composing the section catalog with the open editing sessions.
pub struct ScaledScoreService<S> {
    catalog: Arc<SectionCatalog>,
    sessions: Arc<S>,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("session-{id:06}"))
}

/// Returned when a session is opened.
#[derive(Debug, Clone, Serialize)]
pub struct SessionTicket {
    pub session_id: SessionId,
    pub opened_at: DateTime<Utc>,
    pub snapshot: EditorSnapshot,
}

impl<S> ScaledScoreService<S>
where
    S: SessionStore + 'static,
{
    pub fn new(catalog: Arc<SectionCatalog>, sessions: Arc<S>) -> Self {
        Self { catalog, sessions }
    }

    pub fn catalog(&self) -> &SectionCatalog {
        &self.catalog
    }

    /// Start a session holding a fresh GENERIC configuration.
    pub async fn open_session(&self) -> Result<SessionTicket, ScaledScoreServiceError> {
        let handle = SessionHandle::spawn(self.catalog.clone());
        let snapshot = handle.snapshot().await?;
        let session_id = next_session_id();
        self.sessions.insert(session_id.clone(), handle);

        info!(session = %session_id, "editing session opened");

        Ok(SessionTicket {
            session_id,
            opened_at: Utc::now(),
            snapshot,
        })
    }

    pub async fn snapshot(&self, id: &SessionId) -> Result<EditorSnapshot, ScaledScoreServiceError> {
        Ok(self.session(id)?.snapshot().await?)
    }

    pub async fn session_errors(&self, id: &SessionId) -> Result<ErrorTree, ScaledScoreServiceError> {
        Ok(self.session(id)?.validate().await?)
    }

    pub async fn apply(
        &self,
        id: &SessionId,
        action: EditAction,
    ) -> Result<EditResult, ScaledScoreServiceError> {
        Ok(self.session(id)?.apply(action).await?)
    }

    pub async fn upload_mapping<R>(
        &self,
        id: &SessionId,
        key: UnitKey,
        reader: R,
    ) -> Result<EditResult, ScaledScoreServiceError>
    where
        R: AsyncRead + Unpin,
    {
        Ok(self.session(id)?.upload_mapping(key, reader).await?)
    }

    /// Drop the session. Its task stops once in-flight requests release their handles.
    pub fn close_session(&self, id: &SessionId) -> Result<(), ScaledScoreServiceError> {
        match self.sessions.remove(id) {
            Some(_) => {
                info!(session = %id, "editing session closed");
                Ok(())
            }
            None => Err(ScaledScoreServiceError::SessionNotFound(id.clone())),
        }
    }

    pub fn validate_document(&self, document: &Value) -> ErrorTree {
        validate_document(document)
    }

    pub fn defaults(&self, profile: Profile) -> Configuration {
        defaults_for(profile)
    }

    pub fn parse_mapping(&self, text: &str) -> Vec<MappingEntry> {
        parse_mapping(text)
    }

    fn session(&self, id: &SessionId) -> Result<SessionHandle, ScaledScoreServiceError> {
        self.sessions
            .fetch(id)
            .ok_or_else(|| ScaledScoreServiceError::SessionNotFound(id.clone()))
    }
}

/// Error raised by the scaled score service.
#[derive(Debug, thiserror::Error)]
pub enum ScaledScoreServiceError {
    #[error("session {0} not found")]
    SessionNotFound(SessionId),
    #[error(transparent)]
    Session(#[from] SessionError),
}
