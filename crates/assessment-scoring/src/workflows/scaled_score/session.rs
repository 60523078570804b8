use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::catalog::SectionCatalog;
use super::editor::{
    ConfigurationEditor, EditAction, EditError, EditOutcome, EditorSnapshot, UnitKey,
};
use super::mapping::{MappingImportError, MappingImporter};
use super::validation::ErrorTree;

const SESSION_QUEUE_DEPTH: usize = 32;

/// Identifier wrapper for open editing sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Action outcome paired with the snapshot it produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditResult {
    pub outcome: EditOutcome,
    pub snapshot: EditorSnapshot,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("editing session has shut down")]
    Closed,
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Import(#[from] MappingImportError),
}

enum SessionCommand {
    Apply {
        action: EditAction,
        reply: oneshot::Sender<Result<EditResult, EditError>>,
    },
    Snapshot {
        reply: oneshot::Sender<EditorSnapshot>,
    },
    Validate {
        reply: oneshot::Sender<ErrorTree>,
    },
}

/// Cloneable front door to a session task. The task owns the editor, so every mutation,
/// including the tail of an async mapping upload, is applied in queue order.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionCommand>,
}

impl fmt::Debug for SessionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionCommand::Apply { action, .. } => f.debug_tuple("Apply").field(action).finish(),
            SessionCommand::Snapshot { .. } => f.write_str("Snapshot"),
            SessionCommand::Validate { .. } => f.write_str("Validate"),
        }
    }
}

impl SessionHandle {
    /// Spawn a session task on the current tokio runtime.
    pub fn spawn(catalog: Arc<SectionCatalog>) -> Self {
        Self::spawn_with(ConfigurationEditor::new(catalog))
    }

    pub fn spawn_with(editor: ConfigurationEditor) -> Self {
        let (sender, receiver) = mpsc::channel(SESSION_QUEUE_DEPTH);
        tokio::spawn(run_session(editor, receiver));
        Self { sender }
    }

    pub async fn apply(&self, action: EditAction) -> Result<EditResult, SessionError> {
        let (reply, response) = oneshot::channel();
        self.send(SessionCommand::Apply { action, reply }).await?;
        let result = response.await.map_err(|_| SessionError::Closed)?;
        Ok(result?)
    }

    pub async fn snapshot(&self) -> Result<EditorSnapshot, SessionError> {
        let (reply, response) = oneshot::channel();
        self.send(SessionCommand::Snapshot { reply }).await?;
        response.await.map_err(|_| SessionError::Closed)
    }

    pub async fn validate(&self) -> Result<ErrorTree, SessionError> {
        let (reply, response) = oneshot::channel();
        self.send(SessionCommand::Validate { reply }).await?;
        response.await.map_err(|_| SessionError::Closed)
    }

    /// Read a mapping file, then queue it for the unit behind `key`. If that unit is removed
    /// while the read is pending, the result reports `EditOutcome::Discarded`.
    pub async fn upload_mapping<R>(&self, key: UnitKey, reader: R) -> Result<EditResult, SessionError>
    where
        R: AsyncRead + Unpin,
    {
        let mapping = MappingImporter::from_async_reader(reader).await?;
        debug!(%key, rows = mapping.len(), "mapping upload parsed");
        self.apply(EditAction::ApplyMapping { key, mapping }).await
    }

    async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)
    }
}

async fn run_session(mut editor: ConfigurationEditor, mut receiver: mpsc::Receiver<SessionCommand>) {
    while let Some(command) = receiver.recv().await {
        match command {
            SessionCommand::Apply { action, reply } => {
                let result = editor.apply(action).map(|outcome| EditResult {
                    outcome,
                    snapshot: editor.snapshot(),
                });
                if let Err(error) = &result {
                    warn!(%error, "edit rejected");
                }
                let _ = reply.send(result);
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(editor.snapshot());
            }
            SessionCommand::Validate { reply } => {
                let _ = reply.send(editor.validate());
            }
        }
    }

    debug!(revision = editor.revision(), "editing session closed");
}

/// Storage abstraction for open sessions so the service can be exercised in isolation.
pub trait SessionStore: Send + Sync {
    fn insert(&self, id: SessionId, handle: SessionHandle);
    fn fetch(&self, id: &SessionId) -> Option<SessionHandle>;
    fn remove(&self, id: &SessionId) -> Option<SessionHandle>;
}
