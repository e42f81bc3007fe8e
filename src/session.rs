//! Session store: the single source of truth for "who is logged in".
//!
//! One `SessionStore` exists per process and is shared via `Arc`. It is
//! rehydrated from a JSON file before any flow runs and written back after
//! every mutation. Subscribers get a [`SessionEvent`] for each change.

use std::io::ErrorKind;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

use crate::api::{User, UserPatch};
use crate::error::SessionError;

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// The client-held record of the current user and their tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub is_authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_in_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Whether this is the cleared, logged-out session.
    pub fn is_cleared(&self) -> bool {
        *self == Session::default()
    }
}

/// Change notifications broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { email: String },
    LoggedOut,
    UserUpdated,
}

/// Process-wide session store with durable persistence.
pub struct SessionStore {
    session: RwLock<Session>,
    path: Option<PathBuf>,
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    /// A store that is never written to disk.
    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self::with_session(Session::default(), None))
    }

    /// Open the store backed by `path`, rehydrating any saved session.
    ///
    /// A missing file yields a logged-out session. A file that cannot be
    /// parsed is logged and ignored.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Arc<Self>, SessionError> {
        let path = path.into();
        let session = match fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => {
                    debug!(path = %path.display(), authenticated = session.is_authenticated, "Session rehydrated");
                    session
                }
                Err(e) => {
                    warn!(path = %path.display(), "Ignoring unreadable session file: {}", e);
                    Session::default()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Session::default(),
            Err(e) => return Err(SessionError::Io(e)),
        };
        Ok(Arc::new(Self::with_session(session, Some(path))))
    }

    fn with_session(session: Session, path: Option<PathBuf>) -> Self {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Self {
            session: RwLock::new(session),
            path,
            tx,
        }
    }

    /// Where the session is persisted, if anywhere.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Subscribe to session changes.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Replace the session with freshly issued credentials.
    ///
    /// Token shape is not validated.
    pub async fn set_credentials(&self, user: User, access_token: String, refresh_token: String) {
        let email = user.email.clone();
        {
            let mut session = self.session.write().await;
            *session = Session {
                user: Some(user),
                access_token: Some(access_token),
                refresh_token: Some(refresh_token),
                is_authenticated: true,
                logged_in_at: Some(Utc::now()),
            };
            self.persist(&session).await;
        }
        info!(%email, "Session established");
        let _ = self.tx.send(SessionEvent::LoggedIn { email });
    }

    /// Clear the session. Idempotent.
    pub async fn logout(&self) {
        let was_authenticated = {
            let mut session = self.session.write().await;
            let was = session.is_authenticated;
            *session = Session::default();
            self.persist(&session).await;
            was
        };
        if was_authenticated {
            info!("Session cleared");
        } else {
            debug!("Logout on an already cleared session");
        }
        let _ = self.tx.send(SessionEvent::LoggedOut);
    }

    /// Merge a partial update into the current user. No-op when logged out.
    pub async fn update_user(&self, patch: UserPatch) {
        {
            let mut session = self.session.write().await;
            let Some(user) = session.user.as_mut() else {
                debug!("Ignoring user update without a session");
                return;
            };
            if let Some(full_name) = patch.full_name {
                user.full_name = full_name;
            }
            if let Some(email) = patch.email {
                user.email = email;
            }
            if patch.phone_number.is_some() {
                user.phone_number = patch.phone_number;
            }
            if patch.zip_code.is_some() {
                user.zip_code = patch.zip_code;
            }
            self.persist(&session).await;
        }
        let _ = self.tx.send(SessionEvent::UserUpdated);
    }

    /// A copy of the whole session.
    pub async fn snapshot(&self) -> Session {
        self.session.read().await.clone()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session.read().await.user.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.session.read().await.access_token.clone()
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.session.read().await.refresh_token.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_authenticated
    }

    /// Write the session to disk. Failures are logged, never propagated.
    async fn persist(&self, session: &Session) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        if let Err(e) = write_session(path, session).await {
            warn!(path = %path.display(), "Failed to persist session: {}", e);
        }
    }
}

async fn write_session(path: &Path, session: &Session) -> Result<(), SessionError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(session)?;
    let tmp = path.with_extension("json.tmp");

    // The file holds bearer tokens: owner read/write only.
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);
    let mut file = options.open(&tmp).await?;
    #[cfg(unix)]
    file.set_permissions(std::fs::Permissions::from_mode(0o600)).await?;
    file.write_all(json.as_bytes()).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&tmp, path).await?;
    Ok(())
}
