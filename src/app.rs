//! Top-level coordinator. Owns the shared session, client and notifier and
//! hands out flows bound to them.

use std::sync::Arc;

use tracing::{debug, info};

use crate::api::ApiClient;
use crate::auth::{AuthFlow, expire_session};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::generate::{Clipboard, CommandClipboard, GenerateCallback, GenerationDialog, NoClipboard};
use crate::newsletter::Newsletter;
use crate::notify::Notifier;
use crate::preferences::{CompletionCallback, PreferenceCheck, PreferenceWizard, check_saved_preferences};
use crate::session::SessionStore;

/// Where the "Generate" button leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateRoute {
    /// Nobody is logged in.
    LoginRequired,
    /// Preferences are saved; go straight to the title dialog.
    TitleDialog,
    /// No saved preferences (or the check failed); run the wizard first.
    PreferenceWizard,
    /// The token was rejected and the session has been cleared.
    SessionExpired,
}

pub struct App {
    config: ClientConfig,
    client: Arc<ApiClient>,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    clipboard: Arc<dyn Clipboard>,
    auth: AuthFlow,
    newsletter: Newsletter,
}

impl App {
    /// Build the client and rehydrate the session from `config.session_path`.
    pub async fn new(config: ClientConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let client = Arc::new(ApiClient::new(&config)?);
        let session = SessionStore::open(&config.session_path).await?;
        let clipboard = clipboard_for(&config);
        Ok(Self::from_parts(config, client, session, notifier, clipboard))
    }

    pub fn from_parts(
        config: ClientConfig,
        client: Arc<ApiClient>,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        let auth = AuthFlow::new(
            Arc::clone(&client),
            Arc::clone(&session),
            Arc::clone(&notifier),
        );
        let newsletter = Newsletter::new(
            Arc::clone(&client),
            Arc::clone(&session),
            Arc::clone(&notifier),
        );
        Self {
            config,
            client,
            session,
            notifier,
            clipboard,
            auth,
            newsletter,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn auth(&self) -> &AuthFlow {
        &self.auth
    }

    pub fn newsletter(&self) -> &Newsletter {
        &self.newsletter
    }

    /// A fresh wizard with an empty option cache.
    pub fn preference_wizard(&self, on_complete: Option<CompletionCallback>) -> PreferenceWizard {
        let wizard = PreferenceWizard::new(
            Arc::clone(&self.client),
            Arc::clone(&self.session),
            Arc::clone(&self.notifier),
        );
        match on_complete {
            Some(callback) => wizard.with_on_complete(callback),
            None => wizard,
        }
    }

    /// A fresh generation dialog.
    pub fn generation_dialog(&self, on_generate: Option<GenerateCallback>) -> GenerationDialog {
        let dialog = GenerationDialog::new(
            Arc::clone(&self.client),
            Arc::clone(&self.session),
            Arc::clone(&self.notifier),
            Arc::clone(&self.clipboard),
        )
        .with_suggestion_delay(self.config.suggestion_delay);
        match on_generate {
            Some(callback) => dialog.with_on_generate(callback),
            None => dialog,
        }
    }

    /// Decide what the "Generate" button opens.
    pub async fn start_generation(&self) -> GenerateRoute {
        let Some(token) = self.session.access_token().await else {
            self.notifier.error("Please log in to generate posts");
            return GenerateRoute::LoginRequired;
        };

        let route = match check_saved_preferences(&self.client, Some(&token)).await {
            PreferenceCheck::Saved => GenerateRoute::TitleDialog,
            PreferenceCheck::Missing => GenerateRoute::PreferenceWizard,
            PreferenceCheck::SessionExpired => {
                expire_session(&self.session, self.notifier.as_ref()).await;
                GenerateRoute::SessionExpired
            }
        };
        info!(?route, "Generate requested");
        route
    }

    /// Whether a freshly logged-in user should be sent through the wizard.
    pub async fn needs_preferences(&self) -> bool {
        let token = self.session.access_token().await;
        let check = check_saved_preferences(&self.client, token.as_deref()).await;
        debug!(?check, "Post-login preference check");
        check != PreferenceCheck::Saved
    }
}

/// The configured clipboard command, or one that always fails.
pub fn clipboard_for(config: &ClientConfig) -> Arc<dyn Clipboard> {
    match config
        .clipboard_command
        .as_deref()
        .and_then(CommandClipboard::from_command_line)
    {
        Some(clipboard) => Arc::new(clipboard),
        None => Arc::new(NoClipboard),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::MemoryClipboard;
    use crate::notify::MemoryNotifier;

    fn app(notifier: Arc<MemoryNotifier>) -> App {
        let config = ClientConfig {
            api_url: "http://127.0.0.1:9".into(),
            ..ClientConfig::default()
        };
        let client = Arc::new(ApiClient::new(&config).unwrap());
        App::from_parts(
            config,
            client,
            SessionStore::in_memory(),
            notifier,
            Arc::new(MemoryClipboard::new()),
        )
    }

    #[tokio::test]
    async fn generate_requires_login() {
        let notifier = Arc::new(MemoryNotifier::new());
        let app = app(Arc::clone(&notifier));

        assert_eq!(app.start_generation().await, GenerateRoute::LoginRequired);
        assert_eq!(notifier.messages(), vec!["Please log in to generate posts"]);
    }

    #[tokio::test]
    async fn logged_out_user_needs_preferences() {
        let app = app(Arc::new(MemoryNotifier::new()));
        assert!(app.needs_preferences().await);
    }

    #[tokio::test]
    async fn blank_clipboard_command_never_copies() {
        let config = ClientConfig {
            clipboard_command: Some("  ".into()),
            ..ClientConfig::default()
        };
        let err = clipboard_for(&config).copy("post").await.unwrap_err();
        assert!(matches!(err, crate::error::ClipboardError::Unavailable));
    }

    #[tokio::test]
    async fn unconfigured_clipboard_is_unavailable() {
        let config = ClientConfig::default();
        assert!(config.clipboard_command.is_none());
        let err = clipboard_for(&config).copy("post").await.unwrap_err();
        assert!(matches!(err, crate::error::ClipboardError::Unavailable));
    }
}
