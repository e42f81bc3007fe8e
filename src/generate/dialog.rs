//! Post generation dialog: title entry, then the generated post.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::auth::expire_session;
use crate::busy::BusyGuard;
use crate::config::DEFAULT_SUGGESTION_DELAY;
use crate::error::DialogError;
use crate::notify::Notifier;
use crate::session::SessionStore;

use super::clipboard::Clipboard;

/// Titles offered before the user types anything.
pub const EXAMPLE_TITLES: [&str; 5] = [
    "How I Increased My LinkedIn Engagement by 400% in Just 30 Days",
    "The One LinkedIn Strategy Most People Miss (And It's Costing Them Opportunities)",
    "3 Counter-Intuitive LinkedIn Tips That Helped Me Land My Dream Job",
    "Why Most LinkedIn Posts Fail (And How to Make Yours Stand Out)",
    "The 5-Minute LinkedIn Routine That Transformed My Professional Network",
];

/// How long the "Copied!" indicator stays on.
pub const COPIED_INDICATOR: Duration = Duration::from_secs(2);

/// Called with `(title, body)` after every successful generation.
pub type GenerateCallback = Box<dyn Fn(&str, &str) + Send + Sync>;

/// Which half of the dialog is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogPhase {
    #[default]
    Title,
    Post,
}

impl DialogPhase {
    pub fn heading(&self) -> &'static str {
        match self {
            Self::Title => "Create Your Viral LinkedIn Post",
            Self::Post => "Your Generated LinkedIn Post",
        }
    }
}

impl fmt::Display for DialogPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Post => write!(f, "post"),
        }
    }
}

/// A post returned by the backend for a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPost {
    pub title: String,
    pub body: String,
}

/// One display line of a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostLine {
    Text(String),
    /// A blank line separating paragraphs.
    Gap,
}

impl fmt::Display for PostLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(line) => write!(f, "{line}"),
            Self::Gap => Ok(()),
        }
    }
}

/// Split a post body into display lines, keeping blank lines as gaps.
pub fn format_post(body: &str) -> Vec<PostLine> {
    body.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                PostLine::Gap
            } else {
                PostLine::Text(line.trim_end_matches('\r').to_string())
            }
        })
        .collect()
}

/// What the dialog shows.
#[derive(Debug, Clone)]
pub struct DialogState {
    pub open: bool,
    pub phase: DialogPhase,
    pub title: String,
    pub suggestions: Vec<String>,
    pub post: Option<GeneratedPost>,
    copied_at: Option<Instant>,
}

impl Default for DialogState {
    fn default() -> Self {
        Self {
            open: false,
            phase: DialogPhase::Title,
            title: String::new(),
            suggestions: EXAMPLE_TITLES.iter().map(|t| t.to_string()).collect(),
            post: None,
            copied_at: None,
        }
    }
}

impl DialogState {
    /// Whether `suggestion` is the current title, i.e. shown highlighted.
    pub fn is_chosen(&self, suggestion: &str) -> bool {
        self.title == suggestion
    }

    pub fn can_generate(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// The generation dialog state machine.
pub struct GenerationDialog {
    client: Arc<ApiClient>,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    clipboard: Arc<dyn Clipboard>,
    state: RwLock<DialogState>,
    generating: AtomicBool,
    regenerating: AtomicBool,
    refreshing: AtomicBool,
    on_generate: Option<GenerateCallback>,
    suggestion_delay: Duration,
    copied_indicator: Duration,
}

impl GenerationDialog {
    pub fn new(
        client: Arc<ApiClient>,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        Self {
            client,
            session,
            notifier,
            clipboard,
            state: RwLock::new(DialogState::default()),
            generating: AtomicBool::new(false),
            regenerating: AtomicBool::new(false),
            refreshing: AtomicBool::new(false),
            on_generate: None,
            suggestion_delay: DEFAULT_SUGGESTION_DELAY,
            copied_indicator: COPIED_INDICATOR,
        }
    }

    pub fn with_on_generate(mut self, callback: GenerateCallback) -> Self {
        self.on_generate = Some(callback);
        self
    }

    pub fn with_suggestion_delay(mut self, delay: Duration) -> Self {
        self.suggestion_delay = delay;
        self
    }

    pub fn with_copied_indicator(mut self, duration: Duration) -> Self {
        self.copied_indicator = duration;
        self
    }

    pub async fn state(&self) -> DialogState {
        self.state.read().await.clone()
    }

    pub async fn phase(&self) -> DialogPhase {
        self.state.read().await.phase
    }

    pub async fn title(&self) -> String {
        self.state.read().await.title.clone()
    }

    pub async fn post(&self) -> Option<GeneratedPost> {
        self.state.read().await.post.clone()
    }

    pub async fn suggestions(&self) -> Vec<String> {
        self.state.read().await.suggestions.clone()
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::Acquire)
    }

    pub fn is_regenerating(&self) -> bool {
        self.regenerating.load(Ordering::Acquire)
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// Whether the "Copied!" indicator is showing.
    pub async fn is_copied(&self) -> bool {
        self.state
            .read()
            .await
            .copied_at
            .is_some_and(|at| at.elapsed() < self.copied_indicator)
    }

    pub async fn open(&self) {
        self.state.write().await.open = true;
    }

    /// Close the dialog: back to the title phase, the post is discarded and
    /// the title kept.
    pub async fn close(&self) {
        let mut state = self.state.write().await;
        state.open = false;
        state.phase = DialogPhase::Title;
        state.post = None;
        state.copied_at = None;
    }

    pub async fn set_title(&self, title: impl Into<String>) {
        self.state.write().await.title = title.into();
    }

    /// Use the suggestion at `index` as the title.
    pub async fn select_suggestion(&self, index: usize) -> Result<String, DialogError> {
        let mut state = self.state.write().await;
        let suggestion = state
            .suggestions
            .get(index)
            .cloned()
            .ok_or(DialogError::SuggestionOutOfRange(index))?;
        state.title = suggestion.clone();
        Ok(suggestion)
    }

    /// Generate a post for the current title and show it.
    pub async fn generate(&self) -> Result<GeneratedPost, DialogError> {
        let title = self.state.read().await.title.clone();
        if title.trim().is_empty() {
            self.notifier
                .error("Please enter a title or select a suggestion");
            return Err(DialogError::EmptyTitle);
        }
        let _guard =
            BusyGuard::acquire(&self.generating).ok_or(DialogError::Busy("generate"))?;
        let Some(token) = self.session.access_token().await else {
            self.notifier.error("Please log in to generate posts");
            return Err(DialogError::NotLoggedIn);
        };

        match self.client.generate_post(&token, &title).await {
            Ok(body) => {
                let post = GeneratedPost { title, body };
                {
                    let mut state = self.state.write().await;
                    state.post = Some(post.clone());
                    state.phase = DialogPhase::Post;
                    state.copied_at = None;
                }
                info!(title = %post.title, chars = post.body.len(), "Post generated");
                self.fire_on_generate(&post);
                Ok(post)
            }
            Err(e) if e.is_token_error() => {
                expire_session(&self.session, self.notifier.as_ref()).await;
                Err(DialogError::SessionExpired)
            }
            Err(e) => {
                warn!(%title, "Post generation failed: {}", e);
                self.notifier
                    .error("Failed to generate post. Please try again.");
                Err(DialogError::Api(e))
            }
        }
    }

    /// Ask for another variation of the current post. On failure the
    /// previous post stays.
    pub async fn regenerate(&self) -> Result<GeneratedPost, DialogError> {
        let title = match &self.state.read().await.post {
            Some(post) => post.title.clone(),
            None => return Err(DialogError::NoPost),
        };
        let _guard =
            BusyGuard::acquire(&self.regenerating).ok_or(DialogError::Busy("regenerate"))?;
        let Some(token) = self.session.access_token().await else {
            self.notifier.error("Please log in to generate posts");
            return Err(DialogError::NotLoggedIn);
        };

        match self.client.generate_post(&token, &title).await {
            Ok(body) => {
                let post = GeneratedPost { title, body };
                self.state.write().await.post = Some(post.clone());
                info!(title = %post.title, "Post regenerated");
                self.notifier.success("Generated a new post variation");
                self.fire_on_generate(&post);
                Ok(post)
            }
            Err(e) if e.is_token_error() => {
                expire_session(&self.session, self.notifier.as_ref()).await;
                Err(DialogError::SessionExpired)
            }
            Err(e) => {
                warn!(%title, "Post regeneration failed: {}", e);
                self.notifier
                    .error("Failed to regenerate post. Please try again.");
                Err(DialogError::Api(e))
            }
        }
    }

    /// Go back to editing the title. The title is kept.
    pub async fn back_to_title(&self) {
        self.state.write().await.phase = DialogPhase::Title;
    }

    /// Copy the current post body to the clipboard.
    pub async fn copy_to_clipboard(&self) -> Result<(), DialogError> {
        let body = self
            .state
            .read()
            .await
            .post
            .as_ref()
            .map(|post| post.body.clone())
            .ok_or(DialogError::NoPost)?;

        match self.clipboard.copy(&body).await {
            Ok(()) => {
                self.state.write().await.copied_at = Some(Instant::now());
                self.notifier.success("Post copied to clipboard");
                Ok(())
            }
            Err(e) => {
                warn!("Copy to clipboard failed: {}", e);
                self.notifier.error("Failed to copy to clipboard");
                Err(DialogError::Clipboard(e))
            }
        }
    }

    /// Refresh the suggested titles.
    ///
    /// Placeholder: there is no suggestion endpoint yet, so this waits a
    /// moment and reshuffles the built-in examples.
    pub async fn refresh_suggestions(&self) -> Result<Vec<String>, DialogError> {
        let _guard =
            BusyGuard::acquire(&self.refreshing).ok_or(DialogError::Busy("refresh suggestions"))?;
        if self.session.access_token().await.is_none() {
            self.notifier.error("Please log in to generate suggestions");
            return Err(DialogError::NotLoggedIn);
        }

        tokio::time::sleep(self.suggestion_delay).await;

        let mut suggestions: Vec<String> = EXAMPLE_TITLES.iter().map(|t| t.to_string()).collect();
        suggestions.shuffle(&mut rand::thread_rng());
        debug!(count = suggestions.len(), "Suggestions reshuffled");

        self.state.write().await.suggestions = suggestions.clone();
        self.notifier.success("Generated new title suggestions");
        Ok(suggestions)
    }

    /// The current post as display lines; empty without a post.
    pub async fn formatted_post(&self) -> Vec<PostLine> {
        self.state
            .read()
            .await
            .post
            .as_ref()
            .map(|post| format_post(&post.body))
            .unwrap_or_default()
    }

    fn fire_on_generate(&self, post: &GeneratedPost) {
        if let Some(callback) = &self.on_generate {
            callback(&post.title, &post.body);
        }
    }
}
