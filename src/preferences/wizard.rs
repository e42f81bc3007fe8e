//! Preference wizard: walks the user through the step catalog, loads each
//! step's options, accumulates selections and saves them at the end.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, FreeTextPreferences, OptionItem, PreferenceSelections};
use crate::auth::expire_session;
use crate::busy::BusyGuard;
use crate::error::{ApiError, WizardError};
use crate::notify::Notifier;
use crate::session::SessionStore;

use super::selection::SelectionSet;
use super::steps::Step;

/// Called once after preferences are saved.
pub type CompletionCallback = Box<dyn Fn() + Send + Sync>;

/// Everything the wizard dialog shows.
#[derive(Debug, Clone)]
pub struct WizardState {
    pub open: bool,
    pub step: Step,
    /// Options per step, cached for the lifetime of the wizard.
    pub options: HashMap<Step, Vec<OptionItem>>,
    pub selections: SelectionSet,
    pub free_text: FreeTextPreferences,
    /// A fetch or save is in flight.
    pub loading: bool,
    /// Inline error for the current step.
    pub error: Option<String>,
    /// Saved preferences were found, so the wizard edits rather than creates.
    pub edit_mode: bool,
    /// The user changed something; background prefill must not overwrite it.
    touched: bool,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            open: false,
            step: Step::FIRST,
            options: HashMap::new(),
            selections: SelectionSet::new(),
            free_text: FreeTextPreferences::default(),
            loading: false,
            error: None,
            edit_mode: false,
            touched: false,
        }
    }
}

impl WizardState {
    /// Options of the current step; empty while loading, after a failed
    /// load, and on the free-text step.
    pub fn items(&self) -> &[OptionItem] {
        self.options
            .get(&self.step)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_cached(&self, step: Step) -> bool {
        self.options.contains_key(&step)
    }

    pub fn is_selected(&self, id: u64) -> bool {
        self.selections.is_selected(self.step, id)
    }

    /// Position in the wizard as a percentage, counting the current step.
    pub fn progress_percent(&self) -> f32 {
        (self.step.index() + 1) as f32 / Step::ALL.len() as f32 * 100.0
    }

    pub fn title(&self) -> &'static str {
        if self.edit_mode {
            "Update Your Preferences"
        } else {
            "Set Your Preferences"
        }
    }

    pub fn description(&self) -> String {
        let lead = if self.edit_mode {
            "Modify your content generation settings"
        } else {
            "Customize your content generation experience"
        };
        format!(
            "{lead} (Step {} of {})",
            self.step.index() + 1,
            Step::ALL.len()
        )
    }

    pub fn can_go_back(&self) -> bool {
        !self.loading && self.step.previous().is_some()
    }

    pub fn can_go_next(&self) -> bool {
        !self.loading && self.step.next().is_some()
    }

    pub fn can_submit(&self) -> bool {
        !self.loading && self.step == Step::LAST
    }
}

/// The preference wizard state machine.
///
/// State sits behind a lock and navigation/saving share one busy flag, so a
/// second "Next" while a fetch is running is refused rather than queued.
pub struct PreferenceWizard {
    client: Arc<ApiClient>,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    state: Arc<RwLock<WizardState>>,
    busy: AtomicBool,
    on_complete: Option<CompletionCallback>,
    prefill: Mutex<Option<JoinHandle<()>>>,
}

impl PreferenceWizard {
    pub fn new(
        client: Arc<ApiClient>,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client,
            session,
            notifier,
            state: Arc::new(RwLock::new(WizardState::default())),
            busy: AtomicBool::new(false),
            on_complete: None,
            prefill: Mutex::new(None),
        }
    }

    /// Run `callback` after preferences are saved successfully.
    pub fn with_on_complete(mut self, callback: CompletionCallback) -> Self {
        self.on_complete = Some(callback);
        self
    }

    /// A copy of the current state.
    pub async fn state(&self) -> WizardState {
        self.state.read().await.clone()
    }

    pub async fn step(&self) -> Step {
        self.state.read().await.step
    }

    pub async fn is_open(&self) -> bool {
        self.state.read().await.open
    }

    /// Open the dialog at the first step.
    ///
    /// Saved preferences are fetched in the background while the first
    /// step's options load.
    pub async fn open(&self) -> Result<(), WizardError> {
        let _guard = BusyGuard::acquire(&self.busy).ok_or(WizardError::Busy)?;
        {
            let mut state = self.state.write().await;
            state.open = true;
            state.step = Step::FIRST;
            state.error = None;
        }
        self.spawn_prefill().await;
        self.load_options(Step::FIRST).await
    }

    /// Close the dialog. Cached options and selections are kept.
    pub async fn close(&self) {
        self.state.write().await.open = false;
    }

    /// Wait for the background prefill started by [`open`](Self::open).
    pub async fn wait_for_prefill(&self) {
        let handle = self.prefill.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!("Preference prefill task failed: {}", e);
                }
            }
        }
    }

    /// Move to the next step, fetching its options unless cached.
    pub async fn next(&self) -> Result<Step, WizardError> {
        let _guard = BusyGuard::acquire(&self.busy).ok_or(WizardError::Busy)?;
        let target = {
            let mut state = self.state.write().await;
            if !state.open {
                return Err(WizardError::NotOpen);
            }
            let target = state.step.next().ok_or(WizardError::AtLastStep)?;
            state.step = target;
            state.error = None;
            target
        };
        self.load_options(target).await?;
        Ok(target)
    }

    /// Move to the previous step. Never fetches.
    pub async fn back(&self) -> Result<Step, WizardError> {
        let _guard = BusyGuard::acquire(&self.busy).ok_or(WizardError::Busy)?;
        let mut state = self.state.write().await;
        if !state.open {
            return Err(WizardError::NotOpen);
        }
        let target = state.step.previous().ok_or(WizardError::AtFirstStep)?;
        state.step = target;
        state.error = None;
        Ok(target)
    }

    /// Select `id` on the current step if unselected, unselect it otherwise.
    /// Returns whether it is selected afterwards.
    pub async fn toggle(&self, id: u64) -> Result<bool, WizardError> {
        let mut state = self.state.write().await;
        if !state.open {
            return Err(WizardError::NotOpen);
        }
        let step = state.step;
        if step.is_free_text() {
            return Err(WizardError::FreeTextStep(step.label()));
        }
        if !state.items().iter().any(|item| item.id == id) {
            return Err(WizardError::UnknownOption {
                step: step.label(),
                id,
            });
        }
        state.touched = true;
        Ok(state.selections.toggle(step, id))
    }

    pub async fn set_fine_tune_description(&self, text: impl Into<String>) {
        let mut state = self.state.write().await;
        state.free_text.fine_tune_description = text.into();
        state.touched = true;
    }

    pub async fn set_modify_post_cta(&self, text: impl Into<String>) {
        let mut state = self.state.write().await;
        state.free_text.modify_post_cta = text.into();
        state.touched = true;
    }

    /// Save free-text preferences, then replace every categorical selection.
    ///
    /// Only allowed on the last step. On failure the in-memory state is kept
    /// and the wizard stays on the last step.
    pub async fn submit(&self) -> Result<(), WizardError> {
        let _guard = BusyGuard::acquire(&self.busy).ok_or(WizardError::Busy)?;
        let (free_text, selections) = {
            let mut state = self.state.write().await;
            if !state.open {
                return Err(WizardError::NotOpen);
            }
            if state.step != Step::LAST {
                return Err(WizardError::NotOnLastStep);
            }
            state.loading = true;
            state.error = None;
            (state.free_text.clone(), state.selections.to_request())
        };

        let token = self.session.access_token().await;
        let result: Result<(), ApiError> = async {
            self.client
                .patch_free_text(token.as_deref(), &free_text)
                .await?;
            self.client
                .replace_selections(token.as_deref(), &selections)
                .await
        }
        .await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(()) => {
                state.open = false;
                drop(state);
                info!(selected = selection_count(&selections), "Preferences saved");
                self.notifier.success("Preferences saved successfully!");
                if let Some(callback) = &self.on_complete {
                    callback();
                }
                Ok(())
            }
            Err(e) if e.is_token_error() => {
                state.open = false;
                drop(state);
                expire_session(&self.session, self.notifier.as_ref()).await;
                Err(WizardError::SessionExpired)
            }
            Err(e) => {
                warn!("Saving preferences failed: {}", e);
                state.error = Some("Failed to save preferences".to_string());
                Err(WizardError::Api(e))
            }
        }
    }

    /// Fetch a step's options unless already cached. A failed fetch leaves
    /// the step empty with an inline error; only a token error is returned.
    async fn load_options(&self, step: Step) -> Result<(), WizardError> {
        if step.is_free_text() {
            return Ok(());
        }
        {
            let mut state = self.state.write().await;
            if state.is_cached(step) {
                debug!(%step, "Options already cached");
                return Ok(());
            }
            state.loading = true;
        }

        let token = self.session.access_token().await;
        let result = self
            .client
            .step_options(token.as_deref(), step.endpoint())
            .await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(items) => {
                debug!(%step, count = items.len(), "Options loaded");
                state.options.insert(step, items);
                Ok(())
            }
            Err(e) if e.is_token_error() => {
                state.open = false;
                drop(state);
                expire_session(&self.session, self.notifier.as_ref()).await;
                Err(WizardError::SessionExpired)
            }
            Err(e) => {
                warn!(%step, "Failed loading options: {}", e);
                state.error = Some(format!("Could not load {}", step.label()));
                Ok(())
            }
        }
    }

    /// Fetch saved selections and free text in the background.
    async fn spawn_prefill(&self) {
        let Some(token) = self.session.access_token().await else {
            return;
        };
        let client = Arc::clone(&self.client);
        let session = Arc::clone(&self.session);
        let notifier = Arc::clone(&self.notifier);
        let state = Arc::clone(&self.state);

        let handle = tokio::spawn(async move {
            let (saved, free_text) = tokio::join!(
                client.saved_selections(Some(&token)),
                client.free_text_preferences(Some(&token)),
            );
            apply_prefill(&state, &session, notifier.as_ref(), saved, free_text).await;
        });

        if let Some(previous) = self.prefill.lock().await.replace(handle) {
            previous.abort();
        }
    }
}

async fn apply_prefill(
    state: &RwLock<WizardState>,
    session: &SessionStore,
    notifier: &dyn Notifier,
    saved: Result<PreferenceSelections, ApiError>,
    free_text: Result<FreeTextPreferences, ApiError>,
) {
    let token_rejected = matches!(&saved, Err(e) if e.is_token_error())
        || matches!(&free_text, Err(e) if e.is_token_error());
    if token_rejected {
        state.write().await.open = false;
        expire_session(session, notifier).await;
        return;
    }

    let mut state = state.write().await;
    match saved {
        Ok(saved) if saved.has_any() => {
            state.edit_mode = true;
            if !state.touched {
                state.selections = SelectionSet::from_saved(&saved);
            }
        }
        Ok(_) => {}
        Err(e) => warn!("Could not prefill saved selections: {}", e),
    }
    match free_text {
        Ok(free_text) if !free_text.is_empty() => {
            if !state.touched {
                state.free_text = free_text;
            }
        }
        Ok(_) => {}
        Err(e) => warn!("Could not prefill free-text preferences: {}", e),
    }
}

fn selection_count(selections: &PreferenceSelections) -> usize {
    selections.content_types.len()
        + selections.posting_goals.len()
        + selections.writing_styles.len()
        + selections.industries.len()
        + selections.job_descriptions.len()
}
