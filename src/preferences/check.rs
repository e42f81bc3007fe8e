//! "Has this user saved any preferences yet?"
//!
//! Decides whether the wizard is shown before generating a post. The check
//! fails open: anything other than a clear "yes" means "show the wizard".

use tracing::warn;

use crate::api::ApiClient;

/// Outcome of the saved-preferences check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceCheck {
    /// At least one categorical selection is saved.
    Saved,
    /// Nothing saved, no token, or the check failed.
    Missing,
    /// The backend rejected the token.
    SessionExpired,
}

/// Run the check, keeping token errors distinct so callers can tear down.
pub async fn check_saved_preferences(client: &ApiClient, token: Option<&str>) -> PreferenceCheck {
    let Some(token) = token else {
        return PreferenceCheck::Missing;
    };

    match client.saved_selections(Some(token)).await {
        Ok(saved) if saved.has_any() => PreferenceCheck::Saved,
        Ok(_) => PreferenceCheck::Missing,
        Err(e) if e.is_token_error() => PreferenceCheck::SessionExpired,
        Err(e) => {
            warn!("Preference check failed, showing the wizard: {}", e);
            PreferenceCheck::Missing
        }
    }
}

/// Whether saved preferences exist. Every failure reads as `false`.
pub async fn has_saved_preferences(client: &ApiClient, token: Option<&str>) -> bool {
    check_saved_preferences(client, token).await == PreferenceCheck::Saved
}
