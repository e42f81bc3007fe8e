//! Newsletter signup from the footer.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tracing::{info, warn};

use crate::api::ApiClient;
use crate::busy::BusyGuard;
use crate::error::NewsletterError;
use crate::notify::Notifier;
use crate::session::SessionStore;

pub struct Newsletter {
    client: Arc<ApiClient>,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    busy: AtomicBool,
}

impl Newsletter {
    pub fn new(
        client: Arc<ApiClient>,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client,
            session,
            notifier,
            busy: AtomicBool::new(false),
        }
    }

    /// Subscribe `email`. The access token is sent when there is one, but a
    /// rejected token does not end the session here.
    pub async fn subscribe(&self, email: &str) -> Result<(), NewsletterError> {
        let email = email.trim();
        if email.is_empty() {
            self.notifier.error("Please enter your email address");
            return Err(NewsletterError::EmptyEmail);
        }
        let _guard = BusyGuard::acquire(&self.busy).ok_or(NewsletterError::Busy)?;

        let token = self.session.access_token().await;
        match self.client.subscribe(token.as_deref(), email).await {
            Ok(()) => {
                info!(%email, "Subscribed to newsletter");
                self.notifier
                    .success("Successfully subscribed to our newsletter!");
                Ok(())
            }
            Err(e) => {
                warn!(%email, "Newsletter subscription failed: {}", e);
                self.notifier.error("Failed to subscribe. Please try again.");
                Err(NewsletterError::Api(e))
            }
        }
    }
}
