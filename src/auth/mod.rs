//! Login, signup and logout flows, and session-expiry teardown.

pub mod password;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use crate::api::{ApiClient, SignupRequest, User};
use crate::busy::BusyGuard;
use crate::error::{AuthError, ErrorKind};
use crate::notify::Notifier;
use crate::session::SessionStore;

pub use password::{MAX_STRENGTH, password_strength, strength_label};

/// Fixed message shown whenever a token error ends the session.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Tear the session down after a token error and tell the user.
///
/// Safe to call from several failing requests at once; each call clears
/// the (already cleared) session again.
pub async fn expire_session(session: &SessionStore, notifier: &dyn Notifier) {
    warn!("Access token rejected, ending session");
    session.logout().await;
    notifier.error(SESSION_EXPIRED_MESSAGE);
}

/// Fields of the signup form.
pub struct SignupForm {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub zip_code: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

/// Drives the login / signup / logout dialogs.
pub struct AuthFlow {
    client: Arc<ApiClient>,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    login_busy: AtomicBool,
    signup_busy: AtomicBool,
    logout_busy: AtomicBool,
}

impl AuthFlow {
    pub fn new(
        client: Arc<ApiClient>,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client,
            session,
            notifier,
            login_busy: AtomicBool::new(false),
            signup_busy: AtomicBool::new(false),
            logout_busy: AtomicBool::new(false),
        }
    }

    /// Log in and store the issued credentials.
    ///
    /// A refused login never touches the existing session.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<User, AuthError> {
        let _guard = BusyGuard::acquire(&self.login_busy).ok_or(AuthError::Busy("login"))?;

        if email.trim().is_empty() {
            self.notifier.error("Please enter your email address");
            return Err(AuthError::MissingField("email"));
        }
        if password.expose_secret().is_empty() {
            self.notifier.error("Please enter your password");
            return Err(AuthError::MissingField("password"));
        }

        match self.client.login(email.trim(), password).await {
            Ok(response) => {
                let user = response.user.clone();
                self.session
                    .set_credentials(response.user, response.access, response.refresh)
                    .await;
                self.notifier.success("Logged in successfully");
                Ok(user)
            }
            Err(e) => {
                let message = match e.kind() {
                    ErrorKind::Transport => "Something went wrong".to_string(),
                    _ => e.message_or("Login failed"),
                };
                warn!(%email, "Login refused: {}", e);
                self.notifier.error(&message);
                Err(AuthError::Rejected(message))
            }
        }
    }

    /// Create an account. Returns the confirmation message.
    ///
    /// Does not log the user in; the caller switches to the login dialog.
    pub async fn signup(&self, form: &SignupForm) -> Result<String, AuthError> {
        let _guard = BusyGuard::acquire(&self.signup_busy).ok_or(AuthError::Busy("signup"))?;

        if form.password.expose_secret() != form.confirm_password.expose_secret() {
            self.notifier.error("Passwords do not match");
            return Err(AuthError::PasswordMismatch);
        }
        for (field, value) in [("full_name", &form.full_name), ("email", &form.email)] {
            if value.trim().is_empty() {
                self.notifier.error("Please fill in all required fields");
                return Err(AuthError::MissingField(field));
            }
        }

        let request = SignupRequest {
            full_name: form.full_name.trim(),
            email: form.email.trim(),
            phone_number: form.phone_number.trim(),
            zip_code: form.zip_code.trim(),
            password: form.password.expose_secret(),
        };

        match self.client.signup(&request).await {
            Ok(response) => {
                let message = response
                    .message
                    .unwrap_or_else(|| "Account created successfully".to_string());
                info!(email = %request.email, "Account created");
                self.notifier.success(&message);
                Ok(message)
            }
            Err(e) => {
                let message = match e.kind() {
                    ErrorKind::Transport => "Something went wrong".to_string(),
                    _ => e.message_or("Signup failed"),
                };
                warn!(email = %request.email, "Signup refused: {}", e);
                self.notifier.error(&message);
                Err(AuthError::Rejected(message))
            }
        }
    }

    /// Log out. The local session is cleared whatever the backend says.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let _guard = BusyGuard::acquire(&self.logout_busy).ok_or(AuthError::Busy("logout"))?;

        let session = self.session.snapshot().await;
        if let Some(refresh) = session.refresh_token.as_deref() {
            if let Err(e) = self
                .client
                .logout(session.access_token.as_deref(), refresh)
                .await
            {
                warn!("Backend logout failed, clearing local session anyway: {}", e);
            }
        }

        self.session.logout().await;
        self.notifier.success("Logged out successfully");
        Ok(())
    }
}
