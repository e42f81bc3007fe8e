//! HTTP transport over `reqwest`.

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::types::{
    FreeTextPreferences, GenerateRequest, GenerateResponse, LoginRequest, LoginResponse,
    LogoutRequest, OneOrMany, OptionItem, PreferenceSelections, SignupRequest, SignupResponse,
    SubscribeRequest,
};
use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError};

/// Backend endpoint paths.
pub mod endpoints {
    pub const LOGIN: &str = "/auth/login/";
    pub const SIGNUP: &str = "/auth/signup/";
    pub const LOGOUT: &str = "/auth/logout/";
    pub const MY_SELECTIONS: &str = "/api/user-preference-selections/mine/";
    pub const SELECTIONS: &str = "/api/user-preference-selections/";
    pub const USER_PREFERENCES: &str = "/api/user-preferences/";
    pub const GENERATE_POST: &str = "/api/generate-linkedin-post/";
    pub const SUBSCRIBE: &str = "/api/subscribe/";

    /// Option list for a wizard step, e.g. `/api/content-types/`.
    pub fn step_options(endpoint: &str) -> String {
        format!("/api/{endpoint}/")
    }
}

/// Client for the EasyGen backend.
///
/// Stateless apart from the connection pool: credentials are passed per call,
/// so the same client serves every flow.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl ApiClient {
    /// Build a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("easygen/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self {
            base_url: config.api_url.clone(),
            timeout: config.http_timeout,
            http,
        })
    }

    /// Build a client with default settings against `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let config = ClientConfig {
            api_url: base_url.into().trim_end_matches('/').to_string(),
            ..ClientConfig::default()
        };
        Self::new(&config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn request(&self, method: Method, endpoint: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.http.request(method, self.url(endpoint));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and return the raw body of a successful response.
    async fn execute(&self, endpoint: &str, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if status.is_success() {
            debug!(endpoint, status = status.as_u16(), "Backend call succeeded");
            return Ok(body);
        }

        let err = ApiError::from_response(status, &body);
        warn!(
            endpoint,
            status = status.as_u16(),
            kind = ?err.kind(),
            "Backend call failed"
        );
        Err(err)
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.execute(endpoint, builder).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(format!("{endpoint}: {e}")))
    }

    fn transport_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(self.timeout)
        } else {
            ApiError::from(e)
        }
    }

    // ── Auth ────────────────────────────────────────────────────────────

    /// `POST /auth/login/`.
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        let builder = self
            .request(Method::POST, endpoints::LOGIN, None)
            .json(&body);
        self.execute_json(endpoints::LOGIN, builder).await
    }

    /// `POST /auth/signup/`.
    pub async fn signup(&self, body: &SignupRequest<'_>) -> Result<SignupResponse, ApiError> {
        let builder = self
            .request(Method::POST, endpoints::SIGNUP, None)
            .json(body);
        let raw = self.execute(endpoints::SIGNUP, builder).await?;
        // Some deployments answer 201 with an empty body.
        if raw.trim().is_empty() {
            return Ok(SignupResponse::default());
        }
        serde_json::from_str(&raw).map_err(|e| ApiError::Decode(format!("signup: {e}")))
    }

    /// `POST /auth/logout/`, blacklisting the refresh token server-side.
    pub async fn logout(&self, token: Option<&str>, refresh: &str) -> Result<(), ApiError> {
        let builder = self
            .request(Method::POST, endpoints::LOGOUT, token)
            .json(&LogoutRequest { refresh });
        self.execute(endpoints::LOGOUT, builder).await.map(|_| ())
    }

    // ── Preferences ─────────────────────────────────────────────────────

    /// `GET /api/user-preference-selections/mine/`. Missing data reads as empty.
    pub async fn saved_selections(
        &self,
        token: Option<&str>,
    ) -> Result<PreferenceSelections, ApiError> {
        let builder = self.request(Method::GET, endpoints::MY_SELECTIONS, token);
        let parsed: Option<OneOrMany<PreferenceSelections>> =
            self.execute_json(endpoints::MY_SELECTIONS, builder).await?;
        Ok(parsed.and_then(OneOrMany::into_first).unwrap_or_default())
    }

    /// `PUT /api/user-preference-selections/`, replacing every category.
    pub async fn replace_selections(
        &self,
        token: Option<&str>,
        selections: &PreferenceSelections,
    ) -> Result<(), ApiError> {
        let builder = self
            .request(Method::PUT, endpoints::SELECTIONS, token)
            .json(selections);
        self.execute(endpoints::SELECTIONS, builder).await.map(|_| ())
    }

    /// `GET /api/user-preferences/`. Missing data reads as empty.
    pub async fn free_text_preferences(
        &self,
        token: Option<&str>,
    ) -> Result<FreeTextPreferences, ApiError> {
        let builder = self.request(Method::GET, endpoints::USER_PREFERENCES, token);
        let parsed: Option<OneOrMany<FreeTextPreferences>> =
            self.execute_json(endpoints::USER_PREFERENCES, builder).await?;
        Ok(parsed.and_then(OneOrMany::into_first).unwrap_or_default())
    }

    /// `PATCH /api/user-preferences/`.
    pub async fn patch_free_text(
        &self,
        token: Option<&str>,
        preferences: &FreeTextPreferences,
    ) -> Result<(), ApiError> {
        let builder = self
            .request(Method::PATCH, endpoints::USER_PREFERENCES, token)
            .json(preferences);
        self.execute(endpoints::USER_PREFERENCES, builder)
            .await
            .map(|_| ())
    }

    /// `GET /api/{endpoint}/`, the options of one wizard step.
    pub async fn step_options(
        &self,
        token: Option<&str>,
        endpoint: &str,
    ) -> Result<Vec<OptionItem>, ApiError> {
        let path = endpoints::step_options(endpoint);
        let builder = self.request(Method::GET, &path, token);
        self.execute_json(&path, builder).await
    }

    // ── Generation ──────────────────────────────────────────────────────

    /// `POST /api/generate-linkedin-post/`. Returns the post body.
    pub async fn generate_post(&self, token: &str, title: &str) -> Result<String, ApiError> {
        let builder = self
            .request(Method::POST, endpoints::GENERATE_POST, Some(token))
            .json(&GenerateRequest { title });
        let response: GenerateResponse = self
            .execute_json(endpoints::GENERATE_POST, builder)
            .await?;
        Ok(response.post)
    }

    // ── Newsletter ──────────────────────────────────────────────────────

    /// `POST /api/subscribe/`.
    pub async fn subscribe(&self, token: Option<&str>, email: &str) -> Result<(), ApiError> {
        let builder = self
            .request(Method::POST, endpoints::SUBSCRIBE, token)
            .json(&SubscribeRequest { email });
        self.execute(endpoints::SUBSCRIBE, builder).await.map(|_| ())
    }
}
