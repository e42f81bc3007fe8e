//! In-process mock of the EasyGen backend.
//!
//! Each test starts its own server on a random port; switches on
//! [`MockBackend`] make individual endpoints fail or reject the token.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use easygen::api::{ApiClient, User};
use easygen::app::App;
use easygen::config::ClientConfig;
use easygen::generate::MemoryClipboard;
use easygen::notify::MemoryNotifier;
use easygen::session::SessionStore;

/// Maximum time any test is allowed to run before we consider it hung.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

pub const GOOD_PASSWORD: &str = "Correct-Horse-9";
pub const ACCESS_TOKEN: &str = "access-token";
pub const REFRESH_TOKEN: &str = "refresh-token";

/// Option endpoints and the id offset of their options.
pub const OPTION_ENDPOINTS: [(&str, u64); 5] = [
    ("content-types", 10),
    ("posting-goals", 20),
    ("writing-styles", 30),
    ("industries", 40),
    ("job-descriptions", 50),
];

/// Switches and recorded traffic of the mock backend.
#[derive(Default)]
pub struct MockBackend {
    /// Every authenticated endpoint answers `401 token_not_valid`.
    pub expired: AtomicBool,
    pub fail_generate: AtomicBool,
    pub fail_save: AtomicBool,
    pub fail_subscribe: AtomicBool,
    /// Option endpoints that answer 500.
    pub failing_options: Mutex<HashSet<String>>,
    pub selections: Mutex<Value>,
    pub free_text: Mutex<Value>,
    pub last_put: Mutex<Option<Value>>,
    pub last_patch: Mutex<Option<Value>>,
    pub last_generate_auth: Mutex<Option<String>>,
    pub subscribed: Mutex<Vec<String>>,
    pub generated: AtomicUsize,
    hits: Mutex<HashMap<String, usize>>,
}

impl MockBackend {
    /// Number of requests seen for `"METHOD /path/"`.
    pub fn hits(&self, key: &str) -> usize {
        self.hits.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }

    pub fn expire_tokens(&self) {
        self.expired.store(true, Ordering::SeqCst);
    }

    pub fn fail_options(&self, endpoint: &str) {
        self.failing_options
            .lock()
            .unwrap()
            .insert(endpoint.to_string());
    }

    pub fn restore_options(&self, endpoint: &str) {
        self.failing_options.lock().unwrap().remove(endpoint);
    }

    pub fn save_selections(&self, value: Value) {
        *self.selections.lock().unwrap() = value;
    }

    pub fn save_free_text(&self, value: Value) {
        *self.free_text.lock().unwrap() = value;
    }

    fn is_expired(&self) -> bool {
        self.expired.load(Ordering::SeqCst)
    }
}

type Shared = Arc<MockBackend>;

fn token_rejected() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "detail": "Given token not valid for any token type",
            "code": "token_not_valid",
            "messages": [{
                "token_class": "AccessToken",
                "token_type": "access",
                "message": "Token is expired"
            }]
        })),
    )
        .into_response()
}

fn server_error(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": message })),
    )
        .into_response()
}

pub fn ada() -> User {
    User {
        full_name: "Ada Lovelace".into(),
        email: "ada@example.com".into(),
        phone_number: Some("555-0100".into()),
        zip_code: Some("94107".into()),
    }
}

async fn count_hits(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let key = format!("{} {}", request.method(), request.uri().path());
    *state.hits.lock().unwrap().entry(key).or_default() += 1;
    next.run(request).await
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == GOOD_PASSWORD {
        let user = ada();
        Json(json!({
            "user": {
                "full_name": user.full_name,
                "email": body["email"],
                "phone_number": user.phone_number,
                "zip_code": user.zip_code,
            },
            "access": ACCESS_TOKEN,
            "refresh": REFRESH_TOKEN,
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
            .into_response()
    }
}

async fn signup(Json(body): Json<Value>) -> Response {
    if body["email"] == "taken@example.com" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"email": ["user with this email already exists."]})),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({"message": "Account created. Please log in."})),
    )
        .into_response()
}

async fn logout() -> Response {
    StatusCode::RESET_CONTENT.into_response()
}

async fn my_selections(State(state): State<Shared>) -> Response {
    if state.is_expired() {
        return token_rejected();
    }
    Json(state.selections.lock().unwrap().clone()).into_response()
}

async fn put_selections(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if state.is_expired() {
        return token_rejected();
    }
    if state.fail_save.load(Ordering::SeqCst) {
        return server_error("database unavailable");
    }
    *state.last_put.lock().unwrap() = Some(body.clone());
    *state.selections.lock().unwrap() = body.clone();
    Json(body).into_response()
}

async fn get_free_text(State(state): State<Shared>) -> Response {
    if state.is_expired() {
        return token_rejected();
    }
    Json(state.free_text.lock().unwrap().clone()).into_response()
}

async fn patch_free_text(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if state.is_expired() {
        return token_rejected();
    }
    *state.last_patch.lock().unwrap() = Some(body.clone());
    *state.free_text.lock().unwrap() = body.clone();
    Json(body).into_response()
}

async fn options(state: Shared, endpoint: String) -> Response {
    if state.is_expired() {
        return token_rejected();
    }
    if state.failing_options.lock().unwrap().contains(&endpoint) {
        return server_error("options unavailable");
    }
    let Some((_, base)) = OPTION_ENDPOINTS.iter().find(|(name, _)| *name == endpoint) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    Json(json!([
        {"id": base + 1, "name": format!("{endpoint} A")},
        {"id": base + 2, "name": format!("{endpoint} B")},
        {"id": base + 3, "name": format!("{endpoint} C")},
    ]))
    .into_response()
}

async fn generate(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    *state.last_generate_auth.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    if state.is_expired() {
        return token_rejected();
    }
    if state.fail_generate.load(Ordering::SeqCst) {
        return server_error("model overloaded");
    }
    let n = state.generated.fetch_add(1, Ordering::SeqCst) + 1;
    let title = body["title"].as_str().unwrap_or_default();
    Json(json!({ "post": format!("Variation {n}: {title}\n\nThanks for reading!") })).into_response()
}

async fn subscribe(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if state.fail_subscribe.load(Ordering::SeqCst) {
        return server_error("mailer down");
    }
    let email = body["email"].as_str().unwrap_or_default().to_string();
    state.subscribed.lock().unwrap().push(email);
    StatusCode::CREATED.into_response()
}

/// Start the mock backend on a random port. Returns its base URL.
pub async fn start_backend() -> (String, Shared) {
    let state: Shared = Arc::new(MockBackend::default());
    state.save_selections(json!([]));
    state.save_free_text(json!([]));

    let mut router = Router::new()
        .route("/auth/login/", post(login))
        .route("/auth/signup/", post(signup))
        .route("/auth/logout/", post(logout))
        .route("/api/user-preference-selections/mine/", get(my_selections))
        .route("/api/user-preference-selections/", axum::routing::put(put_selections))
        .route(
            "/api/user-preferences/",
            get(get_free_text).patch(patch_free_text),
        )
        .route("/api/generate-linkedin-post/", post(generate))
        .route("/api/subscribe/", post(subscribe));

    for (endpoint, _) in OPTION_ENDPOINTS {
        let name = endpoint.to_string();
        router = router.route(
            &format!("/api/{endpoint}/"),
            get(move |State(state): State<Shared>| options(state, name.clone())),
        );
    }

    let app = router
        .layer(middleware::from_fn_with_state(Arc::clone(&state), count_hits))
        .with_state(Arc::clone(&state));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}"), state)
}

/// Everything a flow test needs, wired against the mock backend.
pub struct Harness {
    pub backend: Shared,
    pub app: App,
    pub notifier: Arc<MemoryNotifier>,
    pub clipboard: Arc<MemoryClipboard>,
}

impl Harness {
    pub async fn start() -> Self {
        let (base_url, backend) = start_backend().await;
        let config = ClientConfig {
            api_url: base_url,
            suggestion_delay: Duration::ZERO,
            ..ClientConfig::default()
        };
        let client = Arc::new(ApiClient::new(&config).unwrap());
        let notifier = Arc::new(MemoryNotifier::new());
        let clipboard = Arc::new(MemoryClipboard::new());
        let app = App::from_parts(
            config,
            client,
            SessionStore::in_memory(),
            notifier.clone(),
            clipboard.clone(),
        );
        Self {
            backend,
            app,
            notifier,
            clipboard,
        }
    }

    /// Start with a logged-in session and no notifications recorded.
    pub async fn logged_in() -> Self {
        let harness = Self::start().await;
        harness
            .app
            .session()
            .set_credentials(ada(), ACCESS_TOKEN.into(), REFRESH_TOKEN.into())
            .await;
        harness
    }

    pub fn messages(&self) -> Vec<String> {
        self.notifier.messages()
    }
}
