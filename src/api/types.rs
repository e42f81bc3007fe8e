//! Request and response bodies exchanged with the backend.

use serde::{Deserialize, Deserializer, Serialize};

/// The authenticated user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

impl User {
    /// First letter of the name, used as an avatar badge.
    pub fn initial(&self) -> char {
        self.full_name
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('U')
    }
}

/// Partial user update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub zip_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /auth/login/` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub phone_number: &'a str,
    pub zip_code: &'a str,
    pub password: &'a str,
}

/// `POST /auth/signup/` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogoutRequest<'a> {
    pub refresh: &'a str,
}

/// One selectable option of a wizard step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub id: u64,
    pub name: String,
}

/// The user's saved categorical selections, one list of option ids per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceSelections {
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_types: Vec<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub posting_goals: Vec<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub writing_styles: Vec<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub industries: Vec<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job_descriptions: Vec<u64>,
}

impl PreferenceSelections {
    /// Whether any category has at least one selection.
    pub fn has_any(&self) -> bool {
        [
            &self.content_types,
            &self.posting_goals,
            &self.writing_styles,
            &self.industries,
            &self.job_descriptions,
        ]
        .iter()
        .any(|ids| !ids.is_empty())
    }
}

/// Free-text preferences collected on the last wizard step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeTextPreferences {
    #[serde(default, deserialize_with = "null_as_default")]
    pub fine_tune_description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub modify_post_cta: String,
}

impl FreeTextPreferences {
    pub fn is_empty(&self) -> bool {
        self.fine_tune_description.is_empty() && self.modify_post_cta.is_empty()
    }
}

/// Some list endpoints answer with a bare object, others with a list holding it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    /// The single object, or the first entry of the list.
    pub fn into_first(self) -> Option<T> {
        match self {
            Self::Many(items) => items.into_iter().next(),
            Self::One(item) => Some(item),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub title: &'a str,
}

/// `POST /api/generate-linkedin-post/` response.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    pub post: String,
}

#[derive(Debug, Serialize)]
pub struct SubscribeRequest<'a> {
    pub email: &'a str,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
