//! Request and response bodies of the catalog REST API.

use serde::{Deserialize, Serialize};

use crate::state::data::{Group, Image, Role, User};

/// `{results: [...]}` envelope used by list endpoints
#[derive(Debug, Deserialize)]
pub struct Results<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

pub type GroupList = Results<Group>;
pub type UserList = Results<User>;

#[derive(Debug, Serialize)]
pub struct CreateGroup<'a> {
    pub name: &'a str,
    pub section: &'a str,
}

/// Partial update of a group; absent fields are left untouched
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct GroupPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

impl GroupPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), position: None }
    }

    pub fn position(position: i64) -> Self {
        Self { name: None, position: Some(position) }
    }
}

#[derive(Debug, Serialize)]
pub struct NameBody<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct OrderBody<'a> {
    pub order: &'a [i64],
}

#[derive(Debug, Serialize)]
pub struct PresentationBody {
    pub presentation_id: i64,
}

/// `{created: [...]}` returned by image uploads
#[derive(Debug, Deserialize)]
pub struct Created {
    #[serde(default)]
    pub created: Vec<Image>,
}

/// Body of `POST /api/users/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct RoleBody {
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct ResetPasswordBody {
    pub reset_password: bool,
}

/// `{"error": "..."}` body of rejected requests
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Analytics session key; the backend may send it as a number or a string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionKey {
    Number(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub struct SessionStarted {
    pub session_id: SessionKey,
}

#[derive(Debug, Serialize)]
pub struct SessionStart<'a> {
    pub client_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SessionStop<'a> {
    pub session_id: &'a SessionKey,
}

/// Body of `POST /api/perf/track/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackBody {
    pub session_id: SessionKey,
    pub action: &'static str,
    pub section: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_id: Option<i64>,
}
