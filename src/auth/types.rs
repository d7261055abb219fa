//! Request and response types for the account endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::store::UserRecord;

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FullName {
    pub firstname: String,
    pub lastname: String,
}

/// Public view of a user. The password hash is never part of it.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub fullname: FullName,
    pub email: String,
    /// Unix seconds.
    pub created_at: i64,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            fullname: FullName {
                firstname: record.firstname,
                lastname: record.lastname,
            },
            email: record.email,
            created_at: record.created_at_unix,
        }
    }
}

/// `fullname` as submitted; requiredness is checked after parsing so every
/// missing field can be reported at once.
#[derive(ToSchema, Deserialize, Debug, Clone, Default)]
pub struct FullNameInput {
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
}

#[derive(ToSchema, Deserialize, Debug, Clone, Default)]
pub struct RegisterRequest {
    #[serde(default)]
    pub fullname: Option<FullNameInput>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(ToSchema, Deserialize, Debug, Clone, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Token plus the user it identifies.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct MessageResponse {
    pub message: String,
}
