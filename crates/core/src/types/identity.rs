//! Signed-in user identity as returned by the remote API.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::UserId;

/// Identity/profile record issued by the login, register and profile endpoints.
///
/// The client treats this record as opaque: it is replaced wholesale on login
/// or profile update and cleared on logout. Fields the client does not know
/// about are kept in `extra` so persisting and rehydrating never drops data.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    /// Bearer token, for deployments that do not rely on the session cookie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identity {
    /// Date the account was created, formatted for display.
    #[must_use]
    pub fn member_since(&self) -> String {
        self.created_at
            .map_or_else(|| "N/A".to_string(), |at| at.format("%Y-%m-%d").to_string())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("is_admin", &self.is_admin)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}
