//! Request types for the auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `/register` and `/login`.
///
/// Both fields default to empty so a missing field is reported as a 400 with
/// the same message as an empty one.
#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    /// Whether both fields carry something.
    pub(crate) fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.is_empty()
    }
}
