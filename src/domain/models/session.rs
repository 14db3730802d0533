use serde::Serialize;

use super::user::User;

/// Storage key holding the signed-in household id in either scope.
pub const SESSION_STORAGE_KEY: &str = "ecotrack-session-user";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionScope {
    /// Survives restarts ("remember me").
    Durable,
    /// Lives as long as the client session.
    Ephemeral,
}

impl SessionScope {
    pub fn for_remember_me(remember_me: bool) -> Self {
        if remember_me { SessionScope::Durable } else { SessionScope::Ephemeral }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub user: User,
    /// The stored password no longer meets policy; the caller must route to
    /// the password-change flow before anything else.
    pub force_password_change: bool,
}

#[derive(Debug, Clone)]
pub struct SignupParams {
    pub name: String,
    pub identifier: String,
    pub password: String,
    pub email: Option<String>,
    pub family_size: u32,
    pub address: Option<String>,
    pub gram_panchayat: Option<String>,
    pub remember_me: bool,
}
