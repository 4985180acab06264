//! Authenticated session handle.

use secrecy::SecretString;
use serde::Deserialize;

use super::UserId;

/// An authenticated session issued by the auth provider.
///
/// The core treats authentication as opaque: a session is just "which
/// user" plus the bearer token to present on backend calls. The token
/// is wrapped in [`SecretString`] so it never appears in debug output
/// or logs.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    /// The authenticated user.
    pub user: UserId,
    /// Bearer access token for backend calls.
    pub access_token: SecretString,
}

impl Session {
    /// Creates a session from a user id and raw token.
    #[inline]
    #[must_use]
    pub fn new(user: UserId, access_token: SecretString) -> Self {
        Self { user, access_token }
    }
}
