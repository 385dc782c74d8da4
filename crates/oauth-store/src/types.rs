//! Entities exchanged with the protocol engine.
//!
//! These are the in-memory shapes the engine produces and consumes. Foreign
//! references are always hydrated: an [`AuthorizeData`] carries its full
//! [`Client`], and an [`AccessData`] carries its client plus the originating
//! authorization when there is one.
//!
//! Expiry is stored as a duration in seconds next to a creation timestamp.
//! The helpers here compute the absolute instant on demand; deciding what an
//! expired record means is left to the caller.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

// =============================================================================
// Client
// =============================================================================

/// A registered OAuth 2.0 client application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Stable client identifier.
    pub id: String,

    /// Shared secret.
    pub secret: String,

    /// Registered redirect URI.
    pub redirect_uri: String,
}

impl Client {
    /// Creates a new client.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }
}

// =============================================================================
// Authorization Code
// =============================================================================

/// An authorization grant, identified by its single-use code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeData {
    /// Client the code was issued to.
    pub client: Client,

    /// Authorization code.
    pub code: String,

    /// Lifetime of the code in seconds, relative to `created_at`.
    pub expires_in: i32,

    /// Requested scope.
    pub scope: String,

    /// Redirect URI used in the authorization request.
    pub redirect_uri: String,

    /// Opaque state echoed back to the caller.
    pub state: String,

    /// Issuance timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl AuthorizeData {
    /// Returns the instant at which the code stops being valid.
    #[must_use]
    pub fn expire_at(&self) -> OffsetDateTime {
        expire_at(self.created_at, self.expires_in)
    }

    /// Returns `true` if the code has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expire_at() < now
    }
}

// =============================================================================
// Access Token
// =============================================================================

/// An issued access token and its optional companion refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessData {
    /// Client the token was issued to.
    pub client: Client,

    /// Authorization the token was exchanged from.
    ///
    /// `None` for grants that skip the authorization-code step, such as
    /// client credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorize_data: Option<Box<AuthorizeData>>,

    /// Access token.
    pub access_token: String,

    /// Refresh token. Empty when the token cannot be refreshed.
    #[serde(default)]
    pub refresh_token: String,

    /// Lifetime of the token in seconds, relative to `created_at`.
    pub expires_in: i32,

    /// Granted scope.
    pub scope: String,

    /// Redirect URI from the originating request.
    pub redirect_uri: String,

    /// Issuance timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl AccessData {
    /// Returns `true` if a refresh token was issued alongside the access token.
    #[must_use]
    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }

    /// Returns the code of the originating authorization, if any.
    #[must_use]
    pub fn authorization_code(&self) -> Option<&str> {
        self.authorize_data.as_deref().map(|a| a.code.as_str())
    }

    /// Returns the instant at which the access token stops being valid.
    #[must_use]
    pub fn expire_at(&self) -> OffsetDateTime {
        expire_at(self.created_at, self.expires_in)
    }

    /// Returns `true` if the access token has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expire_at() < now
    }
}

fn expire_at(created_at: OffsetDateTime, expires_in: i32) -> OffsetDateTime {
    created_at.saturating_add(Duration::seconds(i64::from(expires_in)))
}
