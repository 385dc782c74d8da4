//! Persisted record shapes and the mapping to and from the engine's entities.
//!
//! Records hold foreign keys as plain identifiers (`client_id`,
//! `authorization_code`); entities hold the resolved records. Going from a
//! record to an entity therefore needs the resolved references, which the
//! `into_*` methods take as arguments.
//!
//! Field names match the document layout used by existing deployments
//! (`redirectUri`, `client_id`, `accessToken`, ...).

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::{AccessData, AuthorizeData, Client};

// =============================================================================
// Client Record
// =============================================================================

/// Persisted client registration, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Client identifier.
    pub id: String,

    /// Shared secret.
    pub secret: String,

    /// Registered redirect URI.
    #[serde(rename = "redirectUri")]
    pub redirect_uri: String,
}

impl ClientRecord {
    /// Builds the record for a client.
    #[must_use]
    pub fn from_client(client: &Client) -> Self {
        Self {
            id: client.id.clone(),
            secret: client.secret.clone(),
            redirect_uri: client.redirect_uri.clone(),
        }
    }

    /// Converts the record back into a client.
    #[must_use]
    pub fn into_client(self) -> Client {
        Client {
            id: self.id,
            secret: self.secret,
            redirect_uri: self.redirect_uri,
        }
    }
}

// =============================================================================
// Authorization Record
// =============================================================================

/// Persisted authorization grant, keyed by `code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeRecord {
    /// Identifier of the owning client.
    pub client_id: String,

    /// Authorization code.
    pub code: String,

    /// Lifetime in seconds.
    #[serde(rename = "expiresIn")]
    pub expires_in: i32,

    /// Requested scope.
    pub scope: String,

    /// Redirect URI from the request.
    #[serde(rename = "redirectUri")]
    pub redirect_uri: String,

    /// State from the request.
    pub state: String,

    /// Issuance timestamp.
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl AuthorizeRecord {
    /// Builds the record for an authorization, keeping only the client id.
    #[must_use]
    pub fn from_authorize(data: &AuthorizeData) -> Self {
        Self {
            client_id: data.client.id.clone(),
            code: data.code.clone(),
            expires_in: data.expires_in,
            scope: data.scope.clone(),
            redirect_uri: data.redirect_uri.clone(),
            state: data.state.clone(),
            created_at: data.created_at,
        }
    }

    /// Hydrates the record with its resolved client.
    #[must_use]
    pub fn into_authorize(self, client: Client) -> AuthorizeData {
        AuthorizeData {
            client,
            code: self.code,
            expires_in: self.expires_in,
            scope: self.scope,
            redirect_uri: self.redirect_uri,
            state: self.state,
            created_at: self.created_at,
        }
    }
}

// =============================================================================
// Access Record
// =============================================================================

/// Persisted access token, keyed by `access_token` with a secondary index on
/// `refresh_token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRecord {
    /// Identifier of the owning client.
    pub client_id: String,

    /// Code of the originating authorization; `None` for client credentials.
    #[serde(rename = "authorizationCode", default)]
    pub authorization_code: Option<String>,

    /// Access token.
    #[serde(rename = "accessToken")]
    pub access_token: String,

    /// Refresh token; empty when none was issued.
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: String,

    /// Lifetime in seconds.
    #[serde(rename = "expiresIn")]
    pub expires_in: i32,

    /// Granted scope.
    pub scope: String,

    /// Redirect URI from the request.
    #[serde(rename = "redirectUri")]
    pub redirect_uri: String,

    /// Issuance timestamp.
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl AccessRecord {
    /// Builds the record for an access token.
    ///
    /// The authorization back-reference is kept as the code of the attached
    /// authorization, or `None` when the token was issued without one.
    #[must_use]
    pub fn from_access(data: &AccessData) -> Self {
        Self {
            client_id: data.client.id.clone(),
            authorization_code: normalize_code(data.authorization_code().map(str::to_owned)),
            access_token: data.access_token.clone(),
            refresh_token: data.refresh_token.clone(),
            expires_in: data.expires_in,
            scope: data.scope.clone(),
            redirect_uri: data.redirect_uri.clone(),
            created_at: data.created_at,
        }
    }

    /// Returns the authorization back-reference, treating an empty code as absent.
    #[must_use]
    pub fn authorization_code(&self) -> Option<&str> {
        self.authorization_code
            .as_deref()
            .filter(|code| !code.is_empty())
    }

    /// Returns `true` if the record carries a refresh token.
    #[must_use]
    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }

    /// Hydrates the record with its resolved client and authorization.
    #[must_use]
    pub fn into_access(self, client: Client, authorize: Option<AuthorizeData>) -> AccessData {
        AccessData {
            client,
            authorize_data: authorize.map(Box::new),
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_in: self.expires_in,
            scope: self.scope,
            redirect_uri: self.redirect_uri,
            created_at: self.created_at,
        }
    }
}

fn normalize_code(code: Option<String>) -> Option<String> {
    code.filter(|c| !c.is_empty())
}
