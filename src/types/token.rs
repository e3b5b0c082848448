//! OAuth token value type and token-endpoint wire payloads

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Immutable OAuth token response
///
/// Created only as the output of a successful token exchange; never mutated
/// after construction. Safe to clone and share across concurrent operations.
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthToken {
    /// Access token for API calls (always non-empty)
    pub access_token: String,

    /// OIDC ID token, when granted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Refresh token, when granted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token lifetime in seconds; absent when the provider did not report one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,

    /// Token type (usually "Bearer")
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Scope string actually granted, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl OAuthToken {
    /// Get the Authorization header value
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl std::fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthToken")
            .field("access_token", &"[REDACTED]")
            .field("id_token", &self.id_token.as_ref().map(|_| "[REDACTED]"))
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Raw token-endpoint response body
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Convert into the public token type, enforcing the non-empty
    /// `access_token` invariant.
    pub(crate) fn into_token(self) -> Result<OAuthToken> {
        let access_token = self
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AuthError::token(None, "token response missing access_token"))?;

        Ok(OAuthToken {
            access_token,
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            expires_in: self.expires_in,
            token_type: self.token_type.unwrap_or_else(default_token_type),
            scope: self.scope,
        })
    }
}
