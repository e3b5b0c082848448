//! Client and agent configuration

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::{AuthError, Result};

/// Scope requested when the caller does not override it
pub const DEFAULT_SCOPE: &str = "openid internal_login";

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

/// Identity-provider configuration shared by all flow operations
///
/// Immutable once constructed. Build with [`AuthConfig::builder`]:
///
/// ```
/// use oidc_agent_sdk::AuthConfig;
///
/// let config = AuthConfig::builder()
///     .base_url("https://id.example.com/t/acme")
///     .client_id("my-client")
///     .redirect_uri("https://app.example.com/callback")
///     .build();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
pub struct AuthConfig {
    /// Base URL of the identity provider (no trailing slash required)
    #[builder(setter(into))]
    pub base_url: String,

    /// OAuth client identifier
    #[builder(setter(into))]
    pub client_id: String,

    /// Redirect URI registered for the client
    #[builder(setter(into))]
    pub redirect_uri: String,

    /// Client secret; absent for public clients
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub client_secret: Option<String>,

    /// Default scope string used by the native flow initiation
    #[serde(default = "default_scope")]
    #[builder(default = DEFAULT_SCOPE.to_string(), setter(into))]
    pub scope: String,
}

impl AuthConfig {
    /// Check the non-empty invariants (`base_url`, `client_id`, `redirect_uri`)
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] naming the first empty field.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(AuthError::validation("base_url must not be empty"));
        }
        if self.client_id.trim().is_empty() {
            return Err(AuthError::validation("client_id must not be empty"));
        }
        if self.redirect_uri.trim().is_empty() {
            return Err(AuthError::validation("redirect_uri must not be empty"));
        }
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    /// Authorization endpoint (GET redirect target)
    #[must_use]
    pub fn authorize_endpoint(&self) -> String {
        self.endpoint("/oauth2/authorize")
    }

    /// Authentication-flow endpoint (native multi-step negotiation)
    #[must_use]
    pub fn authn_endpoint(&self) -> String {
        self.endpoint("/oauth2/authn")
    }

    /// Token endpoint (form-encoded POST)
    #[must_use]
    pub fn token_endpoint(&self) -> String {
        self.endpoint("/oauth2/token")
    }
}

/// Service-account style credential for a non-human (AI agent) actor
///
/// Immutable. Both fields must be non-empty.
#[derive(Clone, Serialize, Deserialize)]
pub struct AgentIdentity {
    /// Agent identifier
    pub agent_id: String,
    /// Agent secret
    pub agent_secret: String,
}

impl AgentIdentity {
    /// Create a new agent identity
    pub fn new(agent_id: impl Into<String>, agent_secret: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            agent_secret: agent_secret.into(),
        }
    }

    /// Check the non-empty invariants
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] naming the empty field.
    pub fn validate(&self) -> Result<()> {
        if self.agent_id.trim().is_empty() {
            return Err(AuthError::validation("agent_id must not be empty"));
        }
        if self.agent_secret.trim().is_empty() {
            return Err(AuthError::validation("agent_secret must not be empty"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for AgentIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentIdentity")
            .field("agent_id", &self.agent_id)
            .field("agent_secret", &"[REDACTED]")
            .finish()
    }
}
