//! Agent authentication and On-Behalf-Of token exchange
//!
//! An AI agent authenticates with its own service-account style credential
//! ([`AgentIdentity`]) and can then act in two capacities:
//!
//! 1. **As itself** — [`AgentAuthManager::get_agent_token`] issues the
//!    agent's own access token via a client-credentials grant.
//! 2. **On behalf of a user** — the caller sends the user through the
//!    authorization URL from [`AgentAuthManager::get_authorization_url`],
//!    receives an authorization code on the redirect, and redeems it with
//!    [`AgentAuthManager::get_obo_token`] together with the agent's own
//!    token. The resulting token represents the user, delegated to the
//!    agent.
//!
//! The `state` returned alongside the authorization URL is the CSRF
//! protection for the redirect; compare it to the redirect's `state` with
//! [`verify_state`](crate::authorize::verify_state) before trusting the
//! code.
//!
//! # Example
//!
//! ```no_run
//! use oidc_agent_sdk::{AgentAuthManager, AgentIdentity, AuthConfig};
//!
//! # async fn example() -> oidc_agent_sdk::Result<()> {
//! let config = AuthConfig::builder()
//!     .base_url("https://id.example.com/t/acme")
//!     .client_id("client-id")
//!     .client_secret("client-secret")
//!     .redirect_uri("https://app.example.com/cb")
//!     .build();
//! let agent = AgentIdentity::new("agent-id", "agent-secret");
//!
//! let manager = AgentAuthManager::new(config, agent)?;
//! let agent_token = manager.get_agent_token(&["openid", "profile"]).await?;
//!
//! let request = manager.get_authorization_url(&["openid", "profile", "email"], None)?;
//! // ... user authorizes at request.url, redirect returns code + state ...
//! # let code = "code-from-redirect";
//! let user_token = manager
//!     .get_obo_token(code, &["openid", "profile", "email"], &agent_token)
//!     .await?;
//! manager.close().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::authorize::{AuthorizationRequest, build_authorization_url, generate_state, join_scopes};
use crate::error::{AuthError, Result};
use crate::transport::{HttpRequest, HttpTransport, Transport};
use crate::types::{AgentIdentity, AuthConfig, OAuthToken, TokenResponse};

/// RFC 8693 token type URN for the agent's actor token
const ACTOR_TOKEN_TYPE: &str = "urn:ietf:params:oauth:token-type:access_token";

/// Manager for agent token issuance and the On-Behalf-Of exchange
///
/// Stateless beyond its configuration: agent and OBO issuance may run
/// concurrently on one manager.
pub struct AgentAuthManager {
    config: AuthConfig,
    agent: AgentIdentity,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for AgentAuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentAuthManager")
            .field("config", &self.config)
            .field("agent", &self.agent)
            .finish_non_exhaustive()
    }
}

impl AgentAuthManager {
    /// Create a manager with the default HTTP transport
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the config or agent identity is
    /// invalid.
    pub fn new(config: AuthConfig, agent: AgentIdentity) -> Result<Self> {
        Self::with_transport(config, agent, Arc::new(HttpTransport::new()))
    }

    /// Create a manager over an existing transport (shared session)
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the config or agent identity is
    /// invalid.
    pub fn with_transport(
        config: AuthConfig,
        agent: AgentIdentity,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        config.validate()?;
        agent.validate()?;
        Ok(Self {
            config,
            agent,
            transport,
        })
    }

    /// Configuration this manager was built with
    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Issue the agent's own access token
    ///
    /// Client-credentials grant with the agent's id/secret as the client
    /// credential pair.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] if `scopes` is empty (before any I/O)
    /// - [`AuthError::Token`] if the provider rejects the grant
    /// - [`AuthError::Network`] on transport failure
    pub async fn get_agent_token(&self, scopes: &[&str]) -> Result<OAuthToken> {
        if scopes.is_empty() {
            return Err(AuthError::validation("scopes must not be empty"));
        }

        let fields = vec![
            ("grant_type".to_string(), "client_credentials".to_string()),
            ("client_id".to_string(), self.agent.agent_id.clone()),
            ("client_secret".to_string(), self.agent.agent_secret.clone()),
            ("scope".to_string(), join_scopes(scopes)),
        ];

        tracing::debug!(agent_id = %self.agent.agent_id, "requesting agent token");
        self.exchange(fields).await
    }

    /// Build a user authorization URL with a fresh state nonce
    ///
    /// Keep the returned state; it must match the `state` query parameter of
    /// the eventual redirect before the authorization code is redeemed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if `scopes` is empty or the config
    /// lacks a base URL.
    pub fn get_authorization_url(
        &self,
        scopes: &[&str],
        resource: Option<&str>,
    ) -> Result<AuthorizationRequest> {
        let state = generate_state();
        let url = build_authorization_url(&self.config, scopes, &state, resource)?;
        Ok(AuthorizationRequest { url, state })
    }

    /// Redeem a user's authorization code for an On-Behalf-Of token
    ///
    /// The agent's own access token rides along as the RFC 8693
    /// `actor_token`, establishing which agent the delegation is for.
    /// Authorization codes are single-use: a second redemption surfaces the
    /// provider's rejection as [`AuthError::Token`]; it is never retried.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] if `auth_code` is empty or `agent_token`
    ///   carries no access token (before any I/O)
    /// - [`AuthError::Token`] if the provider rejects the exchange (expired
    ///   or reused code, scope mismatch, redirect URI mismatch)
    /// - [`AuthError::Network`] on transport failure
    pub async fn get_obo_token(
        &self,
        auth_code: &str,
        scopes: &[&str],
        agent_token: &OAuthToken,
    ) -> Result<OAuthToken> {
        if auth_code.trim().is_empty() {
            return Err(AuthError::validation("auth_code must not be empty"));
        }
        if agent_token.access_token.trim().is_empty() {
            return Err(AuthError::validation(
                "agent_token carries no access token",
            ));
        }

        let mut fields = vec![
            ("grant_type".to_string(), "authorization_code".to_string()),
            ("code".to_string(), auth_code.to_string()),
            (
                "redirect_uri".to_string(),
                self.config.redirect_uri.clone(),
            ),
            ("client_id".to_string(), self.config.client_id.clone()),
            ("actor_token".to_string(), agent_token.access_token.clone()),
            ("actor_token_type".to_string(), ACTOR_TOKEN_TYPE.to_string()),
        ];
        if !scopes.is_empty() {
            fields.push(("scope".to_string(), join_scopes(scopes)));
        }
        if let Some(secret) = &self.config.client_secret {
            fields.push(("client_secret".to_string(), secret.clone()));
        }

        tracing::debug!(agent_id = %self.agent.agent_id, "redeeming authorization code on behalf of user");
        self.exchange(fields).await
    }

    /// Release the transport
    ///
    /// # Errors
    ///
    /// Returns an error if transport cleanup fails.
    pub async fn close(&self) -> Result<()> {
        self.transport.close().await
    }

    async fn exchange(&self, fields: Vec<(String, String)>) -> Result<OAuthToken> {
        let request = HttpRequest::post(self.config.token_endpoint()).form(fields);
        let response = self.transport.request(request).await?;

        if !response.is_success() {
            let (code, description) = response.oauth_error();
            tracing::warn!(status = response.status, ?code, "token exchange rejected");
            return Err(AuthError::token(code, description));
        }

        response.json::<TokenResponse>()?.into_token()
    }
}
