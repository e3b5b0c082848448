//! # OIDC Agent SDK for Rust
//!
//! Client-side authentication SDK for an OAuth2/OIDC identity provider.
//! Async/await, strong typing, tokio-based.
//!
//! Two authentication modes are supported:
//!
//! - **Native authentication** ([`NativeAuthClient`]): a multi-step flow
//!   where the client negotiates authenticator challenges (password, OTP,
//!   ...) directly with the provider until the flow completes, then
//!   exchanges the completed flow for tokens.
//! - **Agent authentication** ([`AgentAuthManager`]): an AI agent obtains
//!   its own token with a client-credentials grant and can redeem a user's
//!   authorization code together with its own token for an On-Behalf-Of
//!   (OBO) token representing that user.
//!
//! ## Quick Start
//!
//! Native login:
//!
//! ```no_run
//! use oidc_agent_sdk::{AuthConfig, FlowStatus, NativeAuthClient};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AuthConfig::builder()
//!         .base_url("https://id.example.com/t/acme")
//!         .client_id("client-id")
//!         .redirect_uri("https://app.example.com/cb")
//!         .build();
//!
//!     let mut client = NativeAuthClient::new(config)?;
//!     client.authenticate(None, None).await?;
//!
//!     if client.flow_status() == Some(&FlowStatus::Incomplete) {
//!         let id = client
//!             .next_step()
//!             .and_then(|step| step.authenticators.first())
//!             .map(|auth| auth.authenticator_id.clone())
//!             .ok_or("no authenticator offered")?;
//!         client
//!             .authenticate(Some(&id), Some(json!({"username": "u", "password": "p"})))
//!             .await?;
//!     }
//!
//!     let token = client.get_token().await?;
//!     println!("logged in, expires in {:?}s", token.expires_in);
//!     client.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! Agent + On-Behalf-Of:
//!
//! ```no_run
//! use oidc_agent_sdk::{AgentAuthManager, AgentIdentity, AuthConfig, verify_state};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuthConfig::builder()
//!     .base_url("https://id.example.com/t/acme")
//!     .client_id("client-id")
//!     .client_secret("client-secret")
//!     .redirect_uri("https://app.example.com/cb")
//!     .build();
//!
//! let manager = AgentAuthManager::new(config, AgentIdentity::new("agent-id", "agent-secret"))?;
//! let agent_token = manager.get_agent_token(&["openid", "profile"]).await?;
//!
//! let request = manager.get_authorization_url(&["openid", "profile", "email"], None)?;
//! println!("open {} in a browser", request.url);
//! // The redirect comes back with ?code=...&state=...
//! # let (code, returned_state) = ("code", request.state.clone());
//! verify_state(&request.state, &returned_state)?;
//!
//! let user_token = manager
//!     .get_obo_token(&code, &["openid", "profile", "email"], &agent_token)
//!     .await?;
//! println!("acting on behalf of the user: {}", user_token.authorization_header());
//! manager.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`types`]: configuration, token, and flow payload types
//! - [`authorize`]: authorization-URL construction and state nonces
//! - [`native`]: native multi-step flow driver
//! - [`agent`]: agent token issuance and OBO exchange
//! - [`transport`]: HTTP seam ([`Transport`] trait + reqwest default)
//! - [`error`]: error taxonomy
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, AuthError>`](Result) with four
//! variants: `Validation` (bad input, raised before any network call),
//! `Authentication` (provider rejected a flow step), `Token` (token endpoint
//! rejected an exchange), and `Network` (transport failure or malformed
//! response). Provider error codes are preserved and available via
//! [`AuthError::provider_code`]. Nothing is retried internally; retry policy
//! belongs to the caller.
//!
//! ## Logging
//!
//! This crate uses [`tracing`](https://crates.io/crates/tracing) for
//! structured logging. Events are always emitted but are zero-cost when no
//! subscriber is attached. Attach one in your application:
//!
//! ```rust,ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! ## Concurrency
//!
//! Each flow or token operation issues at most one outstanding request and
//! suspends only on its response; there are no background tasks. A
//! [`NativeAuthClient`] drives exactly one flow and takes `&mut self`, so
//! interleaved submissions on one flow identifier cannot compile. An
//! [`AgentAuthManager`] is stateless beyond its configuration; its
//! operations may run concurrently. Transports are shared behind an `Arc`
//! and released exactly once via `close()`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod agent;
pub mod authorize;
pub mod error;
pub mod native;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use agent::AgentAuthManager;
pub use authorize::{AuthorizationRequest, build_authorization_url, generate_state, verify_state};
pub use error::{AuthError, Result};
pub use native::NativeAuthClient;
pub use transport::{HttpBody, HttpRequest, HttpResponse, HttpTransport, Transport};
pub use types::{
    AgentIdentity, AuthConfig, Authenticator, DEFAULT_SCOPE, FlowAuthData, FlowResponse,
    FlowStatus, NextStep, OAuthToken,
};

/// Version of the SDK
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
