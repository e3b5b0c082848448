//! Core type definitions: configuration, tokens, and flow payloads

mod config;
mod flow;
mod token;

pub use config::{AgentIdentity, AuthConfig, AuthConfigBuilder, DEFAULT_SCOPE};
pub use flow::{Authenticator, FlowAuthData, FlowResponse, FlowStatus, NextStep};
pub use token::OAuthToken;

pub(crate) use token::TokenResponse;
