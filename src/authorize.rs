//! Authorization URL construction and redirect state handling
//!
//! The authorization-code redirect is the one step of the agent flow the SDK
//! cannot drive itself: a human opens the URL, authenticates, and comes back
//! with a code. The `state` nonce generated here is the CSRF protection for
//! that round trip — callers must hold on to it and check the redirect's
//! `state` with [`verify_state`] before redeeming the code.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use url::Url;

use crate::error::{AuthError, Result};
use crate::types::AuthConfig;

/// Authorization URL plus the state nonce embedded in it
///
/// Consumed exactly once: the caller sends the user to `url`, keeps `state`,
/// and correlates the eventual redirect against it.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Fully rendered authorization endpoint URL
    pub url: String,
    /// State nonce included in the URL
    pub state: String,
}

/// Generate a CSRF state nonce
///
/// 32 bytes from the OS randomness source, base64url encoded (43 chars,
/// 256 bits of entropy). Panics if the OS randomness source is unavailable;
/// this must never degrade to a predictable generator.
#[must_use]
pub fn generate_state() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Build the identity provider's authorization endpoint URL
///
/// Renders `response_type=code`, `client_id`, `redirect_uri`, `scope`
/// (space-joined, order-preserving dedup of `scopes`), `state`, and the
/// RFC 8707 `resource` indicator when supplied. All values are
/// percent-encoded.
///
/// # Errors
///
/// Returns [`AuthError::Validation`] if `scopes` is empty, the config has no
/// base URL, or the derived endpoint is not a valid URL.
pub fn build_authorization_url(
    config: &AuthConfig,
    scopes: &[&str],
    state: &str,
    resource: Option<&str>,
) -> Result<String> {
    if config.base_url.trim().is_empty() {
        return Err(AuthError::validation("base_url must not be empty"));
    }
    if scopes.is_empty() {
        return Err(AuthError::validation("scopes must not be empty"));
    }

    let mut url = Url::parse(&config.authorize_endpoint())
        .map_err(|err| AuthError::validation(format!("invalid authorization endpoint: {err}")))?;

    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("scope", &join_scopes(scopes))
        .append_pair("state", state);

    if let Some(resource) = resource {
        url.query_pairs_mut().append_pair("resource", resource);
    }

    Ok(url.to_string())
}

/// Check that the state echoed back by the redirect matches the generated one
///
/// # Errors
///
/// Returns [`AuthError::Authentication`] on mismatch; the authorization code
/// must not be trusted in that case.
pub fn verify_state(expected: &str, returned: &str) -> Result<()> {
    if expected == returned {
        Ok(())
    } else {
        Err(AuthError::authentication(
            None,
            "state returned by the redirect does not match the generated state",
        ))
    }
}

/// Space-join scopes, dropping duplicates while preserving first-seen order
pub(crate) fn join_scopes(scopes: &[&str]) -> String {
    let mut seen: Vec<&str> = Vec::with_capacity(scopes.len());
    for &scope in scopes {
        if !seen.contains(&scope) {
            seen.push(scope);
        }
    }
    seen.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config() -> AuthConfig {
        AuthConfig::builder()
            .base_url("https://id.example.com/t/acme")
            .client_id("client-1")
            .redirect_uri("https://app.example.com/cb?x=1")
            .build()
    }

    #[test]
    fn test_generate_state_is_url_safe() {
        let state = generate_state();
        assert_eq!(state.len(), 43);
        assert!(
            state
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_generate_state_distinct() {
        let mut states: Vec<String> = (0..1000).map(|_| generate_state()).collect();
        states.sort();
        states.dedup();
        assert_eq!(states.len(), 1000);
    }

    #[test]
    fn test_authorization_url_round_trip() {
        let state = generate_state();
        let rendered =
            build_authorization_url(&config(), &["openid", "profile"], &state, None).unwrap();

        let url = Url::parse(&rendered).unwrap();
        assert_eq!(url.host_str(), Some("id.example.com"));
        assert_eq!(url.path(), "/t/acme/oauth2/authorize");

        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["client_id"], "client-1");
        assert_eq!(params["redirect_uri"], "https://app.example.com/cb?x=1");
        assert_eq!(params["scope"], "openid profile");
        assert_eq!(params["state"], state);
        assert!(!params.contains_key("resource"));
    }

    #[test]
    fn test_authorization_url_with_resource() {
        let rendered = build_authorization_url(
            &config(),
            &["openid"],
            "st",
            Some("https://api.example.com"),
        )
        .unwrap();
        let url = Url::parse(&rendered).unwrap();
        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(params["resource"], "https://api.example.com");
    }

    #[test]
    fn test_empty_scopes_rejected() {
        let err = build_authorization_url(&config(), &[], "st", None).unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[test]
    fn test_missing_base_url_rejected() {
        let config = AuthConfig::builder()
            .base_url("")
            .client_id("client-1")
            .redirect_uri("https://app.example.com/cb")
            .build();
        let err = build_authorization_url(&config, &["openid"], "st", None).unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[test]
    fn test_join_scopes_dedups_in_order() {
        assert_eq!(
            join_scopes(&["openid", "profile", "openid", "email"]),
            "openid profile email"
        );
    }

    #[test]
    fn test_verify_state() {
        assert!(verify_state("abc", "abc").is_ok());
        let err = verify_state("abc", "abd").unwrap_err();
        assert!(matches!(err, AuthError::Authentication { .. }));
    }
}
