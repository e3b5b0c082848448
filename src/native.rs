//! Native multi-step authentication flow driver
//!
//! Drives a provider-orchestrated login negotiation: the first
//! [`NativeAuthClient::authenticate`] call starts the flow, each following
//! call submits one authenticator's response, and once the provider reports
//! `SUCCESS_COMPLETED` the flow is exchanged for tokens with
//! [`NativeAuthClient::get_token`].
//!
//! The driver never picks an authenticator on its own. Callers inspect
//! [`NativeAuthClient::next_step`], choose an authenticator (typically by
//! display name), and loop until the status is terminal or nothing suitable
//! is offered.
//!
//! # Example
//!
//! ```no_run
//! use oidc_agent_sdk::{AuthConfig, FlowStatus, NativeAuthClient};
//! use serde_json::json;
//!
//! # async fn example() -> oidc_agent_sdk::Result<()> {
//! let config = AuthConfig::builder()
//!     .base_url("https://id.example.com/t/acme")
//!     .client_id("client-id")
//!     .redirect_uri("https://app.example.com/cb")
//!     .build();
//!
//! let mut client = NativeAuthClient::new(config)?;
//! client.authenticate(None, None).await?;
//!
//! if client.flow_status() == Some(&FlowStatus::Incomplete) {
//!     let step = client.next_step().expect("incomplete flow has a next step");
//!     let basic = step
//!         .authenticators
//!         .iter()
//!         .find(|auth| auth.authenticator == "Username & Password")
//!         .expect("no username/password authenticator offered");
//!     let id = basic.authenticator_id.clone();
//!     client
//!         .authenticate(
//!             Some(&id),
//!             Some(json!({"username": "user", "password": "pass"})),
//!         )
//!         .await?;
//! }
//!
//! if client.flow_status() == Some(&FlowStatus::SuccessCompleted) {
//!     let token = client.get_token().await?;
//!     println!("access token: {}", token.authorization_header());
//! }
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde_json::{Value, json};

use crate::error::{AuthError, Result};
use crate::transport::{HttpRequest, HttpTransport, Transport};
use crate::types::{AuthConfig, FlowResponse, FlowStatus, NextStep, OAuthToken, TokenResponse};

/// Client driving one native authentication attempt
///
/// Holds the state of a single flow; start a new client for each attempt.
/// `authenticate` and `get_token` take `&mut self`, so two submissions can
/// never race against the same flow identifier.
pub struct NativeAuthClient {
    config: AuthConfig,
    transport: Arc<dyn Transport>,
    flow_id: Option<String>,
    flow_status: Option<FlowStatus>,
    next_step: Option<NextStep>,
    auth_code: Option<String>,
}

impl NativeAuthClient {
    /// Create a client with the default HTTP transport
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the config is invalid.
    pub fn new(config: AuthConfig) -> Result<Self> {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    /// Create a client over an existing transport (shared session)
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the config is invalid.
    pub fn with_transport(config: AuthConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            flow_id: None,
            flow_status: None,
            next_step: None,
            auth_code: None,
        })
    }

    /// Configuration this client was built with
    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Flow identifier, once the provider has assigned one
    #[must_use]
    pub fn flow_id(&self) -> Option<&str> {
        self.flow_id.as_deref()
    }

    /// Current flow status; `None` before initiation
    #[must_use]
    pub fn flow_status(&self) -> Option<&FlowStatus> {
        self.flow_status.as_ref()
    }

    /// Most recent next-step descriptor, while the flow is incomplete
    #[must_use]
    pub fn next_step(&self) -> Option<&NextStep> {
        self.next_step.as_ref()
    }

    /// Run one step of the authentication flow
    ///
    /// With `authenticator_id = None` this initiates the flow; it must be
    /// the first call. With `Some(id)` it submits that authenticator's
    /// `params` (an object of credential key/value pairs) against the stored
    /// flow identifier; the stored status must be `INCOMPLETE`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] when called out of order (step before
    ///   initiation, initiation twice, step after a terminal status)
    /// - [`AuthError::Authentication`] when the provider rejects the step or
    ///   reports a different flow identifier
    /// - [`AuthError::Network`] on transport failure or malformed response
    pub async fn authenticate(
        &mut self,
        authenticator_id: Option<&str>,
        params: Option<Value>,
    ) -> Result<FlowResponse> {
        let body = match authenticator_id {
            None => {
                if self.flow_status.is_some() {
                    return Err(AuthError::validation(
                        "flow already initiated; pass an authenticator_id to continue it",
                    ));
                }
                json!({
                    "client_id": self.config.client_id,
                    "response_type": "code",
                    "redirect_uri": self.config.redirect_uri,
                    "scope": self.config.scope,
                })
            }
            Some(id) => {
                let flow_id = self.flow_id.as_deref().ok_or_else(|| {
                    AuthError::validation("flow not initiated; call authenticate() first")
                })?;
                match self.flow_status {
                    Some(FlowStatus::Incomplete) => {}
                    _ => {
                        return Err(AuthError::validation(
                            "flow is not accepting authenticator submissions",
                        ));
                    }
                }
                json!({
                    "flowId": flow_id,
                    "authenticatorId": id,
                    "params": params.unwrap_or_else(|| json!({})),
                })
            }
        };

        let request = HttpRequest::post(self.config.authn_endpoint()).json(body);
        let response = self.transport.request(request).await?;

        if !response.is_success() {
            let (code, description) = response.oauth_error();
            tracing::warn!(status = response.status, ?code, "flow step rejected");
            return Err(AuthError::authentication(code, description));
        }

        let flow: FlowResponse = response.json()?;

        // The flow identifier is stable for the whole attempt; a provider
        // answering with a different one is not talking about our flow.
        if let Some(existing) = &self.flow_id {
            if *existing != flow.flow_id {
                return Err(AuthError::authentication(
                    None,
                    format!(
                        "provider switched flow identifier from {existing} to {}",
                        flow.flow_id
                    ),
                ));
            }
        }

        tracing::debug!(
            flow_id = %flow.flow_id,
            status = %flow.flow_status,
            "flow step completed"
        );

        self.flow_id = Some(flow.flow_id.clone());
        self.flow_status = Some(flow.flow_status.clone());
        self.next_step = flow.next_step.clone();
        if let Some(code) = flow.auth_data.as_ref().and_then(|data| data.code.clone()) {
            self.auth_code = Some(code);
        }

        Ok(flow)
    }

    /// Exchange the completed flow for tokens
    ///
    /// Valid only while the stored status is `SUCCESS_COMPLETED`. The grant
    /// sent to the token endpoint is the authorization code the provider
    /// attached to the final step, or the flow identifier itself when no
    /// explicit code was issued.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Token`] when the flow is not successfully completed or
    ///   the provider rejects the exchange
    /// - [`AuthError::Network`] on transport failure or malformed response
    pub async fn get_token(&mut self) -> Result<OAuthToken> {
        match self.flow_status {
            Some(FlowStatus::SuccessCompleted) => {}
            _ => {
                return Err(AuthError::token(
                    None,
                    "flow has not completed successfully; tokens are not available",
                ));
            }
        }
        let flow_id = self
            .flow_id
            .clone()
            .ok_or_else(|| AuthError::token(None, "flow has no identifier"))?;

        let code = self.auth_code.clone().unwrap_or_else(|| flow_id.clone());
        let mut fields = vec![
            ("grant_type".to_string(), "authorization_code".to_string()),
            ("code".to_string(), code),
            ("client_id".to_string(), self.config.client_id.clone()),
            (
                "redirect_uri".to_string(),
                self.config.redirect_uri.clone(),
            ),
        ];
        if let Some(secret) = &self.config.client_secret {
            fields.push(("client_secret".to_string(), secret.clone()));
        }

        let request = HttpRequest::post(self.config.token_endpoint()).form(fields);
        let response = self.transport.request(request).await?;

        if !response.is_success() {
            let (code, description) = response.oauth_error();
            tracing::warn!(status = response.status, ?code, flow_id = %flow_id, "token exchange rejected");
            return Err(AuthError::token(code, description));
        }

        tracing::debug!(flow_id = %flow_id, "flow exchanged for tokens");
        response.json::<TokenResponse>()?.into_token()
    }

    /// Release the transport
    ///
    /// # Errors
    ///
    /// Returns an error if transport cleanup fails.
    pub async fn close(&self) -> Result<()> {
        self.transport.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpBody, HttpResponse};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted transport: pops pre-canned responses, records requests.
    struct MockTransport {
        responses: Mutex<VecDeque<HttpResponse>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl MockTransport {
        fn new(responses: Vec<HttpResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn request(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| AuthError::network("no scripted response left"))
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    fn ok_json(body: Value) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: vec![],
            body: body.to_string(),
        }
    }

    fn error_json(status: u16, body: Value) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![],
            body: body.to_string(),
        }
    }

    fn config() -> AuthConfig {
        AuthConfig::builder()
            .base_url("https://id.example.com/t/acme")
            .client_id("client-1")
            .redirect_uri("https://app.example.com/cb")
            .build()
    }

    fn client(transport: Arc<MockTransport>) -> NativeAuthClient {
        NativeAuthClient::with_transport(config(), transport).unwrap()
    }

    fn form_fields(request: &HttpRequest) -> Vec<(String, String)> {
        match &request.body {
            HttpBody::Form(fields) => fields.clone(),
            other => panic!("expected form body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_step_before_initiation_is_validation_error() {
        let transport = MockTransport::new(vec![]);
        let mut client = client(transport.clone());

        let err = client
            .authenticate(Some("a1"), Some(json!({"username": "u"})))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_initiation_sends_client_identity() {
        let transport = MockTransport::new(vec![ok_json(json!({
            "flowId": "f1",
            "flowStatus": "INCOMPLETE",
            "nextStep": {"authenticators": []}
        }))]);
        let mut client = client(transport.clone());
        client.authenticate(None, None).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://id.example.com/t/acme/oauth2/authn");
        match &requests[0].body {
            HttpBody::Json(body) => {
                assert_eq!(body["client_id"], "client-1");
                assert_eq!(body["response_type"], "code");
                assert_eq!(body["redirect_uri"], "https://app.example.com/cb");
                assert_eq!(body["scope"], "openid internal_login");
            }
            other => panic!("expected json body, got {other:?}"),
        }
        assert_eq!(client.flow_id(), Some("f1"));
        assert_eq!(client.flow_status(), Some(&FlowStatus::Incomplete));
    }

    #[tokio::test]
    async fn test_incomplete_flow_rejects_get_token_then_accepts_step() {
        let transport = MockTransport::new(vec![
            ok_json(json!({
                "flowId": "f1",
                "flowStatus": "INCOMPLETE",
                "nextStep": {"authenticators": [{
                    "authenticatorId": "a1",
                    "authenticator": "Username & Password"
                }]}
            })),
            ok_json(json!({"flowId": "f1", "flowStatus": "SUCCESS_COMPLETED"})),
        ]);
        let mut client = client(transport.clone());
        client.authenticate(None, None).await.unwrap();

        let err = client.get_token().await.unwrap_err();
        assert!(matches!(err, AuthError::Token { .. }));
        // Only the initiation hit the wire
        assert_eq!(transport.requests().len(), 1);

        client
            .authenticate(Some("a1"), Some(json!({"username": "u", "password": "p"})))
            .await
            .unwrap();
        assert_eq!(client.flow_status(), Some(&FlowStatus::SuccessCompleted));

        match &transport.requests()[1].body {
            HttpBody::Json(body) => {
                assert_eq!(body["flowId"], "f1");
                assert_eq!(body["authenticatorId"], "a1");
                assert_eq!(body["params"]["username"], "u");
            }
            other => panic!("expected json body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_single_factor_success_allows_immediate_get_token() {
        let transport = MockTransport::new(vec![
            ok_json(json!({"flowId": "f1", "flowStatus": "SUCCESS_COMPLETED"})),
            ok_json(json!({"access_token": "at-1", "token_type": "Bearer"})),
        ]);
        let mut client = client(transport.clone());
        client.authenticate(None, None).await.unwrap();

        let token = client.get_token().await.unwrap();
        assert_eq!(token.access_token, "at-1");

        // No authData code in the flow, so the grant is the flow id itself
        let fields = form_fields(&transport.requests()[1]);
        assert!(fields.contains(&("grant_type".to_string(), "authorization_code".to_string())));
        assert!(fields.contains(&("code".to_string(), "f1".to_string())));
    }

    #[tokio::test]
    async fn test_auth_data_code_preferred_over_flow_id() {
        let transport = MockTransport::new(vec![
            ok_json(json!({
                "flowId": "f1",
                "flowStatus": "SUCCESS_COMPLETED",
                "authData": {"code": "flow-code-9"}
            })),
            ok_json(json!({"access_token": "at-1"})),
        ]);
        let mut client = client(transport.clone());
        client.authenticate(None, None).await.unwrap();
        client.get_token().await.unwrap();

        let fields = form_fields(&transport.requests()[1]);
        assert!(fields.contains(&("code".to_string(), "flow-code-9".to_string())));
    }

    #[tokio::test]
    async fn test_client_secret_included_when_configured() {
        let transport = MockTransport::new(vec![
            ok_json(json!({"flowId": "f1", "flowStatus": "SUCCESS_COMPLETED"})),
            ok_json(json!({"access_token": "at-1"})),
        ]);
        let config = AuthConfig::builder()
            .base_url("https://id.example.com/t/acme")
            .client_id("client-1")
            .client_secret("shhh")
            .redirect_uri("https://app.example.com/cb")
            .build();
        let mut client = NativeAuthClient::with_transport(config, transport.clone()).unwrap();
        client.authenticate(None, None).await.unwrap();
        client.get_token().await.unwrap();

        let fields = form_fields(&transport.requests()[1]);
        assert!(fields.contains(&("client_secret".to_string(), "shhh".to_string())));
    }

    #[tokio::test]
    async fn test_double_initiation_rejected() {
        let transport = MockTransport::new(vec![ok_json(
            json!({"flowId": "f1", "flowStatus": "INCOMPLETE"}),
        )]);
        let mut client = client(transport.clone());
        client.authenticate(None, None).await.unwrap();

        let err = client.authenticate(None, None).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_step_after_terminal_failure_rejected() {
        let transport = MockTransport::new(vec![ok_json(
            json!({"flowId": "f1", "flowStatus": "FAIL_INCOMPLETE"}),
        )]);
        let mut client = client(transport.clone());
        client.authenticate(None, None).await.unwrap();
        assert_eq!(
            client.flow_status(),
            Some(&FlowStatus::Other("FAIL_INCOMPLETE".to_string()))
        );

        let err = client
            .authenticate(Some("a1"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        // Terminal failure also blocks the exchange
        let err = client.get_token().await.unwrap_err();
        assert!(matches!(err, AuthError::Token { .. }));
    }

    #[tokio::test]
    async fn test_provider_rejection_maps_to_authentication_error() {
        let transport = MockTransport::new(vec![error_json(
            400,
            json!({"error": "invalid_request", "error_description": "unknown client"}),
        )]);
        let mut client = client(transport);

        let err = client.authenticate(None, None).await.unwrap_err();
        match err {
            AuthError::Authentication { code, description } => {
                assert_eq!(code.as_deref(), Some("invalid_request"));
                assert_eq!(description, "unknown client");
            }
            other => panic!("expected authentication error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_flow_id_switch_is_rejected() {
        let transport = MockTransport::new(vec![
            ok_json(json!({"flowId": "f1", "flowStatus": "INCOMPLETE"})),
            ok_json(json!({"flowId": "f2", "flowStatus": "SUCCESS_COMPLETED"})),
        ]);
        let mut client = client(transport);
        client.authenticate(None, None).await.unwrap();

        let err = client.authenticate(Some("a1"), None).await.unwrap_err();
        assert!(matches!(err, AuthError::Authentication { .. }));
        // Stored state keeps the original flow identifier
        assert_eq!(client.flow_id(), Some("f1"));
    }

    #[tokio::test]
    async fn test_token_endpoint_rejection_maps_to_token_error() {
        let transport = MockTransport::new(vec![
            ok_json(json!({"flowId": "f1", "flowStatus": "SUCCESS_COMPLETED"})),
            error_json(400, json!({"error": "invalid_grant"})),
        ]);
        let mut client = client(transport);
        client.authenticate(None, None).await.unwrap();

        let err = client.get_token().await.unwrap_err();
        assert_eq!(err.provider_code(), Some("invalid_grant"));
        assert!(matches!(err, AuthError::Token { .. }));
    }

    #[tokio::test]
    async fn test_malformed_flow_body_is_network_error() {
        let transport = MockTransport::new(vec![HttpResponse {
            status: 200,
            headers: vec![],
            body: "<html>proxy error</html>".to_string(),
        }]);
        let mut client = client(transport);

        let err = client.authenticate(None, None).await.unwrap_err();
        assert!(matches!(err, AuthError::Network(_)));
        // A malformed response must not half-start a flow
        assert!(client.flow_id().is_none());
        assert!(client.flow_status().is_none());
    }
}
