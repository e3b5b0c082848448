//! Native authentication flow wire payloads
//!
//! The provider's flow responses are only partially specified: the flow id,
//! status, and authenticator list have a fixed shape, while the rest varies
//! by provider version and authenticator type. The types here model the
//! required subset as fields and keep everything else in flattened
//! `extra` bags so flow driving stays statically checkable without
//! rejecting provider additions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status of a native authentication flow as reported by the provider
///
/// Statuses other than the two the SDK acts on are preserved verbatim in
/// [`FlowStatus::Other`]; all of them are terminal failures from the
/// client's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FlowStatus {
    /// Further authenticator steps are required
    Incomplete,
    /// The flow finished successfully; tokens may be requested
    SuccessCompleted,
    /// Any other provider-reported status, kept verbatim
    Other(String),
}

impl FlowStatus {
    /// Provider wire representation of this status
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Incomplete => "INCOMPLETE",
            Self::SuccessCompleted => "SUCCESS_COMPLETED",
            Self::Other(status) => status,
        }
    }

    /// Whether the flow can accept no further authenticator submissions
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Incomplete)
    }
}

impl From<String> for FlowStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "INCOMPLETE" => Self::Incomplete,
            "SUCCESS_COMPLETED" => Self::SuccessCompleted,
            _ => Self::Other(status),
        }
    }
}

impl From<FlowStatus> for String {
    fn from(status: FlowStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One response from the authentication-flow endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowResponse {
    /// Flow identifier correlating all steps of this attempt
    pub flow_id: String,

    /// Status the provider assigned to the flow after this step
    pub flow_status: FlowStatus,

    /// Next-step descriptor; present while the flow is incomplete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step: Option<NextStep>,

    /// Authorization grant data; some providers attach it to the final step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_data: Option<FlowAuthData>,

    /// Provider-specific additions
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Grant data attached to a completed flow response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowAuthData {
    /// Authorization code to redeem at the token endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Provider-specific additions
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Descriptor of the authenticators available for the next flow step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextStep {
    /// Step type label, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_type: Option<String>,

    /// Authenticators the caller may choose from
    #[serde(default)]
    pub authenticators: Vec<Authenticator>,

    /// Provider-specific additions
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One verification method offered during a flow step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authenticator {
    /// Identifier submitted back when selecting this authenticator
    pub authenticator_id: String,

    /// Display name (e.g. "Username & Password")
    pub authenticator: String,

    /// Provider-specific additions (idp, metadata, required params, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
