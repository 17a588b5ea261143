//! Serialized authorization requests.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

/// Snapshot of an outbound authorization code request, kept across the
/// redirect so the token exchange can be completed on return.
///
/// Unknown fields are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedAuthorizationRequest {
    #[serde(default)]
    pub redirect_uri: String,

    #[serde(default)]
    pub scopes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_verifier: Option<String>,

    /// Authority the request was issued against. When absent, recovery falls
    /// back to the authority cached for the correlation id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CachedAuthorizationRequest {
    pub fn new(redirect_uri: impl Into<String>, scopes: Vec<String>) -> Self {
        Self {
            redirect_uri: redirect_uri.into(),
            scopes,
            ..Self::default()
        }
    }

    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }

    pub fn with_code_verifier(mut self, verifier: impl Into<String>) -> Self {
        self.code_verifier = Some(verifier.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Whether the request names an authority of its own.
    pub fn has_authority(&self) -> bool {
        self.authority.as_deref().is_some_and(|a| !a.is_empty())
    }
}

/// The encode/decode primitive used to store request snapshots.
///
/// Supplied by the host's crypto layer; [`StandardBase64`] is the stock
/// implementation.
pub trait Base64Codec {
    fn base64_encode(&self, input: &str) -> String;

    /// Decode to a UTF-8 string, or describe why that was impossible.
    fn base64_decode(&self, input: &str) -> Result<String, String>;
}

/// RFC 4648 base64 with padding.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardBase64;

impl Base64Codec for StandardBase64 {
    fn base64_encode(&self, input: &str) -> String {
        STANDARD.encode(input.as_bytes())
    }

    fn base64_decode(&self, input: &str) -> Result<String, String> {
        let bytes = STANDARD
            .decode(input.trim())
            .map_err(|e| format!("invalid base64: {e}"))?;
        String::from_utf8(bytes).map_err(|e| format!("invalid UTF-8: {e}"))
    }
}
