//! Decoded access-token identity
//!
//! The serving layer verifies the HMAC on the `token` query parameter; the
//! game only ever sees the decoded payload fields as plain data.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

/// Identity fields carried in the token payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    #[serde(rename = "sub")]
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub rank: String,
    /// Initiation date as given by the issuer (display-only)
    #[serde(default)]
    pub initiated: String,
    #[serde(default)]
    pub grand_officer: bool,
}

impl PlayerIdentity {
    /// Whether the fields the story gate needs are present.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Decode the payload half of a `base64url(payload).base64url(sig)` token.
    /// The signature is not checked here; that already happened upstream.
    pub fn from_token(token: &str) -> Option<Self> {
        let payload = token.split('.').next()?;
        let bytes = URL_SAFE_NO_PAD.decode(payload.as_bytes()).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(json: &str) -> String {
        URL_SAFE_NO_PAD.encode(json.as_bytes())
    }

    #[test]
    fn decodes_payload_half() {
        let payload = encode(
            r#"{"sub":"u-42","name":"Hiram","rank":"Master Mason","initiated":"1999-06-24","grand_officer":true}"#,
        );
        let token = format!("{payload}.c2lnbmF0dXJl");
        let id = PlayerIdentity::from_token(&token).unwrap();
        assert_eq!(id.user_id, "u-42");
        assert_eq!(id.name, "Hiram");
        assert!(id.grand_officer);
        assert!(id.is_complete());
    }

    #[test]
    fn missing_optional_fields_default() {
        let payload = encode(r#"{"sub":"u-1","name":"Jabez"}"#);
        let id = PlayerIdentity::from_token(&payload).unwrap();
        assert_eq!(id.rank, "");
        assert!(!id.grand_officer);
    }

    #[test]
    fn garbage_token_is_none() {
        assert!(PlayerIdentity::from_token("").is_none());
        assert!(PlayerIdentity::from_token("!!!.sig").is_none());
        let not_json = URL_SAFE_NO_PAD.encode(b"hello");
        assert!(PlayerIdentity::from_token(&not_json).is_none());
    }

    #[test]
    fn blank_name_is_incomplete() {
        let payload = encode(r#"{"sub":"u-1","name":"  "}"#);
        let id = PlayerIdentity::from_token(&payload).unwrap();
        assert!(!id.is_complete());
    }
}
