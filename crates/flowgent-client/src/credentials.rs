//! Per-request n8n credentials
//!
//! Credentials travel with the request that supplied them: either in the
//! chat request body or in headers, parsed once at the API boundary and
//! passed down explicitly. There is no process-wide credential slot.

use serde::{Deserialize, Serialize};

/// User-supplied n8n instance credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// Base URL of the n8n instance, e.g. "https://acme.app.n8n.cloud"
    #[serde(rename = "instanceUrl", alias = "instance_url")]
    pub instance_url: String,
    /// Instance API key
    #[serde(rename = "apiKey", alias = "api_key")]
    pub api_key: String,
}

impl Credentials {
    /// Build credentials from optional parts
    ///
    /// Returns `Some` only when both the URL and the key are present and
    /// non-empty after trimming; a half-filled pair selects no transport.
    pub fn from_parts(instance_url: Option<&str>, api_key: Option<&str>) -> Option<Self> {
        let instance_url = instance_url.map(str::trim).filter(|s| !s.is_empty())?;
        let api_key = api_key.map(str::trim).filter(|s| !s.is_empty())?;
        Some(Self {
            instance_url: instance_url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Whether this pair is usable for direct API calls
    pub fn is_complete(&self) -> bool {
        !self.instance_url.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_requires_both() {
        assert!(Credentials::from_parts(Some("https://x"), Some("k")).is_some());
        assert!(Credentials::from_parts(Some("https://x"), None).is_none());
        assert!(Credentials::from_parts(None, Some("k")).is_none());
        assert!(Credentials::from_parts(Some("  "), Some("k")).is_none());
        assert!(Credentials::from_parts(Some("https://x"), Some("")).is_none());
    }

    #[test]
    fn test_from_parts_trims() {
        let creds = Credentials::from_parts(Some(" https://x "), Some(" k ")).unwrap();
        assert_eq!(creds.instance_url, "https://x");
        assert_eq!(creds.api_key, "k");
    }

    #[test]
    fn test_deserializes_both_casings() {
        let camel: Credentials =
            serde_json::from_str(r#"{"instanceUrl": "https://x", "apiKey": "k"}"#).unwrap();
        let snake: Credentials =
            serde_json::from_str(r#"{"instance_url": "https://x", "api_key": "k"}"#).unwrap();
        assert_eq!(camel, snake);
        assert!(camel.is_complete());
    }
}
