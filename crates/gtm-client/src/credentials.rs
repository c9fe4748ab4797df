//! Service-account key files.

use std::path::Path;

use gtm_model::RemoteError;
use serde::Deserialize;

/// Token endpoint used when the key file does not name one.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The fields of a service-account JSON key that the client needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_json(raw: &str) -> Result<Self, RemoteError> {
        serde_json::from_str(raw).map_err(|err| {
            RemoteError::Authentication(format!("invalid service account key: {err}"))
        })
    }

    pub fn load(path: &Path) -> Result<Self, RemoteError> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            RemoteError::Authentication(format!(
                "cannot read service account file {}: {err}",
                path.display()
            ))
        })?;
        Self::from_json(&raw)
    }
}

// Keeps the private key out of logs.
impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_uri_defaults() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email": "a@b.iam.gserviceaccount.com", "private_key": "pem"}"#,
        )
        .unwrap();
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
        assert_eq!(key.private_key_id, None);
        assert!(!format!("{key:?}").contains("pem"));
    }

    #[test]
    fn test_missing_file_is_an_authentication_error() {
        let err = ServiceAccountKey::load(Path::new("/nonexistent/key.json")).unwrap_err();
        assert!(err.to_string().starts_with("Authentication failed: cannot read"));
    }

    #[test]
    fn test_missing_field_is_an_authentication_error() {
        let err = ServiceAccountKey::from_json(r#"{"client_email": "x"}"#).unwrap_err();
        assert!(matches!(err, RemoteError::Authentication(_)));
    }
}
