//! OAuth2 JWT-bearer grant for service accounts.

use std::time::{Duration, Instant};

use chrono::Utc;
use gtm_model::RemoteError;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::credentials::ServiceAccountKey;

/// Scope needed to create and delete container entities.
pub const TAG_MANAGER_SCOPE: &str = "https://www.googleapis.com/auth/tagmanager.edit.containers";

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    refresh_at: Instant,
}

/// Exchanges signed assertions for access tokens and caches the result.
#[derive(Debug, Clone)]
pub struct Authenticator {
    key: ServiceAccountKey,
    scopes: Vec<String>,
    token: Option<AccessToken>,
}

impl Authenticator {
    pub fn new(key: ServiceAccountKey, scopes: Vec<String>) -> Self {
        Self {
            key,
            scopes,
            token: None,
        }
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Returns a valid access token, fetching a new one when needed.
    pub fn access_token(&mut self, http: &Client) -> Result<String, RemoteError> {
        if let Some(token) = &self.token
            && Instant::now() < token.refresh_at
        {
            return Ok(token.value.clone());
        }
        let token = self.fetch(http)?;
        let value = token.value.clone();
        self.token = Some(token);
        Ok(value)
    }

    /// Builds the signed RS256 assertion.
    pub fn assertion(&self) -> Result<String, RemoteError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: self.scopes.join(" "),
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|err| RemoteError::Authentication(format!("invalid private key: {err}")))?;
        jsonwebtoken::encode(&header, &claims, &key)
            .map_err(|err| RemoteError::Authentication(format!("cannot sign assertion: {err}")))
    }

    fn fetch(&self, http: &Client) -> Result<AccessToken, RemoteError> {
        debug!(client_email = %self.key.client_email, "requesting access token");
        let assertion = self.assertion()?;
        let response = http
            .post(&self.key.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .map_err(|err| RemoteError::Authentication(format!("token request failed: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| {
                RemoteError::Authentication(format!("token response unreadable: {err}"))
            })?;

        if !status.is_success() {
            let detail = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(TokenErrorResponse {
                    error,
                    error_description: Some(description),
                }) => format!("{error}: {description}"),
                Ok(TokenErrorResponse { error, .. }) => error,
                Err(_) => format!("HTTP {}", status.as_u16()),
            };
            return Err(RemoteError::Authentication(detail));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|err| {
            RemoteError::Authentication(format!("unexpected token response: {err}"))
        })?;
        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(3600));
        debug!(expires_in_secs = lifetime.as_secs(), "access token acquired");
        Ok(AccessToken {
            value: token.access_token,
            refresh_at: Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN),
        })
    }
}
