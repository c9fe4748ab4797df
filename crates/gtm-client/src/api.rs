//! Authenticated request plumbing shared by the client and the connector.

use std::time::Duration;

use gtm_model::RemoteError;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::auth::{Authenticator, TAG_MANAGER_SCOPE};
use crate::credentials::ServiceAccountKey;
use crate::retry::RetryPolicy;
use crate::types::{ApiResource, Page, api_error};

/// Production endpoint of the Tag Manager API v2.
pub const DEFAULT_BASE_URL: &str = "https://tagmanager.googleapis.com/tagmanager/v2";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for talking to the Tag Manager API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub scopes: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            scopes: vec![TAG_MANAGER_SCOPE.to_string()],
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[derive(Debug)]
pub(crate) struct Api {
    http: Client,
    base_url: String,
    auth: Authenticator,
    retry: RetryPolicy,
}

impl Api {
    pub(crate) fn new(config: &ClientConfig, key: ServiceAccountKey) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| RemoteError::Transport(format!("cannot build HTTP client: {err}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth: Authenticator::new(key, config.scopes.clone()),
            retry: config.retry.clone(),
        })
    }

    /// Exchanges credentials up front so bad keys fail before any API call.
    pub(crate) fn authenticate(&mut self) -> Result<(), RemoteError> {
        self.auth.access_token(&self.http).map(drop)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Fetches every page of a collection.
    pub(crate) fn list_all(
        &mut self,
        path: &str,
        key: &str,
    ) -> Result<Vec<ApiResource>, RemoteError> {
        let url = self.url(path);
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let token = page_token.take();
            let body = self.send("list", |http| {
                let request = http.get(&url);
                match &token {
                    Some(token) => request.query(&[("pageToken", token.as_str())]),
                    None => request,
                }
            })?;
            let page = Page::from_value(parse(&body)?, key)?;
            debug!(path, count = page.items.len(), "listed page");
            items.extend(page.items);
            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => return Ok(items),
            }
        }
    }

    pub(crate) fn create(
        &mut self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<ApiResource, RemoteError> {
        let url = self.url(path);
        let response = self.send("create", |http| http.post(&url).json(body))?;
        serde_json::from_value(parse(&response)?)
            .map_err(|err| RemoteError::Decode(err.to_string()))
    }

    pub(crate) fn delete(&mut self, path: &str) -> Result<(), RemoteError> {
        let url = self.url(path);
        self.send("delete", |http| http.delete(&url)).map(drop)
    }

    fn send(
        &mut self,
        operation: &str,
        build: impl Fn(&Client) -> RequestBuilder,
    ) -> Result<String, RemoteError> {
        let Self {
            http, auth, retry, ..
        } = self;
        retry.run(operation, || {
            let token = auth.access_token(http)?;
            let response = build(http)
                .bearer_auth(token)
                .send()
                .map_err(|err| RemoteError::Transport(err.to_string()))?;
            read(response)
        })
    }
}

fn read(response: Response) -> Result<String, RemoteError> {
    let status = response.status();
    let body = response
        .text()
        .map_err(|err| RemoteError::Transport(err.to_string()))?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(api_error(status.as_u16(), &body))
    }
}

fn parse(body: &str) -> Result<Value, RemoteError> {
    if body.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(body).map_err(|err| RemoteError::Decode(err.to_string()))
}
