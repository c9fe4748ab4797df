use std::path::{Path, PathBuf};

use gtm_model::{Connector, ContainerRef, RemoteError};
use tracing::{debug, info};

use crate::api::{Api, ClientConfig};
use crate::client::GtmClient;
use crate::credentials::ServiceAccountKey;

/// Opens [`GtmClient`] sessions from a service-account key file.
#[derive(Debug, Clone)]
pub struct GtmConnector {
    key_path: PathBuf,
    config: ClientConfig,
}

impl GtmConnector {
    pub fn new(key_path: impl Into<PathBuf>, config: ClientConfig) -> Self {
        Self {
            key_path: key_path.into(),
            config,
        }
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    fn open(&self) -> Result<Api, RemoteError> {
        let key = ServiceAccountKey::load(&self.key_path)?;
        debug!(client_email = %key.client_email, "loaded service account");
        let mut api = Api::new(&self.config, key)?;
        api.authenticate()?;
        Ok(api)
    }
}

impl Connector for GtmConnector {
    type Service = GtmClient;

    /// Scans every accessible account for a container whose numeric or
    /// public (`GTM-XXXX`) ID equals `identifier`.
    fn resolve_container(&self, identifier: &str) -> Result<ContainerRef, RemoteError> {
        let mut api = self.open()?;
        for account in api.list_all("accounts", "account")? {
            let Some(account_id) = account.account_id.filter(|id| !id.is_empty()) else {
                continue;
            };
            let containers =
                api.list_all(&format!("accounts/{account_id}/containers"), "container")?;
            let matched = containers.into_iter().find_map(|container| {
                let is_match = container.container_id.as_deref() == Some(identifier)
                    || container.public_id.as_deref() == Some(identifier);
                is_match.then_some(container.container_id).flatten()
            });
            if let Some(container_id) = matched {
                info!(identifier, %account_id, %container_id, "resolved container");
                return Ok(ContainerRef::new(account_id, container_id));
            }
        }
        Err(RemoteError::ContainerNotFound {
            identifier: identifier.to_string(),
        })
    }

    fn connect(&self, container: &ContainerRef) -> Result<GtmClient, RemoteError> {
        let api = self.open()?;
        info!(container = %container.path(), "authenticated");
        Ok(GtmClient::new(api, container.clone()))
    }
}
