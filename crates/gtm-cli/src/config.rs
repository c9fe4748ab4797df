//! Optional TOML configuration file.
//!
//! ```toml
//! [gtm]
//! container_id = "GTM-ABC1234"
//! workspace_name = "Automation Workspace"
//! service_account = "config/service_account.json"
//!
//! [retry]
//! max_retries = 2
//! initial_delay = 1.0
//! ```
//!
//! Values here sit below command-line flags and environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use gtm_client::{ClientConfig, RetryPolicy};
use gtm_core::DEFAULT_WORKSPACE_NAME;
use serde::Deserialize;

/// Read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "gtm-deploy.toml";

/// Key file used when no flag, variable or config entry names one.
pub const DEFAULT_SERVICE_ACCOUNT: &str = "config/service_account.json";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub gtm: GtmSection,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GtmSection {
    pub account_id: Option<String>,
    pub container_id: Option<String>,
    pub workspace_name: Option<String>,
    pub service_account: Option<PathBuf>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn parse(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("parse configuration")
    }

    /// Loads `explicit`, or the default file when it exists.
    ///
    /// A missing explicit file is an error; a missing default file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Path::new(DEFAULT_CONFIG_FILE),
            None => return Ok(Self::default()),
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("in {}", path.display()))
    }
}

/// Command-line and environment values; `None` means not given.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub account_id: Option<String>,
    pub container_id: Option<String>,
    pub workspace_name: Option<String>,
    pub service_account: Option<PathBuf>,
    pub retries: Option<u32>,
}

/// Effective deploy settings after layering.
#[derive(Debug, Clone)]
pub struct DeploySettings {
    pub account_id: Option<String>,
    pub container_id: Option<String>,
    pub workspace_name: String,
    pub service_account: PathBuf,
    pub client: ClientConfig,
}

impl DeploySettings {
    /// Layers overrides over the file over built-in defaults.
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Self {
        let FileConfig { gtm, retry } = file;
        let mut client = ClientConfig::default().with_retry(retry);
        if let Some(base_url) = gtm.base_url {
            client = client.with_base_url(base_url);
        }
        if let Some(secs) = gtm.timeout_secs {
            client.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = overrides.retries {
            client.retry = client.retry.with_max_retries(retries);
        }
        Self {
            account_id: overrides.account_id.or(gtm.account_id),
            container_id: overrides.container_id.or(gtm.container_id),
            workspace_name: overrides
                .workspace_name
                .or(gtm.workspace_name)
                .unwrap_or_else(|| DEFAULT_WORKSPACE_NAME.to_string()),
            service_account: overrides
                .service_account
                .or(gtm.service_account)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SERVICE_ACCOUNT)),
            client,
        }
    }
}
