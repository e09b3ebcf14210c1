//! Configuration file handling.
//!
//! The configuration file is stored at `$FIN_HOME/config.json`. It selects the persistence backend
//! (a local JSON store or a REST server) and holds the few settings the store needs. Embedders that
//! do not want a file can build a `Config` directly with `Config::in_memory` or `Config::http`.

use crate::error::{ErrorType, IntoResult, Res};
use crate::{utils, Result};
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const APP_NAME: &str = "fin";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const PAGE_SIZE: usize = 10;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// The address of the REST backend when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// The well-known key under which the local store keeps the whole transaction list. When the store
/// is file-backed, the key is the file stem.
pub const LOCAL_STORE_KEY: &str = "transactions";

/// Which kind of backend to use, as chosen on the command line.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Keep transactions in a JSON file inside the home directory.
    #[default]
    Local,
    /// Talk to a REST server.
    Http,
}

serde_plain::derive_display_from_serialize!(BackendKind);
serde_plain::derive_fromstr_from_deserialize!(BackendKind);

/// The persistence backend and its settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backend {
    /// A REST server implementing `GET /transactions/{month}`, `POST /transaction` and
    /// `DELETE /transaction/{id}`.
    Http { base_url: Url },
    /// The local store. `path` is the JSON file holding all transactions; a relative path is
    /// resolved against the home directory. Without a path the store lives in memory only.
    Local {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
}

/// The `Config` object represents the configuration of the app. It is either loaded from
/// `$FIN_HOME/config.json` or built in memory.
#[derive(Debug, Clone)]
pub struct Config {
    root: Option<PathBuf>,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory, if needed, and writes an initial `config.json` into it.
    ///
    /// # Arguments
    /// - `dir` - The home directory, e.g. `$HOME/fin`
    /// - `kind` - Which backend to use
    /// - `base_url` - The server address for the `Http` backend. Defaults to `DEFAULT_BASE_URL`.
    ///
    /// # Errors
    /// - Returns an error if a configuration already exists or any file operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        kind: BackendKind,
        base_url: Option<Url>,
    ) -> Result<Self> {
        Self::create_inner(dir.into(), kind, base_url)
            .await
            .pub_result(ErrorType::Config)
    }

    async fn create_inner(dir: PathBuf, kind: BackendKind, base_url: Option<Url>) -> Res<Self> {
        utils::make_dir(&dir)
            .await
            .context("Unable to create the home directory")?;
        let root = utils::canonicalize(&dir).await?;
        let config_path = root.join(CONFIG_JSON);
        ensure!(
            !config_path.exists(),
            "A config file already exists at '{}'",
            config_path.display()
        );

        let backend = match kind {
            BackendKind::Local => Backend::Local {
                path: Some(PathBuf::from(format!("{LOCAL_STORE_KEY}.json"))),
            },
            BackendKind::Http => Backend::Http {
                base_url: match base_url {
                    Some(url) => url,
                    None => Url::parse(DEFAULT_BASE_URL).context("Invalid default base URL")?,
                },
            },
        };
        let config_file = ConfigFile {
            backend,
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root: Some(root),
            config_file,
        })
    }

    /// This will
    /// - validate that `home` exists and that the config file exists
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn load_inner(home: PathBuf) -> Res<Self> {
        let root = utils::canonicalize(&home)
            .await
            .context("The home directory is missing, run 'fin init' first")?;
        let config_path = root.join(CONFIG_JSON);
        ensure!(
            config_path.is_file(),
            "The config file is missing '{}'",
            config_path.display()
        );
        let config_file = ConfigFile::load(&config_path).await?;
        Ok(Self {
            root: Some(root),
            config_file,
        })
    }

    /// A configuration that keeps transactions in memory. Nothing is written to disk.
    pub fn in_memory() -> Self {
        Self {
            root: None,
            config_file: ConfigFile::default(),
        }
    }

    /// A configuration that talks to the REST server at `base_url`.
    pub fn http(base_url: Url) -> Self {
        Self {
            root: None,
            config_file: ConfigFile {
                backend: Backend::Http { base_url },
                ..ConfigFile::default()
            },
        }
    }

    /// Sets the number of transactions per page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.config_file.page_size = page_size;
        self
    }

    /// The home directory, if this configuration was loaded from one.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn config_path(&self) -> Option<PathBuf> {
        self.root.as_ref().map(|r| r.join(CONFIG_JSON))
    }

    /// The configured backend with any relative local path resolved against the home directory.
    pub fn backend(&self) -> Backend {
        match &self.config_file.backend {
            Backend::Local { path: Some(p) } if p.is_relative() => Backend::Local {
                path: Some(match &self.root {
                    Some(root) => root.join(p),
                    None => p.clone(),
                }),
            },
            other => other.clone(),
        }
    }

    pub fn page_size(&self) -> usize {
        self.config_file.page_size
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config_file.request_timeout_secs)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "fin",
///   "config_version": 1,
///   "backend": { "kind": "http", "base_url": "http://127.0.0.1:5000/" },
///   "page_size": 10,
///   "request_timeout_secs": 30
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "fin"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Where transactions are persisted
    backend: Backend,

    /// Number of transactions per page of history
    #[serde(default = "default_page_size")]
    page_size: usize,

    /// How long to wait for the REST server before giving up
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
}

fn default_page_size() -> usize {
    PAGE_SIZE
}

fn default_request_timeout_secs() -> u64 {
    REQUEST_TIMEOUT_SECS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backend: Backend::Local { path: None },
            page_size: PAGE_SIZE,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ConfigFile {
    /// Loads and validates a ConfigFile from `path`.
    async fn load(path: &Path) -> Res<Self> {
        let config: ConfigFile = utils::deserialize(path).await?;
        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{APP_NAME}', found '{}'",
            config.app_name
        );
        ensure!(
            config.config_version == CONFIG_VERSION,
            "Unsupported config_version {}, expected {CONFIG_VERSION}",
            config.config_version
        );
        ensure!(config.page_size > 0, "page_size must be greater than zero");
        Ok(config)
    }

    async fn save(&self, path: &Path) -> Res<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        utils::write(path, json).await
    }
}
