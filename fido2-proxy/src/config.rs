//! Proxy configuration.
//!
//! Values come from a JSON file (`url` and `accessToken`, the file named by
//! `FIDO2_PROXY_CONFIG`, `fido2-proxy.json` by default) and are overridden by the environment:
//!
//! - `FIDO2_UPSTREAM_URL`: base URL of the relying party
//! - `FIDO2_ACCESS_TOKEN`: token sent as `Authorization` to the relying party
//! - `HOST`: address to bind to (default: 127.0.0.1)
//! - `PORT`: port to listen on (default: 3000)
//!
//! A `.env` file is honored for all of them.

use std::{
    env, fmt, fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use url::Url;

/// Names the configuration file.
pub const CONFIG_PATH_VAR: &str = "FIDO2_PROXY_CONFIG";
/// Configuration file read when [`CONFIG_PATH_VAR`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "fido2-proxy.json";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;

/// Errors preventing the proxy from starting.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// The configuration file.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// The configuration file is not valid JSON of the expected shape.
    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        /// The configuration file.
        path: PathBuf,
        /// The underlying error.
        source: serde_json::Error,
    },
    /// A required value is set neither in the file nor in the environment.
    #[error("missing {0}, set it in the configuration file or the environment")]
    Missing(&'static str),
    /// The upstream URL does not parse.
    #[error("invalid upstream url {url:?}: {source}")]
    InvalidUrl {
        /// The offending value.
        url: String,
        /// The underlying error.
        source: url::ParseError,
    },
    /// The port is not a number between 0 and 65535.
    #[error("invalid port {0:?}")]
    InvalidPort(String),
}

/// The configuration file as written on disk.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    url: Option<String>,
    access_token: Option<String>,
}

impl ConfigFile {
    fn read(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
                tracing::debug!("no configuration file at {}", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_owned(),
                    source,
                })
            }
        };

        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }
}

/// Resolved proxy configuration.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the relying party, without the `/rp/api/versioned/fido2` prefix.
    pub url: Url,
    /// Access token for the relying party. Never leaves the server.
    pub access_token: String,
    /// Address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Config {
    /// Load the configuration from the file and the process environment, including `.env`.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let explicit = env::var_os(CONFIG_PATH_VAR).map(PathBuf::from);
        let required = explicit.is_some();
        let path = explicit.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let file = ConfigFile::read(&path, required)?;
        Self::resolve(file, |key| env::var(key).ok())
    }

    /// Load the configuration from the given file only, with defaults for the listener.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = ConfigFile::read(path.as_ref(), true)?;
        Self::resolve(file, |_| None)
    }

    fn resolve(
        file: ConfigFile,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let url = var("FIDO2_UPSTREAM_URL")
            .or(file.url)
            .ok_or(ConfigError::Missing("upstream url"))?;
        let url = Url::parse(&url).map_err(|source| ConfigError::InvalidUrl { url, source })?;

        let access_token = var("FIDO2_ACCESS_TOKEN")
            .or(file.access_token)
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing("access token"))?;

        let port = match var("PORT") {
            Some(port) => port.parse().map_err(|_| ConfigError::InvalidPort(port))?,
            None => DEFAULT_PORT,
        };

        Ok(Config {
            url,
            access_token,
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port,
        })
    }

    /// The socket address to bind to, e.g. `127.0.0.1:3000`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url.as_str())
            .field("access_token", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}
