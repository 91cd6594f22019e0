use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{de, Deserialize, Deserializer};
use std::time::Duration;
use url::Url;

fn deserialize_path<'de, D>(de: D) -> Result<Utf8PathBuf, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = de::Deserialize::deserialize(de)?;
    Ok(Utf8PathBuf::from(s))
}

fn deserialize_url<'de, D>(de: D) -> Result<Url, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = de::Deserialize::deserialize(de)?;
    parse_base_url(&s).map_err(de::Error::custom)
}

/// Parses the API base url, making sure it ends with a slash so that
/// [`Url::join`] appends endpoint paths instead of replacing the last segment.
pub fn parse_base_url(s: &str) -> Result<Url, url::ParseError> {
    if s.ends_with('/') {
        Url::parse(s)
    } else {
        Url::parse(&format!("{}/", s))
    }
}

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub api: Api,
    #[serde(default)]
    pub export: Export,
}

impl Config {
    /// Reads the configuration from `path`, the `CONFIG` environment variable or `config.yaml`.
    ///
    /// A missing `config.yaml` is tolerated when `API_URL` is set, in which case defaults are used.
    /// `API_URL` always overrides the configured base url.
    pub fn read(path: Option<&Utf8Path>) -> anyhow::Result<Config> {
        let explicit = path
            .map(Utf8Path::to_path_buf)
            .or_else(|| std::env::var("CONFIG").ok().map(Utf8PathBuf::from));
        let api_url = std::env::var("API_URL").ok();

        let mut config = match explicit {
            Some(path) => {
                let config = std::fs::read_to_string(&path)
                    .with_context(|| format!("Reading config file {}", path))?;
                Self::from_yaml(&config)?
            }
            None => match std::fs::read_to_string(DEFAULT_CONFIG_PATH) {
                Ok(config) => Self::from_yaml(&config)?,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound && api_url.is_some() => {
                    Config {
                        api: Api::with_base_url(parse_base_url(api_url.as_deref().unwrap_or_default())?),
                        export: Export::default(),
                    }
                }
                Err(e) => return Err(e).context("Reading config file"),
            },
        };

        if let Some(api_url) = api_url {
            config.api.base_url = parse_base_url(&api_url).context("Parsing API_URL")?;
        }

        Ok(config)
    }

    pub fn from_yaml(config: &str) -> anyhow::Result<Config> {
        serde_yaml::from_str(config).context("Parsing config file")
    }
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_rpm() -> u32 {
    600
}

fn default_max_burst() -> u32 {
    31
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    #[serde(deserialize_with = "deserialize_url")]
    pub base_url: Url,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Client-side request budget, requests per minute.
    #[serde(default = "default_rpm")]
    pub rpm: u32,
    #[serde(default = "default_max_burst")]
    pub max_burst: u32,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Api {
    pub fn with_base_url(base_url: Url) -> Self {
        Api {
            base_url,
            user_agent: default_user_agent(),
            rpm: default_rpm(),
            max_burst: default_max_burst(),
            timeout: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Export {
    #[serde(deserialize_with = "deserialize_path")]
    pub dir: Utf8PathBuf,
}

impl Default for Export {
    fn default() -> Self {
        Export {
            dir: Utf8PathBuf::from("."),
        }
    }
}
