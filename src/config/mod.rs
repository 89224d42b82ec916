//! Locating, loading and initializing the Quire config file

pub mod schema;

pub use schema::{BufferConfig, Config, GeneralConfig, MailConfig, SiteConfig, WorkersConfig};

use crate::error::{QuireError, QuireResult};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

const HEADER: &str = "# Quire configuration\n# Every buffer TTL must exceed the interval of the worker draining it.\n\n";

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(PathBuf),

    /// No file at the configured path
    Defaults,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Defaults => write!(f, "built-in defaults"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub origin: ConfigOrigin,
}

/// Result of [`ConfigFile::init`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Written,
    AlreadyExists,
}

/// The config file Quire reads, wherever it lives
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    /// `explicit` (from `--config` or `QUIRE_CONFIG`) if given, otherwise the
    /// per-user location
    pub fn locate(explicit: Option<PathBuf>) -> Self {
        let path = explicit.unwrap_or_else(Self::default_path);
        Self { path }
    }

    /// `<config dir>/quire/config.toml`, relative to the working directory
    /// when the platform has no config dir
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quire")
            .join("config.toml")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file; a missing file yields the defaults
    pub async fn load(&self) -> QuireResult<LoadedConfig> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.path.display());
                return Ok(LoadedConfig {
                    config: Config::default(),
                    origin: ConfigOrigin::Defaults,
                });
            }
            Err(e) => {
                return Err(QuireError::io(
                    format!("reading config from {}", self.path.display()),
                    e,
                ))
            }
        };

        Ok(LoadedConfig {
            config: parse(&self.path, &content)?,
            origin: ConfigOrigin::File(self.path.clone()),
        })
    }

    /// Write the default configuration unless a file is already there and
    /// `force` is off
    pub async fn init(&self, force: bool) -> QuireResult<InitOutcome> {
        if !force && fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(InitOutcome::AlreadyExists);
        }
        self.save(&Config::default()).await?;
        Ok(InitOutcome::Written)
    }

    pub async fn save(&self, config: &Config) -> QuireResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| QuireError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let content = format!("{}{}", HEADER, toml::to_string_pretty(config)?);
        fs::write(&self.path, content).await.map_err(|e| {
            QuireError::io(format!("writing config to {}", self.path.display()), e)
        })?;

        info!("Configuration saved to {}", self.path.display());
        Ok(())
    }
}

/// Parse `content`, reporting the line of the first error
fn parse(path: &Path, content: &str) -> QuireResult<Config> {
    toml::from_str(content).map_err(|e| {
        let reason = match e.span() {
            Some(span) => {
                let line = content[..span.start.min(content.len())].matches('\n').count() + 1;
                format!("line {}: {}", line, e.message())
            }
            None => e.message().to_string(),
        };
        QuireError::ConfigInvalid {
            path: path.to_path_buf(),
            reason,
        }
    })
}
