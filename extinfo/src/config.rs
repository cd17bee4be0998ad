use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::consts::{DEFAULT_MAX_REPORT_LEN, DEFAULT_TRACING_FILTER, ENV_PREFIX};

/// The smallest report ceiling we accept.
const MIN_REPORT_LEN: usize = 256;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Info panel configuration
    #[serde(default)]
    pub info: InfoConfig,
    /// Tracing configuration
    #[serde(default)]
    pub tracing: TracingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct InfoConfig {
    /// Include the channel security salt and password in channel reports
    #[serde(default)]
    pub developer_fields: bool,
    /// Maximum size of a report in bytes, including the C string terminator
    #[serde(default = "default_max_report_len")]
    pub max_report_len: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TracingConfig {
    /// Enable tracing
    #[serde(default = "default_tracing_enabled")]
    pub enabled: bool,
    /// Filter directives used when `RUST_LOG` is not set
    #[serde(default = "default_tracing_filter")]
    pub filter: String,
}

impl Default for InfoConfig {
    fn default() -> Self {
        Self {
            developer_fields: false,
            max_report_len: default_max_report_len(),
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: default_tracing_enabled(),
            filter: default_tracing_filter(),
        }
    }
}

impl Config {
    /// Loads the configuration from the defaults, the TOML file at `path` if it exists, and
    /// `EXTINFO_` prefixed environment variables, in that order of precedence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be parsed, and [`Error::InvalidConfig`] if a
    /// value is out of range.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }

        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extracts and validates a configuration from an already assembled figment.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn extract(figment: Figment) -> Result<Self, Error> {
        let config: Self = figment
            .extract()
            .map_err(|err| Error::Config(Box::new(err)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.info.max_report_len < MIN_REPORT_LEN {
            return Err(Error::InvalidConfig(format!(
                "info.max_report_len must be at least {MIN_REPORT_LEN}, got {}",
                self.info.max_report_len
            )));
        }

        Ok(())
    }
}

#[must_use]
pub const fn default_max_report_len() -> usize {
    DEFAULT_MAX_REPORT_LEN
}

#[must_use]
pub const fn default_tracing_enabled() -> bool {
    true
}

#[must_use]
pub fn default_tracing_filter() -> String {
    DEFAULT_TRACING_FILTER.to_string()
}
