use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::errors::ConfigError;

/// Configuration file picked up from the working directory when no explicit
/// file is given
pub const DEFAULT_CONFIG_FILE: &str = "onem2m.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CseSettings {
    /// Scheme, host and port of the CSE, e.g. `http://localhost:8080`
    #[serde(default = "default_host")]
    pub host: String,
    /// Resource name of the CSEBase
    #[serde(default = "default_rn")]
    pub rn: String,
    #[serde(default = "default_originator")]
    pub originator: String,
    /// Upper tester endpoint; commands are unavailable when unset
    #[serde(default)]
    pub upper_tester: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NotificationSettings {
    #[serde(default = "default_notification_url_base")]
    pub url_base: String,
    #[serde(default = "default_notification_port")]
    pub port: u16,
}

impl NotificationSettings {
    pub fn url(&self) -> String {
        format!("{}:{}", self.url_base, self.port)
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ProxySettings {
    #[serde(default)]
    pub http: Option<String>,
    #[serde(default)]
    pub https: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputSettings {
    #[serde(default = "default_true")]
    pub verbose: bool,
    /// Print the status of successful requests in non-verbose mode
    #[serde(default)]
    pub with_results: bool,
    #[serde(default = "default_true")]
    pub long_names: bool,
    #[serde(default = "default_theme")]
    pub theme: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub cse: CseSettings,
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub proxy: ProxySettings,
    pub output: OutputSettings,
}

impl Settings {
    /// Load the settings from defaults, `onem2m.toml` if present, and the
    /// `ONEM2M_` environment variables.
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Like [`Settings::new`] but reading an explicit configuration file,
    /// which must exist.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
        };

        let config = Config::builder()
            .set_default("cse.host", default_host())?
            .set_default("cse.rn", default_rn())?
            .set_default("cse.originator", default_originator())?
            .set_default("notifications.url_base", default_notification_url_base())?
            .set_default("notifications.port", i64::from(default_notification_port()))?
            .set_default("output.verbose", true)?
            .set_default("output.with_results", false)?
            .set_default("output.long_names", true)?
            .set_default("output.theme", default_theme())?
            .add_source(file)
            .add_source(
                Environment::with_prefix("ONEM2M")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        tracing::debug!("Loaded settings for CSE at {}", settings.cse.host);
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, url) in [
            ("cse.host", Some(&self.cse.host)),
            ("cse.upper_tester", self.cse.upper_tester.as_ref()),
            ("notifications.url_base", Some(&self.notifications.url_base)),
        ] {
            if let Some(url) = url {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: format!("'{}' is not an http(s) URL", url),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cse: CseSettings {
                host: default_host(),
                rn: default_rn(),
                originator: default_originator(),
                upper_tester: None,
            },
            notifications: NotificationSettings {
                url_base: default_notification_url_base(),
                port: default_notification_port(),
            },
            proxy: ProxySettings::default(),
            output: OutputSettings {
                verbose: true,
                with_results: false,
                long_names: true,
                theme: default_theme(),
            },
        }
    }
}

fn default_host() -> String {
    "http://localhost:8080".to_string()
}

fn default_rn() -> String {
    "cse-in".to_string()
}

fn default_originator() -> String {
    "CAdmin".to_string()
}

fn default_notification_url_base() -> String {
    "http://localhost".to_string()
}

fn default_notification_port() -> u16 {
    9999
}

fn default_theme() -> String {
    "zenburn".to_string()
}

fn default_true() -> bool {
    true
}
