//! Configuration management for alertroute
//!
//! This module defines the main `Config` struct and its sub-structs. Settings
//! are layered with `figment`: built-in defaults, then an optional
//! `alertroute.toml`, then `ALERTROUTE_`-prefixed environment variables (use
//! `__` to reach nested keys), and finally command-line arguments.
//!
//! The unprefixed variables `SPLUNK_HEC_URL`, `SPLUNK_TOKEN`, `EMAIL_TO`,
//! `EMAIL_FROM` and `SMTP_SERVER` are also honoured.

use crate::cli::Cli;
use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize,
};
use std::{fmt, path::PathBuf};

/// The configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "alertroute.toml";

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level for the application.
    #[serde(deserialize_with = "string_from_scalar")]
    pub log_level: String,
    /// Also write logs to this file when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// Configuration for the HTTP listener.
    pub server: ServerConfig,
    /// Locations of the routing table and email template.
    pub routing: RoutingConfig,
    /// Configuration for email delivery.
    pub email: EmailConfig,
    /// Configuration for the Splunk HTTP Event Collector.
    pub splunk: SplunkConfig,
    /// Configuration for the Prometheus metrics endpoint.
    pub metrics: MetricsConfig,
}

/// Configuration for the HTTP listener.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// The socket address to bind, e.g. "0.0.0.0:8000".
    #[serde(deserialize_with = "string_from_scalar")]
    pub listen_addr: String,
}

/// Locations of the routing resources.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RoutingConfig {
    /// The reference table, as a JSON array or a `.csv` file.
    pub reference_table_path: PathBuf,
    /// The email body template. Re-read on every email alert.
    pub template_path: PathBuf,
}

/// Configuration for email delivery.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EmailConfig {
    /// Hostname of the outbound SMTP relay.
    #[serde(deserialize_with = "string_from_scalar")]
    pub smtp_server: String,
    pub smtp_port: u16,
    /// Upgrade the relay connection with STARTTLS.
    #[serde(default)]
    pub starttls: bool,
    /// Sender address.
    #[serde(deserialize_with = "string_from_scalar")]
    pub from: String,
    /// Recipient address.
    #[serde(deserialize_with = "string_from_scalar")]
    pub to: String,
    pub timeout_seconds: u64,
}

/// Configuration for the Splunk HTTP Event Collector.
#[derive(Deserialize, Serialize, Clone, PartialEq)]
pub struct SplunkConfig {
    /// The collector endpoint URL.
    #[serde(deserialize_with = "string_from_scalar")]
    pub hec_url: String,
    /// The HEC token, sent as `Authorization: Splunk <token>`.
    #[serde(deserialize_with = "string_from_scalar")]
    pub token: String,
    pub timeout_seconds: u64,
}

impl std::fmt::Debug for SplunkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplunkConfig")
            .field("hec_url", &self.hec_url)
            .field("token", &"<redacted>")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Configuration for the Prometheus metrics endpoint.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct MetricsConfig {
    /// Serve `/metrics` on the main listener.
    #[serde(default)]
    pub enabled: bool,
}

impl Config {
    /// Loads the application configuration by layering all sources.
    ///
    /// # Arguments
    /// * `cli` - Parsed command-line arguments. `cli.config` names the TOML
    ///   file; when it is absent, `alertroute.toml` is used if it exists.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = match &cli.config {
            Some(path) => {
                if !path.exists() {
                    bail!("Configuration file not found at {:?}", path);
                }
                path.clone()
            }
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(legacy_env())
            // Allow overriding with environment variables, e.g., ALERTROUTE_SERVER__LISTEN_ADDR
            .merge(Env::prefixed("ALERTROUTE_").split("__"))
            .merge(cli)
            .extract()?;
        Ok(config)
    }
}

/// The unprefixed environment variables and the keys they set.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("SPLUNK_HEC_URL", "splunk.hec_url"),
    ("SPLUNK_TOKEN", "splunk.token"),
    ("EMAIL_TO", "email.to"),
    ("EMAIL_FROM", "email.from"),
    ("SMTP_SERVER", "email.smtp_server"),
];

/// Reads the unprefixed variables verbatim, without figment's value parsing.
fn legacy_env() -> Figment {
    LEGACY_ENV
        .iter()
        .fold(Figment::new(), |figment, (var, key)| match Env::var(var) {
            Some(value) => figment.merge(Serialized::default(key, value)),
            None => figment,
        })
}

/// Deserializes a string setting from any scalar.
///
/// Figment parses environment values, so `ALERTROUTE_SPLUNK__TOKEN=12345`
/// arrives as an integer.
fn string_from_scalar<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct ScalarVisitor;

    impl Visitor<'_> for ScalarVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<String, E> {
            Ok(v)
        }

        fn visit_char<E: de::Error>(self, v: char) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i128<E: de::Error>(self, v: i128) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(ScalarVisitor)
}

// Provide a default implementation for tests and easy setup.
impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
            server: ServerConfig {
                listen_addr: "0.0.0.0:8000".to_string(),
            },
            routing: RoutingConfig {
                reference_table_path: PathBuf::from("reference_table.json"),
                template_path: PathBuf::from("templates/alert_email.txt"),
            },
            email: EmailConfig {
                smtp_server: "smtp.example.com".to_string(),
                smtp_port: 25,
                starttls: false,
                from: "alerts@example.com".to_string(),
                to: "someone@example.com".to_string(),
                timeout_seconds: 10,
            },
            splunk: SplunkConfig {
                hec_url: "https://splunk-host:8088/services/collector".to_string(),
                token: "Your-Splunk-Token".to_string(),
                timeout_seconds: 10,
            },
            metrics: MetricsConfig::default(),
        }
    }
}
