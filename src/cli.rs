//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the application using the
//! `clap` crate. These arguments are parsed at startup and then merged on top of
//! the configuration file and environment variables.

use clap::Parser;
use figment::{
    providers::Serialized,
    value::{Dict, Map},
    Error, Figment, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Routes monitor alerts to email or Splunk based on a static routing table.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8000.
    #[arg(long, value_name = "ADDR")]
    pub listen_addr: Option<String>,

    /// Path to the reference table (JSON or CSV).
    #[arg(long, value_name = "FILE")]
    pub reference_table: Option<PathBuf>,

    /// Path to the email body template.
    #[arg(long, value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Serve Prometheus metrics on /metrics.
    #[arg(long)]
    pub metrics: bool,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut figment = Figment::new();

        if let Some(addr) = &self.listen_addr {
            figment = figment.merge(Serialized::default("server.listen_addr", addr));
        }
        if let Some(path) = &self.reference_table {
            figment = figment.merge(Serialized::default("routing.reference_table_path", path));
        }
        if let Some(path) = &self.template {
            figment = figment.merge(Serialized::default("routing.template_path", path));
        }
        if let Some(level) = &self.log_level {
            figment = figment.merge(Serialized::default("log_level", level));
        }
        // A bare flag can only switch metrics on; leaving it out defers to the other layers.
        if self.metrics {
            figment = figment.merge(Serialized::default("metrics.enabled", true));
        }

        figment.data()
    }
}
