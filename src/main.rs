//! alertroute - HTTP alert router
//!
//! Receives alerts on `POST /alert` and forwards each one to email or Splunk
//! according to the reference table.

use alertroute::{
    app::App, cli::Cli, config::Config, internal_metrics::install_prometheus_recorder, logging,
};
use anyhow::Result;
use clap::Parser;
use tokio::sync::watch;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = Config::load(&cli).unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {:#}", err);
        // Exit if configuration fails, as it's a critical step.
        std::process::exit(1);
    });

    let _log_guard = logging::init(&config)?;

    info!("alertroute starting up...");

    // Log the loaded configuration settings for visibility
    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", config.log_level);
    if let Some(path) = &config.log_file {
        info!("Log File: {}", path.display());
    }
    info!("Listen Address: {}", config.server.listen_addr);
    info!(
        "Reference Table: {}",
        config.routing.reference_table_path.display()
    );
    info!("Email Template: {}", config.routing.template_path.display());
    info!(
        "SMTP Relay: {}:{}{}",
        config.email.smtp_server,
        config.email.smtp_port,
        if config.email.starttls { " (STARTTLS)" } else { "" }
    );
    info!("Email From: {}", config.email.from);
    info!("Email To: {}", config.email.to);
    info!("Splunk HEC URL: {}", config.splunk.hec_url);
    info!(
        "Metrics Endpoint: {}",
        if config.metrics.enabled {
            "Enabled"
        } else {
            "Disabled"
        }
    );
    info!("-------------------------------------------------------");

    let mut builder = App::builder(config.clone());
    if config.metrics.enabled {
        builder = builder.prometheus_handle(install_prometheus_recorder()?);
    }
    let app = builder.build().await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut server = tokio::spawn(app.run(shutdown_rx));

    tokio::select! {
        result = &mut server => {
            // The server stopped without being asked to.
            return result?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutdown signal received. Shutting down gracefully...");
        }
    }

    shutdown_tx.send(true)?;
    server.await??;

    info!("alertroute stopped. Exiting.");
    Ok(())
}
