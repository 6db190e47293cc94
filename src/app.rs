//! The main application logic, decoupled from the entry point.

use crate::{
    config::Config,
    core::{Clock, EmailSender, EventSender, TemplateRenderer},
    handler::AlertHandler,
    internal_metrics::Metrics,
    notification::{SmtpEmailSender, SplunkHecClient},
    routing::ReferenceTable,
    schedule::SystemClock,
    server::{self, AppState},
    template::FileTemplate,
};
use anyhow::{Context, Result};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, instrument};

/// A fully wired application, bound to its listening socket.
pub struct App {
    listener: TcpListener,
    router: Router,
    local_addr: SocketAddr,
}

impl App {
    /// Creates a new `AppBuilder` to construct an `App`.
    pub fn builder(config: Config) -> AppBuilder {
        AppBuilder::new(config)
    }

    /// The address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves requests until the shutdown channel changes or is dropped.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) -> Result<()> {
        info!("Listening for alerts on {}", self.local_addr);
        axum::serve(self.listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
                info!("Shutdown signal received. Draining in-flight requests...");
            })
            .await
            .context("HTTP server error")?;
        info!("HTTP server stopped.");
        Ok(())
    }
}

/// Builder for the main application.
///
/// Separates constructing the components from running them, and lets tests
/// swap any collaborator for a fake.
pub struct AppBuilder {
    config: Config,
    reference_table_override: Option<ReferenceTable>,
    template_override: Option<Arc<dyn TemplateRenderer>>,
    email_sender_override: Option<Arc<dyn EmailSender>>,
    event_sender_override: Option<Arc<dyn EventSender>>,
    clock_override: Option<Arc<dyn Clock>>,
    prom_handle: Option<PrometheusHandle>,
}

impl AppBuilder {
    /// Creates a new `AppBuilder` with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            reference_table_override: None,
            template_override: None,
            email_sender_override: None,
            event_sender_override: None,
            clock_override: None,
            prom_handle: None,
        }
    }

    /// Uses the given table instead of loading one from disk.
    pub fn reference_table_override(mut self, table: ReferenceTable) -> Self {
        self.reference_table_override = Some(table);
        self
    }

    /// Overrides the email template for testing.
    pub fn template_override(mut self, template: Arc<dyn TemplateRenderer>) -> Self {
        self.template_override = Some(template);
        self
    }

    /// Overrides the email dispatcher for testing.
    pub fn email_sender_override(mut self, sender: Arc<dyn EmailSender>) -> Self {
        self.email_sender_override = Some(sender);
        self
    }

    /// Overrides the Splunk dispatcher for testing.
    pub fn event_sender_override(mut self, sender: Arc<dyn EventSender>) -> Self {
        self.event_sender_override = Some(sender);
        self
    }

    /// Overrides the clock for testing.
    pub fn clock_override(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock_override = Some(clock);
        self
    }

    /// Supplies the installed Prometheus recorder. Only used when
    /// `metrics.enabled` is set.
    pub fn prometheus_handle(mut self, handle: PrometheusHandle) -> Self {
        self.prom_handle = Some(handle);
        self
    }

    /// Builds and initializes all application components, returning a runnable `App`.
    #[instrument(skip_all)]
    pub async fn build(self) -> Result<App> {
        let config = self.config;

        // =========================================================================
        // 1. Routing resources
        // =========================================================================
        let table = match self.reference_table_override {
            Some(table) => table,
            None => ReferenceTable::load(&config.routing.reference_table_path)
                .context("Failed to load reference table")?,
        };
        let template = self.template_override.unwrap_or_else(|| {
            debug!(path = ?config.routing.template_path, "Using file template");
            Arc::new(FileTemplate::new(config.routing.template_path.clone()))
                as Arc<dyn TemplateRenderer>
        });

        // =========================================================================
        // 2. Dispatchers
        // =========================================================================
        let email: Arc<dyn EmailSender> = match self.email_sender_override {
            Some(sender) => sender,
            None => Arc::new(
                SmtpEmailSender::new(&config.email).context("Failed to set up email delivery")?,
            ),
        };
        let events: Arc<dyn EventSender> = match self.event_sender_override {
            Some(sender) => sender,
            None => Arc::new(
                SplunkHecClient::new(&config.splunk).context("Failed to set up Splunk client")?,
            ),
        };
        let clock = self
            .clock_override
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);

        let handler = AlertHandler::new(
            Arc::new(table),
            template,
            email,
            events,
            clock,
            Metrics::new(),
        );

        // =========================================================================
        // 3. HTTP server
        // =========================================================================
        let prom_handle = if config.metrics.enabled {
            self.prom_handle
        } else {
            None
        };
        let router = server::router(AppState {
            handler: Arc::new(handler),
            prom_handle,
        });

        let listener = TcpListener::bind(&config.server.listen_addr)
            .await
            .with_context(|| format!("Failed to bind {}", config.server.listen_addr))?;
        let local_addr = listener.local_addr()?;

        Ok(App {
            listener,
            router,
            local_addr,
        })
    }
}
