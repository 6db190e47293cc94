//! Test helpers for running the full application instance.

use alertroute::{
    app::AppBuilder,
    config::Config,
    core::{EmailSender, EventSender, TemplateRenderer},
    routing::ReferenceTable,
    schedule::FixedClock,
};
use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{sync::watch, task::JoinHandle, time::timeout};

/// Represents a running instance of the application for testing purposes.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    shutdown_tx: watch::Sender<bool>,
    app_handle: JoinHandle<Result<()>>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_alert(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url("/alert"))
            .json(body)
            .send()
            .await
            .expect("Failed to reach the alert endpoint")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to reach the server")
    }

    /// Shuts down the application and waits for it to terminate.
    pub async fn shutdown(self) -> Result<()> {
        self.shutdown_tx.send(true)?;
        match timeout(Duration::from_secs(5), self.app_handle).await {
            Ok(joined) => joined?,
            Err(_) => Err(anyhow::anyhow!("App failed to shut down within the timeout")),
        }
    }
}

/// A builder for creating `TestApp` instances with specific configurations.
pub struct TestAppBuilder {
    config: Config,
    table: ReferenceTable,
    clock: FixedClock,
    template: Option<Arc<dyn TemplateRenderer>>,
    email: Option<Arc<dyn EmailSender>>,
    events: Option<Arc<dyn EventSender>>,
    prom_handle: Option<PrometheusHandle>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        let mut config = Config::default();
        config.server.listen_addr = "127.0.0.1:0".to_string();
        Self {
            config,
            table: super::test_table(),
            clock: FixedClock::at(super::WEDNESDAY),
            template: None,
            email: None,
            events: None,
            prom_handle: None,
        }
    }

    pub fn with_config_modifier(mut self, modifier: impl FnOnce(&mut Config)) -> Self {
        modifier(&mut self.config);
        self
    }

    pub fn with_table(mut self, table: ReferenceTable) -> Self {
        self.table = table;
        self
    }

    pub fn at(mut self, rfc3339: &str) -> Self {
        self.clock = FixedClock::at(rfc3339);
        self
    }

    pub fn with_template(mut self, template: Arc<dyn TemplateRenderer>) -> Self {
        self.template = Some(template);
        self
    }

    pub fn with_email_sender(mut self, sender: Arc<dyn EmailSender>) -> Self {
        self.email = Some(sender);
        self
    }

    pub fn with_event_sender(mut self, sender: Arc<dyn EventSender>) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.config.metrics.enabled = true;
        self.prom_handle = Some(handle);
        self
    }

    /// Builds the app and starts serving on an ephemeral port.
    pub async fn start(self) -> Result<TestApp> {
        let mut builder = AppBuilder::new(self.config)
            .reference_table_override(self.table)
            .clock_override(Arc::new(self.clock));
        if let Some(template) = self.template {
            builder = builder.template_override(template);
        }
        if let Some(email) = self.email {
            builder = builder.email_sender_override(email);
        }
        if let Some(events) = self.events {
            builder = builder.event_sender_override(events);
        }
        if let Some(handle) = self.prom_handle {
            builder = builder.prometheus_handle(handle);
        }

        let app = builder.build().await?;
        let addr = app.local_addr();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let app_handle = tokio::spawn(app.run(shutdown_rx));

        Ok(TestApp {
            addr,
            client: reqwest::Client::new(),
            shutdown_tx,
            app_handle,
        })
    }
}
