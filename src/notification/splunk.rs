//! A client for the Splunk HTTP Event Collector.

use crate::config::SplunkConfig;
use crate::core::{AlertPayload, EventSender};
use crate::error::DeliveryError;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, info, instrument};

/// Posts alert payloads to a Splunk HEC endpoint.
pub struct SplunkHecClient {
    client: reqwest::Client,
    hec_url: String,
    token: String,
}

impl SplunkHecClient {
    /// Creates a new `SplunkHecClient` with the configured request timeout.
    pub fn new(config: &SplunkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            hec_url: config.hec_url.clone(),
            token: config.token.clone(),
        })
    }

    /// Wraps a payload in the HEC event envelope.
    pub fn event_body(payload: &AlertPayload) -> Value {
        json!({
            "event": payload,
            "sourcetype": "_json",
        })
    }
}

#[async_trait]
impl EventSender for SplunkHecClient {
    #[instrument(skip(self, payload), fields(monitor_type = %payload.monitor_type))]
    async fn send_event(&self, payload: &AlertPayload) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.hec_url)
            .header(AUTHORIZATION, format!("Splunk {}", self.token))
            .json(&Self::event_body(payload))
            .send()
            .await;

        match response {
            Ok(res) if res.status() == StatusCode::OK => {
                info!("Event sent to Splunk.");
                Ok(())
            }
            Ok(res) => {
                let status = res.status();
                // An unreadable or empty body falls back to the status line.
                let detail = match res.text().await {
                    Ok(text) if !text.trim().is_empty() => text,
                    _ => status.to_string(),
                };
                error!(
                    status = %status,
                    body = %detail,
                    "Splunk sending failed"
                );
                Err(DeliveryError::Splunk(detail))
            }
            Err(e) => {
                error!(error = %e, "HTTP request to Splunk failed");
                Err(DeliveryError::Splunk(e.to_string()))
            }
        }
    }
}
