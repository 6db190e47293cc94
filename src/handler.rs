//! The alert handler: classify, resolve, render, dispatch.

use crate::core::{
    AlertContext, AlertPayload, AlertReceipt, Clock, Destination, EmailSender, EventSender,
    TemplateRenderer,
};
use crate::error::{AlertError, RoutingError};
use crate::internal_metrics::Metrics;
use crate::routing::ReferenceTable;
use crate::schedule::classify;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// Routes a single alert to its destination.
///
/// All collaborators are injected at construction and none of them is
/// mutated while handling a request, so one handler is shared by every
/// request task.
#[derive(Clone)]
pub struct AlertHandler {
    table: Arc<ReferenceTable>,
    template: Arc<dyn TemplateRenderer>,
    email: Arc<dyn EmailSender>,
    events: Arc<dyn EventSender>,
    clock: Arc<dyn Clock>,
    metrics: Metrics,
}

impl AlertHandler {
    pub fn new(
        table: Arc<ReferenceTable>,
        template: Arc<dyn TemplateRenderer>,
        email: Arc<dyn EmailSender>,
        events: Arc<dyn EventSender>,
        clock: Arc<dyn Clock>,
        metrics: Metrics,
    ) -> Self {
        Self {
            table,
            template,
            email,
            events,
            clock,
            metrics,
        }
    }

    pub fn table(&self) -> &ReferenceTable {
        &self.table
    }

    /// Handles one alert end to end.
    #[instrument(skip(self, payload), fields(monitor_type = %payload.monitor_type))]
    pub async fn handle(&self, payload: &AlertPayload) -> Result<AlertReceipt, AlertError> {
        self.metrics.alerts_received_total.increment(1);

        let result = self.route(payload).await;
        match &result {
            Ok(receipt) => self.metrics.record_routed(&receipt.destination),
            Err(e) => self.metrics.record_failure(e.reason()),
        }
        result
    }

    async fn route(&self, payload: &AlertPayload) -> Result<AlertReceipt, AlertError> {
        let now = self.clock.now();
        let daytype = classify(&now);
        let monitor_type = payload.monitor_type.as_str();

        let destination = match self.table.resolve(monitor_type, daytype) {
            Some(destination) if !destination.is_blank() => destination.clone(),
            _ => {
                warn!(monitor_type, %daytype, "No destination for alert");
                return Err(RoutingError::NoDestination {
                    monitor_type: monitor_type.to_string(),
                    daytype,
                }
                .into());
            }
        };

        let start = Instant::now();
        let outcome: Result<(), AlertError> = match &destination {
            Destination::Email => {
                let context = AlertContext::new(payload, daytype, now);
                match self.template.render(&context.to_vars()).await {
                    Ok(body) => {
                        let subject = format!("[ALERT] {}", monitor_type);
                        self.email
                            .send_email(&subject, &body)
                            .await
                            .map_err(AlertError::from)
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Destination::Splunk => self
                .events
                .send_event(payload)
                .await
                .map_err(AlertError::from),
            Destination::Other(_) => {
                error!(monitor_type, %daytype, %destination, "Unsupported destination");
                return Err(RoutingError::UnsupportedDestination {
                    monitor_type: monitor_type.to_string(),
                    daytype,
                    destination: destination.clone(),
                }
                .into());
            }
        };

        self.metrics
            .record_dispatch_duration(&destination, start.elapsed().as_secs_f64());
        if let Err(e) = &outcome {
            error!(monitor_type, %daytype, %destination, error = %e, "Alert delivery failed");
        }
        outcome?;

        info!("Alert processed for {} -> {}", monitor_type, destination);
        Ok(AlertReceipt::processed(destination))
    }
}
