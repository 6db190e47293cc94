//! Error types raised while routing and delivering an alert.

use crate::core::{DayType, Destination};
use std::path::PathBuf;
use thiserror::Error;

/// The alert could not be routed. Caused by the request, not by this service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error("No destination found for monitor_type={monitor_type}, daytype={daytype}")]
    NoDestination {
        monitor_type: String,
        daytype: DayType,
    },

    #[error("Unsupported destination '{destination}' for monitor_type={monitor_type}, daytype={daytype}")]
    UnsupportedDestination {
        monitor_type: String,
        daytype: DayType,
        destination: Destination,
    },
}

/// The email template could not be read.
#[derive(Error, Debug)]
#[error("Failed to load email template {}: {source}", .path.display())]
pub struct TemplateError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// An outbound delivery failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Email failed: {0}")]
    Email(String),

    #[error("Failed to send to Splunk: {0}")]
    Splunk(String),
}

/// Any failure of the alert handler.
#[derive(Error, Debug)]
pub enum AlertError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl AlertError {
    /// The HTTP status this error is reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            AlertError::Routing(RoutingError::NoDestination { .. }) => 404,
            AlertError::Routing(RoutingError::UnsupportedDestination { .. }) => 400,
            AlertError::Template(_) | AlertError::Delivery(_) => 500,
        }
    }

    /// The client-facing detail string.
    pub fn detail(&self) -> String {
        match self {
            AlertError::Routing(RoutingError::NoDestination { .. }) => {
                "No destination found for given monitor_type and daytype".to_string()
            }
            AlertError::Routing(RoutingError::UnsupportedDestination { .. }) => {
                "Unsupported destination type".to_string()
            }
            AlertError::Template(e) => format!("Failed to load email template: {}", e.source),
            AlertError::Delivery(e) => e.to_string(),
        }
    }

    /// A short label used for the failure metric.
    pub fn reason(&self) -> &'static str {
        match self {
            AlertError::Routing(RoutingError::NoDestination { .. }) => "no_destination",
            AlertError::Routing(RoutingError::UnsupportedDestination { .. }) => {
                "unsupported_destination"
            }
            AlertError::Template(_) => "template",
            AlertError::Delivery(DeliveryError::Email(_)) => "email",
            AlertError::Delivery(DeliveryError::Splunk(_)) => "splunk",
        }
    }
}
