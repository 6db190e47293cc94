//! Core domain types and service traits for alertroute
//!
//! This module defines the fundamental data structures and trait contracts
//! that govern how the alert handler talks to its collaborators.

use crate::error::{DeliveryError, TemplateError};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// An incoming alert as posted by a monitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AlertPayload {
    /// Human-readable error text
    pub error: String,
    /// Numeric error code reported by the monitor
    pub error_code: i64,
    /// Tag identifying the originating monitor (e.g., "disk", "latency")
    pub monitor_type: String,
}

/// Weekday or weekend classification of a point in time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::Weekday => "weekday",
            DayType::Weekend => "weekend",
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The delivery channel a routing entry points at.
///
/// Unknown values are kept as `Other` so that a table naming a channel this
/// service cannot deliver to still loads; such alerts are rejected per request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum Destination {
    Email,
    Splunk,
    Other(String),
}

impl Destination {
    pub fn as_str(&self) -> &str {
        match self {
            Destination::Email => "email",
            Destination::Splunk => "splunk",
            Destination::Other(name) => name,
        }
    }

    /// Returns true when the entry carries no destination at all.
    pub fn is_blank(&self) -> bool {
        matches!(self, Destination::Other(name) if name.trim().is_empty())
    }
}

impl From<String> for Destination {
    fn from(value: String) -> Self {
        match value.as_str() {
            "email" => Destination::Email,
            "splunk" => Destination::Splunk,
            _ => Destination::Other(value),
        }
    }
}

impl From<Destination> for String {
    fn from(value: Destination) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-request values available to the email template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertContext {
    pub error: String,
    pub error_code: i64,
    pub monitor_type: String,
    pub daytype: DayType,
    /// ISO 8601 timestamp of when the alert was handled
    pub timestamp: String,
}

impl AlertContext {
    pub fn new(payload: &AlertPayload, daytype: DayType, now: DateTime<FixedOffset>) -> Self {
        Self {
            error: payload.error.clone(),
            error_code: payload.error_code,
            monitor_type: payload.monitor_type.clone(),
            daytype,
            timestamp: now.to_rfc3339(),
        }
    }

    /// Flattens the context into the string mapping consumed by templates.
    pub fn to_vars(&self) -> HashMap<String, String> {
        HashMap::from([
            ("error".to_string(), self.error.clone()),
            ("error_code".to_string(), self.error_code.to_string()),
            ("monitor_type".to_string(), self.monitor_type.clone()),
            ("daytype".to_string(), self.daytype.to_string()),
            ("timestamp".to_string(), self.timestamp.clone()),
        ])
    }
}

/// The successful outcome of handling one alert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertReceipt {
    pub status: String,
    pub destination: Destination,
}

impl AlertReceipt {
    pub fn processed(destination: Destination) -> Self {
        Self {
            status: "processed".to_string(),
            destination,
        }
    }
}

// =============================================================================
// Service Traits
// =============================================================================

/// Source of the current time, used to classify the day type.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Renders the email body for an alert.
#[async_trait]
pub trait TemplateRenderer: Send + Sync {
    /// Renders the template against the given variables.
    ///
    /// # Returns
    /// * `Err(TemplateError)` if the template source cannot be read
    async fn render(&self, vars: &HashMap<String, String>) -> Result<String, TemplateError>;
}

/// Delivers plain-text notifications by email.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Sends a single message to the configured recipient.
    ///
    /// # Returns
    /// * `Ok(())` once the relay accepted the message
    /// * `Err(DeliveryError::Email)` on any transport failure
    async fn send_email(&self, subject: &str, body: &str) -> Result<(), DeliveryError>;
}

/// Delivers alert events to the log-aggregation platform.
#[async_trait]
pub trait EventSender: Send + Sync {
    /// Posts the full alert payload as a single event.
    async fn send_event(&self, payload: &AlertPayload) -> Result<(), DeliveryError>;
}
