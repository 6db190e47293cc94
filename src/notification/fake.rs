//! In-memory dispatchers that record what they were asked to send.

use crate::core::{AlertPayload, EmailSender, EventSender};
use crate::error::DeliveryError;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// An email captured by `RecordingEmailSender`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub subject: String,
    pub body: String,
}

/// An `EmailSender` that stores messages instead of sending them.
#[derive(Clone, Debug, Default)]
pub struct RecordingEmailSender {
    sent: Arc<Mutex<Vec<SentEmail>>>,
    failure: Option<String>,
}

impl RecordingEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every send fail with the given transport message.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send_email(&self, subject: &str, body: &str) -> Result<(), DeliveryError> {
        if let Some(message) = &self.failure {
            return Err(DeliveryError::Email(message.clone()));
        }
        self.sent.lock().unwrap().push(SentEmail {
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// An `EventSender` that stores payloads instead of posting them.
#[derive(Clone, Debug, Default)]
pub struct RecordingEventSender {
    sent: Arc<Mutex<Vec<AlertPayload>>>,
    failure: Option<String>,
}

impl RecordingEventSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every send fail with the given response text.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<AlertPayload> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSender for RecordingEventSender {
    async fn send_event(&self, payload: &AlertPayload) -> Result<(), DeliveryError> {
        if let Some(message) = &self.failure {
            return Err(DeliveryError::Splunk(message.clone()));
        }
        self.sent.lock().unwrap().push(payload.clone());
        Ok(())
    }
}
