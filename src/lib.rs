/// alertroute - routes monitor alerts to email or Splunk.
///
/// Each alert is classified by day type, looked up in a static routing table,
/// and delivered through the matching channel.
pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod handler;
pub mod internal_metrics;
pub mod logging;
pub mod notification;
pub mod routing;
pub mod schedule;
pub mod server;
pub mod template;

// Re-export core types for convenience
pub use crate::core::*;
pub use crate::error::{AlertError, DeliveryError, RoutingError, TemplateError};
