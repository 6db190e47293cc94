//! Outbound delivery channels.
//!
//! Each channel implements one of the dispatcher traits from `core`, so the
//! alert handler can be wired to real transports in production and to
//! recording fakes in tests.

pub mod email;
pub mod splunk;

#[cfg(any(test, feature = "test-utils"))]
pub mod fake;

pub use email::SmtpEmailSender;
pub use splunk::SplunkHecClient;
