//! Email body templating.
//!
//! Templates are plain text containing `{{name}}` placeholders. Rendering is a
//! single left-to-right pass; substituted values are never re-scanned, and
//! placeholders without a matching variable are left exactly as written.

use crate::core::TemplateRenderer;
use crate::error::TemplateError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, error};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Substitutes every `{{name}}` in `template` whose name is a key of `vars`.
///
/// Inserted values are never re-scanned, so an alert whose `error` text
/// contains `{{monitor_type}}` is delivered with that text intact.
pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];

        let value = after_open
            .find(CLOSE)
            .and_then(|end| vars.get(&after_open[..end]).map(|v| (end, v)));

        match value {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after_open[end + CLOSE.len()..];
            }
            None => {
                // Emit one brace and rescan, so "{{{name}}}" still finds "{{name}}".
                out.push('{');
                rest = &rest[start + 1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// A template read from disk on every render.
#[derive(Debug, Clone)]
pub struct FileTemplate {
    path: PathBuf,
}

impl FileTemplate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl TemplateRenderer for FileTemplate {
    async fn render(&self, vars: &HashMap<String, String>) -> Result<String, TemplateError> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|source| {
            error!(path = %self.path.display(), error = %source, "Failed to load email template");
            TemplateError {
                path: self.path.clone(),
                source,
            }
        })?;
        debug!(path = %self.path.display(), "Rendering email template");
        Ok(render(&text, vars))
    }
}

/// A template held in memory.
#[derive(Debug, Clone)]
pub struct StaticTemplate(pub String);

#[async_trait]
impl TemplateRenderer for StaticTemplate {
    async fn render(&self, vars: &HashMap<String, String>) -> Result<String, TemplateError> {
        Ok(render(&self.0, vars))
    }
}
