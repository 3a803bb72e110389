//! Seam for the external formatting service

use crate::utils::BackendError;
use async_trait::async_trait;

/// Opaque formatting service: takes text or HTML, returns formatted HTML.
///
/// Failures are surfaced to the caller unchanged; nothing here retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FormattingBackend: Send + Sync {
    async fn format(&self, text: &str) -> Result<String, BackendError>;
}

/// Backend that returns its input unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughBackend;

#[async_trait]
impl FormattingBackend for PassthroughBackend {
    async fn format(&self, text: &str) -> Result<String, BackendError> {
        Ok(text.to_string())
    }
}
