//! Outbound HTTP port.
//!
//! Providers only need "fetch text from URL". Retry and circuit-breaking
//! policies are decorators around an implementation of this trait.

use crate::error::TransportError;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Issues a GET request. A non-success status is still `Ok`.
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError>;
}

#[async_trait::async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        (**self).get(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        assert!(TransportResponse::new(200, "").is_success());
        assert!(TransportResponse::new(204, "").is_success());
        assert!(!TransportResponse::new(304, "").is_success());
        assert!(!TransportResponse::new(404, "").is_success());
        assert!(!TransportResponse::new(503, "").is_success());
    }
}
