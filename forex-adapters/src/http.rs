//! reqwest-backed implementation of the `Transport` port.

use std::time::Duration;

use async_trait::async_trait;
use forex_types::{Transport, TransportError, TransportResponse};
use tracing::{info, instrument};

/// Plain HTTP GET transport. Wrap it in the resilience decorators for
/// retries and circuit breaking.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self { client })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(err.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self))]
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        info!("Sending upstream request");

        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;

        info!(status, "Received upstream response");
        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("base", "USD"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_get_returns_status_and_body() {
        let server = create_mock_server(200, r#"{"rates":{"EUR":0.91}}"#).await;
        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();

        let response = transport
            .get(&format!("{}/latest?base=USD", server.uri()))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"rates":{"EUR":0.91}}"#);
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_an_error() {
        let server = create_mock_server(404, r#"{"message":"not found"}"#).await;
        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();

        let response = transport
            .get(&format!("{}/latest?base=USD", server.uri()))
            .await
            .unwrap();

        assert_eq!(response.status, 404);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_timeout_maps_to_transport_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;
        let transport = ReqwestTransport::new(Duration::from_millis(50)).unwrap();

        let result = transport.get(&format!("{}/latest", server.uri())).await;

        assert!(matches!(result, Err(TransportError::Timeout)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_request_error() {
        let transport = ReqwestTransport::new(Duration::from_secs(1)).unwrap();

        let result = transport.get("http://127.0.0.1:1/latest").await;

        assert!(matches!(result, Err(TransportError::Request(_))));
    }
}
