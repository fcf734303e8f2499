// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Direct header fetch, for running without a deployed collaborator

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{HeaderFetcher, REQUEST_FAILED};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::security::HeaderSet;

/// Fetches the target itself and reports its response headers
#[derive(Clone)]
pub struct DirectHeaderFetcher {
    client: HttpClient,
}

impl DirectHeaderFetcher {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HeaderFetcher for DirectHeaderFetcher {
    async fn fetch_headers(&self, url: &str) -> Result<HeaderSet> {
        debug!(url, "Fetching headers directly");

        match self.client.get(url).await {
            Ok(response) => {
                let headers = HeaderSet::from_response(&response);
                debug!(
                    url,
                    status = response.status_code(),
                    redirected = response.redirected,
                    elapsed_ms = response.response_time_ms,
                    count = headers.len(),
                    "Headers received"
                );
                Ok(headers)
            }
            Err(e) => {
                warn!(url, error = %e, "Direct header fetch failed");
                Err(Error::fetch_failed_with(
                    format!("{}: {}", REQUEST_FAILED, e),
                    url,
                    None,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_direct_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .insert_header("X-Frame-Options", "SAMEORIGIN")
                    .insert_header("Content-Type", "text/html"),
            )
            .mount(&server)
            .await;

        let fetcher = DirectHeaderFetcher::new(HttpClient::new().unwrap());
        let headers = assert_ok!(fetcher.fetch_headers(&server.uri()).await);

        assert_eq!(headers.get("X-Frame-Options"), Some("SAMEORIGIN"));
        assert_eq!(headers.get("content-type"), Some("text/html"));
    }

    #[tokio::test]
    async fn test_malformed_url_is_fetch_failure() {
        let fetcher = DirectHeaderFetcher::new(HttpClient::new().unwrap());
        let err = fetcher.fetch_headers("example.com").await.unwrap_err();

        assert!(err.is_fetch_failure());
        assert!(err.to_string().starts_with(REQUEST_FAILED));
    }
}
