// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client implementation

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::Client;
use serde::Serialize;
use url::Url;

use super::response::Response;
use super::{headers, DEFAULT_USER_AGENT};
use crate::error::{Error, Result};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Default timeout
    pub timeout: Duration,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
    /// Default headers
    pub default_headers: HeaderMap,
    /// Proxy URL
    pub proxy: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            headers::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        default_headers.insert(
            "accept-language",
            HeaderValue::from_static("en-US,en;q=0.5"),
        );

        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_redirects: 10,
            accept_invalid_certs: false,
            default_headers,
            proxy: None,
        }
    }
}

impl HttpClientConfig {
    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Accept invalid TLS certificates
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Set proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}

/// Thin wrapper over reqwest that buffers whole responses
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(Policy::limited(config.max_redirects))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .default_headers(config.default_headers.clone());

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Execute a GET request
    pub async fn get(&self, url: impl AsRef<str>) -> Result<Response> {
        let url = Url::parse(url.as_ref())?;
        self.send(self.client.get(url.clone()), url).await
    }

    /// Execute a POST request with a JSON body
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: impl AsRef<str>,
        body: &T,
    ) -> Result<Response> {
        let url = Url::parse(url.as_ref())?;
        let builder = self
            .client
            .post(url.clone())
            .header(headers::CONTENT_TYPE, "application/json")
            .header(headers::ACCEPT, "application/json")
            .body(serde_json::to_vec(body)?);
        self.send(builder, url).await
    }

    async fn send(&self, builder: reqwest::RequestBuilder, url: Url) -> Result<Response> {
        let start = Instant::now();

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::timeout_with_url("request", self.config.timeout.as_millis() as u64, url.as_str())
            } else {
                Error::Http(e)
            }
        })?;
        let response_time = start.elapsed().as_millis() as u64;

        let redirected = response.url() != &url;
        let final_url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();

        let body = response.bytes().await?;

        tracing::debug!(
            url = %final_url,
            status = status.as_u16(),
            elapsed_ms = response_time,
            "HTTP response"
        );

        Ok(Response::new(
            status,
            headers,
            body,
            final_url,
            redirected,
            response_time,
        ))
    }

    /// Get client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}
