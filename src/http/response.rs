// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response types

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{Error, Result};

/// HTTP response representation
#[derive(Debug, Clone)]
pub struct Response {
    /// Response status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
    /// Final URL (after redirects)
    pub url: Url,
    /// Whether this was a redirect
    pub redirected: bool,
    /// Response time in milliseconds
    pub response_time_ms: u64,
}

impl Response {
    /// Create a new response
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
        url: Url,
        redirected: bool,
        response_time_ms: u64,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            url,
            redirected,
            response_time_ms,
        }
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get status code as u16
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Get body as text, lossy conversion
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::from)
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// All headers as (lower-case name, value) pairs, in wire order.
    /// Values that are not valid visible ASCII are decoded lossily.
    pub fn header_pairs(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect()
    }

    /// Get content type
    pub fn content_type(&self) -> Option<&str> {
        self.header(super::headers::CONTENT_TYPE)
    }

    /// Check if content type is HTML
    pub fn is_html(&self) -> bool {
        self.content_type()
            .map(|ct| ct.contains("text/html") || ct.contains("application/xhtml"))
            .unwrap_or(false)
    }
}
