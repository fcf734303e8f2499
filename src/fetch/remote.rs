// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Client for the header-fetch collaborator
//!
//! Protocol: `POST <endpoint>` with `{"url": ...}`. A successful call answers
//! `{"headers": {...}}`, a failed one `{"error": "..."}`. Status codes only
//! matter as success or failure of the call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{HeaderFetcher, REQUEST_FAILED};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::security::HeaderSet;

#[derive(Debug, Serialize)]
struct FetchRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct FetchPayload {
    #[serde(default)]
    headers: Option<Map<String, Value>>,
    #[serde(default)]
    error: Option<String>,
}

/// Header fetcher backed by the remote collaborator
#[derive(Clone)]
pub struct RemoteHeaderFetcher {
    client: HttpClient,
    endpoint: String,
}

impl RemoteHeaderFetcher {
    /// Create a fetcher for the given collaborator endpoint
    pub fn new(client: HttpClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Get the collaborator endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl HeaderFetcher for RemoteHeaderFetcher {
    async fn fetch_headers(&self, url: &str) -> Result<HeaderSet> {
        debug!(endpoint = %self.endpoint, url, "Requesting headers from collaborator");

        let response = match self
            .client
            .post_json(&self.endpoint, &FetchRequest { url })
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "Header fetch call failed");
                return Err(Error::fetch_failed_with(REQUEST_FAILED, url, None));
            }
        };

        let status = response.status_code();
        let payload = response.json::<FetchPayload>().ok();

        if let Some(message) = payload.as_ref().and_then(|p| p.error.clone()) {
            warn!(url, status, error = %message, "Collaborator reported an error");
            return Err(Error::fetch_failed_with(message, url, Some(status)));
        }

        if !response.is_success() {
            warn!(url, status, "Collaborator call unsuccessful");
            return Err(Error::fetch_failed_with(REQUEST_FAILED, url, Some(status)));
        }

        let headers = match payload.and_then(|p| p.headers) {
            Some(map) => headers_from_json(map),
            None => {
                debug!(url, "Collaborator returned no headers object");
                HeaderSet::new()
            }
        };

        debug!(url, count = headers.len(), "Headers received");
        Ok(headers)
    }
}

/// Header values may be strings, arrays of strings, or stray scalars
fn headers_from_json(map: Map<String, Value>) -> HeaderSet {
    map.into_iter()
        .filter_map(|(name, value)| {
            let value = match value {
                Value::Null => return None,
                Value::String(s) => s,
                Value::Array(items) => items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
                other => other.to_string(),
            };
            Some((name, value))
        })
        .collect()
}
