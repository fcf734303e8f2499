// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Sandbox and probe configuration

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, DEFAULT_USER_AGENT};

/// Settle delay before the frame is inspected
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(2000);

/// Inspection never happens earlier than this
pub const DEFAULT_MIN_SETTLE: Duration = Duration::from_millis(500);

/// Origin the sandbox pretends to embed frames from. Deliberately unrelated
/// to any real site, so every target is cross-origin.
pub const DEFAULT_EMBEDDER_ORIGIN: &str = "https://kehys.invalid";

/// Sandbox configuration (one sandbox, many frames)
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Origin of the embedding page
    pub embedder_origin: String,
    /// User agent used for frame navigations
    pub user_agent: String,
    /// Timeout for a frame navigation
    pub navigation_timeout: Duration,
    /// Accept invalid TLS certificates
    pub ignore_https_errors: bool,
    /// Proxy URL
    pub proxy: Option<String>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            embedder_origin: DEFAULT_EMBEDDER_ORIGIN.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            navigation_timeout: Duration::from_secs(15),
            ignore_https_errors: false,
            proxy: None,
        }
    }
}

impl SandboxConfig {
    /// Create a new sandbox config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the embedder origin
    pub fn embedder_origin(mut self, origin: impl Into<String>) -> Self {
        self.embedder_origin = origin.into();
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set navigation timeout
    pub fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Ignore HTTPS errors
    pub fn ignore_https_errors(mut self, ignore: bool) -> Self {
        self.ignore_https_errors = ignore;
        self
    }

    /// Set proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Parse the embedder origin
    pub fn embedder_url(&self) -> Result<Url> {
        let url = Url::parse(&self.embedder_origin)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "Embedder origin must be http or https: {}",
                self.embedder_origin
            )));
        }
        Ok(url)
    }

    /// HTTP settings for frame navigations
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            user_agent: self.user_agent.clone(),
            timeout: self.navigation_timeout,
            accept_invalid_certs: self.ignore_https_errors,
            proxy: self.proxy.clone(),
            ..Default::default()
        }
    }
}

/// Render probe timing
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// How long to wait before inspecting the frame
    pub settle_delay: Duration,
    /// Lower bound on the wait, also when racing the load event
    pub min_settle: Duration,
    /// Resolve on the frame's load event if it fires before the settle
    /// delay (but never before `min_settle`)
    pub race_load_event: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            min_settle: DEFAULT_MIN_SETTLE,
            race_load_event: false,
        }
    }
}

impl ProbeConfig {
    /// Create a new probe config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set settle delay
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the minimum settle floor
    pub fn min_settle(mut self, floor: Duration) -> Self {
        self.min_settle = floor;
        self
    }

    /// Enable/disable racing the load event
    pub fn race_load_event(mut self, race: bool) -> Self {
        self.race_load_event = race;
        self
    }

    /// Check that the floor does not exceed the settle delay
    pub fn validate(&self) -> Result<()> {
        if self.min_settle > self.settle_delay {
            return Err(Error::config(format!(
                "Minimum settle ({}ms) exceeds settle delay ({}ms)",
                self.min_settle.as_millis(),
                self.settle_delay.as_millis()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_defaults() {
        let config = ProbeConfig::default();
        assert_eq!(config.settle_delay, Duration::from_millis(2000));
        assert!(!config.race_load_event);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_floor_above_settle_rejected() {
        let config = ProbeConfig::new()
            .settle_delay(Duration::from_millis(100))
            .min_settle(Duration::from_millis(200));
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_sandbox_config() {
        let config = SandboxConfig::new()
            .embedder_origin("http://localhost:8080")
            .navigation_timeout(Duration::from_secs(5))
            .ignore_https_errors(true);

        let http = config.http_config();
        assert_eq!(http.timeout, Duration::from_secs(5));
        assert!(http.accept_invalid_certs);
        assert_eq!(config.embedder_url().unwrap().port(), Some(8080));
    }

    #[test]
    fn test_embedder_must_be_http() {
        let config = SandboxConfig::new().embedder_origin("file:///tmp/x.html");
        assert!(matches!(config.embedder_url(), Err(Error::Config(_))));
    }
}
