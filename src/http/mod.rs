// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client layer for Kehys
//!
//! Used for two things: talking to the header-fetch collaborator and
//! navigating sandbox frames.

mod client;
mod response;

pub use client::{HttpClient, HttpClientConfig};
pub use response::Response;

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Header names the checker cares about
pub mod headers {
    pub const ACCEPT: &str = "accept";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const X_FRAME_OPTIONS: &str = "x-frame-options";
    pub const CONTENT_SECURITY_POLICY: &str = "content-security-policy";
}
