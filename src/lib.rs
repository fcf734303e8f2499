// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Kehys - Clickjacking Susceptibility Checker
//!
//! Decides whether a page can be framed by another origin and is missing
//! the headers that prevent it.
//!
//! ## How a check works
//!
//! - Headers: fetched through a server-side collaborator (or directly) and
//!   checked for `X-Frame-Options` and a CSP `frame-ancestors` directive
//! - Probe: the page is loaded into a fresh cross-origin frame, given time
//!   to settle, then inspected
//! - Verdict: vulnerable only if the page rendered *and* a protection is
//!   missing
//!
//! ## Example
//!
//! ```rust,no_run
//! use kehys::{Checker, HttpClient, RemoteHeaderFetcher, RenderProbe, Sandbox};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = RemoteHeaderFetcher::new(HttpClient::new()?, "https://api.example/headers");
//!     let checker = Checker::new(fetcher, Sandbox::launch()?, RenderProbe::default());
//!
//!     let verdict = checker.check("https://example.com").await?;
//!     println!("{}", kehys::report::render_text(&verdict));
//!
//!     Ok(())
//! }
//! ```

pub mod checker;
pub mod error;
pub mod fetch;
pub mod http;
pub mod probe;
pub mod report;
pub mod security;

// Re-exports for convenience

// Checking
pub use checker::Checker;

// Errors
pub use error::{Error, ErrorContext, Result};

// Header fetching
pub use fetch::{DirectHeaderFetcher, HeaderFetcher, RemoteHeaderFetcher};

// HTTP
pub use http::{HttpClient, HttpClientConfig, Response};

// Probe
pub use probe::{Embedder, EmbeddingContext, Inspection, RenderSignal, Unavailable};
pub use probe::{ProbeConfig, ProbeOutcome, RenderProbe, Sandbox, SandboxConfig, Verdict};

// Security
pub use security::{evaluate, FramingPolicy, HeaderEvaluation, HeaderSet, ProtectionFinding};

/// Kehys version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
