// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Header fetching
//!
//! A check starts by fetching the target's response headers. Normally a
//! server-side collaborator does this (browsers cannot read cross-origin
//! headers), but the headers can also be fetched directly.

mod direct;
mod remote;

use async_trait::async_trait;

use crate::error::Result;
use crate::security::HeaderSet;

pub use direct::DirectHeaderFetcher;
pub use remote::RemoteHeaderFetcher;

/// Message shown when a fetch fails without a more specific reason
pub const REQUEST_FAILED: &str = "Request failed";

/// Source of a target's response headers
///
/// # Example
///
/// ```rust,no_run
/// use async_trait::async_trait;
/// use kehys::fetch::HeaderFetcher;
/// use kehys::{HeaderSet, Result};
///
/// struct Fixed(HeaderSet);
///
/// #[async_trait]
/// impl HeaderFetcher for Fixed {
///     async fn fetch_headers(&self, _url: &str) -> Result<HeaderSet> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait HeaderFetcher: Send + Sync {
    /// Fetch the headers for `url`. Any failure is returned as
    /// `Error::FetchFailed` carrying the message meant for the user.
    async fn fetch_headers(&self, url: &str) -> Result<HeaderSet>;
}

#[async_trait]
impl<T: HeaderFetcher + ?Sized> HeaderFetcher for Box<T> {
    async fn fetch_headers(&self, url: &str) -> Result<HeaderSet> {
        (**self).fetch_headers(url).await
    }
}
