// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Clickjacking check orchestration
//!
//! One check is: fetch headers, evaluate them, then probe a fresh frame.
//! A failed fetch ends the check before any frame is opened.

use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::fetch::HeaderFetcher;
use crate::probe::{Embedder, RenderProbe, Verdict};
use crate::security::{evaluate, HeaderEvaluation, HeaderSet};

/// Runs clickjacking checks
pub struct Checker<F, E> {
    fetcher: F,
    embedder: E,
    probe: RenderProbe,
}

impl<F: HeaderFetcher, E: Embedder> Checker<F, E> {
    /// Create a checker from its collaborators
    pub fn new(fetcher: F, embedder: E, probe: RenderProbe) -> Self {
        Self {
            fetcher,
            embedder,
            probe,
        }
    }

    /// Fetch and evaluate the target's headers without probing
    pub async fn evaluate_headers(&self, url: &str) -> Result<(HeaderSet, HeaderEvaluation)> {
        let headers = self.fetcher.fetch_headers(url).await?;
        let evaluation = evaluate(&headers);
        Ok((headers, evaluation))
    }

    /// Run a full check against `url`
    ///
    /// Returns `Error::FetchFailed` when the headers could not be fetched.
    /// Everything that goes wrong after that ends up in the verdict.
    #[instrument(skip(self))]
    pub async fn check(&self, url: &str) -> Result<Verdict> {
        let (headers, evaluation) = match self.evaluate_headers(url).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "Header fetch failed, not probing");
                return Err(e);
            }
        };
        info!(missing = ?evaluation.missing, "Headers evaluated");

        let frame = self.embedder.open_frame();
        let verdict = self
            .probe
            .probe(url, &evaluation, &headers, frame.as_ref())
            .await;

        Ok(verdict)
    }

    /// Get the render probe
    pub fn probe(&self) -> &RenderProbe {
        &self.probe
    }
}
