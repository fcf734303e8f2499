// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Render probe
//!
//! Loading -> Settling -> Resolved, exactly once per check. The settle wait
//! is the only suspension point. The frame's load event is not trusted by
//! default: cross-origin frames may never fire it, or fire it before the
//! browser has applied framing restrictions.

use std::fmt;

use chrono::Utc;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use super::config::ProbeConfig;
use super::frame::{EmbeddingContext, Inspection, Unavailable};
use super::verdict::{ProbeOutcome, Verdict};
use crate::error::Result;
use crate::security::{HeaderEvaluation, HeaderSet};

/// Probe lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Loading,
    Settling,
    Resolved,
}

impl fmt::Display for ProbeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeState::Loading => write!(f, "loading"),
            ProbeState::Settling => write!(f, "settling"),
            ProbeState::Resolved => write!(f, "resolved"),
        }
    }
}

/// Loads a URL into an embedding context and decides whether it rendered
#[derive(Debug, Clone)]
pub struct RenderProbe {
    config: ProbeConfig,
}

impl Default for RenderProbe {
    fn default() -> Self {
        Self {
            config: ProbeConfig::default(),
        }
    }
}

impl RenderProbe {
    /// Create a probe; fails if the settle floor exceeds the settle delay
    pub fn new(config: ProbeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get probe config
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Run the probe against a fresh context and build the verdict
    pub async fn probe(
        &self,
        url: &str,
        evaluation: &HeaderEvaluation,
        headers: &HeaderSet,
        context: &dyn EmbeddingContext,
    ) -> Verdict {
        let started = Instant::now();

        debug!(url, state = %ProbeState::Loading, "Probe state");
        context.load(url);

        debug!(url, state = %ProbeState::Settling, "Probe state");
        self.settle(context).await;

        let inspection = context.inspect();
        let outcome = classify(&inspection);
        debug!(
            url,
            state = %ProbeState::Resolved,
            waited_ms = started.elapsed().as_millis() as u64,
            ?inspection,
            "Probe state"
        );

        let verdict = Verdict::assemble(url, outcome, evaluation, headers.clone(), Utc::now());
        info!(
            url,
            outcome = %outcome,
            vulnerable = verdict.is_vulnerable,
            "Probe resolved"
        );
        verdict
    }

    /// Wait before inspecting. Never shorter than the floor.
    async fn settle(&self, context: &dyn EmbeddingContext) {
        let settle_delay = self.config.settle_delay;
        let min_settle = self.config.min_settle;

        if !self.config.race_load_event {
            sleep(settle_delay.max(min_settle)).await;
            return;
        }

        sleep(min_settle).await;
        let remaining = settle_delay.saturating_sub(min_settle);
        tokio::select! {
            _ = sleep(remaining) => {}
            _ = context.load_event() => {
                debug!("Load event fired before the settle delay");
            }
        }
    }
}

/// Denied and empty are the same to the verdict: the page did not render
pub fn classify(inspection: &Inspection) -> ProbeOutcome {
    match inspection {
        Inspection::Rendered(signal) if signal.has_content() => ProbeOutcome::Rendered,
        Inspection::Rendered(_) => ProbeOutcome::BlockedOrErrored,
        Inspection::Unavailable(Unavailable::Denied(_) | Unavailable::Empty) => {
            ProbeOutcome::BlockedOrErrored
        }
    }
}
