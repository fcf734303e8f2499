// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Probe outcome and the verdict built from it

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::security::{HeaderEvaluation, HeaderSet};

/// Reason given when the page is framable and unprotected
pub const REASON_VULNERABLE: &str = "Page is embeddable and missing required security headers";

/// Reason given when the page rendered but headers protect it
pub const REASON_RENDERED_PROTECTED: &str =
    "Page is either protected via headers or refused to render in iframe";

/// Reason given when the page did not render in the frame
pub const REASON_REFUSED: &str = "Page refused to render in iframe (likely protected)";

/// Shown in place of an empty missing list
pub const NO_MISSING_PROTECTIONS: &str = "None - Site is protected";

/// What the framing probe observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// The frame showed visible content
    Rendered,
    /// Content could not be read, or there was none
    BlockedOrErrored,
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Rendered => write!(f, "rendered"),
            ProbeOutcome::BlockedOrErrored => write!(f, "blocked or errored"),
        }
    }
}

/// Final result of one clickjacking check
///
/// Built once per check and never updated; a new check produces a new
/// verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub site_url: String,
    pub checked_at: DateTime<Utc>,
    /// Missing protections, or the single "None - Site is protected" marker
    pub missing_protections: Vec<String>,
    pub is_vulnerable: bool,
    pub reason: String,
    pub outcome: ProbeOutcome,
    pub raw_headers: HeaderSet,
}

impl Verdict {
    /// Combine the probe outcome with the header findings
    pub fn assemble(
        site_url: impl Into<String>,
        outcome: ProbeOutcome,
        evaluation: &HeaderEvaluation,
        raw_headers: HeaderSet,
        checked_at: DateTime<Utc>,
    ) -> Self {
        let is_vulnerable = outcome == ProbeOutcome::Rendered && evaluation.is_missing_any();

        let reason = match (outcome, is_vulnerable) {
            (ProbeOutcome::Rendered, true) => REASON_VULNERABLE,
            (ProbeOutcome::Rendered, false) => REASON_RENDERED_PROTECTED,
            (ProbeOutcome::BlockedOrErrored, _) => REASON_REFUSED,
        };

        let missing_protections = if evaluation.missing.is_empty() {
            vec![NO_MISSING_PROTECTIONS.to_string()]
        } else {
            evaluation.missing.clone()
        };

        Self {
            site_url: site_url.into(),
            checked_at,
            missing_protections,
            is_vulnerable,
            reason: reason.to_string(),
            outcome,
            raw_headers,
        }
    }

    /// Missing protections joined for display
    pub fn missing_display(&self) -> String {
        self.missing_protections.join(", ")
    }

    /// Raw headers as pretty JSON
    pub fn raw_headers_dump(&self) -> String {
        self.raw_headers.to_pretty_json()
    }

    /// Check time in HTTP-date form, e.g. `Mon, 19 Oct 2026 10:00:00 GMT`
    pub fn checked_at_display(&self) -> String {
        self.checked_at
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string()
    }

    /// Same result ignoring when it was produced
    pub fn same_result(&self, other: &Verdict) -> bool {
        self.is_vulnerable == other.is_vulnerable
            && self.missing_protections == other.missing_protections
            && self.reason == other.reason
    }
}
