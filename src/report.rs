// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Verdict and header reports

use std::fmt::Write as _;
use std::path::Path;

use crate::error::{ErrorContext, Result};
use crate::probe::Verdict;
use crate::security::{HeaderEvaluation, HeaderSet};

/// Banner for a vulnerable site
pub const BANNER_VULNERABLE: &str = "Site is vulnerable to Clickjacking";

/// Banner for a site that is not vulnerable
pub const BANNER_NOT_VULNERABLE: &str = "Site is not vulnerable to Clickjacking";

/// Plain text report of a verdict
pub fn render_text(verdict: &Verdict) -> String {
    let mut out = String::new();
    let banner = if verdict.is_vulnerable {
        BANNER_VULNERABLE
    } else {
        BANNER_NOT_VULNERABLE
    };

    let _ = writeln!(out, "Site: {}", verdict.site_url);
    let _ = writeln!(out, "Time: {}", verdict.checked_at_display());
    let _ = writeln!(out, "Missing Security Headers: {}", verdict.missing_display());
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", banner);
    let _ = writeln!(out, "Reason: {}", verdict.reason);
    let _ = writeln!(out);
    let _ = writeln!(out, "Raw Response Headers:");
    let _ = writeln!(out, "{}", verdict.raw_headers_dump());
    out
}

/// Header findings without a framing probe
pub fn render_headers(headers: &HeaderSet, evaluation: &HeaderEvaluation) -> String {
    let mut out = String::new();

    for finding in evaluation.findings() {
        let mark = if finding.present { "present" } else { "MISSING" };
        let _ = writeln!(out, "{:<22}{}", finding.header_label, mark);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Raw Response Headers:");
    let _ = writeln!(out, "{}", headers.to_pretty_json());
    out
}

/// Verdict as pretty JSON
pub fn to_json(verdict: &Verdict) -> Result<String> {
    Ok(serde_json::to_string_pretty(verdict)?)
}

/// Write the JSON report to `path`
pub fn write_json(verdict: &Verdict, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = to_json(verdict)?;
    std::fs::write(path, json).context(&format!("writing report to {}", path.display()))
}
