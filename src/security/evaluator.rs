// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Anti-framing header evaluation
//!
//! Decides whether the two headers browsers honor against framing are
//! present. Matching is substring based and case-insensitive, which is as
//! permissive about formatting as browsers are (extra directives, odd
//! whitespace, mixed case).

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::headers::HeaderSet;
use crate::http::headers::{CONTENT_SECURITY_POLICY, X_FRAME_OPTIONS};

/// Label reported when X-Frame-Options is missing or ineffective
pub const XFO_LABEL: &str = "X-Frame-Options";

/// Label reported when CSP has no frame-ancestors directive
pub const CSP_FRAME_ANCESTORS_LABEL: &str = "CSP frame-ancestors";

lazy_static! {
    static ref XFO_PROTECTIVE: Regex = Regex::new(r"(?i)deny|sameorigin").unwrap();
    static ref CSP_FRAME_ANCESTORS: Regex = Regex::new(r"(?i)frame-ancestors").unwrap();
}

/// One protective header and whether it was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionFinding {
    pub header_label: String,
    pub present: bool,
}

/// Result of evaluating a header set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEvaluation {
    /// Missing protections, X-Frame-Options first
    pub missing: Vec<String>,
    pub has_xfo: bool,
    pub has_csp: bool,
}

impl HeaderEvaluation {
    /// Whether at least one protection is missing
    pub fn is_missing_any(&self) -> bool {
        !self.missing.is_empty()
    }

    /// Per-header findings, in the same order as `missing`
    pub fn findings(&self) -> Vec<ProtectionFinding> {
        vec![
            ProtectionFinding {
                header_label: XFO_LABEL.to_string(),
                present: self.has_xfo,
            },
            ProtectionFinding {
                header_label: CSP_FRAME_ANCESTORS_LABEL.to_string(),
                present: self.has_csp,
            },
        ]
    }
}

/// Evaluate anti-framing headers. Never fails: absent or malformed values
/// count as missing.
pub fn evaluate(headers: &HeaderSet) -> HeaderEvaluation {
    let has_xfo = XFO_PROTECTIVE.is_match(headers.value(X_FRAME_OPTIONS));
    let has_csp = CSP_FRAME_ANCESTORS.is_match(headers.value(CONTENT_SECURITY_POLICY));

    let mut missing = Vec::with_capacity(2);
    if !has_xfo {
        missing.push(XFO_LABEL.to_string());
    }
    if !has_csp {
        missing.push(CSP_FRAME_ANCESTORS_LABEL.to_string());
    }

    HeaderEvaluation {
        missing,
        has_xfo,
        has_csp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HeaderSet {
        HeaderSet::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_no_headers_missing_both_in_order() {
        let eval = evaluate(&HeaderSet::new());

        assert!(!eval.has_xfo);
        assert!(!eval.has_csp);
        assert_eq!(eval.missing, vec!["X-Frame-Options", "CSP frame-ancestors"]);
    }

    #[test]
    fn test_xfo_deny_any_case() {
        for value in ["DENY", "deny", "Deny", "DENY, ALLOW-FROM https://x.example"] {
            let eval = evaluate(&headers(&[("x-frame-options", value)]));
            assert!(eval.has_xfo, "{value}");
            assert_eq!(eval.missing, vec!["CSP frame-ancestors"]);
        }
    }

    #[test]
    fn test_xfo_sameorigin_with_whitespace() {
        let eval = evaluate(&headers(&[("X-Frame-Options", "  SameOrigin ")]));
        assert!(eval.has_xfo);
    }

    #[test]
    fn test_xfo_allow_from_is_missing() {
        let eval = evaluate(&headers(&[("x-frame-options", "ALLOW-FROM https://a.example")]));
        assert!(!eval.has_xfo);
        assert_eq!(eval.missing[0], XFO_LABEL);
    }

    #[test]
    fn test_csp_frame_ancestors() {
        let eval = evaluate(&headers(&[(
            "content-security-policy",
            "default-src 'self'; frame-ancestors 'none'",
        )]));
        assert!(eval.has_csp);
        assert_eq!(eval.missing, vec!["X-Frame-Options"]);
    }

    #[test]
    fn test_csp_without_frame_ancestors() {
        let eval = evaluate(&headers(&[("content-security-policy", "default-src 'self'")]));
        assert!(!eval.has_csp);
    }

    #[test]
    fn test_report_only_csp_does_not_count() {
        let eval = evaluate(&headers(&[(
            "content-security-policy-report-only",
            "frame-ancestors 'none'",
        )]));
        assert!(!eval.has_csp);
    }

    #[test]
    fn test_fully_protected() {
        let eval = evaluate(&headers(&[
            ("X-Frame-Options", "DENY"),
            ("Content-Security-Policy", "FRAME-ANCESTORS 'self'"),
        ]));
        assert!(eval.missing.is_empty());
        assert!(!eval.is_missing_any());
        assert!(eval.findings().iter().all(|f| f.present));
    }

    #[test]
    fn test_deterministic() {
        let set = headers(&[("server", "nginx"), ("x-frame-options", "bogus")]);
        assert_eq!(evaluate(&set), evaluate(&set));
    }

    #[test]
    fn test_findings_order() {
        let eval = evaluate(&headers(&[("x-frame-options", "DENY")]));
        let findings = eval.findings();

        assert_eq!(findings[0].header_label, XFO_LABEL);
        assert!(findings[0].present);
        assert_eq!(findings[1].header_label, CSP_FRAME_ANCESTORS_LABEL);
        assert!(!findings[1].present);
    }
}
