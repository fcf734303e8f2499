// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Framing enforcement
//!
//! Models the decision a browser makes when a response is loaded into a
//! frame: an enforced CSP `frame-ancestors` directive wins, otherwise
//! `X-Frame-Options` is consulted. Report-only policies never block.

use serde::{Deserialize, Serialize};
use url::{Origin, Url};

use super::headers::HeaderSet;
use crate::http::headers::{CONTENT_SECURITY_POLICY, X_FRAME_OPTIONS};

/// Why a frame load was refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefusalReason {
    /// X-Frame-Options: DENY
    XfoDeny,
    /// X-Frame-Options: SAMEORIGIN with a cross-origin embedder
    XfoSameOrigin,
    /// Several X-Frame-Options values that disagree
    XfoConflict(String),
    /// CSP frame-ancestors did not list the embedder
    FrameAncestors(String),
}

impl RefusalReason {
    /// Get description
    pub fn description(&self) -> String {
        match self {
            RefusalReason::XfoDeny => "X-Frame-Options denies all framing".to_string(),
            RefusalReason::XfoSameOrigin => {
                "X-Frame-Options only allows same-origin framing".to_string()
            }
            RefusalReason::XfoConflict(v) => {
                format!("conflicting X-Frame-Options values: {}", v)
            }
            RefusalReason::FrameAncestors(policy) => {
                format!("embedder not allowed by frame-ancestors ({})", policy)
            }
        }
    }
}

/// Outcome of a framing check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramingDecision {
    Allowed,
    Refused(RefusalReason),
}

impl FramingDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, FramingDecision::Allowed)
    }
}

/// One source expression of a frame-ancestors list
#[derive(Debug, Clone, PartialEq, Eq)]
enum AncestorSource {
    None,
    SelfOrigin,
    Wildcard,
    Scheme(String),
    Host {
        scheme: Option<String>,
        host: String,
        port: Option<PortMatch>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PortMatch {
    Any,
    Exact(u16),
}

/// Parsed `frame-ancestors` directive of one policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameAncestors {
    raw: String,
    sources: Vec<AncestorSource>,
}

impl FrameAncestors {
    /// Extract the directive from a single serialized policy. The first
    /// occurrence wins when the directive is repeated.
    pub fn from_policy(policy: &str) -> Option<Self> {
        for directive in policy.split(';') {
            let mut parts = directive.split_whitespace();
            let name = match parts.next() {
                Some(n) => n.to_ascii_lowercase(),
                None => continue,
            };
            if name != "frame-ancestors" {
                continue;
            }

            let values: Vec<&str> = parts.collect();
            let sources = values.iter().filter_map(|v| parse_source(v)).collect();
            return Some(Self {
                raw: directive.trim().to_string(),
                sources,
            });
        }
        None
    }

    /// The directive as written
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether `embedder` may frame the resource at `target`
    pub fn allows(&self, target: &Url, embedder: &Url) -> bool {
        // 'none' only counts when it is the sole source
        if self.sources.len() == 1 && self.sources[0] == AncestorSource::None {
            return false;
        }
        self.sources
            .iter()
            .any(|source| source_matches(source, target, embedder))
    }
}

fn parse_source(value: &str) -> Option<AncestorSource> {
    let lower = value.to_ascii_lowercase();
    match lower.as_str() {
        "'none'" => return Some(AncestorSource::None),
        "'self'" => return Some(AncestorSource::SelfOrigin),
        "*" => return Some(AncestorSource::Wildcard),
        _ => {}
    }

    // Other quoted keywords (nonces, hashes) mean nothing for ancestors
    if lower.starts_with('\'') {
        return None;
    }

    if let Some(scheme) = lower.strip_suffix(':') {
        if !scheme.is_empty() && !scheme.contains('/') {
            return Some(AncestorSource::Scheme(scheme.to_string()));
        }
    }

    let (scheme, rest) = match lower.split_once("://") {
        Some((s, r)) => (Some(s.to_string()), r),
        None => (None, lower.as_str()),
    };

    let authority = rest.split('/').next().unwrap_or("");
    if authority.is_empty() {
        return None;
    }

    let (host, port) = match authority.rsplit_once(':') {
        Some((h, "*")) => (h, Some(PortMatch::Any)),
        Some((h, p)) => match p.parse::<u16>() {
            Ok(port) => (h, Some(PortMatch::Exact(port))),
            Err(_) => return None,
        },
        None => (authority, None),
    };

    Some(AncestorSource::Host {
        scheme,
        host: host.to_string(),
        port,
    })
}

fn is_network_scheme(scheme: &str) -> bool {
    matches!(scheme, "http" | "https" | "ws" | "wss")
}

/// Scheme matching with the http -> https upgrade allowance
fn scheme_matches(expected: &str, actual: &str) -> bool {
    expected == actual
        || (expected == "http" && actual == "https")
        || (expected == "ws" && matches!(actual, "wss" | "http" | "https"))
        || (expected == "wss" && actual == "https")
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" | "ws" => Some(80),
        "https" | "wss" => Some(443),
        _ => None,
    }
}

fn source_matches(source: &AncestorSource, target: &Url, embedder: &Url) -> bool {
    match source {
        AncestorSource::None => false,
        AncestorSource::SelfOrigin => embedder.origin() == target.origin(),
        AncestorSource::Wildcard => is_network_scheme(embedder.scheme()),
        AncestorSource::Scheme(scheme) => scheme_matches(scheme, embedder.scheme()),
        AncestorSource::Host { scheme, host, port } => {
            let scheme_ok = match scheme {
                Some(s) => scheme_matches(s, embedder.scheme()),
                None => scheme_matches(target.scheme(), embedder.scheme()),
            };
            if !scheme_ok {
                return false;
            }

            let embedder_host = match embedder.host_str() {
                Some(h) => h.to_ascii_lowercase(),
                None => return false,
            };
            let host_ok = match host.strip_prefix("*.") {
                Some(suffix) => embedder_host.ends_with(&format!(".{}", suffix)),
                None => embedder_host == *host,
            };
            if !host_ok {
                return false;
            }

            let embedder_port = embedder.port_or_known_default();
            match port {
                Some(PortMatch::Any) => true,
                Some(PortMatch::Exact(p)) => embedder_port == Some(*p),
                None => {
                    let expected = scheme
                        .as_deref()
                        .and_then(default_port)
                        .or_else(|| default_port(embedder.scheme()));
                    embedder_port == expected
                        || (expected == Some(80) && embedder_port == Some(443))
                }
            }
        }
    }
}

/// X-Frame-Options as a browser interprets it
#[derive(Debug, Clone, PartialEq, Eq)]
enum XfoDirective {
    Deny,
    SameOrigin,
    Conflict(String),
}

fn parse_xfo(value: &str) -> Option<XfoDirective> {
    let mut values: Vec<String> = value
        .split(',')
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
        .collect();
    values.sort();
    values.dedup();

    let known = |v: &String| matches!(v.as_str(), "deny" | "sameorigin" | "allowall");
    if values.len() > 1 && values.iter().any(known) {
        return Some(XfoDirective::Conflict(values.join(", ")));
    }

    match values.first().map(String::as_str) {
        Some("deny") => Some(XfoDirective::Deny),
        Some("sameorigin") => Some(XfoDirective::SameOrigin),
        _ => None,
    }
}

/// Framing-relevant policy of one response
#[derive(Debug, Clone, Default)]
pub struct FramingPolicy {
    frame_ancestors: Vec<FrameAncestors>,
    xfo: Option<XfoDirective>,
}

impl FramingPolicy {
    /// Collect enforced policies from response headers. Comma-joined CSP
    /// values are separate policies and each one is enforced.
    pub fn from_headers(headers: &HeaderSet) -> Self {
        let frame_ancestors = headers
            .get(CONTENT_SECURITY_POLICY)
            .map(|csp| csp.split(',').filter_map(FrameAncestors::from_policy).collect())
            .unwrap_or_default();

        let xfo = headers.get(X_FRAME_OPTIONS).and_then(parse_xfo);

        Self {
            frame_ancestors,
            xfo,
        }
    }

    /// Whether any enforced frame-ancestors directive exists
    pub fn has_frame_ancestors(&self) -> bool {
        !self.frame_ancestors.is_empty()
    }

    /// Decide whether `embedder` may display the response for `target`
    pub fn decide(&self, target: &Url, embedder: &Url) -> FramingDecision {
        if self.has_frame_ancestors() {
            for directive in &self.frame_ancestors {
                if !directive.allows(target, embedder) {
                    return FramingDecision::Refused(RefusalReason::FrameAncestors(
                        directive.raw().to_string(),
                    ));
                }
            }
            return FramingDecision::Allowed;
        }

        match &self.xfo {
            Some(XfoDirective::Deny) => FramingDecision::Refused(RefusalReason::XfoDeny),
            Some(XfoDirective::SameOrigin) => {
                if same_origin(target, embedder) {
                    FramingDecision::Allowed
                } else {
                    FramingDecision::Refused(RefusalReason::XfoSameOrigin)
                }
            }
            Some(XfoDirective::Conflict(values)) => {
                FramingDecision::Refused(RefusalReason::XfoConflict(values.clone()))
            }
            None => FramingDecision::Allowed,
        }
    }
}

/// Tuple-origin equality; opaque origins are never same-origin
pub fn same_origin(a: &Url, b: &Url) -> bool {
    match (a.origin(), b.origin()) {
        (o @ Origin::Tuple(..), p @ Origin::Tuple(..)) => o == p,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn decide(pairs: &[(&str, &str)], target: &str, embedder: &str) -> FramingDecision {
        let headers = HeaderSet::from_pairs(pairs.iter().copied());
        FramingPolicy::from_headers(&headers).decide(&url(target), &url(embedder))
    }

    const TARGET: &str = "https://bank.example/account";
    const ATTACKER: &str = "https://evil.example/";

    #[test]
    fn test_no_headers_allows() {
        assert!(decide(&[], TARGET, ATTACKER).is_allowed());
    }

    #[test]
    fn test_xfo_deny() {
        assert_eq!(
            decide(&[("x-frame-options", "DENY")], TARGET, ATTACKER),
            FramingDecision::Refused(RefusalReason::XfoDeny)
        );
    }

    #[test]
    fn test_xfo_sameorigin() {
        let headers = [("x-frame-options", "sameorigin")];
        assert_eq!(
            decide(&headers, TARGET, ATTACKER),
            FramingDecision::Refused(RefusalReason::XfoSameOrigin)
        );
        assert!(decide(&headers, TARGET, "https://bank.example/other").is_allowed());
    }

    #[test]
    fn test_xfo_allow_from_ignored() {
        assert!(decide(
            &[("x-frame-options", "ALLOW-FROM https://evil.example")],
            TARGET,
            ATTACKER
        )
        .is_allowed());
    }

    #[test]
    fn test_xfo_conflict_refuses() {
        let decision = decide(&[("x-frame-options", "SAMEORIGIN, ALLOWALL")], TARGET, ATTACKER);
        assert!(matches!(
            decision,
            FramingDecision::Refused(RefusalReason::XfoConflict(_))
        ));
    }

    #[test]
    fn test_xfo_repeated_same_value() {
        assert_eq!(
            decide(&[("x-frame-options", "DENY, deny")], TARGET, ATTACKER),
            FramingDecision::Refused(RefusalReason::XfoDeny)
        );
    }

    #[test]
    fn test_frame_ancestors_none() {
        let decision = decide(
            &[("content-security-policy", "default-src 'self'; frame-ancestors 'none'")],
            TARGET,
            ATTACKER,
        );
        assert_eq!(
            decision,
            FramingDecision::Refused(RefusalReason::FrameAncestors(
                "frame-ancestors 'none'".to_string()
            ))
        );
    }

    #[test]
    fn test_frame_ancestors_self() {
        let headers = [("content-security-policy", "frame-ancestors 'self'")];
        assert!(!decide(&headers, TARGET, ATTACKER).is_allowed());
        assert!(decide(&headers, TARGET, "https://bank.example:443/").is_allowed());
    }

    #[test]
    fn test_frame_ancestors_overrides_xfo() {
        let headers = [
            ("x-frame-options", "DENY"),
            ("content-security-policy", "frame-ancestors https://evil.example"),
        ];
        assert!(decide(&headers, TARGET, ATTACKER).is_allowed());
    }

    #[test]
    fn test_frame_ancestors_host_sources() {
        let headers = [(
            "content-security-policy",
            "frame-ancestors *.partner.example http://legacy.example:8080",
        )];
        assert!(decide(&headers, TARGET, "https://app.partner.example/").is_allowed());
        assert!(!decide(&headers, TARGET, "https://partner.example/").is_allowed());
        assert!(decide(&headers, TARGET, "http://legacy.example:8080/").is_allowed());
        assert!(!decide(&headers, TARGET, "http://legacy.example/").is_allowed());
    }

    #[test]
    fn test_frame_ancestors_scheme_and_wildcard() {
        let https_only = [("content-security-policy", "frame-ancestors https:")];
        assert!(decide(&https_only, TARGET, ATTACKER).is_allowed());
        assert!(!decide(&https_only, TARGET, "http://evil.example/").is_allowed());

        let any = [("content-security-policy", "frame-ancestors *")];
        assert!(decide(&any, TARGET, "http://evil.example/").is_allowed());
    }

    #[test]
    fn test_every_policy_must_allow() {
        let headers = HeaderSet::from_pairs([
            ("content-security-policy", "frame-ancestors *"),
            ("content-security-policy", "frame-ancestors 'self'"),
        ]);
        let policy = FramingPolicy::from_headers(&headers);
        assert!(!policy.decide(&url(TARGET), &url(ATTACKER)).is_allowed());
    }

    #[test]
    fn test_report_only_never_blocks() {
        assert!(decide(
            &[("content-security-policy-report-only", "frame-ancestors 'none'")],
            TARGET,
            ATTACKER
        )
        .is_allowed());
    }

    #[test]
    fn test_opaque_origins_never_same_origin() {
        let data = url("data:text/html,hi");
        assert!(!same_origin(&data, &data));
    }
}
