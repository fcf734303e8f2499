// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Response header set as seen by the checker

use std::collections::BTreeMap;

use serde::Serialize;

use crate::http::Response;

/// Immutable response headers keyed by lower-cased name.
///
/// Lookups are case-insensitive. Repeated names are folded into one
/// comma-separated value, the way HTTP combines field lines. Keys are kept
/// sorted so the raw dump is stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HeaderSet {
    headers: BTreeMap<String, String>,
}

impl HeaderSet {
    /// Empty header set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (name, value) pairs in any case
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in pairs {
            let name = name.as_ref().trim().to_ascii_lowercase();
            if name.is_empty() {
                continue;
            }
            let value = value.into();
            headers
                .entry(name)
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }
        Self { headers }
    }

    /// Headers of a response received directly
    pub fn from_response(response: &Response) -> Self {
        Self::from_pairs(response.header_pairs())
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Case-insensitive lookup; absent headers read as empty
    pub fn value(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    /// Check if a header is present
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Iterate (name, value) in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Pretty JSON dump for display
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.headers).unwrap_or_else(|_| "{}".to_string())
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for HeaderSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}
