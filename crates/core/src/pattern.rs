//! Trigger path patterns
//!
//! A pattern addresses a family of document paths, with `{name}` segments
//! capturing the matched text as a named parameter:
//!
//! ```text
//! users/{userId}/followers/{followerId}
//! ```
//!
//! Matching is segment-wise and exact in length. Captured parameters are
//! handed to trigger handlers as [`PathParams`]; handlers that require a
//! parameter get a hard error when it is absent or empty rather than a
//! silently missing value.

use crate::error::{Error, Result};
use crate::path::DocPath;
use rustc_hash::FxHashMap;
use std::fmt;

/// One segment of a pattern: fixed text or a named capture
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Path pattern with named captures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a pattern from its slash-separated form
    ///
    /// Rules mirror document paths (even segment count, nothing empty), plus:
    /// capture names are non-empty and unique within the pattern.
    ///
    /// # Errors
    /// Returns `Error::InvalidPattern` on any violation.
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.split('/').collect();
        if parts.len() < 2 || parts.len() % 2 != 0 {
            return Err(Error::InvalidPattern(format!(
                "pattern needs an even number of segments: '{}'",
                raw
            )));
        }

        let mut segments = Vec::with_capacity(parts.len());
        let mut seen = FxHashMap::default();
        for part in parts {
            if part.is_empty() {
                return Err(Error::InvalidPattern(format!("empty segment in '{}'", raw)));
            }
            if let Some(name) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                if name.is_empty() {
                    return Err(Error::InvalidPattern(format!("empty capture name in '{}'", raw)));
                }
                if seen.insert(name.to_string(), ()).is_some() {
                    return Err(Error::InvalidPattern(format!(
                        "duplicate capture '{}' in '{}'",
                        name, raw
                    )));
                }
                segments.push(Segment::Param(name.to_string()));
            } else if part.contains('{') || part.contains('}') {
                return Err(Error::InvalidPattern(format!(
                    "malformed capture segment '{}' in '{}'",
                    part, raw
                )));
            } else {
                segments.push(Segment::Literal(part.to_string()));
            }
        }
        Ok(Self { segments })
    }

    /// Match a document path, capturing parameters on success
    pub fn matches(&self, path: &DocPath) -> Option<PathParams> {
        let segs = path.segments();
        if segs.len() != self.segments.len() {
            return None;
        }
        let mut params = FxHashMap::default();
        for (pattern_seg, path_seg) in self.segments.iter().zip(segs) {
            match pattern_seg {
                Segment::Literal(lit) => {
                    if lit != path_seg {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), path_seg.clone());
                }
            }
        }
        Some(PathParams { params })
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .segments
            .iter()
            .map(|s| match s {
                Segment::Literal(lit) => lit.clone(),
                Segment::Param(name) => format!("{{{}}}", name),
            })
            .collect();
        write!(f, "{}", parts.join("/"))
    }
}

/// Parameters captured from a matched path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: FxHashMap<String, String>,
}

impl PathParams {
    /// Look up a captured parameter
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Look up a required parameter
    ///
    /// # Errors
    /// Returns `Error::MissingParam` if the parameter is absent or empty.
    pub fn require(&self, name: &str) -> Result<&str> {
        match self.params.get(name) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(Error::MissingParam(name.to_string())),
        }
    }

    /// Number of captured parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// True when nothing was captured
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn follow_pattern() -> PathPattern {
        PathPattern::parse("users/{userId}/followers/{followerId}").unwrap()
    }

    #[test]
    fn test_match_captures_both_params() {
        let path = DocPath::parse("users/alice/followers/bob").unwrap();
        let params = follow_pattern().matches(&path).unwrap();
        assert_eq!(params.get("userId"), Some("alice"));
        assert_eq!(params.get("followerId"), Some("bob"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_match_rejects_wrong_collection() {
        let path = DocPath::parse("users/alice/likes/bob").unwrap();
        assert!(follow_pattern().matches(&path).is_none());
    }

    #[test]
    fn test_match_rejects_wrong_depth() {
        let shallow = DocPath::parse("users/alice").unwrap();
        let deep = DocPath::parse("users/a/followers/b/x/y").unwrap();
        assert!(follow_pattern().matches(&shallow).is_none());
        assert!(follow_pattern().matches(&deep).is_none());
    }

    #[test]
    fn test_literal_only_pattern() {
        let pattern = PathPattern::parse("config/global").unwrap();
        let path = DocPath::parse("config/global").unwrap();
        let params = pattern.matches(&path).unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn test_parse_rejects_duplicates_and_malformed() {
        assert!(PathPattern::parse("users/{id}/followers/{id}").is_err());
        assert!(PathPattern::parse("users/{}/followers/{f}").is_err());
        assert!(PathPattern::parse("users/{id/followers/{f}").is_err());
        assert!(PathPattern::parse("users/{id}/followers").is_err());
        assert!(PathPattern::parse("users//{id}/x").is_err());
    }

    #[test]
    fn test_require_present_and_missing() {
        let path = DocPath::parse("users/alice/followers/bob").unwrap();
        let params = follow_pattern().matches(&path).unwrap();
        assert_eq!(params.require("userId").unwrap(), "alice");
        assert!(matches!(
            params.require("nope"),
            Err(Error::MissingParam(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_display_round_trip() {
        let raw = "users/{userId}/followers/{followerId}";
        assert_eq!(PathPattern::parse(raw).unwrap().to_string(), raw);
    }

    proptest! {
        #[test]
        fn prop_pattern_matches_any_ids(
            user in "[a-zA-Z0-9_-]{1,12}",
            follower in "[a-zA-Z0-9_-]{1,12}",
        ) {
            let raw = format!("users/{}/followers/{}", user, follower);
            let path = DocPath::parse(&raw).unwrap();
            let params = follow_pattern().matches(&path).unwrap();
            prop_assert_eq!(params.require("userId").unwrap(), user.as_str());
            prop_assert_eq!(params.require("followerId").unwrap(), follower.as_str());
        }
    }
}
