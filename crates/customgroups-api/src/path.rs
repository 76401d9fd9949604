//! Tree path extraction
//!
//! The router captures everything after `/` as one wildcard, which axum
//! hands over percent-decoded. It is split into node names here, so an
//! encoded `/` still separates segments and no name carries an escape.

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::ApiError;

/// Decoded, non-empty segments of the request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePath(pub Vec<String>);

impl NodePath {
    pub fn parse(decoded: &str) -> Self {
        NodePath(
            decoded
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Split off the last segment, which names the node being created.
    pub fn split_leaf(&self) -> Option<(&[String], &str)> {
        self.0
            .split_last()
            .map(|(leaf, parent)| (parent, leaf.as_str()))
    }
}

impl std::fmt::Display for NodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.0.join("/"))
    }
}

impl<S> FromRequestParts<S> for NodePath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if parts.uri.path().trim_matches('/').is_empty() {
            return Ok(NodePath(Vec::new()));
        }

        let Path(decoded) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(NodePath::parse(&decoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_empty_segments() {
        let path = NodePath::parse("users//alice/groups/");
        assert_eq!(path.segments(), ["users", "alice", "groups"]);
        assert_eq!(path.to_string(), "/users/alice/groups");
        assert!(NodePath::parse("").segments().is_empty());
    }

    #[test]
    fn test_split_leaf() {
        let path = NodePath::parse("groups/g1/members/a b");
        let (parent, leaf) = path.split_leaf().unwrap();
        assert_eq!(parent, ["groups", "g1", "members"]);
        assert_eq!(leaf, "a b");
        assert!(NodePath::parse("/").split_leaf().is_none());
    }
}
