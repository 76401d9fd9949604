// ============================================================================
// Custom Groups Core - Custom Group Entity
// File: crates/customgroups-core/src/domain/custom_group.rs
// Description: Group record addressed by its URI
// ============================================================================

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Internal, stable group reference used for store operations
pub type GroupId = Uuid;

/// Custom group record.
///
/// `uri` is unique across all groups and is the externally addressable
/// name; `id` never leaves the store/tree boundary in paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomGroup {
    pub id: GroupId,
    pub uri: String,
    pub display_name: String,
}

impl CustomGroup {
    pub fn new(id: GroupId, uri: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id,
            uri: uri.into(),
            display_name: display_name.into(),
        }
    }
}

/// Candidate group, validated before it reaches the store
#[derive(Debug, Clone, Validate)]
pub struct NewGroup {
    #[validate(
        length(min = 1, max = 200, message = "Group uri must be between 1 and 200 characters"),
        custom(function = "validate_group_uri")
    )]
    pub uri: String,

    #[validate(length(min = 1, max = 255, message = "Display name must be between 1 and 255 characters"))]
    pub display_name: String,
}

impl NewGroup {
    /// Display name falls back to the uri when none is given.
    pub fn new(uri: &str, display_name: Option<&str>) -> Result<Self, validator::ValidationErrors> {
        let uri = uri.trim().to_string();
        let display_name = display_name
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| uri.clone());

        let group = Self { uri, display_name };
        group.validate()?;
        Ok(group)
    }
}

/// Group uris are single path segments.
fn validate_group_uri(uri: &str) -> Result<(), ValidationError> {
    if uri == "." || uri == ".." {
        return Err(ValidationError::new("reserved_uri"));
    }
    let path_safe = uri
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if !path_safe {
        return Err(ValidationError::new("invalid_uri_characters"));
    }
    Ok(())
}
