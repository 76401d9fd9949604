//! Search filter passed through to the Group Store

use serde::{Deserialize, Serialize};

use super::custom_group::CustomGroup;

/// Pattern and paging for group listings.
///
/// The tree never interprets this; ordering and paging belong to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub pattern: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl SearchFilter {
    pub fn new(pattern: Option<String>, limit: Option<u32>, offset: Option<u32>) -> Self {
        Self { pattern, limit, offset }
    }

    /// Case-insensitive substring match on uri or display name
    pub fn matches(&self, group: &CustomGroup) -> bool {
        match &self.pattern {
            None => true,
            Some(pattern) => {
                let pattern = pattern.to_lowercase();
                group.uri.to_lowercase().contains(&pattern)
                    || group.display_name.to_lowercase().contains(&pattern)
            }
        }
    }

    /// Apply offset and limit to an already ordered sequence.
    pub fn page<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let offset = self.offset.unwrap_or(0) as usize;
        let iter = items.into_iter().skip(offset);
        match self.limit {
            Some(limit) => iter.take(limit as usize).collect(),
            None => iter.collect(),
        }
    }
}
