use crate::model::change::ItemChangeSet;
use crate::model::revision::Revision;
use serde::{Deserialize, Serialize};

/// Completeness marker of a feed response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseType {
    Complete,
    /// Time budget ran out; resume with the same window
    Partial,
}

/// Payload returned for one feed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub items: Vec<ItemChangeSet>,
    /// Every item currently in the container; absent on partial responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_item_ids: Option<Vec<String>>,
    pub response_type: ResponseType,
    pub from_revision: Revision,
    pub to_revision: Revision,
}

impl ResponseEnvelope {
    pub fn is_partial(&self) -> bool {
        self.response_type == ResponseType::Partial
    }

    pub fn item(&self, id: &str) -> Option<&ItemChangeSet> {
        self.items.iter().find(|item| item.id == id)
    }
}
