//! Chat rooms

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A conversation room, optionally bound to one uploaded document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Stored path of the attached document, if any
    #[serde(default)]
    pub file_context: Option<String>,
    /// Vector collection holding the document's chunks, if indexed
    #[serde(default)]
    pub collection_name: Option<String>,
}

impl Room {
    pub fn has_document(&self) -> bool {
        self.collection_name.is_some()
    }
}

/// Partial update applied to a room. Fields left `None` are untouched.
#[derive(Debug, Clone, Default)]
pub struct RoomUpdate {
    pub file_context: Option<String>,
    pub collection_name: Option<String>,
}

impl RoomUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file_context(mut self, path: impl Into<String>) -> Self {
        self.file_context = Some(path.into());
        self
    }

    pub fn with_collection_name(mut self, name: impl Into<String>) -> Self {
        self.collection_name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_document_requires_collection() {
        let mut room = Room {
            id: 1,
            name: "study".into(),
            created_at: Utc::now(),
            file_context: Some("data/documents/notes.txt".into()),
            collection_name: None,
        };
        assert!(!room.has_document());
        room.collection_name = Some("collection_1700000000".into());
        assert!(room.has_document());
    }

    #[test]
    fn test_update_builder() {
        let update = RoomUpdate::new()
            .with_file_context("a.txt")
            .with_collection_name("collection_1");
        assert_eq!(update.file_context.as_deref(), Some("a.txt"));
        assert_eq!(update.collection_name.as_deref(), Some("collection_1"));

        let empty = RoomUpdate::new();
        assert!(empty.file_context.is_none() && empty.collection_name.is_none());
    }
}
