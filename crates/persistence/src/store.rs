//! In-memory chat store
//!
//! Rooms and messages in process memory behind the `ChatStore` trait. Ids
//! are assigned from an atomic counter; message timestamps within a room
//! are strictly monotonic, nudged forward by a millisecond when the clock
//! reads the same instant twice.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{debug, info};
use tutor_core::traits::ChatStore;
use tutor_core::{Error, Message, MessageContext, MessageRole, Result, Room, RoomUpdate};

#[derive(Debug)]
struct RoomRecord {
    room: Room,
    messages: Vec<Message>,
    last_timestamp: Option<DateTime<Utc>>,
}

/// Process-local store keyed by room id
#[derive(Debug, Default)]
pub struct InMemoryChatStore {
    rooms: DashMap<i64, RoomRecord>,
    next_id: AtomicI64,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn not_found(room_id: i64) -> Error {
        Error::NotFound(format!("room {}", room_id))
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn create_room(
        &self,
        name: &str,
        file_context: Option<String>,
        collection_name: Option<String>,
    ) -> Result<Room> {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("room name must not be empty".into()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let room = Room {
            id,
            name: name.to_string(),
            created_at: Utc::now(),
            file_context,
            collection_name,
        };
        self.rooms.insert(
            id,
            RoomRecord {
                room: room.clone(),
                messages: Vec::new(),
                last_timestamp: None,
            },
        );
        info!(room_id = id, name, "room created");
        Ok(room)
    }

    async fn get_room(&self, room_id: i64) -> Result<Room> {
        self.rooms
            .get(&room_id)
            .map(|r| r.room.clone())
            .ok_or_else(|| Self::not_found(room_id))
    }

    async fn list_rooms(&self) -> Result<Vec<Room>> {
        let mut rooms: Vec<Room> = self.rooms.iter().map(|r| r.room.clone()).collect();
        rooms.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rooms)
    }

    async fn get_messages(&self, room_id: i64) -> Result<Vec<Message>> {
        self.rooms
            .get(&room_id)
            .map(|r| r.messages.clone())
            .ok_or_else(|| Self::not_found(room_id))
    }

    async fn add_message(
        &self,
        room_id: i64,
        content: &str,
        role: MessageRole,
        context: Option<MessageContext>,
    ) -> Result<Message> {
        let mut record = self
            .rooms
            .get_mut(&room_id)
            .ok_or_else(|| Self::not_found(room_id))?;

        let now = Utc::now();
        let timestamp = match record.last_timestamp {
            Some(last) if now <= last => last + Duration::milliseconds(1),
            _ => now,
        };
        record.last_timestamp = Some(timestamp);

        let message = Message {
            room_id,
            content: content.to_string(),
            role,
            timestamp,
            context,
        };
        record.messages.push(message.clone());
        debug!(room_id, role = %role, "message stored");
        Ok(message)
    }

    async fn update_room(&self, room_id: i64, update: RoomUpdate) -> Result<Room> {
        let mut record = self
            .rooms
            .get_mut(&room_id)
            .ok_or_else(|| Self::not_found(room_id))?;

        if let Some(file_context) = update.file_context {
            record.room.file_context = Some(file_context);
        }
        if let Some(collection_name) = update.collection_name {
            record.room.collection_name = Some(collection_name);
        }
        Ok(record.room.clone())
    }

    async fn delete_room(&self, room_id: i64) -> Result<bool> {
        let removed = self.rooms.remove(&room_id).is_some();
        if removed {
            info!(room_id, "room deleted");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_fetch_room() {
        let store = InMemoryChatStore::new();
        let room = store.create_room("biology", None, None).await.unwrap();
        assert!(room.id >= 1);
        let fetched = store.get_room(room.id).await.unwrap();
        assert_eq!(fetched, room);
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let store = InMemoryChatStore::new();
        let err = store.create_room("  ", None, None).await.unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_missing_room_is_not_found() {
        let store = InMemoryChatStore::new();
        assert!(store.get_room(99).await.unwrap_err().is_not_found());
        assert!(store.get_messages(99).await.unwrap_err().is_not_found());
        assert!(store
            .add_message(99, "hi", MessageRole::User, None)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_message_timestamps_strictly_increase() {
        let store = InMemoryChatStore::new();
        let room = store.create_room("r", None, None).await.unwrap();
        for i in 0..20 {
            store
                .add_message(room.id, &format!("m{}", i), MessageRole::User, None)
                .await
                .unwrap();
        }
        let messages = store.get_messages(room.id).await.unwrap();
        for pair in messages.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[tokio::test]
    async fn test_partial_room_update() {
        let store = InMemoryChatStore::new();
        let room = store.create_room("r", None, None).await.unwrap();

        let updated = store
            .update_room(room.id, RoomUpdate::new().with_file_context("doc.txt"))
            .await
            .unwrap();
        assert_eq!(updated.file_context.as_deref(), Some("doc.txt"));
        assert!(updated.collection_name.is_none());

        let updated = store
            .update_room(
                room.id,
                RoomUpdate::new().with_collection_name("collection_7"),
            )
            .await
            .unwrap();
        assert_eq!(updated.file_context.as_deref(), Some("doc.txt"));
        assert_eq!(updated.collection_name.as_deref(), Some("collection_7"));
    }

    #[tokio::test]
    async fn test_delete_cascades_messages() {
        let store = InMemoryChatStore::new();
        let room = store.create_room("r", None, None).await.unwrap();
        store
            .add_message(room.id, "hello", MessageRole::User, None)
            .await
            .unwrap();

        assert!(store.delete_room(room.id).await.unwrap());
        assert!(!store.delete_room(room.id).await.unwrap());
        assert!(store.get_messages(room.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_rooms_newest_first() {
        let store = InMemoryChatStore::new();
        let a = store.create_room("first", None, None).await.unwrap();
        let b = store.create_room("second", None, None).await.unwrap();
        let rooms = store.list_rooms().await.unwrap();
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].id, b.id);
        assert_eq!(rooms[1].id, a.id);
    }
}
