//! Persistence interface

use async_trait::async_trait;

use crate::message::{Message, MessageContext, MessageRole};
use crate::room::{Room, RoomUpdate};
use crate::Result;

/// Room and message persistence.
///
/// Implementations must keep message timestamps strictly monotonic within a
/// room, since history selection relies on "the most recent message" being
/// unambiguous. A missing room surfaces as `Error::NotFound`, distinct from
/// other storage failures.
#[async_trait]
pub trait ChatStore: Send + Sync + 'static {
    /// Create a room, assigning its id and creation timestamp
    async fn create_room(
        &self,
        name: &str,
        file_context: Option<String>,
        collection_name: Option<String>,
    ) -> Result<Room>;

    /// Fetch a room by id
    async fn get_room(&self, room_id: i64) -> Result<Room>;

    /// All rooms, newest first
    async fn list_rooms(&self) -> Result<Vec<Room>>;

    /// All messages of a room, ordered by timestamp ascending
    async fn get_messages(&self, room_id: i64) -> Result<Vec<Message>>;

    /// Append a message to a room
    async fn add_message(
        &self,
        room_id: i64,
        content: &str,
        role: MessageRole,
        context: Option<MessageContext>,
    ) -> Result<Message>;

    /// Apply a partial update to a room's mutable fields
    async fn update_room(&self, room_id: i64, update: RoomUpdate) -> Result<Room>;

    /// Delete a room and all its messages. Returns false if it did not exist.
    async fn delete_room(&self, room_id: i64) -> Result<bool>;
}
