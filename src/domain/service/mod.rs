// src/domain/service/mod.rs
// External collaborator interfaces

use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::errors::{AppResult, StoreResult};
use crate::domain::events::{RoomEvent, RoomEventPayload};
use crate::domain::models::Notification;

/// Blob store collaborator: store a file, get a retrievable URL back.
/// Used by the receipt and attachment flows.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, bytes: Vec<u8>, content_type: &str) -> StoreResult<String>;
}

/// A live trade-room subscription: everything after the caller's cursor,
/// then a receiver for events published from now on. A reconnecting
/// client passes the seq of its last seen event and never gaps.
#[derive(Debug)]
pub struct RoomSubscription {
    pub backlog: Vec<RoomEvent>,
    pub live: broadcast::Receiver<RoomEvent>,
}

/// Real-time fan-out collaborator. Publication happens strictly after
/// the corresponding store write has committed; dropping a receiver just
/// unregisters it and never touches trade or message state.
#[async_trait]
pub trait RealtimeChannel: Send + Sync {
    /// Create the event log for a new trade room
    async fn register_room(&self, trade_id: Uuid);

    /// Sequence, log, and broadcast one room event
    async fn publish_room(&self, trade_id: Uuid, payload: RoomEventPayload)
        -> AppResult<RoomEvent>;

    /// Subscribe to a trade room, resuming after `cursor` when given
    async fn subscribe_room(&self, trade_id: Uuid, cursor: Option<u64>)
        -> AppResult<RoomSubscription>;

    /// Best-effort push of a notification to a connected user
    async fn push_user(&self, user_id: Uuid, notification: &Notification);

    /// Live notification feed for one user
    async fn subscribe_user(&self, user_id: Uuid) -> broadcast::Receiver<Notification>;
}
