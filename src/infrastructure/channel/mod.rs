// src/infrastructure/channel/room_hub.rs
// Per-trade event log and broadcast fan-out

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::domain::errors::{AppResult, ChannelError};
use crate::domain::events::{RoomEvent, RoomEventPayload};
use crate::domain::models::Notification;
use crate::domain::service::{RealtimeChannel, RoomSubscription};

// One broadcast channel plus a replayable sequenced log per trade room,
// and one broadcast channel per connected user for notification pushes.
// Publishing takes the write lock, so a subscriber snapshotting its
// backlog under the read lock can never miss an event in between.
pub struct RoomHub {
    rooms: RwLock<HashMap<Uuid, RoomState>>,
    users: RwLock<HashMap<Uuid, broadcast::Sender<Notification>>>,
    room_buffer: usize,
    user_buffer: usize,
}

struct RoomState {
    next_seq: u64,
    log: Vec<RoomEvent>,
    tx: broadcast::Sender<RoomEvent>,
}

impl RoomHub {
    pub fn new(room_buffer: usize, user_buffer: usize) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            users: RwLock::new(HashMap::new()),
            room_buffer,
            user_buffer,
        }
    }
}

#[async_trait]
impl RealtimeChannel for RoomHub {
    async fn register_room(&self, trade_id: Uuid) {
        let mut rooms = self.rooms.write().await;
        rooms.entry(trade_id).or_insert_with(|| {
            let (tx, _rx) = broadcast::channel(self.room_buffer);
            RoomState {
                next_seq: 0,
                log: Vec::new(),
                tx,
            }
        });
    }

    async fn publish_room(
        &self,
        trade_id: Uuid,
        payload: RoomEventPayload,
    ) -> AppResult<RoomEvent> {
        let mut rooms = self.rooms.write().await;
        let room = rooms
            .get_mut(&trade_id)
            .ok_or(ChannelError::RoomNotFound(trade_id))?;

        let event = RoomEvent {
            seq: room.next_seq,
            payload,
        };
        room.next_seq += 1;
        room.log.push(event.clone());

        // No receivers connected is fine; the log serves the backlog
        let _ = room.tx.send(event.clone());
        Ok(event)
    }

    async fn subscribe_room(
        &self,
        trade_id: Uuid,
        cursor: Option<u64>,
    ) -> AppResult<RoomSubscription> {
        let rooms = self.rooms.read().await;
        let room = rooms
            .get(&trade_id)
            .ok_or(ChannelError::RoomNotFound(trade_id))?;

        let backlog = match cursor {
            Some(after) => room
                .log
                .iter()
                .filter(|event| event.seq > after)
                .cloned()
                .collect(),
            None => room.log.clone(),
        };

        Ok(RoomSubscription {
            backlog,
            live: room.tx.subscribe(),
        })
    }

    async fn push_user(&self, user_id: Uuid, notification: &Notification) {
        let users = self.users.read().await;
        if let Some(tx) = users.get(&user_id) {
            // A full or closed feed only costs this push; the store
            // remains queryable
            if tx.send(notification.clone()).is_err() {
                log::debug!("No live listeners for user {}", user_id);
            }
        }
    }

    async fn subscribe_user(&self, user_id: Uuid) -> broadcast::Receiver<Notification> {
        let mut users = self.users.write().await;
        users
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(self.user_buffer).0)
            .subscribe()
    }
}
