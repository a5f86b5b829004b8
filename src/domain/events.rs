// src/domain/events.rs
// Domain events emitted by state transitions and chat

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::{Message, TradeStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    pub trade_id: Uuid,
    pub old_status: TradeStatus,
    pub new_status: TradeStatus,
    pub actor_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

// Every successful transition emits exactly one StatusChanged. The store
// write commits before the event is published, so missed events are
// recoverable by re-fetching the trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TradeEvent {
    /// Trade moved along the lifecycle
    StatusChanged(StatusChange),

    /// A chat, system, or payment-info message entered the room
    MessagePosted(Message),

    /// A dispute claim was recorded against the trade
    DisputeOpened {
        dispute_id: Uuid,
        trade_id: Uuid,
        raised_by: Uuid,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl TradeEvent {
    pub fn trade_id(&self) -> Uuid {
        match self {
            TradeEvent::StatusChanged(change) => change.trade_id,
            TradeEvent::MessagePosted(message) => message.trade_id,
            TradeEvent::DisputeOpened { trade_id, .. } => *trade_id,
        }
    }
}

// What a trade-room subscriber receives: chat and lifecycle changes
// interleaved as one conversation, tagged with a per-trade sequence
// number usable as a resume cursor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomEvent {
    pub seq: u64,
    pub payload: RoomEventPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RoomEventPayload {
    Message(Message),
    Status(StatusChange),
}
