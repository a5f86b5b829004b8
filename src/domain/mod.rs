// src/domain/mod.rs
pub mod errors;
pub mod events;
pub mod models;
pub mod repository;
pub mod service;
pub mod state;

// Re-export common types for convenience
pub use errors::{AccessError, AppError, AppResult, StoreError, StoreResult, TradeError};
pub use events::{RoomEvent, RoomEventPayload, StatusChange, TradeEvent};
pub use models::{
    Dispute, DisputeOutcome, DisputeStatus, Message, MessageKind, Notification, NotificationKind,
    Offer, Profile, Trade, TradeStatus,
};
pub use state::{TradeAction, TradeActionKind};
