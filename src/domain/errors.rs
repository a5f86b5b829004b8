// src/domain/errors.rs
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::TradeStatus;
use crate::domain::state::TradeActionKind;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Trade error: {0}")]
    Trade(#[from] TradeError),

    #[error("Access error: {0}")]
    Access(#[from] AccessError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Validation and state-conflict failures. State-conflict variants carry
// the current authoritative status so a client can resynchronize instead
// of retrying blindly.
#[derive(Error, Debug)]
pub enum TradeError {
    #[error("amount {amount} is outside offer bounds [{min}, {max}]")]
    InvalidAmount {
        amount: Decimal,
        min: Decimal,
        max: Decimal,
    },

    #[error("offer rate must be positive, got {rate}")]
    InvalidRate { rate: Decimal },

    #[error("offer bounds invalid: min {min}, max {max}, available {available}")]
    InvalidOfferBounds {
        min: Decimal,
        max: Decimal,
        available: Decimal,
    },

    #[error("offer has only {available} available, {requested} requested")]
    InsufficientAvailability {
        requested: Decimal,
        available: Decimal,
    },

    #[error("buyer and seller must be different users")]
    SelfTradeForbidden,

    #[error("offer is not active")]
    OfferInactive,

    #[error("a receipt attachment is required")]
    MissingAttachment,

    #[error("trade cannot be cancelled while {current}; raise a dispute instead")]
    TradeNotCancellable { current: TradeStatus },

    #[error("action {action} is not allowed while trade is {current}")]
    InvalidTransition {
        action: TradeActionKind,
        current: TradeStatus,
    },

    #[error("a dispute is already open for this trade")]
    DisputeAlreadyOpen,

    #[error("no open dispute for this trade")]
    NoOpenDispute,

    #[error("chat is closed: trade is {current}")]
    TradeTerminatedForChat { current: TradeStatus },

    #[error("message needs a body or an attachment")]
    EmptyMessage,

    #[error("message body exceeds {limit} characters")]
    MessageTooLong { limit: usize },

    #[error("offer {0} not found")]
    OfferNotFound(Uuid),

    #[error("trade {0} not found")]
    TradeNotFound(Uuid),

    #[error("dispute {0} not found")]
    DisputeNotFound(Uuid),

    #[error("notification {0} not found")]
    NotificationNotFound(Uuid),
}

// Authorization failures are fatal for the request and never retried
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("user {user_id} is not a participant of trade {trade_id}")]
    NotAParticipant { user_id: Uuid, trade_id: Uuid },

    #[error("user {user_id} does not own offer {offer_id}")]
    NotOfferOwner { user_id: Uuid, offer_id: Uuid },

    #[error("user {user_id} is not an arbiter")]
    NotAnArbiter { user_id: Uuid },

    #[error("notification belongs to another user")]
    NotNotificationOwner,

    #[error("only the {role} may perform this action")]
    WrongParty { role: &'static str },
}

// Infrastructure failures: reads are safe to retry with backoff, writes
// go through idempotent event re-derivation instead of re-applying the
// transition.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("write conflict on {0}")]
    WriteConflict(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("no room registered for trade {0}")]
    RoomNotFound(Uuid),

    #[error("subscriber lagged behind the event buffer")]
    Lagged,
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
pub type StoreResult<T> = Result<T, StoreError>;
