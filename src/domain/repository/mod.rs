// src/domain/repository/mod.rs
// Repository interfaces for domain entities

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::StoreResult;
use crate::domain::models::{Dispute, Message, Notification, Offer, Profile, Trade};

/// Filter for offer catalog listings
#[derive(Debug, Clone, Default)]
pub struct OfferFilter {
    pub platform: Option<String>,
    pub currency: Option<String>,
    pub seller_id: Option<Uuid>,
    /// When true, only offers currently accepting trades are returned
    pub active_only: bool,
}

#[async_trait]
pub trait OfferRepository: Send + Sync {
    async fn insert(&self, offer: &Offer) -> StoreResult<()>;
    async fn get(&self, offer_id: Uuid) -> StoreResult<Option<Offer>>;
    async fn list(&self, filter: &OfferFilter) -> StoreResult<Vec<Offer>>;
    async fn update(&self, offer: &Offer) -> StoreResult<()>;
}

#[async_trait]
pub trait TradeRepository: Send + Sync {
    async fn insert(&self, trade: &Trade) -> StoreResult<()>;
    async fn get(&self, trade_id: Uuid) -> StoreResult<Option<Trade>>;
    async fn update(&self, trade: &Trade) -> StoreResult<()>;
    /// Trades where the user is buyer or seller, newest first
    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Trade>>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Append a message, atomically assigning the next per-trade seq.
    /// Returns the stored message with its sequence filled in.
    async fn append(&self, message: Message) -> StoreResult<Message>;
    /// All messages of a trade in seq order
    async fn list_for_trade(&self, trade_id: Uuid) -> StoreResult<Vec<Message>>;
}

#[async_trait]
pub trait DisputeRepository: Send + Sync {
    async fn insert(&self, dispute: &Dispute) -> StoreResult<()>;
    async fn get(&self, dispute_id: Uuid) -> StoreResult<Option<Dispute>>;
    async fn update(&self, dispute: &Dispute) -> StoreResult<()>;
    async fn find_open_for_trade(&self, trade_id: Uuid) -> StoreResult<Option<Dispute>>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: &Notification) -> StoreResult<()>;
    async fn list_for_user(&self, user_id: Uuid, unread_only: bool)
        -> StoreResult<Vec<Notification>>;
    async fn get(&self, notification_id: Uuid) -> StoreResult<Option<Notification>>;
    async fn mark_read(&self, notification_id: Uuid) -> StoreResult<Option<Notification>>;
    /// Returns how many notifications were flipped to read
    async fn mark_all_read(&self, user_id: Uuid) -> StoreResult<usize>;
    async fn unread_count(&self, user_id: Uuid) -> StoreResult<usize>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_or_create(&self, user_id: Uuid) -> StoreResult<Profile>;
    async fn update(&self, profile: &Profile) -> StoreResult<()>;
    /// Dedup ledger for terminal-event application: returns true the
    /// first time a trade id is recorded, false on every later call.
    /// Makes reputation updates idempotent under at-least-once delivery.
    async fn try_mark_applied(&self, trade_id: Uuid) -> StoreResult<bool>;
}
