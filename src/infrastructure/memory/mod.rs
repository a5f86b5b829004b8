// src/infrastructure/memory/repositories.rs
// In-memory implementations of the durable record store

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::StoreResult;
use crate::domain::models::{Dispute, DisputeStatus, Message, Notification, Offer, Profile, Trade};
use crate::domain::repository::{
    DisputeRepository, MessageRepository, NotificationRepository, OfferFilter, OfferRepository,
    ProfileRepository, TradeRepository,
};

pub struct MemoryOfferRepository {
    offers: RwLock<HashMap<Uuid, Offer>>,
}

impl MemoryOfferRepository {
    pub fn new() -> Self {
        Self {
            offers: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryOfferRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OfferRepository for MemoryOfferRepository {
    async fn insert(&self, offer: &Offer) -> StoreResult<()> {
        let mut offers = self.offers.write().await;
        offers.insert(offer.id, offer.clone());
        Ok(())
    }

    async fn get(&self, offer_id: Uuid) -> StoreResult<Option<Offer>> {
        let offers = self.offers.read().await;
        Ok(offers.get(&offer_id).cloned())
    }

    async fn list(&self, filter: &OfferFilter) -> StoreResult<Vec<Offer>> {
        let offers = self.offers.read().await;
        let mut matches: Vec<Offer> = offers
            .values()
            .filter(|offer| {
                filter
                    .platform
                    .as_ref()
                    .map_or(true, |p| offer.platform.eq_ignore_ascii_case(p))
                    && filter
                        .currency
                        .as_ref()
                        .map_or(true, |c| offer.currency.eq_ignore_ascii_case(c))
                    && filter.seller_id.map_or(true, |s| offer.seller_id == s)
                    && (!filter.active_only || offer.active)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn update(&self, offer: &Offer) -> StoreResult<()> {
        let mut offers = self.offers.write().await;
        offers.insert(offer.id, offer.clone());
        Ok(())
    }
}

pub struct MemoryTradeRepository {
    trades: RwLock<HashMap<Uuid, Trade>>,
}

impl MemoryTradeRepository {
    pub fn new() -> Self {
        Self {
            trades: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryTradeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TradeRepository for MemoryTradeRepository {
    async fn insert(&self, trade: &Trade) -> StoreResult<()> {
        let mut trades = self.trades.write().await;
        trades.insert(trade.id, trade.clone());
        Ok(())
    }

    async fn get(&self, trade_id: Uuid) -> StoreResult<Option<Trade>> {
        let trades = self.trades.read().await;
        Ok(trades.get(&trade_id).cloned())
    }

    async fn update(&self, trade: &Trade) -> StoreResult<()> {
        let mut trades = self.trades.write().await;
        trades.insert(trade.id, trade.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Trade>> {
        let trades = self.trades.read().await;
        let mut matches: Vec<Trade> = trades
            .values()
            .filter(|trade| trade.is_participant(user_id))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }
}

pub struct MemoryMessageRepository {
    by_trade: RwLock<HashMap<Uuid, Vec<Message>>>,
}

impl MemoryMessageRepository {
    pub fn new() -> Self {
        Self {
            by_trade: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryMessageRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageRepository for MemoryMessageRepository {
    async fn append(&self, mut message: Message) -> StoreResult<Message> {
        let mut by_trade = self.by_trade.write().await;
        let log = by_trade.entry(message.trade_id).or_default();
        // Insertion order breaks creation-time ties
        message.seq = log.len() as u64;
        log.push(message.clone());
        Ok(message)
    }

    async fn list_for_trade(&self, trade_id: Uuid) -> StoreResult<Vec<Message>> {
        let by_trade = self.by_trade.read().await;
        Ok(by_trade.get(&trade_id).cloned().unwrap_or_default())
    }
}

pub struct MemoryDisputeRepository {
    disputes: RwLock<HashMap<Uuid, Dispute>>,
}

impl MemoryDisputeRepository {
    pub fn new() -> Self {
        Self {
            disputes: RwLock::new(HashMap::new()),
        }
    }

    pub async fn count_for_trade(&self, trade_id: Uuid) -> usize {
        let disputes = self.disputes.read().await;
        disputes
            .values()
            .filter(|dispute| dispute.trade_id == trade_id)
            .count()
    }
}

impl Default for MemoryDisputeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DisputeRepository for MemoryDisputeRepository {
    async fn insert(&self, dispute: &Dispute) -> StoreResult<()> {
        let mut disputes = self.disputes.write().await;
        disputes.insert(dispute.id, dispute.clone());
        Ok(())
    }

    async fn get(&self, dispute_id: Uuid) -> StoreResult<Option<Dispute>> {
        let disputes = self.disputes.read().await;
        Ok(disputes.get(&dispute_id).cloned())
    }

    async fn update(&self, dispute: &Dispute) -> StoreResult<()> {
        let mut disputes = self.disputes.write().await;
        disputes.insert(dispute.id, dispute.clone());
        Ok(())
    }

    async fn find_open_for_trade(&self, trade_id: Uuid) -> StoreResult<Option<Dispute>> {
        let disputes = self.disputes.read().await;
        Ok(disputes
            .values()
            .find(|dispute| dispute.trade_id == trade_id && dispute.status == DisputeStatus::Open)
            .cloned())
    }
}

pub struct MemoryNotificationRepository {
    notifications: RwLock<HashMap<Uuid, Notification>>,
}

impl MemoryNotificationRepository {
    pub fn new() -> Self {
        Self {
            notifications: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryNotificationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationRepository for MemoryNotificationRepository {
    async fn insert(&self, notification: &Notification) -> StoreResult<()> {
        let mut notifications = self.notifications.write().await;
        notifications.insert(notification.id, notification.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> StoreResult<Vec<Notification>> {
        let notifications = self.notifications.read().await;
        let mut matches: Vec<Notification> = notifications
            .values()
            .filter(|n| n.recipient_id == user_id && (!unread_only || !n.read))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn get(&self, notification_id: Uuid) -> StoreResult<Option<Notification>> {
        let notifications = self.notifications.read().await;
        Ok(notifications.get(&notification_id).cloned())
    }

    async fn mark_read(&self, notification_id: Uuid) -> StoreResult<Option<Notification>> {
        let mut notifications = self.notifications.write().await;
        Ok(notifications.get_mut(&notification_id).map(|n| {
            n.read = true;
            n.clone()
        }))
    }

    async fn mark_all_read(&self, user_id: Uuid) -> StoreResult<usize> {
        let mut notifications = self.notifications.write().await;
        let mut flipped = 0;
        for n in notifications.values_mut() {
            if n.recipient_id == user_id && !n.read {
                n.read = true;
                flipped += 1;
            }
        }
        Ok(flipped)
    }

    async fn unread_count(&self, user_id: Uuid) -> StoreResult<usize> {
        let notifications = self.notifications.read().await;
        Ok(notifications
            .values()
            .filter(|n| n.recipient_id == user_id && !n.read)
            .count())
    }
}

pub struct MemoryProfileRepository {
    profiles: RwLock<HashMap<Uuid, Profile>>,
    applied: RwLock<HashSet<Uuid>>,
}

impl MemoryProfileRepository {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            applied: RwLock::new(HashSet::new()),
        }
    }
}

impl Default for MemoryProfileRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileRepository for MemoryProfileRepository {
    async fn get_or_create(&self, user_id: Uuid) -> StoreResult<Profile> {
        let mut profiles = self.profiles.write().await;
        Ok(profiles
            .entry(user_id)
            .or_insert_with(|| Profile::new(user_id))
            .clone())
    }

    async fn update(&self, profile: &Profile) -> StoreResult<()> {
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn try_mark_applied(&self, trade_id: Uuid) -> StoreResult<bool> {
        let mut applied = self.applied.write().await;
        Ok(applied.insert(trade_id))
    }
}
