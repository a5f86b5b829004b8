// src/adapter/coordinator.rs
// Composition root for the trade coordination core

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::application::dto::{CreateOfferRequest, ReceiptUpload};
use crate::application::usecase::{
    DisputeDesk, NotificationDispatcher, OfferCatalog, ReputationUpdater, TradeLifecycle,
    TradeRooms,
};
use crate::config::Config;
use crate::domain::errors::AppResult;
use crate::domain::models::{
    Dispute, DisputeOutcome, Message, Notification, Offer, Profile, Trade,
};
use crate::domain::repository::{
    DisputeRepository, MessageRepository, NotificationRepository, OfferFilter, OfferRepository,
    ProfileRepository, TradeRepository,
};
use crate::domain::service::{BlobStore, RealtimeChannel, RoomSubscription};
use crate::domain::state::TradeAction;

/// Every store and collaborator the core is wired against
pub struct CoordinatorDeps {
    pub offers: Arc<dyn OfferRepository>,
    pub trades: Arc<dyn TradeRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub disputes: Arc<dyn DisputeRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub blobs: Arc<dyn BlobStore>,
    pub channel: Arc<dyn RealtimeChannel>,
    /// User ids holding the arbiter capability
    pub arbiters: HashSet<Uuid>,
}

// The one surface the (excluded) API layer talks to. Callers always pass
// the acting user's id explicitly; the core never looks identity up from
// ambient context.
pub struct TradeCoordinator {
    catalog: Arc<OfferCatalog>,
    lifecycle: Arc<TradeLifecycle>,
    rooms: Arc<TradeRooms>,
    disputes: Arc<DisputeDesk>,
    notifier: Arc<NotificationDispatcher>,
    reputation: Arc<ReputationUpdater>,
    blobs: Arc<dyn BlobStore>,
}

impl TradeCoordinator {
    pub fn new(config: &Config, deps: CoordinatorDeps) -> Self {
        let catalog = Arc::new(OfferCatalog::new(deps.offers));
        let notifier = Arc::new(NotificationDispatcher::new(
            deps.notifications,
            deps.channel.clone(),
        ));
        let reputation = Arc::new(ReputationUpdater::new(deps.profiles));
        let rooms = Arc::new(TradeRooms::new(
            deps.trades.clone(),
            deps.messages,
            deps.channel.clone(),
            notifier.clone(),
            config.chat.max_body_length,
        ));
        let lifecycle = Arc::new(TradeLifecycle::new(
            deps.trades,
            deps.disputes.clone(),
            catalog.clone(),
            rooms.clone(),
            notifier.clone(),
            reputation.clone(),
            deps.channel,
        ));
        let disputes = Arc::new(DisputeDesk::new(
            deps.disputes,
            lifecycle.clone(),
            deps.arbiters,
        ));

        Self {
            catalog,
            lifecycle,
            rooms,
            disputes,
            notifier,
            reputation,
            blobs: deps.blobs,
        }
    }

    // --- Offer catalog ---

    pub async fn create_offer(&self, request: CreateOfferRequest) -> AppResult<Offer> {
        self.catalog.create_offer(request).await
    }

    pub async fn list_offers(&self, filter: &OfferFilter) -> AppResult<Vec<Offer>> {
        self.catalog.list_offers(filter).await
    }

    pub async fn get_offer(&self, offer_id: Uuid) -> AppResult<Offer> {
        self.catalog.get_offer(offer_id).await
    }

    pub async fn set_offer_active(
        &self,
        offer_id: Uuid,
        seller_id: Uuid,
        active: bool,
    ) -> AppResult<Offer> {
        self.catalog
            .set_offer_active(offer_id, seller_id, active)
            .await
    }

    pub async fn restock_offer(
        &self,
        offer_id: Uuid,
        seller_id: Uuid,
        additional: Decimal,
    ) -> AppResult<Offer> {
        self.catalog
            .restock_offer(offer_id, seller_id, additional)
            .await
    }

    // --- Trade lifecycle ---

    pub async fn create_trade(
        &self,
        offer_id: Uuid,
        buyer_id: Uuid,
        amount_asset: Decimal,
    ) -> AppResult<Trade> {
        self.lifecycle
            .create_trade(offer_id, buyer_id, amount_asset)
            .await
    }

    pub async fn get_trade(&self, trade_id: Uuid) -> AppResult<Trade> {
        self.lifecycle.get_trade(trade_id).await
    }

    pub async fn list_trades_for_user(&self, user_id: Uuid) -> AppResult<Vec<Trade>> {
        self.lifecycle.list_trades_for_user(user_id).await
    }

    pub async fn apply_trade_action(
        &self,
        trade_id: Uuid,
        actor_id: Uuid,
        action: TradeAction,
    ) -> AppResult<Trade> {
        self.lifecycle.apply_action(trade_id, actor_id, action).await
    }

    /// Receipt flow: store the uploaded file, then submit the returned
    /// URL through the normal state-machine action
    pub async fn submit_receipt(
        &self,
        trade_id: Uuid,
        actor_id: Uuid,
        upload: ReceiptUpload,
    ) -> AppResult<Trade> {
        let url = self
            .blobs
            .put(upload.bytes, &upload.content_type)
            .await?;
        self.lifecycle
            .apply_action(
                trade_id,
                actor_id,
                TradeAction::SubmitReceipt {
                    attachment_url: Some(url),
                },
            )
            .await
    }

    // --- Disputes ---

    pub async fn open_dispute(
        &self,
        trade_id: Uuid,
        raiser_id: Uuid,
        reason: String,
    ) -> AppResult<Dispute> {
        self.disputes.open_dispute(trade_id, raiser_id, reason).await
    }

    pub async fn resolve_dispute(
        &self,
        dispute_id: Uuid,
        arbiter_id: Uuid,
        outcome: DisputeOutcome,
    ) -> AppResult<Dispute> {
        self.disputes
            .resolve_dispute(dispute_id, arbiter_id, outcome)
            .await
    }

    pub async fn get_dispute(&self, dispute_id: Uuid) -> AppResult<Dispute> {
        self.disputes.get_dispute(dispute_id).await
    }

    // --- Trade room ---

    pub async fn post_message(
        &self,
        trade_id: Uuid,
        sender_id: Uuid,
        body: Option<String>,
        attachment_url: Option<String>,
    ) -> AppResult<Message> {
        self.rooms
            .post_message(trade_id, sender_id, body, attachment_url)
            .await
    }

    pub async fn subscribe_trade_room(
        &self,
        trade_id: Uuid,
        participant_id: Uuid,
        cursor: Option<u64>,
    ) -> AppResult<RoomSubscription> {
        self.rooms.subscribe(trade_id, participant_id, cursor).await
    }

    pub async fn trade_messages(
        &self,
        trade_id: Uuid,
        participant_id: Uuid,
    ) -> AppResult<Vec<Message>> {
        self.rooms.history(trade_id, participant_id).await
    }

    // --- Notifications ---

    pub async fn get_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> AppResult<Vec<Notification>> {
        self.notifier.notifications_for(user_id, unread_only).await
    }

    pub async fn unread_count(&self, user_id: Uuid) -> AppResult<usize> {
        self.notifier.unread_count(user_id).await
    }

    pub async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> AppResult<Notification> {
        self.notifier.mark_read(user_id, notification_id).await
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> AppResult<usize> {
        self.notifier.mark_all_read(user_id).await
    }

    // --- Reputation ---

    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<Profile> {
        self.reputation.profile_of(user_id).await
    }
}
