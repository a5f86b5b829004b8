// src/application/usecase/trade_usecase.rs
// Trade lifecycle driver: creation and state transitions

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::application::usecase::locks::LockRegistry;
use crate::application::usecase::notification_usecase::NotificationDispatcher;
use crate::application::usecase::offer_usecase::OfferCatalog;
use crate::application::usecase::reputation_usecase::ReputationUpdater;
use crate::application::usecase::trade_room_usecase::TradeRooms;
use crate::domain::errors::{AppResult, TradeError};
use crate::domain::events::{RoomEventPayload, StatusChange, TradeEvent};
use crate::domain::models::{Dispute, DisputeOutcome, MessageKind, Trade, TradeStatus};
use crate::domain::repository::{DisputeRepository, TradeRepository};
use crate::domain::service::RealtimeChannel;
use crate::domain::state::{self, TradeAction};

pub struct TradeLifecycle {
    trades: Arc<dyn TradeRepository>,
    disputes: Arc<dyn DisputeRepository>,
    catalog: Arc<OfferCatalog>,
    rooms: Arc<TradeRooms>,
    notifier: Arc<NotificationDispatcher>,
    reputation: Arc<ReputationUpdater>,
    channel: Arc<dyn RealtimeChannel>,
    // One transition in flight per trade id
    locks: LockRegistry,
}

impl TradeLifecycle {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        trades: Arc<dyn TradeRepository>,
        disputes: Arc<dyn DisputeRepository>,
        catalog: Arc<OfferCatalog>,
        rooms: Arc<TradeRooms>,
        notifier: Arc<NotificationDispatcher>,
        reputation: Arc<ReputationUpdater>,
        channel: Arc<dyn RealtimeChannel>,
    ) -> Self {
        Self {
            trades,
            disputes,
            catalog,
            rooms,
            notifier,
            reputation,
            channel,
            locks: LockRegistry::new(),
        }
    }

    /// Open a trade against an offer. Reserves the amount out of the
    /// offer's stock; the reservation is returned on cancellation.
    pub async fn create_trade(
        &self,
        offer_id: Uuid,
        buyer_id: Uuid,
        amount_asset: Decimal,
    ) -> AppResult<Trade> {
        let offer = self.catalog.get_offer(offer_id).await?;
        if offer.seller_id == buyer_id {
            return Err(TradeError::SelfTradeForbidden.into());
        }

        // Atomic against concurrent trades on the same offer
        let offer = self.catalog.reserve(offer_id, amount_asset).await?;

        let trade = Trade::new(&offer, buyer_id, amount_asset);
        if let Err(e) = self.trades.insert(&trade).await {
            // The reservation must not leak if the trade row never lands
            if let Err(release_err) = self.catalog.release(offer_id, amount_asset).await {
                log::error!(
                    "Failed to release reservation on offer {}: {}",
                    offer_id,
                    release_err
                );
            }
            return Err(e.into());
        }

        self.channel.register_room(trade.id).await;
        log::info!(
            "Trade {} opened: buyer {} takes {} against offer {} ({} local)",
            trade.id,
            buyer_id,
            amount_asset,
            offer_id,
            trade.amount_local
        );
        Ok(trade)
    }

    pub async fn get_trade(&self, trade_id: Uuid) -> AppResult<Trade> {
        self.load(trade_id).await
    }

    pub async fn list_trades_for_user(&self, user_id: Uuid) -> AppResult<Vec<Trade>> {
        Ok(self.trades.list_for_user(user_id).await?)
    }

    /// Apply one participant action to the trade, serialized per trade
    /// id. Exactly one of two racing conflicting actions wins; the
    /// loser's error names the post-transition status.
    pub async fn apply_action(
        &self,
        trade_id: Uuid,
        actor_id: Uuid,
        action: TradeAction,
    ) -> AppResult<Trade> {
        let _guard = self.locks.acquire(trade_id).await;

        let mut trade = self.load(trade_id).await?;
        let kind = action.kind();
        state::authorize_actor(&trade, actor_id, kind)?;

        if let TradeAction::SubmitReceipt {
            attachment_url: None,
        } = &action
        {
            return Err(TradeError::MissingAttachment.into());
        }

        let old_status = trade.status;
        trade.status = state::next_status(old_status, kind)?;
        trade.updated_at = Utc::now();
        if let TradeAction::SubmitReceipt {
            attachment_url: Some(url),
        } = &action
        {
            trade.receipt_url = Some(url.clone());
        }

        // Commit before any event leaves the core
        self.trades.update(&trade).await?;
        log::info!(
            "Trade {}: {} by {} ({} -> {})",
            trade_id,
            kind,
            actor_id,
            old_status,
            trade.status
        );

        let dispute_event = self
            .record_action_side_effects(&trade, actor_id, &action)
            .await?;

        self.finish_transition(&trade, old_status, actor_id, dispute_event)
            .await;
        Ok(trade)
    }

    /// Arbiter-only exit from Disputed, driven by the dispute desk after
    /// the arbiter capability has been checked
    pub(crate) async fn resolve_transition(
        &self,
        trade_id: Uuid,
        arbiter_id: Uuid,
        outcome: DisputeOutcome,
    ) -> AppResult<Trade> {
        let _guard = self.locks.acquire(trade_id).await;

        let mut trade = self.load(trade_id).await?;
        let old_status = trade.status;
        trade.status = state::resolve_status(old_status, outcome)?;
        trade.updated_at = Utc::now();
        self.trades.update(&trade).await?;
        log::info!(
            "Trade {}: dispute resolved as {} by arbiter {}",
            trade_id,
            trade.status,
            arbiter_id
        );

        if let Err(e) = self
            .rooms
            .post_transition_message(
                &trade,
                arbiter_id,
                MessageKind::System,
                format!("Dispute resolved: trade {}", trade.status),
                None,
            )
            .await
        {
            log::error!("System message failed for trade {}: {}", trade_id, e);
        }

        self.finish_transition(&trade, old_status, arbiter_id, None)
            .await;
        Ok(trade)
    }

    /// Messages and records that accompany particular actions. Runs
    /// after the status commit, under the same trade lock.
    async fn record_action_side_effects(
        &self,
        trade: &Trade,
        actor_id: Uuid,
        action: &TradeAction,
    ) -> AppResult<Option<TradeEvent>> {
        match action {
            TradeAction::SendPaymentInfo { details } => {
                self.rooms
                    .post_transition_message(
                        trade,
                        actor_id,
                        MessageKind::PaymentInfo,
                        details.clone(),
                        None,
                    )
                    .await?;
                Ok(None)
            }
            TradeAction::SubmitReceipt {
                attachment_url: Some(url),
            } => {
                self.rooms
                    .post_transition_message(
                        trade,
                        actor_id,
                        MessageKind::Chat,
                        "Payment receipt submitted".to_string(),
                        Some(url.clone()),
                    )
                    .await?;
                Ok(None)
            }
            TradeAction::RaiseDispute { reason } => {
                // The dispute row lands under the same lock as the
                // Disputed status, keeping the two in step
                let dispute = Dispute::new(trade.id, actor_id, reason.clone());
                self.disputes.insert(&dispute).await?;

                self.rooms
                    .post_transition_message(
                        trade,
                        actor_id,
                        MessageKind::System,
                        format!("Dispute opened: {}", reason),
                        None,
                    )
                    .await?;

                Ok(Some(TradeEvent::DisputeOpened {
                    dispute_id: dispute.id,
                    trade_id: trade.id,
                    raised_by: actor_id,
                    reason: reason.clone(),
                    timestamp: dispute.created_at,
                }))
            }
            _ => Ok(None),
        }
    }

    /// Post-commit fan-out shared by every transition: room event,
    /// notifications, and terminal-state consequences. Failures here are
    /// logged, never propagated; clients reconcile by re-fetching state.
    async fn finish_transition(
        &self,
        trade: &Trade,
        old_status: TradeStatus,
        actor_id: Uuid,
        dispute_event: Option<TradeEvent>,
    ) {
        let change = StatusChange {
            trade_id: trade.id,
            old_status,
            new_status: trade.status,
            actor_id,
            timestamp: trade.updated_at,
        };

        if let Err(e) = self
            .channel
            .publish_room(trade.id, RoomEventPayload::Status(change.clone()))
            .await
        {
            log::error!("Status publish failed for trade {}: {}", trade.id, e);
        }

        self.notifier
            .dispatch(&TradeEvent::StatusChanged(change), trade)
            .await;
        if let Some(event) = dispute_event {
            self.notifier.dispatch(&event, trade).await;
        }

        if trade.status.is_terminal() {
            if let Err(e) = self.reputation.on_terminal(trade).await {
                log::error!("Reputation update failed for trade {}: {}", trade.id, e);
            }
            if trade.status == TradeStatus::Cancelled {
                if let Err(e) = self
                    .catalog
                    .release(trade.offer_id, trade.amount_asset)
                    .await
                {
                    log::error!("Stock release failed for trade {}: {}", trade.id, e);
                }
            }
        }
    }

    async fn load(&self, trade_id: Uuid) -> AppResult<Trade> {
        self.trades
            .get(trade_id)
            .await?
            .ok_or_else(|| TradeError::TradeNotFound(trade_id).into())
    }
}
