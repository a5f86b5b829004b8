// src/application/usecase/trade_room_usecase.rs
// Per-trade message log and live event stream

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::application::usecase::notification_usecase::NotificationDispatcher;
use crate::domain::errors::{AccessError, AppResult, TradeError};
use crate::domain::events::{RoomEventPayload, TradeEvent};
use crate::domain::models::{Message, MessageKind, Trade, TradeStatus};
use crate::domain::repository::{MessageRepository, TradeRepository};
use crate::domain::service::{RealtimeChannel, RoomSubscription};

pub struct TradeRooms {
    trades: Arc<dyn TradeRepository>,
    messages: Arc<dyn MessageRepository>,
    channel: Arc<dyn RealtimeChannel>,
    notifier: Arc<NotificationDispatcher>,
    max_body_length: usize,
}

impl TradeRooms {
    pub fn new(
        trades: Arc<dyn TradeRepository>,
        messages: Arc<dyn MessageRepository>,
        channel: Arc<dyn RealtimeChannel>,
        notifier: Arc<NotificationDispatcher>,
        max_body_length: usize,
    ) -> Self {
        Self {
            trades,
            messages,
            channel,
            notifier,
            max_body_length,
        }
    }

    /// Append a participant chat message to the trade room.
    /// Disputed trades still accept chat (mediation needs the channel);
    /// terminal trades do not.
    pub async fn post_message(
        &self,
        trade_id: Uuid,
        sender_id: Uuid,
        body: Option<String>,
        attachment_url: Option<String>,
    ) -> AppResult<Message> {
        let trade = self.load_trade(trade_id).await?;
        if !trade.is_participant(sender_id) {
            return Err(AccessError::NotAParticipant {
                user_id: sender_id,
                trade_id,
            }
            .into());
        }
        if matches!(
            trade.status,
            TradeStatus::Cancelled | TradeStatus::Completed
        ) {
            return Err(TradeError::TradeTerminatedForChat {
                current: trade.status,
            }
            .into());
        }
        if body.is_none() && attachment_url.is_none() {
            return Err(TradeError::EmptyMessage.into());
        }
        if let Some(ref text) = body {
            if text.chars().count() > self.max_body_length {
                return Err(TradeError::MessageTooLong {
                    limit: self.max_body_length,
                }
                .into());
            }
        }

        self.append_and_publish(&trade, sender_id, MessageKind::Chat, body, attachment_url)
            .await
    }

    /// Append a state-machine-driven message (payment info, receipt,
    /// dispute notes). Skips the participant chat policy: transitions
    /// may annotate rooms of trades that just went terminal.
    pub(crate) async fn post_transition_message(
        &self,
        trade: &Trade,
        sender_id: Uuid,
        kind: MessageKind,
        body: String,
        attachment_url: Option<String>,
    ) -> AppResult<Message> {
        self.append_and_publish(trade, sender_id, kind, Some(body), attachment_url)
            .await
    }

    /// Subscribe to the room's combined chat + lifecycle stream,
    /// resuming after `cursor` when one is given
    pub async fn subscribe(
        &self,
        trade_id: Uuid,
        participant_id: Uuid,
        cursor: Option<u64>,
    ) -> AppResult<RoomSubscription> {
        let trade = self.load_trade(trade_id).await?;
        if !trade.is_participant(participant_id) {
            return Err(AccessError::NotAParticipant {
                user_id: participant_id,
                trade_id,
            }
            .into());
        }
        self.channel.subscribe_room(trade_id, cursor).await
    }

    /// Full message history in room order
    pub async fn history(&self, trade_id: Uuid, participant_id: Uuid) -> AppResult<Vec<Message>> {
        let trade = self.load_trade(trade_id).await?;
        if !trade.is_participant(participant_id) {
            return Err(AccessError::NotAParticipant {
                user_id: participant_id,
                trade_id,
            }
            .into());
        }
        Ok(self.messages.list_for_trade(trade_id).await?)
    }

    async fn append_and_publish(
        &self,
        trade: &Trade,
        sender_id: Uuid,
        kind: MessageKind,
        body: Option<String>,
        attachment_url: Option<String>,
    ) -> AppResult<Message> {
        let message = Message {
            id: Uuid::new_v4(),
            trade_id: trade.id,
            sender_id,
            body,
            attachment_url,
            kind,
            // Assigned by the store on append
            seq: 0,
            created_at: Utc::now(),
        };

        // The durable write commits before any fan-out
        let message = self.messages.append(message).await?;

        if let Err(e) = self
            .channel
            .publish_room(trade.id, RoomEventPayload::Message(message.clone()))
            .await
        {
            log::error!("Room publish failed for trade {}: {}", trade.id, e);
        }
        self.notifier
            .dispatch(&TradeEvent::MessagePosted(message.clone()), trade)
            .await;

        Ok(message)
    }

    async fn load_trade(&self, trade_id: Uuid) -> AppResult<Trade> {
        self.trades
            .get(trade_id)
            .await?
            .ok_or_else(|| TradeError::TradeNotFound(trade_id).into())
    }
}
