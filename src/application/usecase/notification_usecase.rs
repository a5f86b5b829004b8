// src/application/usecase/notification_usecase.rs
// Translates domain events into per-user notifications

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::{AccessError, AppResult, TradeError};
use crate::domain::events::TradeEvent;
use crate::domain::models::{
    MessageKind, Notification, NotificationKind, Trade, TradeStatus,
};
use crate::domain::repository::NotificationRepository;
use crate::domain::service::RealtimeChannel;

pub struct NotificationDispatcher {
    notifications: Arc<dyn NotificationRepository>,
    channel: Arc<dyn RealtimeChannel>,
}

/// Pure translation of one domain event into recipient notifications.
/// The counterparty of the acting user is notified, never the actor.
pub fn translate(event: &TradeEvent, trade: &Trade) -> Vec<Notification> {
    let link = Some(format!("/trades/{}", trade.id));

    match event {
        TradeEvent::MessagePosted(message) => match message.kind {
            // System messages ride along with their status event
            MessageKind::System => Vec::new(),
            MessageKind::PaymentInfo => vec![Notification::new(
                trade.counterparty_of(message.sender_id),
                NotificationKind::NewMessage,
                "Payment details received".to_string(),
                "The seller sent payment instructions for your trade.".to_string(),
                link,
            )],
            MessageKind::Chat => vec![Notification::new(
                trade.counterparty_of(message.sender_id),
                NotificationKind::NewMessage,
                "New message".to_string(),
                message
                    .body
                    .clone()
                    .unwrap_or_else(|| "Sent an attachment".to_string()),
                link,
            )],
        },

        TradeEvent::StatusChanged(change) => {
            // Idempotent re-sends (awaiting_payment -> awaiting_payment)
            // are already covered by the payment-info message
            if change.old_status == change.new_status {
                return Vec::new();
            }
            let (title, body) = match change.new_status {
                TradeStatus::AwaitingPayment => (
                    "Awaiting your payment",
                    "Payment details are ready; transfer the funds to proceed.",
                ),
                TradeStatus::Paid => (
                    "Payment receipt submitted",
                    "The buyer reports the transfer as sent. Review the receipt.",
                ),
                TradeStatus::Completed => (
                    "Trade completed",
                    "The seller confirmed receiving the funds.",
                ),
                TradeStatus::Cancelled => ("Trade cancelled", "The trade was cancelled."),
                TradeStatus::Disputed => {
                    // DisputeOpened carries the richer notification
                    return Vec::new();
                }
                _ => ("Trade updated", "The trade status changed."),
            };
            vec![Notification::new(
                trade.counterparty_of(change.actor_id),
                NotificationKind::StatusChange,
                title.to_string(),
                body.to_string(),
                link,
            )]
        }

        TradeEvent::DisputeOpened {
            raised_by, reason, ..
        } => vec![Notification::new(
            trade.counterparty_of(*raised_by),
            NotificationKind::DisputeOpened,
            "Dispute opened".to_string(),
            format!("Your counterparty opened a dispute: {}", reason),
            link,
        )],
    }
}

impl NotificationDispatcher {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        channel: Arc<dyn RealtimeChannel>,
    ) -> Self {
        Self {
            notifications,
            channel,
        }
    }

    /// Persist and push the notifications derived from `event`.
    /// Best-effort by contract: failures are logged and swallowed so
    /// they can never fail the originating transition.
    pub async fn dispatch(&self, event: &TradeEvent, trade: &Trade) {
        for notification in translate(event, trade) {
            if let Err(e) = self.notifications.insert(&notification).await {
                log::error!(
                    "Failed to persist notification for {}: {}",
                    notification.recipient_id,
                    e
                );
                continue;
            }
            self.channel
                .push_user(notification.recipient_id, &notification)
                .await;
        }
    }

    pub async fn notifications_for(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> AppResult<Vec<Notification>> {
        Ok(self
            .notifications
            .list_for_user(user_id, unread_only)
            .await?)
    }

    pub async fn unread_count(&self, user_id: Uuid) -> AppResult<usize> {
        Ok(self.notifications.unread_count(user_id).await?)
    }

    pub async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> AppResult<Notification> {
        let existing = self
            .notifications
            .get(notification_id)
            .await?
            .ok_or(TradeError::NotificationNotFound(notification_id))?;
        if existing.recipient_id != user_id {
            return Err(AccessError::NotNotificationOwner.into());
        }

        self.notifications
            .mark_read(notification_id)
            .await?
            .ok_or_else(|| TradeError::NotificationNotFound(notification_id).into())
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> AppResult<usize> {
        Ok(self.notifications.mark_all_read(user_id).await?)
    }
}
