//! Trade room chat, subscriptions, and notification queries.

mod common;

use rust_decimal_macros::dec;

use peer_trade::application::dto::ReceiptUpload;
use peer_trade::domain::errors::{AppError, TradeError};
use peer_trade::domain::events::RoomEventPayload;
use peer_trade::domain::models::{MessageKind, NotificationKind, TradeStatus};
use peer_trade::domain::state::TradeAction;

use common::{harness, published_offer};

#[tokio::test]
async fn chat_flows_between_participants_in_order() {
    let h = harness();
    let offer = published_offer(&h).await;
    let trade = h
        .coordinator
        .create_trade(offer.id, h.buyer_id, dec!(100))
        .await
        .unwrap();

    h.coordinator
        .post_message(trade.id, h.buyer_id, Some("hi, paying today".into()), None)
        .await
        .unwrap();
    h.coordinator
        .post_message(trade.id, h.seller_id, Some("details coming up".into()), None)
        .await
        .unwrap();

    let history = h
        .coordinator
        .trade_messages(trade.id, h.buyer_id)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].seq < history[1].seq);
    assert_eq!(history[0].sender_id, h.buyer_id);
    assert_eq!(history[1].sender_id, h.seller_id);
}

#[tokio::test]
async fn outsiders_cannot_read_or_post() {
    let h = harness();
    let offer = published_offer(&h).await;
    let trade = h
        .coordinator
        .create_trade(offer.id, h.buyer_id, dec!(100))
        .await
        .unwrap();
    let stranger = uuid::Uuid::new_v4();

    let err = h
        .coordinator
        .post_message(trade.id, stranger, Some("let me in".into()), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Access(_)));

    let err = h
        .coordinator
        .trade_messages(trade.id, stranger)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Access(_)));

    let err = h
        .coordinator
        .subscribe_trade_room(trade.id, stranger, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Access(_)));
}

#[tokio::test]
async fn chat_closes_on_cancellation_but_not_on_dispute() {
    let h = harness();
    let offer = published_offer(&h).await;

    // Disputed trade keeps its channel open for mediation
    let disputed = h
        .coordinator
        .create_trade(offer.id, h.buyer_id, dec!(100))
        .await
        .unwrap();
    h.coordinator
        .open_dispute(disputed.id, h.buyer_id, "no response".into())
        .await
        .unwrap();
    h.coordinator
        .post_message(disputed.id, h.seller_id, Some("I am here".into()), None)
        .await
        .unwrap();

    // Cancelled trade does not
    let cancelled = h
        .coordinator
        .create_trade(offer.id, h.buyer_id, dec!(100))
        .await
        .unwrap();
    h.coordinator
        .apply_trade_action(cancelled.id, h.buyer_id, TradeAction::Cancel)
        .await
        .unwrap();
    let err = h
        .coordinator
        .post_message(cancelled.id, h.buyer_id, Some("wait".into()), None)
        .await
        .unwrap_err();
    match err {
        AppError::Trade(TradeError::TradeTerminatedForChat { current }) => {
            assert_eq!(current, TradeStatus::Cancelled)
        }
        other => panic!("expected TradeTerminatedForChat, got {:?}", other),
    }
}

#[tokio::test]
async fn message_needs_content() {
    let h = harness();
    let offer = published_offer(&h).await;
    let trade = h
        .coordinator
        .create_trade(offer.id, h.buyer_id, dec!(100))
        .await
        .unwrap();

    let err = h
        .coordinator
        .post_message(trade.id, h.buyer_id, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Trade(TradeError::EmptyMessage)));

    let err = h
        .coordinator
        .post_message(trade.id, h.buyer_id, Some("x".repeat(2001)), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Trade(TradeError::MessageTooLong { .. })
    ));
}

// System messages from transitions land in the same stream as chat.
#[tokio::test]
async fn transitions_annotate_the_conversation() {
    let h = harness();
    let offer = published_offer(&h).await;
    let trade = h
        .coordinator
        .create_trade(offer.id, h.buyer_id, dec!(100))
        .await
        .unwrap();

    h.coordinator
        .apply_trade_action(
            trade.id,
            h.seller_id,
            TradeAction::SendPaymentInfo {
                details: "IBAN XY12".into(),
            },
        )
        .await
        .unwrap();
    h.coordinator
        .submit_receipt(
            trade.id,
            h.buyer_id,
            ReceiptUpload {
                bytes: b"scan".to_vec(),
                content_type: "image/png".into(),
            },
        )
        .await
        .unwrap();

    let history = h
        .coordinator
        .trade_messages(trade.id, h.seller_id)
        .await
        .unwrap();
    let kinds: Vec<MessageKind> = history.iter().map(|m| m.kind).collect();
    assert_eq!(kinds, vec![MessageKind::PaymentInfo, MessageKind::Chat]);
    assert!(history[1].attachment_url.is_some());
}

// A reconnecting subscriber resumes from its cursor without gaps or
// duplicates, seeing chat and status changes as one stream.
#[tokio::test]
async fn subscription_resumes_from_cursor() {
    let h = harness();
    let offer = published_offer(&h).await;
    let trade = h
        .coordinator
        .create_trade(offer.id, h.buyer_id, dec!(100))
        .await
        .unwrap();

    h.coordinator
        .post_message(trade.id, h.buyer_id, Some("first".into()), None)
        .await
        .unwrap();

    let sub = h
        .coordinator
        .subscribe_trade_room(trade.id, h.buyer_id, None)
        .await
        .unwrap();
    assert_eq!(sub.backlog.len(), 1);
    let last_seen = sub.backlog.last().unwrap().seq;
    drop(sub);

    // Events continue while the client is away: a payment-info message
    // plus its status change
    h.coordinator
        .apply_trade_action(
            trade.id,
            h.seller_id,
            TradeAction::SendPaymentInfo {
                details: "IBAN XY12".into(),
            },
        )
        .await
        .unwrap();

    let sub = h
        .coordinator
        .subscribe_trade_room(trade.id, h.buyer_id, Some(last_seen))
        .await
        .unwrap();
    assert_eq!(sub.backlog.len(), 2);
    assert!(sub.backlog.iter().all(|e| e.seq > last_seen));
    assert!(sub
        .backlog
        .iter()
        .any(|e| matches!(&e.payload, RoomEventPayload::Message(m) if m.kind == MessageKind::PaymentInfo)));
    assert!(sub.backlog.iter().any(|e| matches!(
        &e.payload,
        RoomEventPayload::Status(c) if c.new_status == TradeStatus::AwaitingPayment
    )));
}

#[tokio::test]
async fn notifications_reach_the_counterparty_only() {
    let h = harness();
    let offer = published_offer(&h).await;
    let trade = h
        .coordinator
        .create_trade(offer.id, h.buyer_id, dec!(100))
        .await
        .unwrap();

    h.coordinator
        .post_message(trade.id, h.buyer_id, Some("hello".into()), None)
        .await
        .unwrap();

    let seller_inbox = h
        .coordinator
        .get_notifications(h.seller_id, true)
        .await
        .unwrap();
    assert_eq!(seller_inbox.len(), 1);
    assert_eq!(seller_inbox[0].kind, NotificationKind::NewMessage);

    let buyer_inbox = h
        .coordinator
        .get_notifications(h.buyer_id, true)
        .await
        .unwrap();
    assert!(buyer_inbox.is_empty());
}

#[tokio::test]
async fn notification_read_flags() {
    let h = harness();
    let offer = published_offer(&h).await;
    let trade = h
        .coordinator
        .create_trade(offer.id, h.buyer_id, dec!(100))
        .await
        .unwrap();

    h.coordinator
        .post_message(trade.id, h.buyer_id, Some("one".into()), None)
        .await
        .unwrap();
    h.coordinator
        .post_message(trade.id, h.buyer_id, Some("two".into()), None)
        .await
        .unwrap();
    assert_eq!(h.coordinator.unread_count(h.seller_id).await.unwrap(), 2);

    let inbox = h
        .coordinator
        .get_notifications(h.seller_id, true)
        .await
        .unwrap();

    // Only the recipient may mark their notification read
    let err = h
        .coordinator
        .mark_read(h.buyer_id, inbox[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Access(_)));

    let marked = h
        .coordinator
        .mark_read(h.seller_id, inbox[0].id)
        .await
        .unwrap();
    assert!(marked.read);
    assert_eq!(h.coordinator.unread_count(h.seller_id).await.unwrap(), 1);

    assert_eq!(h.coordinator.mark_all_read(h.seller_id).await.unwrap(), 1);
    assert_eq!(h.coordinator.unread_count(h.seller_id).await.unwrap(), 0);
}
