//! Validation, authorization, and concurrency behavior of the
//! trade lifecycle.

mod common;

use std::sync::Arc;

use rust_decimal_macros::dec;

use peer_trade::application::dto::ReceiptUpload;
use peer_trade::domain::errors::{AppError, TradeError};
use peer_trade::domain::models::TradeStatus;
use peer_trade::domain::state::TradeAction;

use common::{harness, published_offer};

fn receipt() -> ReceiptUpload {
    ReceiptUpload {
        bytes: b"transfer receipt".to_vec(),
        content_type: "image/png".to_string(),
    }
}

#[tokio::test]
async fn create_trade_validates_amount_bounds() {
    let h = harness();
    let offer = published_offer(&h).await;

    for amount in [dec!(5), dec!(501)] {
        let err = h
            .coordinator
            .create_trade(offer.id, h.buyer_id, amount)
            .await
            .unwrap_err();
        match err {
            AppError::Trade(TradeError::InvalidAmount { min, max, .. }) => {
                assert_eq!(min, dec!(10));
                assert_eq!(max, dec!(500));
            }
            other => panic!("expected InvalidAmount, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn seller_cannot_buy_from_themselves() {
    let h = harness();
    let offer = published_offer(&h).await;

    let err = h
        .coordinator
        .create_trade(offer.id, h.seller_id, dec!(100))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Trade(TradeError::SelfTradeForbidden)
    ));
}

#[tokio::test]
async fn inactive_offer_rejects_trades() {
    let h = harness();
    let offer = published_offer(&h).await;

    h.coordinator
        .set_offer_active(offer.id, h.seller_id, false)
        .await
        .unwrap();

    let err = h
        .coordinator
        .create_trade(offer.id, h.buyer_id, dec!(100))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Trade(TradeError::OfferInactive)));
}

#[tokio::test]
async fn reservation_blocks_overselling() {
    let h = harness();
    let offer = published_offer(&h).await;

    // Two 500-unit trades fit the per-trade bounds but not the stock
    h.coordinator
        .create_trade(offer.id, h.buyer_id, dec!(500))
        .await
        .unwrap();
    h.coordinator
        .create_trade(offer.id, h.buyer_id, dec!(500))
        .await
        .unwrap();

    let err = h
        .coordinator
        .create_trade(offer.id, h.buyer_id, dec!(500))
        .await
        .unwrap_err();
    match err {
        AppError::Trade(TradeError::InsufficientAvailability { available, .. }) => {
            assert_eq!(available, dec!(0))
        }
        other => panic!("expected InsufficientAvailability, got {:?}", other),
    }
}

#[tokio::test]
async fn cancelling_restores_stock_for_later_buyers() {
    let h = harness();
    let offer = published_offer(&h).await;

    let trade = h
        .coordinator
        .create_trade(offer.id, h.buyer_id, dec!(500))
        .await
        .unwrap();
    h.coordinator
        .create_trade(offer.id, h.buyer_id, dec!(500))
        .await
        .unwrap();

    h.coordinator
        .apply_trade_action(trade.id, h.buyer_id, TradeAction::Cancel)
        .await
        .unwrap();

    // The freed stock is sellable again
    h.coordinator
        .create_trade(offer.id, h.buyer_id, dec!(500))
        .await
        .unwrap();
}

#[tokio::test]
async fn receipt_requires_an_attachment() {
    let h = harness();
    let offer = published_offer(&h).await;
    let trade = h
        .coordinator
        .create_trade(offer.id, h.buyer_id, dec!(100))
        .await
        .unwrap();

    let err = h
        .coordinator
        .apply_trade_action(
            trade.id,
            h.buyer_id,
            TradeAction::SubmitReceipt {
                attachment_url: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Trade(TradeError::MissingAttachment)
    ));
}

#[tokio::test]
async fn actions_are_bound_to_their_party() {
    let h = harness();
    let offer = published_offer(&h).await;
    let trade = h
        .coordinator
        .create_trade(offer.id, h.buyer_id, dec!(100))
        .await
        .unwrap();

    // Buyer cannot send payment info
    let err = h
        .coordinator
        .apply_trade_action(
            trade.id,
            h.buyer_id,
            TradeAction::SendPaymentInfo {
                details: "my own account".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Access(_)));

    // Seller cannot submit the buyer's receipt
    let err = h
        .coordinator
        .submit_receipt(trade.id, h.seller_id, receipt())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Access(_)));

    // A stranger cannot do anything
    let err = h
        .coordinator
        .apply_trade_action(trade.id, uuid::Uuid::new_v4(), TradeAction::Cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Access(_)));
}

#[tokio::test]
async fn cancel_after_receipt_is_rejected_with_current_status() {
    let h = harness();
    let offer = published_offer(&h).await;
    let trade = h
        .coordinator
        .create_trade(offer.id, h.buyer_id, dec!(100))
        .await
        .unwrap();
    h.coordinator
        .submit_receipt(trade.id, h.buyer_id, receipt())
        .await
        .unwrap();

    let err = h
        .coordinator
        .apply_trade_action(trade.id, h.seller_id, TradeAction::Cancel)
        .await
        .unwrap_err();
    match err {
        AppError::Trade(TradeError::TradeNotCancellable { current }) => {
            assert_eq!(current, TradeStatus::Paid)
        }
        other => panic!("expected TradeNotCancellable, got {:?}", other),
    }
}

#[tokio::test]
async fn payment_info_can_be_resent() {
    let h = harness();
    let offer = published_offer(&h).await;
    let trade = h
        .coordinator
        .create_trade(offer.id, h.buyer_id, dec!(100))
        .await
        .unwrap();

    for details in ["IBAN XY12", "IBAN XY12, reference 99"] {
        let trade = h
            .coordinator
            .apply_trade_action(
                trade.id,
                h.seller_id,
                TradeAction::SendPaymentInfo {
                    details: details.to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(trade.status, TradeStatus::AwaitingPayment);
    }
}

// Two conflicting actions race on one trade: exactly one wins, and the
// loser's error reflects the post-transition status.
#[tokio::test]
async fn conflicting_concurrent_actions_leave_one_winner() {
    let h = harness();
    let offer = published_offer(&h).await;
    let trade = h
        .coordinator
        .create_trade(offer.id, h.buyer_id, dec!(100))
        .await
        .unwrap();
    h.coordinator
        .submit_receipt(trade.id, h.buyer_id, receipt())
        .await
        .unwrap();

    let coordinator = Arc::new(h.coordinator);

    let confirm = {
        let coordinator = coordinator.clone();
        let seller_id = h.seller_id;
        let trade_id = trade.id;
        tokio::spawn(async move {
            coordinator
                .apply_trade_action(trade_id, seller_id, TradeAction::ConfirmReceipt)
                .await
        })
    };
    let dispute = {
        let coordinator = coordinator.clone();
        let buyer_id = h.buyer_id;
        let trade_id = trade.id;
        tokio::spawn(async move {
            coordinator
                .apply_trade_action(
                    trade_id,
                    buyer_id,
                    TradeAction::RaiseDispute {
                        reason: "Seller unresponsive".to_string(),
                    },
                )
                .await
        })
    };

    let confirm = confirm.await.unwrap();
    let dispute = dispute.await.unwrap();
    assert!(
        confirm.is_ok() ^ dispute.is_ok(),
        "exactly one of the racing actions must win"
    );

    let status = coordinator.get_trade(trade.id).await.unwrap().status;
    if confirm.is_ok() {
        assert_eq!(status, TradeStatus::Completed);
        match dispute.unwrap_err() {
            AppError::Trade(TradeError::InvalidTransition { current, .. }) => {
                assert_eq!(current, TradeStatus::Completed)
            }
            other => panic!("expected InvalidTransition, got {:?}", other),
        }
    } else {
        assert_eq!(status, TradeStatus::Disputed);
        match confirm.unwrap_err() {
            AppError::Trade(TradeError::InvalidTransition { current, .. }) => {
                assert_eq!(current, TradeStatus::Disputed)
            }
            other => panic!("expected InvalidTransition, got {:?}", other),
        }
    }
}
