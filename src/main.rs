// src/main.rs
// Demo wiring: runs one scripted peer-to-peer exchange end to end

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use peer_trade::adapter::coordinator::{CoordinatorDeps, TradeCoordinator};
use peer_trade::application::dto::{CreateOfferRequest, ReceiptUpload};
use peer_trade::config::Config;
use peer_trade::domain::errors::AppResult;
use peer_trade::domain::events::RoomEventPayload;
use peer_trade::domain::repository::OfferFilter;
use peer_trade::domain::state::TradeAction;
use peer_trade::infrastructure::blob::InMemoryBlobStore;
use peer_trade::infrastructure::channel::RoomHub;
use peer_trade::infrastructure::memory::{
    MemoryDisputeRepository, MemoryMessageRepository, MemoryNotificationRepository,
    MemoryOfferRepository, MemoryProfileRepository, MemoryTradeRepository,
};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    config.init_logging()?;

    log::info!("Starting peer_trade v{}", env!("CARGO_PKG_VERSION"));

    let arbiter_id = Uuid::new_v4();
    let coordinator = TradeCoordinator::new(
        &config,
        CoordinatorDeps {
            offers: Arc::new(MemoryOfferRepository::new()),
            trades: Arc::new(MemoryTradeRepository::new()),
            messages: Arc::new(MemoryMessageRepository::new()),
            disputes: Arc::new(MemoryDisputeRepository::new()),
            notifications: Arc::new(MemoryNotificationRepository::new()),
            profiles: Arc::new(MemoryProfileRepository::new()),
            blobs: Arc::new(InMemoryBlobStore::new()),
            channel: Arc::new(RoomHub::new(
                config.channel.room_event_buffer,
                config.channel.user_event_buffer,
            )),
            arbiters: HashSet::from([arbiter_id]),
        },
    );

    let seller_id = Uuid::new_v4();
    let buyer_id = Uuid::new_v4();

    // Seller publishes an offer
    let offer = coordinator
        .create_offer(CreateOfferRequest {
            seller_id,
            platform: "payoneer".to_string(),
            currency: "PKR".to_string(),
            rate: Decimal::new(240, 0),
            available_amount: Decimal::new(1000, 0),
            min_amount: Decimal::new(10, 0),
            max_amount: Decimal::new(500, 0),
        })
        .await?;

    let listed = coordinator
        .list_offers(&OfferFilter {
            active_only: true,
            ..Default::default()
        })
        .await?;
    log::info!("{} offer(s) in the catalog", listed.len());

    // Buyer opens a trade and watches the room
    let trade = coordinator
        .create_trade(offer.id, buyer_id, Decimal::new(100, 0))
        .await?;
    log::info!(
        "Trade {} opened for {} local units",
        trade.id,
        trade.amount_local
    );

    let mut room = coordinator
        .subscribe_trade_room(trade.id, buyer_id, None)
        .await?;
    tokio::spawn(async move {
        while let Ok(event) = room.live.recv().await {
            match event.payload {
                RoomEventPayload::Message(message) => {
                    log::info!(
                        "[room #{}] {:?} message from {}",
                        event.seq,
                        message.kind,
                        message.sender_id
                    );
                }
                RoomEventPayload::Status(change) => {
                    log::info!(
                        "[room #{}] status {} -> {}",
                        event.seq,
                        change.old_status,
                        change.new_status
                    );
                }
            }
        }
    });

    // Seller sends payment details
    coordinator
        .apply_trade_action(
            trade.id,
            seller_id,
            TradeAction::SendPaymentInfo {
                details: "Bank transfer to account 0123-456".to_string(),
            },
        )
        .await?;

    // Buyer chats and submits a transfer receipt
    coordinator
        .post_message(
            trade.id,
            buyer_id,
            Some("Sending the transfer now".to_string()),
            None,
        )
        .await?;
    coordinator
        .submit_receipt(
            trade.id,
            buyer_id,
            ReceiptUpload {
                bytes: b"receipt scan".to_vec(),
                content_type: "image/png".to_string(),
            },
        )
        .await?;

    // Seller confirms the funds arrived
    let trade = coordinator
        .apply_trade_action(trade.id, seller_id, TradeAction::ConfirmReceipt)
        .await?;
    log::info!("Trade finished as {}", trade.status);

    for user_id in [buyer_id, seller_id] {
        let profile = coordinator.get_profile(user_id).await?;
        log::info!(
            "{}: {} trades, {}% success",
            user_id,
            profile.total_trades,
            profile.success_rate
        );
        let unread = coordinator.unread_count(user_id).await?;
        log::info!("{}: {} unread notification(s)", user_id, unread);
    }

    log::info!("Demo complete. Goodbye!");
    Ok(())
}
