//! Shared test harness: a coordinator wired against in-memory stores.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal_macros::dec;
use uuid::Uuid;

use peer_trade::adapter::coordinator::{CoordinatorDeps, TradeCoordinator};
use peer_trade::application::dto::CreateOfferRequest;
use peer_trade::config::Config;
use peer_trade::domain::models::Offer;
use peer_trade::infrastructure::blob::InMemoryBlobStore;
use peer_trade::infrastructure::channel::RoomHub;
use peer_trade::infrastructure::memory::{
    MemoryDisputeRepository, MemoryMessageRepository, MemoryNotificationRepository,
    MemoryOfferRepository, MemoryProfileRepository, MemoryTradeRepository,
};

pub struct Harness {
    pub coordinator: TradeCoordinator,
    pub seller_id: Uuid,
    pub buyer_id: Uuid,
    pub arbiter_id: Uuid,
    // Direct store handles for assertions that bypass the public surface
    pub offers: Arc<MemoryOfferRepository>,
    pub disputes: Arc<MemoryDisputeRepository>,
}

pub fn harness() -> Harness {
    let config = Config::default();
    let arbiter_id = Uuid::new_v4();
    let offers = Arc::new(MemoryOfferRepository::new());
    let disputes = Arc::new(MemoryDisputeRepository::new());
    let coordinator = TradeCoordinator::new(
        &config,
        CoordinatorDeps {
            offers: offers.clone(),
            trades: Arc::new(MemoryTradeRepository::new()),
            messages: Arc::new(MemoryMessageRepository::new()),
            disputes: disputes.clone(),
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

    Harness {
        coordinator,
        seller_id: Uuid::new_v4(),
        buyer_id: Uuid::new_v4(),
        arbiter_id,
        offers,
        disputes,
    }
}

/// A standard offer: 1000 units at rate 240, trades of 10..=500
pub async fn published_offer(harness: &Harness) -> Offer {
    harness
        .coordinator
        .create_offer(CreateOfferRequest {
            seller_id: harness.seller_id,
            platform: "payoneer".to_string(),
            currency: "PKR".to_string(),
            rate: dec!(240),
            available_amount: dec!(1000),
            min_amount: dec!(10),
            max_amount: dec!(500),
        })
        .await
        .expect("offer creation failed")
}
