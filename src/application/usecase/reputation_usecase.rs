// src/application/usecase/reputation_usecase.rs
// Success-rate and trade-count aggregation on terminal outcomes

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::AppResult;
use crate::domain::models::{Profile, Trade, TradeStatus};
use crate::domain::repository::ProfileRepository;

pub struct ReputationUpdater {
    profiles: Arc<dyn ProfileRepository>,
}

impl ReputationUpdater {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Fold one terminal trade outcome into both parties' aggregates.
    /// Idempotent per trade id: at-least-once event delivery may hand us
    /// the same terminal event twice, and the second application must
    /// not double-count.
    pub async fn on_terminal(&self, trade: &Trade) -> AppResult<()> {
        debug_assert!(trade.status.is_terminal());

        if !self.profiles.try_mark_applied(trade.id).await? {
            log::debug!("Terminal event for trade {} already applied", trade.id);
            return Ok(());
        }

        let successful = trade.status == TradeStatus::Completed;
        for user_id in [trade.buyer_id, trade.seller_id] {
            let mut profile = self.profiles.get_or_create(user_id).await?;
            profile.record_outcome(successful);
            self.profiles.update(&profile).await?;
            log::info!(
                "Reputation for {}: {} trades, {}% success",
                user_id,
                profile.total_trades,
                profile.success_rate
            );
        }
        Ok(())
    }

    pub async fn profile_of(&self, user_id: Uuid) -> AppResult<Profile> {
        Ok(self.profiles.get_or_create(user_id).await?)
    }
}
