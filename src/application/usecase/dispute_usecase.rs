// src/application/usecase/dispute_usecase.rs
// Dispute claims and arbiter resolution

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::application::usecase::trade_usecase::TradeLifecycle;
use crate::domain::errors::{AccessError, AppResult, StoreError, TradeError};
use crate::domain::models::{Dispute, DisputeOutcome, DisputeStatus};
use crate::domain::repository::DisputeRepository;
use crate::domain::state::TradeAction;

pub struct DisputeDesk {
    disputes: Arc<dyn DisputeRepository>,
    lifecycle: Arc<TradeLifecycle>,
    // The arbiter capability is a closed set handed in at construction,
    // distinct from any trade's participants
    arbiters: HashSet<Uuid>,
}

impl DisputeDesk {
    pub fn new(
        disputes: Arc<dyn DisputeRepository>,
        lifecycle: Arc<TradeLifecycle>,
        arbiters: HashSet<Uuid>,
    ) -> Self {
        Self {
            disputes,
            lifecycle,
            arbiters,
        }
    }

    /// Record a dispute claim and freeze the trade. The one-open-dispute
    /// invariant is enforced by the state machine: a trade already
    /// Disputed rejects the second claim with DisputeAlreadyOpen and no
    /// second row is written.
    pub async fn open_dispute(
        &self,
        trade_id: Uuid,
        raiser_id: Uuid,
        reason: String,
    ) -> AppResult<Dispute> {
        self.lifecycle
            .apply_action(trade_id, raiser_id, TradeAction::RaiseDispute { reason })
            .await?;

        self.disputes
            .find_open_for_trade(trade_id)
            .await?
            .ok_or_else(|| {
                StoreError::Corrupt(format!("no dispute row after freezing trade {}", trade_id))
                    .into()
            })
    }

    /// Terminal resolution, reserved for the arbiter capability
    pub async fn resolve_dispute(
        &self,
        dispute_id: Uuid,
        arbiter_id: Uuid,
        outcome: DisputeOutcome,
    ) -> AppResult<Dispute> {
        if !self.arbiters.contains(&arbiter_id) {
            return Err(AccessError::NotAnArbiter {
                user_id: arbiter_id,
            }
            .into());
        }

        let mut dispute = self
            .disputes
            .get(dispute_id)
            .await?
            .ok_or(TradeError::DisputeNotFound(dispute_id))?;
        if dispute.status != DisputeStatus::Open {
            return Err(TradeError::NoOpenDispute.into());
        }

        // The trade-status check under the trade lock is authoritative;
        // a concurrent resolution loses there with NoOpenDispute
        self.lifecycle
            .resolve_transition(dispute.trade_id, arbiter_id, outcome)
            .await?;

        dispute.status = DisputeStatus::Resolved;
        dispute.outcome = Some(outcome);
        dispute.resolved_at = Some(Utc::now());
        self.disputes.update(&dispute).await?;
        log::info!(
            "Dispute {} on trade {} resolved as {:?} by {}",
            dispute_id,
            dispute.trade_id,
            outcome,
            arbiter_id
        );

        // Resolved disputes stay on record as audit trail
        Ok(dispute)
    }

    pub async fn get_dispute(&self, dispute_id: Uuid) -> AppResult<Dispute> {
        self.disputes
            .get(dispute_id)
            .await?
            .ok_or_else(|| TradeError::DisputeNotFound(dispute_id).into())
    }

    pub async fn open_dispute_for_trade(&self, trade_id: Uuid) -> AppResult<Option<Dispute>> {
        Ok(self.disputes.find_open_for_trade(trade_id).await?)
    }
}
