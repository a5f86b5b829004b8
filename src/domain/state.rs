// src/domain/state.rs
// Trade lifecycle transition table

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{AccessError, TradeError};
use crate::domain::models::{DisputeOutcome, Trade, TradeStatus};

// A participant-requested lifecycle action. Payloads are resolved by the
// application layer (receipt bytes become a blob URL before the action
// reaches the state machine).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TradeAction {
    SendPaymentInfo { details: String },
    SubmitReceipt { attachment_url: Option<String> },
    ConfirmReceipt,
    Cancel,
    RaiseDispute { reason: String },
}

impl TradeAction {
    pub fn kind(&self) -> TradeActionKind {
        match self {
            TradeAction::SendPaymentInfo { .. } => TradeActionKind::SendPaymentInfo,
            TradeAction::SubmitReceipt { .. } => TradeActionKind::SubmitReceipt,
            TradeAction::ConfirmReceipt => TradeActionKind::ConfirmReceipt,
            TradeAction::Cancel => TradeActionKind::Cancel,
            TradeAction::RaiseDispute { .. } => TradeActionKind::RaiseDispute,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeActionKind {
    SendPaymentInfo,
    SubmitReceipt,
    ConfirmReceipt,
    Cancel,
    RaiseDispute,
}

impl std::fmt::Display for TradeActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TradeActionKind::SendPaymentInfo => write!(f, "send_payment_info"),
            TradeActionKind::SubmitReceipt => write!(f, "submit_receipt"),
            TradeActionKind::ConfirmReceipt => write!(f, "confirm_receipt"),
            TradeActionKind::Cancel => write!(f, "cancel"),
            TradeActionKind::RaiseDispute => write!(f, "raise_dispute"),
        }
    }
}

/// Which side of the trade may request an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    Buyer,
    Seller,
    Either,
}

impl TradeActionKind {
    pub fn required_role(&self) -> ActorRole {
        match self {
            TradeActionKind::SendPaymentInfo => ActorRole::Seller,
            TradeActionKind::SubmitReceipt => ActorRole::Buyer,
            TradeActionKind::ConfirmReceipt => ActorRole::Seller,
            TradeActionKind::Cancel => ActorRole::Either,
            TradeActionKind::RaiseDispute => ActorRole::Either,
        }
    }
}

/// Validate that `actor_id` may request `kind` on `trade`
pub fn authorize_actor(
    trade: &Trade,
    actor_id: Uuid,
    kind: TradeActionKind,
) -> Result<(), AccessError> {
    if !trade.is_participant(actor_id) {
        return Err(AccessError::NotAParticipant {
            user_id: actor_id,
            trade_id: trade.id,
        });
    }
    match kind.required_role() {
        ActorRole::Buyer if actor_id != trade.buyer_id => {
            Err(AccessError::WrongParty { role: "buyer" })
        }
        ActorRole::Seller if actor_id != trade.seller_id => {
            Err(AccessError::WrongParty { role: "seller" })
        }
        _ => Ok(()),
    }
}

/// The transition table. Pure: no I/O, no side effects, total over every
/// (status, action) pair. Errors carry the current status so the caller
/// can resynchronize.
pub fn next_status(current: TradeStatus, kind: TradeActionKind) -> Result<TradeStatus, TradeError> {
    use TradeActionKind::*;
    use TradeStatus::*;

    match (current, kind) {
        // Re-sending payment info is allowed; the seller may correct details
        (Pending | AwaitingPayment, SendPaymentInfo) => Ok(AwaitingPayment),

        (Pending | AwaitingPayment, SubmitReceipt) => Ok(Paid),

        (Paid, ConfirmReceipt) => Ok(Completed),

        (Pending | AwaitingPayment, Cancel) => Ok(Cancelled),
        // Once a receipt exists, unilateral cancellation would discard
        // evidence of a possible payment; that path goes through dispute.
        (Paid | AwaitingRelease | Disputed | Completed | Cancelled, Cancel) => {
            Err(TradeError::TradeNotCancellable { current })
        }

        (Pending | AwaitingPayment | Paid | AwaitingRelease, RaiseDispute) => Ok(Disputed),
        (Disputed, RaiseDispute) => Err(TradeError::DisputeAlreadyOpen),

        (_, kind) => Err(TradeError::InvalidTransition {
            action: kind,
            current,
        }),
    }
}

/// Arbiter-only exit from `Disputed`
pub fn resolve_status(
    current: TradeStatus,
    outcome: DisputeOutcome,
) -> Result<TradeStatus, TradeError> {
    match current {
        TradeStatus::Disputed => Ok(outcome.as_status()),
        _ => Err(TradeError::NoOpenDispute),
    }
}
