// src/domain/models.rs
// Core domain entities

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::TradeError;

// A seller's standing advertisement: a bounded quantity of an asset
// offered at a fixed local-currency rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: Uuid,
    pub seller_id: Uuid,
    /// Payment platform the asset balance lives on (e.g. "payoneer")
    pub platform: String,
    /// ISO currency code of the local-currency side (e.g. "PKR")
    pub currency: String,
    /// Local-currency units per 1 asset unit, fixed for the offer
    pub rate: Decimal,
    /// Remaining sellable stock; shrinks as trades reserve against it
    pub available_amount: Decimal,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    pub fn new(
        seller_id: Uuid,
        platform: String,
        currency: String,
        rate: Decimal,
        available_amount: Decimal,
        min_amount: Decimal,
        max_amount: Decimal,
    ) -> Result<Self, TradeError> {
        if rate <= Decimal::ZERO {
            return Err(TradeError::InvalidRate { rate });
        }
        if min_amount <= Decimal::ZERO
            || min_amount > max_amount
            || max_amount > available_amount
        {
            return Err(TradeError::InvalidOfferBounds {
                min: min_amount,
                max: max_amount,
                available: available_amount,
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            seller_id,
            platform,
            currency,
            rate,
            available_amount,
            min_amount,
            max_amount,
            active: true,
            created_at: Utc::now(),
        })
    }

    /// Whether `amount` is an acceptable per-trade size for this offer
    pub fn accepts_amount(&self, amount: Decimal) -> bool {
        amount >= self.min_amount && amount <= self.max_amount
    }
}

// One buyer-seller negotiation created against an Offer. The rate is
// captured as amount_local at creation and never recomputed, so later
// offer edits cannot shift an in-flight trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub offer_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub amount_asset: Decimal,
    /// amount_asset * offer rate, frozen at creation
    pub amount_local: Decimal,
    pub status: TradeStatus,
    pub receipt_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trade {
    pub fn new(offer: &Offer, buyer_id: Uuid, amount_asset: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            offer_id: offer.id,
            buyer_id,
            seller_id: offer.seller_id,
            amount_asset,
            amount_local: amount_asset * offer.rate,
            status: TradeStatus::Pending,
            receipt_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_participant(&self, user_id: Uuid) -> bool {
        user_id == self.buyer_id || user_id == self.seller_id
    }

    /// The other side of the table from `user_id`
    pub fn counterparty_of(&self, user_id: Uuid) -> Uuid {
        if user_id == self.buyer_id {
            self.seller_id
        } else {
            self.buyer_id
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeStatus {
    Pending,
    AwaitingPayment,
    Paid,
    AwaitingRelease,
    Completed,
    Cancelled,
    Disputed,
}

impl TradeStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TradeStatus::Completed | TradeStatus::Cancelled)
    }
}

impl std::fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TradeStatus::Pending => write!(f, "pending"),
            TradeStatus::AwaitingPayment => write!(f, "awaiting_payment"),
            TradeStatus::Paid => write!(f, "paid"),
            TradeStatus::AwaitingRelease => write!(f, "awaiting_release"),
            TradeStatus::Completed => write!(f, "completed"),
            TradeStatus::Cancelled => write!(f, "cancelled"),
            TradeStatus::Disputed => write!(f, "disputed"),
        }
    }
}

// One entry in a trade room. `seq` is the per-trade insertion sequence
// assigned under the room's append lock; timestamps are informational
// and do not decide ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub trade_id: Uuid,
    pub sender_id: Uuid,
    pub body: Option<String>,
    pub attachment_url: Option<String>,
    pub kind: MessageKind,
    pub seq: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    Chat,
    System,
    PaymentInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispute {
    pub id: Uuid,
    pub trade_id: Uuid,
    pub raised_by: Uuid,
    pub reason: String,
    pub status: DisputeStatus,
    pub outcome: Option<DisputeOutcome>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Dispute {
    pub fn new(trade_id: Uuid, raised_by: Uuid, reason: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            trade_id,
            raised_by,
            reason,
            status: DisputeStatus::Open,
            outcome: None,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisputeStatus {
    Open,
    Resolved,
}

// The only two exits from Disputed, chosen by the arbiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisputeOutcome {
    Completed,
    Cancelled,
}

impl DisputeOutcome {
    pub fn as_status(&self) -> TradeStatus {
        match self {
            DisputeOutcome::Completed => TradeStatus::Completed,
            DisputeOutcome::Cancelled => TradeStatus::Cancelled,
        }
    }
}

// Derived, never authoritative: may be rebuilt from the event history
// without affecting trade correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        recipient_id: Uuid,
        kind: NotificationKind,
        title: String,
        body: String,
        link: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_id,
            kind,
            title,
            body,
            link,
            read: false,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    NewMessage,
    StatusChange,
    DisputeOpened,
}

// Reputation-relevant slice of a user profile. successful_trades is the
// running aggregate that keeps the success_rate recomputation O(1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub success_rate: u8,
    pub successful_trades: u64,
    pub total_trades: u64,
    pub is_verified: bool,
}

impl Profile {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            success_rate: 0,
            successful_trades: 0,
            total_trades: 0,
            is_verified: false,
        }
    }

    /// Fold one terminal trade outcome into the running aggregates
    pub fn record_outcome(&mut self, successful: bool) {
        self.total_trades += 1;
        if successful {
            self.successful_trades += 1;
        }
        // round(100 * k / N) on integers
        self.success_rate =
            ((self.successful_trades * 100 + self.total_trades / 2) / self.total_trades) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_offer() -> Offer {
        Offer::new(
            Uuid::new_v4(),
            "payoneer".to_string(),
            "PKR".to_string(),
            dec!(240),
            dec!(1000),
            dec!(10),
            dec!(500),
        )
        .unwrap()
    }

    #[test]
    fn offer_rejects_inverted_bounds() {
        let err = Offer::new(
            Uuid::new_v4(),
            "payoneer".to_string(),
            "PKR".to_string(),
            dec!(240),
            dec!(100),
            dec!(200),
            dec!(50),
        );
        assert!(err.is_err());
    }

    #[test]
    fn offer_rejects_non_positive_rate() {
        let err = Offer::new(
            Uuid::new_v4(),
            "payoneer".to_string(),
            "PKR".to_string(),
            dec!(0),
            dec!(100),
            dec!(10),
            dec!(50),
        );
        assert!(err.is_err());
    }

    #[test]
    fn trade_freezes_local_amount() {
        let mut offer = sample_offer();
        let trade = Trade::new(&offer, Uuid::new_v4(), dec!(100));
        assert_eq!(trade.amount_local, dec!(24000));

        // A later rate edit must not affect the trade
        offer.rate = dec!(250);
        assert_eq!(trade.amount_local, dec!(24000));
    }

    #[test]
    fn profile_success_rate_rounds() {
        let mut profile = Profile::new(Uuid::new_v4());
        profile.record_outcome(true);
        profile.record_outcome(true);
        profile.record_outcome(false);
        // 2/3 -> 66.67 -> 67
        assert_eq!(profile.success_rate, 67);
        assert_eq!(profile.total_trades, 3);
        assert_eq!(profile.successful_trades, 2);
    }
}
