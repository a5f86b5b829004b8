// src/application/usecase/offer_usecase.rs
// Offer catalog: seller-published sell offers and stock reservation

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::application::dto::CreateOfferRequest;
use crate::application::usecase::locks::LockRegistry;
use crate::domain::errors::{AccessError, AppResult, TradeError};
use crate::domain::models::Offer;
use crate::domain::repository::{OfferFilter, OfferRepository};

pub struct OfferCatalog {
    offers: Arc<dyn OfferRepository>,
    // Serializes reserve/release per offer so concurrent trades cannot
    // oversell the remaining stock
    locks: LockRegistry,
}

impl OfferCatalog {
    pub fn new(offers: Arc<dyn OfferRepository>) -> Self {
        Self {
            offers,
            locks: LockRegistry::new(),
        }
    }

    pub async fn create_offer(&self, request: CreateOfferRequest) -> AppResult<Offer> {
        let offer = Offer::new(
            request.seller_id,
            request.platform,
            request.currency,
            request.rate,
            request.available_amount,
            request.min_amount,
            request.max_amount,
        )?;

        self.offers.insert(&offer).await?;
        log::info!(
            "Offer {} created by seller {} ({} {} at rate {})",
            offer.id,
            offer.seller_id,
            offer.available_amount,
            offer.platform,
            offer.rate
        );
        Ok(offer)
    }

    pub async fn list_offers(&self, filter: &OfferFilter) -> AppResult<Vec<Offer>> {
        Ok(self.offers.list(filter).await?)
    }

    pub async fn get_offer(&self, offer_id: Uuid) -> AppResult<Offer> {
        self.offers
            .get(offer_id)
            .await?
            .ok_or_else(|| TradeError::OfferNotFound(offer_id).into())
    }

    /// Owner-only toggle of whether the offer accepts new trades
    pub async fn set_offer_active(
        &self,
        offer_id: Uuid,
        seller_id: Uuid,
        active: bool,
    ) -> AppResult<Offer> {
        let _guard = self.locks.acquire(offer_id).await;

        let mut offer = self.get_offer(offer_id).await?;
        self.check_owner(&offer, seller_id)?;

        offer.active = active;
        self.offers.update(&offer).await?;
        log::info!("Offer {} set active={}", offer_id, active);
        Ok(offer)
    }

    /// Owner-only stock top-up
    pub async fn restock_offer(
        &self,
        offer_id: Uuid,
        seller_id: Uuid,
        additional: Decimal,
    ) -> AppResult<Offer> {
        if additional <= Decimal::ZERO {
            return Err(TradeError::InvalidAmount {
                amount: additional,
                min: Decimal::ZERO,
                max: Decimal::MAX,
            }
            .into());
        }

        let _guard = self.locks.acquire(offer_id).await;

        let mut offer = self.get_offer(offer_id).await?;
        self.check_owner(&offer, seller_id)?;

        offer.available_amount += additional;
        self.offers.update(&offer).await?;
        log::info!(
            "Offer {} restocked by {}, now {} available",
            offer_id,
            additional,
            offer.available_amount
        );
        Ok(offer)
    }

    /// Atomically take `amount` out of the offer's remaining stock for a
    /// new trade. Validates activity and per-trade bounds under the
    /// offer lock so two concurrent trades cannot both claim the last
    /// stock.
    pub(crate) async fn reserve(&self, offer_id: Uuid, amount: Decimal) -> AppResult<Offer> {
        let _guard = self.locks.acquire(offer_id).await;

        let mut offer = self.get_offer(offer_id).await?;
        if !offer.active {
            return Err(TradeError::OfferInactive.into());
        }
        if !offer.accepts_amount(amount) {
            return Err(TradeError::InvalidAmount {
                amount,
                min: offer.min_amount,
                max: offer.max_amount,
            }
            .into());
        }
        if amount > offer.available_amount {
            return Err(TradeError::InsufficientAvailability {
                requested: amount,
                available: offer.available_amount,
            }
            .into());
        }

        offer.available_amount -= amount;
        self.offers.update(&offer).await?;
        Ok(offer)
    }

    /// Return previously reserved stock after a cancellation
    pub(crate) async fn release(&self, offer_id: Uuid, amount: Decimal) -> AppResult<()> {
        let _guard = self.locks.acquire(offer_id).await;

        match self.offers.get(offer_id).await? {
            Some(mut offer) => {
                offer.available_amount += amount;
                self.offers.update(&offer).await?;
                log::debug!("Released {} back to offer {}", amount, offer_id);
                Ok(())
            }
            None => {
                // The trade outlives the offer row only if the catalog
                // lost data; nothing to restore.
                log::warn!("Release for missing offer {}", offer_id);
                Ok(())
            }
        }
    }

    fn check_owner(&self, offer: &Offer, seller_id: Uuid) -> Result<(), AccessError> {
        if offer.seller_id != seller_id {
            return Err(AccessError::NotOfferOwner {
                user_id: seller_id,
                offer_id: offer.id,
            });
        }
        Ok(())
    }
}
