// src/application/dto/mod.rs
// Request DTOs crossing into the application layer

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOfferRequest {
    pub seller_id: Uuid,
    pub platform: String,
    pub currency: String,
    pub rate: Decimal,
    pub available_amount: Decimal,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
}

/// Raw receipt file as handed over by the API layer; stored through the
/// blob store before the submit-receipt action reaches the state machine
#[derive(Debug, Clone)]
pub struct ReceiptUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}
