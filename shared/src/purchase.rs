//! Purchase computation
//!
//! Quantity clamping, platform fee and stock decrement for buying from a
//! listing. Everything here is pure so the browser and the server quote the
//! same numbers.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ListingStatus, OrganicWasteListing};

/// Platform commission, charged to the buyer and withheld from the seller
pub const PLATFORM_FEE_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Quantity preselected when the purchase dialog opens
pub const DEFAULT_PURCHASE_KG: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("listing is not available")]
    ListingUnavailable,

    #[error("quantity must be at least 1 kg")]
    QuantityTooSmall,

    #[error("quantity must be a whole number of kilograms, got {0}")]
    FractionalQuantity(Decimal),

    #[error("requested {requested} kg but only {available} kg available")]
    InsufficientStock { requested: Decimal, available: Decimal },

    #[error("price per kg must be positive")]
    InvalidPrice,
}

/// Amounts for buying `quantity_kg` at `price_per_kg`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseQuote {
    pub quantity_kg: Decimal,
    pub price_per_kg: Decimal,
    pub subtotal: Decimal,
    pub platform_fee: Decimal,
    pub total_amount: Decimal,
    pub seller_earnings: Decimal,
}

impl PurchaseQuote {
    pub fn compute(quantity_kg: Decimal, price_per_kg: Decimal) -> Self {
        let subtotal = quantity_kg * price_per_kg;
        let platform_fee = platform_fee(subtotal);

        Self {
            quantity_kg,
            price_per_kg,
            subtotal,
            platform_fee,
            total_amount: subtotal + platform_fee,
            seller_earnings: subtotal - platform_fee,
        }
    }
}

/// One percent of the subtotal, rounded half away from zero to cents
pub fn platform_fee(subtotal: Decimal) -> Decimal {
    (subtotal * PLATFORM_FEE_RATE).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Clamp a requested quantity to whole kilograms within `[1, available_kg]`.
/// Only whole kilograms of the stock can be bought.
pub fn clamp_quantity(requested: Decimal, available_kg: Decimal) -> Decimal {
    requested.trunc().max(Decimal::ONE).min(available_kg.trunc())
}

/// Clamp raw form input; anything that is not a number counts as 1 kg
pub fn clamp_quantity_input(input: &str, available_kg: Decimal) -> Decimal {
    let requested = input.trim().parse::<Decimal>().unwrap_or(Decimal::ONE);
    clamp_quantity(requested, available_kg)
}

/// Quantity preselected in the purchase dialog
pub fn default_quantity(available_kg: Decimal) -> Decimal {
    DEFAULT_PURCHASE_KG.min(available_kg.trunc())
}

/// A validated purchase and its effect on the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasePlan {
    pub quote: PurchaseQuote,
    pub remaining_kg: Decimal,
    pub listing_status: ListingStatus,
}

impl PurchasePlan {
    pub fn sells_out(&self) -> bool {
        self.listing_status == ListingStatus::Vendido
    }
}

/// Validate `quantity_kg` against the listing and compute the outcome
pub fn plan_purchase(
    listing: &OrganicWasteListing,
    quantity_kg: Decimal,
) -> Result<PurchasePlan, PurchaseError> {
    if !listing.is_available() {
        return Err(PurchaseError::ListingUnavailable);
    }
    if listing.price_per_kg <= Decimal::ZERO {
        return Err(PurchaseError::InvalidPrice);
    }
    if quantity_kg < Decimal::ONE {
        return Err(PurchaseError::QuantityTooSmall);
    }
    if !quantity_kg.fract().is_zero() {
        return Err(PurchaseError::FractionalQuantity(quantity_kg));
    }
    if quantity_kg > listing.quantity_kg {
        return Err(PurchaseError::InsufficientStock {
            requested: quantity_kg,
            available: listing.quantity_kg,
        });
    }

    let quantity_kg = quantity_kg.normalize();
    let remaining_kg = listing.quantity_kg - quantity_kg;

    Ok(PurchasePlan {
        quote: PurchaseQuote::compute(quantity_kg, listing.price_per_kg),
        remaining_kg,
        listing_status: ListingStatus::for_remaining(remaining_kg),
    })
}
