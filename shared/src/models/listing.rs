//! Organic waste listing models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Frequency, WasteType};

/// A quantity of organic waste offered for sale by a seller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrganicWasteListing {
    pub id: Uuid,
    /// Email of the selling account
    pub seller_id: String,
    pub seller_name: String,
    pub waste_type: WasteType,
    /// Remaining stock
    pub quantity_kg: Decimal,
    pub original_quantity: Decimal,
    /// Price in USD per kilogram
    pub price_per_kg: Decimal,
    pub frequency: Option<Frequency>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
}

impl OrganicWasteListing {
    pub fn is_available(&self) -> bool {
        self.status == ListingStatus::Disponible
    }
}

/// Listing availability
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[default]
    Disponible,
    /// Sold out
    Vendido,
}

wire_enum!(ListingStatus, "listing status", {
    Disponible => "disponible",
    Vendido => "vendido",
});

impl ListingStatus {
    /// Status implied by the remaining stock; sold out once no whole
    /// kilogram is left to buy
    pub fn for_remaining(remaining_kg: Decimal) -> Self {
        if remaining_kg < Decimal::ONE {
            ListingStatus::Vendido
        } else {
            ListingStatus::Disponible
        }
    }
}

/// Seller input for publishing a listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewListing {
    pub waste_type: Option<WasteType>,
    pub quantity_kg: Decimal,
    pub price_per_kg: Decimal,
    pub frequency: Option<Frequency>,
    pub location: Option<String>,
    pub description: Option<String>,
}
