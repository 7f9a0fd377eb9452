//! Marketplace browsing, publishing and dashboard figures

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{NewListing, OrganicWasteListing, Transaction, WasteType};
use crate::validation::{validate_price_per_kg, validate_quantity_kg};

// ============================================================================
// Browsing
// ============================================================================

/// Buyer-side filters for the available listings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingFilter {
    pub waste_type: Option<WasteType>,
    pub min_quantity: Option<Decimal>,
    /// Buyer's country, matched against the listing location
    pub country: Option<String>,
}

impl ListingFilter {
    pub fn matches(&self, listing: &OrganicWasteListing) -> bool {
        if !listing.is_available() {
            return false;
        }
        if self.waste_type.is_some_and(|w| w != listing.waste_type) {
            return false;
        }
        if self.min_quantity.is_some_and(|min| listing.quantity_kg < min) {
            return false;
        }
        match self.country.as_deref().map(str::trim) {
            Some(country) if !country.is_empty() => listing
                .location
                .as_deref()
                .is_some_and(|location| location.to_lowercase().contains(&country.to_lowercase())),
            _ => true,
        }
    }

    pub fn apply(&self, listings: Vec<OrganicWasteListing>) -> Vec<OrganicWasteListing> {
        listings.into_iter().filter(|l| self.matches(l)).collect()
    }
}

// ============================================================================
// Publishing
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    #[error("waste type is required")]
    WasteTypeRequired,

    #[error("{field}: {reason}")]
    InvalidField { field: &'static str, reason: &'static str },
}

impl ListingError {
    pub fn field(&self) -> &'static str {
        match self {
            ListingError::WasteTypeRequired => "waste_type",
            ListingError::InvalidField { field, .. } => *field,
        }
    }
}

/// A listing that passed validation, ready to be stored
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedListing {
    pub waste_type: WasteType,
    pub quantity_kg: Decimal,
    pub price_per_kg: Decimal,
    pub frequency: Option<crate::models::Frequency>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl ValidatedListing {
    /// Stock recorded at creation time
    pub fn original_quantity(&self) -> Decimal {
        self.quantity_kg
    }
}

pub fn validate_new_listing(input: NewListing) -> Result<ValidatedListing, ListingError> {
    let waste_type = input.waste_type.ok_or(ListingError::WasteTypeRequired)?;
    validate_quantity_kg(input.quantity_kg)
        .map_err(|reason| ListingError::InvalidField { field: "quantity_kg", reason })?;
    validate_price_per_kg(input.price_per_kg)
        .map_err(|reason| ListingError::InvalidField { field: "price_per_kg", reason })?;

    Ok(ValidatedListing {
        waste_type,
        quantity_kg: input.quantity_kg,
        price_per_kg: input.price_per_kg,
        frequency: input.frequency,
        location: input.location.filter(|l| !l.trim().is_empty()),
        description: input.description.filter(|d| !d.trim().is_empty()),
    })
}

// ============================================================================
// Dashboards
// ============================================================================

/// Seller dashboard figures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerStats {
    pub total_sold_kg: Decimal,
    pub gross_earnings: Decimal,
    pub net_earnings: Decimal,
    pub available_stock_kg: Decimal,
    pub active_listings: usize,
    pub completed_sales: usize,
}

impl SellerStats {
    pub fn compute(listings: &[OrganicWasteListing], transactions: &[Transaction]) -> Self {
        let mut stats = transactions
            .iter()
            .filter(|t| t.is_completed())
            .fold(Self::default(), |mut acc, t| {
                acc.total_sold_kg += t.quantity_kg;
                acc.gross_earnings += t.subtotal;
                acc.net_earnings += t.seller_earnings;
                acc.completed_sales += 1;
                acc
            });

        for listing in listings.iter().filter(|l| l.is_available()) {
            stats.available_stock_kg += listing.quantity_kg;
            stats.active_listings += 1;
        }

        stats
    }
}

/// Buyer dashboard figures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerStats {
    pub total_purchased_kg: Decimal,
    pub total_spent: Decimal,
    pub completed_purchases: usize,
}

impl BuyerStats {
    pub fn compute(transactions: &[Transaction]) -> Self {
        transactions
            .iter()
            .filter(|t| t.is_completed())
            .fold(Self::default(), |mut acc, t| {
                acc.total_purchased_kg += t.quantity_kg;
                acc.total_spent += t.total_amount;
                acc.completed_purchases += 1;
                acc
            })
    }
}

/// Kilograms of waste diverted per tree saved
pub const KG_PER_TREE: Decimal = Decimal::from_parts(100, 0, 0, false, 0);
/// Kilograms of CO2 avoided per kilogram diverted
pub const CO2_KG_PER_KG: Decimal = Decimal::from_parts(25, 0, 0, false, 1);
/// Litres of water saved per kilogram diverted
pub const WATER_L_PER_KG: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Environmental impact of the waste a seller has diverted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentalImpact {
    pub trees_saved: Decimal,
    pub co2_avoided_kg: Decimal,
    pub water_saved_liters: Decimal,
}

impl EnvironmentalImpact {
    pub fn from_kg(total_kg: Decimal) -> Self {
        let whole = |d: Decimal| d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        Self {
            trees_saved: (total_kg / KG_PER_TREE).floor(),
            co2_avoided_kg: whole(total_kg * CO2_KG_PER_KG),
            water_saved_liters: whole(total_kg * WATER_L_PER_KG),
        }
    }
}

/// Order transactions newest first
pub fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListingStatus, PaymentStatus, TransactionStatus};
    use chrono::{Duration, Utc};
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn listing(waste_type: WasteType, quantity: &str, location: Option<&str>) -> OrganicWasteListing {
        OrganicWasteListing {
            id: Uuid::new_v4(),
            seller_id: "granja@example.com".to_string(),
            seller_name: "Granja".to_string(),
            waste_type,
            quantity_kg: dec(quantity),
            original_quantity: dec(quantity),
            price_per_kg: dec("1.00"),
            frequency: None,
            location: location.map(str::to_string),
            description: None,
            status: ListingStatus::Disponible,
            created_at: Utc::now(),
        }
    }

    fn transaction(quantity: &str, subtotal: &str, status: TransactionStatus) -> Transaction {
        let subtotal = dec(subtotal);
        let fee = crate::purchase::platform_fee(subtotal);
        Transaction {
            id: Uuid::new_v4(),
            waste_id: Uuid::new_v4(),
            seller_id: "granja@example.com".to_string(),
            seller_name: "Granja".to_string(),
            buyer_id: "planta@example.com".to_string(),
            buyer_name: "Planta".to_string(),
            waste_type: WasteType::Bagazo,
            quantity_kg: dec(quantity),
            price_per_kg: dec("1.00"),
            subtotal,
            platform_fee: fee,
            total_amount: subtotal + fee,
            seller_earnings: subtotal - fee,
            status,
            payment_status: PaymentStatus::Pagado,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_filter_by_country_case_insensitive() {
        let filter = ListingFilter {
            country: Some("méxico".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&listing(WasteType::Bagazo, "10", Some("Guadalajara, MÉXICO"))));
        assert!(!filter.matches(&listing(WasteType::Bagazo, "10", Some("Santiago, Chile"))));
        assert!(!filter.matches(&listing(WasteType::Bagazo, "10", None)));
    }

    #[test]
    fn test_filter_by_type_and_min_quantity() {
        let filter = ListingFilter {
            waste_type: Some(WasteType::Estiercol),
            min_quantity: Some(dec("500")),
            country: None,
        };
        assert!(filter.matches(&listing(WasteType::Estiercol, "500", None)));
        assert!(!filter.matches(&listing(WasteType::Estiercol, "499", None)));
        assert!(!filter.matches(&listing(WasteType::Bagazo, "900", None)));

        let mut sold = listing(WasteType::Estiercol, "900", None);
        sold.status = ListingStatus::Vendido;
        assert!(!filter.matches(&sold));
    }

    #[test]
    fn test_validate_new_listing() {
        let input = NewListing {
            waste_type: Some(WasteType::PulpaVegetal),
            quantity_kg: dec("1200"),
            price_per_kg: dec("0.80"),
            frequency: None,
            location: Some("  ".to_string()),
            description: None,
        };
        let listing = validate_new_listing(input.clone()).unwrap();
        assert_eq!(listing.original_quantity(), dec("1200"));
        assert_eq!(listing.location, None);

        let missing_type = NewListing {
            waste_type: None,
            ..input.clone()
        };
        assert_eq!(validate_new_listing(missing_type), Err(ListingError::WasteTypeRequired));

        let zero_price = NewListing {
            price_per_kg: Decimal::ZERO,
            ..input
        };
        assert_eq!(validate_new_listing(zero_price).unwrap_err().field(), "price_per_kg");
    }

    #[test]
    fn test_seller_stats_only_count_completed() {
        let transactions = vec![
            transaction("100", "200.00", TransactionStatus::Completada),
            transaction("50", "100.00", TransactionStatus::Cancelada),
            transaction("25", "50.00", TransactionStatus::Completada),
        ];
        let mut sold_out = listing(WasteType::Bagazo, "0", None);
        sold_out.status = ListingStatus::Vendido;
        let listings = vec![listing(WasteType::Bagazo, "300", None), sold_out];

        let stats = SellerStats::compute(&listings, &transactions);
        assert_eq!(stats.total_sold_kg, dec("125"));
        assert_eq!(stats.gross_earnings, dec("250.00"));
        assert_eq!(stats.net_earnings, dec("247.50"));
        assert_eq!(stats.available_stock_kg, dec("300"));
        assert_eq!(stats.active_listings, 1);
        assert_eq!(stats.completed_sales, 2);
    }

    #[test]
    fn test_buyer_stats() {
        let transactions = vec![
            transaction("100", "200.00", TransactionStatus::Completada),
            transaction("10", "20.00", TransactionStatus::Pendiente),
        ];
        let stats = BuyerStats::compute(&transactions);
        assert_eq!(stats.total_purchased_kg, dec("100"));
        assert_eq!(stats.total_spent, dec("202.00"));
        assert_eq!(stats.completed_purchases, 1);
    }

    #[test]
    fn test_environmental_impact() {
        let impact = EnvironmentalImpact::from_kg(dec("1250"));
        assert_eq!(impact.trees_saved, dec("12"));
        assert_eq!(impact.co2_avoided_kg, dec("3125"));
        assert_eq!(impact.water_saved_liters, dec("62500"));

        assert_eq!(EnvironmentalImpact::from_kg(dec("99")).trees_saved, Decimal::ZERO);
    }

    #[test]
    fn test_sort_newest_first() {
        let mut older = transaction("1", "1.00", TransactionStatus::Completada);
        older.created_at = Utc::now() - Duration::days(2);
        let newer = transaction("2", "2.00", TransactionStatus::Completada);
        let newer_id = newer.id;

        let mut transactions = vec![older, newer];
        sort_newest_first(&mut transactions);
        assert_eq!(transactions[0].id, newer_id);
    }
}
