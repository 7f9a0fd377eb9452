//! Dashboard service: seller and buyer summaries

use serde::Serialize;
use sqlx::PgPool;

use shared::{
    AccessDecision, AccessState, BuyerStats, EnvironmentalImpact, OrganicWasteListing, Page,
    SellerStats, Transaction, UserProfile,
};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::purchase::Party;
use crate::services::{ListingService, ProfileService, PurchaseService};

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    profiles: ProfileService,
    listings: ListingService,
    purchases: PurchaseService,
}

/// Seller dashboard payload
#[derive(Debug, Serialize)]
pub struct SellerDashboard {
    pub profile: UserProfile,
    pub stats: SellerStats,
    pub impact: EnvironmentalImpact,
    pub listings: Vec<OrganicWasteListing>,
    pub transactions: Vec<Transaction>,
}

/// Buyer dashboard payload
#[derive(Debug, Serialize)]
pub struct BuyerDashboard {
    pub profile: UserProfile,
    pub access: AccessDecision,
    pub stats: BuyerStats,
    pub transactions: Vec<Transaction>,
}

impl DashboardService {
    pub fn new(db: PgPool) -> Self {
        Self {
            profiles: ProfileService::new(db.clone()),
            listings: ListingService::new(db.clone()),
            purchases: PurchaseService::new(db),
        }
    }

    pub async fn seller(&self, user: &AuthUser) -> AppResult<SellerDashboard> {
        let (state, profile) = self.profiles.access_state(user.user_id).await?;
        let profile = Self::require_page(state, profile, Page::SellerDashboard)?;

        let listings = self.listings.list_for_seller(&user.email).await?;
        let transactions = self.purchases.history(&user.email, Party::Seller).await?;
        let stats = SellerStats::compute(&listings, &transactions);

        Ok(SellerDashboard {
            profile,
            impact: EnvironmentalImpact::from_kg(stats.total_sold_kg),
            stats,
            listings,
            transactions,
        })
    }

    pub async fn buyer(&self, user: &AuthUser) -> AppResult<BuyerDashboard> {
        let (state, profile) = self.profiles.access_state(user.user_id).await?;
        let profile = Self::require_page(state, profile, Page::BuyerDashboard)?;

        let transactions = self.purchases.history(&user.email, Party::Buyer).await?;

        Ok(BuyerDashboard {
            profile,
            access: state.decide(Some(Page::BuyerDashboard)),
            stats: BuyerStats::compute(&transactions),
            transactions,
        })
    }

    /// Refuse a dashboard the state would redirect away from
    fn require_page(
        state: AccessState,
        profile: Option<UserProfile>,
        page: Page,
    ) -> AppResult<UserProfile> {
        let resolved = state.resolve(page);
        match profile {
            Some(profile) if resolved == page => Ok(profile),
            _ => Err(AppError::Forbidden {
                message: format!("This dashboard is not available in state {}", state),
                message_es: "Este panel no está disponible para tu cuenta".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sellers_cannot_open_buyer_dashboard() {
        let err = DashboardService::require_page(AccessState::SellerActive, None, Page::BuyerDashboard);
        assert!(matches!(err, Err(AppError::Forbidden { .. })));
    }

    #[test]
    fn test_missing_profile_is_refused() {
        let err = DashboardService::require_page(AccessState::ProfileMissing, None, Page::SellerDashboard);
        assert!(err.is_err());
    }
}
