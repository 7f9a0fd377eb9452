//! User profile and role models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::WasteType;

/// Marketplace role chosen during onboarding
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SellerPersonal,
    SellerBusiness,
    BuyerBusiness,
}

wire_enum!(UserRole, "role", {
    SellerPersonal => "seller_personal",
    SellerBusiness => "seller_business",
    BuyerBusiness => "buyer_business",
});

impl UserRole {
    pub fn is_seller(&self) -> bool {
        matches!(self, UserRole::SellerPersonal | UserRole::SellerBusiness)
    }

    pub fn is_buyer(&self) -> bool {
        matches!(self, UserRole::BuyerBusiness)
    }

    /// Buyers must pass permit verification before they can purchase
    pub fn requires_verification(&self) -> bool {
        self.is_buyer()
    }

    /// Approval status assigned when the profile is created
    pub fn initial_approval_status(&self) -> ApprovalStatus {
        if self.requires_verification() {
            ApprovalStatus::Pending
        } else {
            ApprovalStatus::Approved
        }
    }

    /// Industries offered in the onboarding form for this role
    pub fn industry_options(&self) -> &'static [IndustryType] {
        const SELLER: &[IndustryType] = &[
            IndustryType::Granja,
            IndustryType::Ganaderia,
            IndustryType::Agroindustrial,
            IndustryType::Otro,
        ];
        const BUYER: &[IndustryType] = &[
            IndustryType::Biogas,
            IndustryType::Energia,
            IndustryType::Otro,
        ];

        if self.is_buyer() {
            BUYER
        } else {
            SELLER
        }
    }
}

/// Reviewer decision on a buyer's permit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

wire_enum!(ApprovalStatus, "approval status", {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

/// Industry a participant operates in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IndustryType {
    Granja,
    Ganaderia,
    Agroindustrial,
    Biogas,
    Energia,
    Otro,
}

wire_enum!(IndustryType, "industry type", {
    Granja => "granja",
    Ganaderia => "ganaderia",
    Agroindustrial => "agroindustrial",
    Biogas => "biogas",
    Energia => "energia",
    Otro => "otro",
});

impl IndustryType {
    pub fn label(&self) -> &'static str {
        match self {
            IndustryType::Granja => "Granja",
            IndustryType::Ganaderia => "Ganadería",
            IndustryType::Agroindustrial => "Agroindustrial",
            IndustryType::Biogas => "Planta de Biogás",
            IndustryType::Energia => "Generación de Energía",
            IndustryType::Otro => "Otro",
        }
    }
}

/// A participant's marketplace profile, created once at the end of onboarding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    /// Email of the account that owns this profile
    pub owner_email: String,
    pub role: UserRole,
    pub onboarding_completed: bool,
    /// Only meaningful for buyers; sellers are approved at creation
    pub approval_status: Option<ApprovalStatus>,
    pub company_name: String,
    pub industry_type: IndustryType,
    pub country: String,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub waste_types_needed: Vec<WasteType>,
    pub permit_document_url: Option<String>,
    // Display aggregates, recomputed from transaction history
    pub total_sold_kg: Decimal,
    pub total_purchased_kg: Decimal,
    pub total_earnings: Decimal,
    pub total_spent: Decimal,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Whether the profile satisfies the completeness invariant
    pub fn is_complete(&self) -> bool {
        self.onboarding_completed && (!self.role.is_buyer() || self.approval_status.is_some())
    }

    /// Name shown to counterparties, falling back to the account name
    pub fn display_name<'a>(&'a self, account_name: &'a str) -> &'a str {
        if self.company_name.trim().is_empty() {
            account_name
        } else {
            &self.company_name
        }
    }
}

/// Profile payload produced by a completed onboarding form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewUserProfile {
    pub role: UserRole,
    pub onboarding_completed: bool,
    pub approval_status: ApprovalStatus,
    pub company_name: String,
    pub industry_type: IndustryType,
    pub country: String,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub waste_types_needed: Vec<WasteType>,
    pub permit_document_url: Option<String>,
}

impl NewUserProfile {
    /// Materialize the stored record for `owner_email`
    pub fn into_profile(self, id: Uuid, owner_email: String, created_at: DateTime<Utc>) -> UserProfile {
        UserProfile {
            id,
            owner_email,
            role: self.role,
            onboarding_completed: self.onboarding_completed,
            approval_status: Some(self.approval_status),
            company_name: self.company_name,
            industry_type: self.industry_type,
            country: self.country,
            location: self.location,
            phone: self.phone,
            description: self.description,
            waste_types_needed: self.waste_types_needed,
            permit_document_url: self.permit_document_url,
            total_sold_kg: Decimal::ZERO,
            total_purchased_kg: Decimal::ZERO,
            total_earnings: Decimal::ZERO,
            total_spent: Decimal::ZERO,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_approval_status_per_role() {
        assert_eq!(UserRole::SellerPersonal.initial_approval_status(), ApprovalStatus::Approved);
        assert_eq!(UserRole::SellerBusiness.initial_approval_status(), ApprovalStatus::Approved);
        assert_eq!(UserRole::BuyerBusiness.initial_approval_status(), ApprovalStatus::Pending);
    }

    #[test]
    fn test_industry_options() {
        assert!(UserRole::BuyerBusiness.industry_options().contains(&IndustryType::Biogas));
        assert!(!UserRole::BuyerBusiness.industry_options().contains(&IndustryType::Granja));
        assert!(UserRole::SellerPersonal.industry_options().contains(&IndustryType::Ganaderia));
        assert!(!UserRole::SellerBusiness.industry_options().contains(&IndustryType::Energia));
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!("buyer_business".parse::<UserRole>(), Ok(UserRole::BuyerBusiness));
        assert!("seller".parse::<UserRole>().is_err());
        assert_eq!(UserRole::SellerPersonal.to_string(), "seller_personal");
    }
}
