//! Multi-step onboarding form
//!
//! Step 1 picks the role, step 2 collects company details and step 3 (buyers
//! only) collects the waste types needed and the operating permit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{IndustryType, NewUserProfile, UserRole, WasteType};
use crate::validation::{validate_document_url, validate_phone};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OnboardingError {
    #[error("select a role to continue")]
    RoleRequired,

    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("industry {industry} is not offered for role {role}")]
    IndustryNotOffered { industry: IndustryType, role: UserRole },

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: &'static str },

    #[error("select at least one waste type")]
    WasteTypesRequired,

    #[error("a permit document is required for buyers")]
    PermitRequired,

    #[error("onboarding has no step {0}")]
    NoSuchStep(u8),
}

impl OnboardingError {
    /// Form field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            OnboardingError::RoleRequired => "role",
            OnboardingError::MissingField { field } | OnboardingError::InvalidField { field, .. } => {
                *field
            }
            OnboardingError::IndustryNotOffered { .. } => "industry_type",
            OnboardingError::WasteTypesRequired => "waste_types_needed",
            OnboardingError::PermitRequired => "permit_document_url",
            OnboardingError::NoSuchStep(_) => "step",
        }
    }
}

/// Form state as the user fills it in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnboardingForm {
    pub step: u8,
    pub role: Option<UserRole>,
    pub company_name: String,
    pub industry_type: Option<IndustryType>,
    pub location: String,
    pub country: String,
    pub phone: String,
    pub description: String,
    pub waste_types_needed: Vec<WasteType>,
    pub permit_document_url: String,
}

impl Default for OnboardingForm {
    fn default() -> Self {
        Self {
            step: Self::FIRST_STEP,
            role: None,
            company_name: String::new(),
            industry_type: None,
            location: String::new(),
            country: String::new(),
            phone: String::new(),
            description: String::new(),
            waste_types_needed: Vec::new(),
            permit_document_url: String::new(),
        }
    }
}

impl OnboardingForm {
    pub const FIRST_STEP: u8 = 1;

    pub fn new() -> Self {
        Self::default()
    }

    /// Start the form with the role picked on the welcome screen
    pub fn with_pending_role(pending_role: Option<UserRole>) -> Self {
        let mut form = Self::new();
        form.role = pending_role;
        form
    }

    /// Number of steps for the selected role
    pub fn total_steps(&self) -> u8 {
        match self.role {
            Some(role) if role.requires_verification() => 3,
            _ => 2,
        }
    }

    pub fn is_last_step(&self) -> bool {
        self.step >= self.total_steps()
    }

    pub fn select_role(&mut self, role: UserRole) {
        self.role = Some(role);
        if let Some(industry) = self.industry_type {
            if !role.industry_options().contains(&industry) {
                self.industry_type = None;
            }
        }
        if !role.requires_verification() {
            self.waste_types_needed.clear();
            self.permit_document_url.clear();
        }
    }

    /// Add the waste type if absent, remove it otherwise
    pub fn toggle_waste_type(&mut self, waste_type: WasteType) {
        if let Some(pos) = self.waste_types_needed.iter().position(|w| *w == waste_type) {
            self.waste_types_needed.remove(pos);
        } else {
            self.waste_types_needed.push(waste_type);
        }
    }

    pub fn attach_permit(&mut self, file_url: impl Into<String>) {
        self.permit_document_url = file_url.into();
    }

    /// Validate a single step
    pub fn validate_step(&self, step: u8) -> Result<(), OnboardingError> {
        match step {
            1 => self.role.map(|_| ()).ok_or(OnboardingError::RoleRequired),
            2 => self.validate_details(),
            3 => self.validate_verification(),
            other => Err(OnboardingError::NoSuchStep(other)),
        }
    }

    /// Move forward if the current step is valid
    pub fn advance(&mut self) -> Result<u8, OnboardingError> {
        self.validate_step(self.step)?;
        if !self.is_last_step() {
            self.step += 1;
        }
        Ok(self.step)
    }

    /// Step back without validating
    pub fn back(&mut self) -> u8 {
        if self.step > Self::FIRST_STEP {
            self.step -= 1;
        }
        self.step
    }

    /// Validate every applicable step and build the profile payload
    pub fn submit(&self) -> Result<NewUserProfile, OnboardingError> {
        for step in Self::FIRST_STEP..=self.total_steps() {
            self.validate_step(step)?;
        }

        let role = self.role.ok_or(OnboardingError::RoleRequired)?;
        let industry_type = self
            .industry_type
            .ok_or(OnboardingError::MissingField { field: "industry_type" })?;
        let is_buyer = role.requires_verification();

        Ok(NewUserProfile {
            role,
            onboarding_completed: true,
            approval_status: role.initial_approval_status(),
            company_name: self.company_name.trim().to_string(),
            industry_type,
            country: self.country.trim().to_string(),
            location: non_empty(&self.location),
            phone: non_empty(&self.phone),
            description: non_empty(&self.description),
            waste_types_needed: if is_buyer {
                self.waste_types_needed.clone()
            } else {
                Vec::new()
            },
            permit_document_url: if is_buyer {
                non_empty(&self.permit_document_url)
            } else {
                None
            },
        })
    }

    fn validate_details(&self) -> Result<(), OnboardingError> {
        let role = self.role.ok_or(OnboardingError::RoleRequired)?;

        if self.company_name.trim().is_empty() {
            return Err(OnboardingError::MissingField { field: "company_name" });
        }
        let industry = self
            .industry_type
            .ok_or(OnboardingError::MissingField { field: "industry_type" })?;
        if !role.industry_options().contains(&industry) {
            return Err(OnboardingError::IndustryNotOffered { industry, role });
        }
        if self.country.trim().is_empty() {
            return Err(OnboardingError::MissingField { field: "country" });
        }
        if !self.phone.trim().is_empty() {
            validate_phone(&self.phone)
                .map_err(|reason| OnboardingError::InvalidField { field: "phone", reason })?;
        }
        Ok(())
    }

    fn validate_verification(&self) -> Result<(), OnboardingError> {
        if self.waste_types_needed.is_empty() {
            return Err(OnboardingError::WasteTypesRequired);
        }
        if self.permit_document_url.trim().is_empty() {
            return Err(OnboardingError::PermitRequired);
        }
        validate_document_url(&self.permit_document_url).map_err(|reason| {
            OnboardingError::InvalidField {
                field: "permit_document_url",
                reason,
            }
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApprovalStatus;

    fn seller_form() -> OnboardingForm {
        let mut form = OnboardingForm::new();
        form.select_role(UserRole::SellerPersonal);
        form.company_name = "Granja El Roble".to_string();
        form.industry_type = Some(IndustryType::Ganaderia);
        form.country = "México".to_string();
        form
    }

    #[test]
    fn test_seller_has_two_steps_and_is_approved() {
        let mut form = seller_form();
        assert_eq!(form.total_steps(), 2);
        assert_eq!(form.advance(), Ok(2));
        assert!(form.is_last_step());

        let profile = form.submit().unwrap();
        assert_eq!(profile.approval_status, ApprovalStatus::Approved);
        assert!(profile.onboarding_completed);
        assert!(profile.permit_document_url.is_none());
    }

    #[test]
    fn test_step_one_requires_role() {
        let mut form = OnboardingForm::new();
        assert_eq!(form.advance(), Err(OnboardingError::RoleRequired));
        assert_eq!(form.step, 1);
    }

    #[test]
    fn test_buyer_requires_waste_types_and_permit() {
        let mut form = OnboardingForm::with_pending_role(Some(UserRole::BuyerBusiness));
        form.company_name = "BioEnergía del Norte".to_string();
        form.industry_type = Some(IndustryType::Biogas);
        form.country = "Chile".to_string();
        assert_eq!(form.total_steps(), 3);

        assert_eq!(form.submit(), Err(OnboardingError::WasteTypesRequired));

        form.toggle_waste_type(WasteType::Estiercol);
        assert_eq!(form.submit(), Err(OnboardingError::PermitRequired));

        form.attach_permit("https://files.example.com/permits/123.pdf");
        let profile = form.submit().unwrap();
        assert_eq!(profile.approval_status, ApprovalStatus::Pending);
        assert_eq!(profile.waste_types_needed, vec![WasteType::Estiercol]);
    }

    #[test]
    fn test_toggle_waste_type() {
        let mut form = OnboardingForm::new();
        form.toggle_waste_type(WasteType::Bagazo);
        form.toggle_waste_type(WasteType::LodosOrganicos);
        form.toggle_waste_type(WasteType::Bagazo);
        assert_eq!(form.waste_types_needed, vec![WasteType::LodosOrganicos]);
    }

    #[test]
    fn test_role_change_clears_unoffered_industry() {
        let mut form = seller_form();
        form.select_role(UserRole::BuyerBusiness);
        assert_eq!(form.industry_type, None);

        form.industry_type = Some(IndustryType::Otro);
        form.select_role(UserRole::SellerBusiness);
        assert_eq!(form.industry_type, Some(IndustryType::Otro));
    }

    #[test]
    fn test_industry_must_match_role() {
        let mut form = seller_form();
        form.industry_type = Some(IndustryType::Energia);
        assert_eq!(
            form.validate_step(2),
            Err(OnboardingError::IndustryNotOffered {
                industry: IndustryType::Energia,
                role: UserRole::SellerPersonal
            })
        );
    }

    #[test]
    fn test_back_never_validates() {
        let mut form = seller_form();
        form.advance().unwrap();
        form.company_name.clear();
        assert_eq!(form.back(), 1);
        assert_eq!(form.back(), 1);
    }
}
