//! Profile service: onboarding completion and access-state lookup

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgExecutor, PgPool};
use uuid::Uuid;

use shared::{
    AccessEvent, AccessState, ApprovalStatus, IndustryType, OnboardingForm, UserProfile, UserRole,
    WasteType,
};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;

/// Profile service
#[derive(Clone)]
pub struct ProfileService {
    db: PgPool,
}

const PROFILE_COLUMNS: &str = r#"
    id, owner_email, role, onboarding_completed, approval_status, company_name,
    industry_type, country, location, phone, description, waste_types_needed,
    permit_document_url, total_sold_kg, total_purchased_kg, total_earnings,
    total_spent, created_at
"#;

/// Row for profile queries
#[derive(Debug, FromRow)]
struct ProfileRow {
    id: Uuid,
    owner_email: String,
    role: String,
    onboarding_completed: bool,
    approval_status: Option<String>,
    company_name: String,
    industry_type: String,
    country: String,
    location: Option<String>,
    phone: Option<String>,
    description: Option<String>,
    waste_types_needed: Vec<String>,
    permit_document_url: Option<String>,
    total_sold_kg: Decimal,
    total_purchased_kg: Decimal,
    total_earnings: Decimal,
    total_spent: Decimal,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = AppError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(UserProfile {
            id: row.id,
            owner_email: row.owner_email,
            role: row.role.parse::<UserRole>()?,
            onboarding_completed: row.onboarding_completed,
            approval_status: row
                .approval_status
                .as_deref()
                .map(str::parse::<ApprovalStatus>)
                .transpose()?,
            company_name: row.company_name,
            industry_type: row.industry_type.parse::<IndustryType>()?,
            country: row.country,
            location: row.location,
            phone: row.phone,
            description: row.description,
            waste_types_needed: row
                .waste_types_needed
                .iter()
                .map(|w| WasteType::from_str_or_other(w))
                .collect(),
            permit_document_url: row.permit_document_url,
            total_sold_kg: row.total_sold_kg,
            total_purchased_kg: row.total_purchased_kg,
            total_earnings: row.total_earnings,
            total_spent: row.total_spent,
            created_at: row.created_at,
        })
    }
}

/// Fetch a profile through any executor, so purchases can read inside their transaction
pub(crate) async fn fetch_profile<'e, E>(executor: E, user_id: Uuid) -> AppResult<Option<UserProfile>>
where
    E: PgExecutor<'e>,
{
    let sql = format!("SELECT {} FROM user_profiles WHERE user_id = $1", PROFILE_COLUMNS);
    sqlx::query_as::<_, ProfileRow>(&sql)
        .bind(user_id)
        .fetch_optional(executor)
        .await?
        .map(UserProfile::try_from)
        .transpose()
}

impl ProfileService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Profile of the user, if onboarding has produced one
    pub async fn find(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        fetch_profile(&self.db, user_id).await
    }

    /// Profile of the user, or 404
    pub async fn get(&self, user_id: Uuid) -> AppResult<UserProfile> {
        self.find(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("profile".to_string()))
    }

    /// Access state for an authenticated user, read fresh on every call
    pub async fn access_state(&self, user_id: Uuid) -> AppResult<(AccessState, Option<UserProfile>)> {
        let profile = self.find(user_id).await?;
        let state = AccessState::for_session(true, profile.as_ref());
        Ok((state, profile))
    }

    /// Persist the profile produced by a finished onboarding form
    pub async fn complete_onboarding(
        &self,
        user: &AuthUser,
        form: OnboardingForm,
    ) -> AppResult<UserProfile> {
        let (state, _) = self.access_state(user.user_id).await?;
        if state != AccessState::ProfileMissing {
            return Err(AppError::Conflict {
                resource: "profile".to_string(),
                message: "Onboarding was already completed".to_string(),
                message_es: "El registro ya fue completado".to_string(),
            });
        }

        let new_profile = form.submit()?;

        let next = state
            .transition(AccessEvent::BeginOnboarding)?
            .transition(AccessEvent::CompleteOnboarding {
                role: new_profile.role,
            })?;

        let waste_types: Vec<&str> = new_profile
            .waste_types_needed
            .iter()
            .map(WasteType::as_str)
            .collect();

        let (id, created_at) = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            r#"
            INSERT INTO user_profiles (
                user_id, owner_email, role, onboarding_completed, approval_status,
                company_name, industry_type, country, location, phone, description,
                waste_types_needed, permit_document_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING id, created_at
            "#,
        )
        .bind(user.user_id)
        .bind(&user.email)
        .bind(new_profile.role.as_str())
        .bind(new_profile.onboarding_completed)
        .bind(new_profile.approval_status.as_str())
        .bind(&new_profile.company_name)
        .bind(new_profile.industry_type.as_str())
        .bind(&new_profile.country)
        .bind(&new_profile.location)
        .bind(&new_profile.phone)
        .bind(&new_profile.description)
        .bind(&waste_types)
        .bind(&new_profile.permit_document_url)
        .fetch_optional(&self.db)
        .await?
        // A concurrent submission won the insert
        .ok_or_else(|| AppError::Conflict {
            resource: "profile".to_string(),
            message: "Onboarding was already completed".to_string(),
            message_es: "El registro ya fue completado".to_string(),
        })?;

        tracing::info!(
            user_id = %user.user_id,
            profile_id = %id,
            role = %new_profile.role,
            state = %next,
            "Onboarding completed"
        );

        Ok(new_profile.into_profile(id, user.email.clone(), created_at))
    }
}
