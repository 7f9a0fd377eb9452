//! Listing service for publishing and browsing organic waste

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use shared::{
    validate_new_listing, AccessState, Frequency, ListingFilter, ListingStatus, NewListing,
    OrganicWasteListing, UserProfile, WasteType,
};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;

/// Listing service
#[derive(Clone)]
pub struct ListingService {
    db: PgPool,
}

/// Row for listing queries
#[derive(Debug, FromRow)]
struct ListingRow {
    id: Uuid,
    seller_id: String,
    seller_name: String,
    waste_type: String,
    quantity_kg: Decimal,
    original_quantity: Decimal,
    price_per_kg: Decimal,
    frequency: Option<String>,
    location: Option<String>,
    description: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ListingRow> for OrganicWasteListing {
    type Error = AppError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        Ok(OrganicWasteListing {
            id: row.id,
            seller_id: row.seller_id,
            seller_name: row.seller_name,
            waste_type: WasteType::from_str_or_other(&row.waste_type),
            quantity_kg: row.quantity_kg,
            original_quantity: row.original_quantity,
            price_per_kg: row.price_per_kg,
            frequency: row.frequency.as_deref().map(str::parse::<Frequency>).transpose()?,
            location: row.location,
            description: row.description,
            status: row.status.parse::<ListingStatus>()?,
            created_at: row.created_at,
        })
    }
}

fn into_listings(rows: Vec<ListingRow>) -> AppResult<Vec<OrganicWasteListing>> {
    rows.into_iter().map(OrganicWasteListing::try_from).collect()
}

/// Lock a listing row for the rest of the surrounding transaction
pub(crate) async fn lock_listing(
    conn: &mut PgConnection,
    listing_id: Uuid,
) -> AppResult<OrganicWasteListing> {
    sqlx::query_as::<_, ListingRow>(
        r#"
        SELECT id, seller_id, seller_name, waste_type, quantity_kg, original_quantity,
               price_per_kg, frequency, location, description, status, created_at
        FROM waste_listings
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(listing_id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| AppError::NotFound("listing".to_string()))?
    .try_into()
}

impl ListingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get a single listing
    pub async fn get(&self, listing_id: Uuid) -> AppResult<OrganicWasteListing> {
        sqlx::query_as::<_, ListingRow>(
            r#"
            SELECT id, seller_id, seller_name, waste_type, quantity_kg, original_quantity,
                   price_per_kg, frequency, location, description, status, created_at
            FROM waste_listings
            WHERE id = $1
            "#,
        )
        .bind(listing_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("listing".to_string()))?
        .try_into()
    }

    /// Available listings matching the buyer's filters, newest first
    pub async fn browse(&self, filter: &ListingFilter) -> AppResult<Vec<OrganicWasteListing>> {
        let rows = sqlx::query_as::<_, ListingRow>(
            r#"
            SELECT id, seller_id, seller_name, waste_type, quantity_kg, original_quantity,
                   price_per_kg, frequency, location, description, status, created_at
            FROM waste_listings
            WHERE status = 'disponible'
              AND ($1::TEXT IS NULL OR waste_type = $1)
              AND ($2::NUMERIC IS NULL OR quantity_kg >= $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.waste_type.map(|w| w.as_str()))
        .bind(filter.min_quantity)
        .fetch_all(&self.db)
        .await?;

        // Country matching stays in the domain filter
        Ok(filter.apply(into_listings(rows)?))
    }

    /// Every listing published by a seller, newest first
    pub async fn list_for_seller(&self, seller_email: &str) -> AppResult<Vec<OrganicWasteListing>> {
        let rows = sqlx::query_as::<_, ListingRow>(
            r#"
            SELECT id, seller_id, seller_name, waste_type, quantity_kg, original_quantity,
                   price_per_kg, frequency, location, description, status, created_at
            FROM waste_listings
            WHERE seller_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(seller_email)
        .fetch_all(&self.db)
        .await?;

        into_listings(rows)
    }

    /// Publish a new listing for an active seller
    pub async fn publish(
        &self,
        user: &AuthUser,
        state: AccessState,
        profile: Option<&UserProfile>,
        input: NewListing,
    ) -> AppResult<OrganicWasteListing> {
        state.ensure_can_publish()?;

        let listing = validate_new_listing(input)?;
        let seller_name = profile.map_or(user.full_name.as_str(), |p| p.display_name(&user.full_name));

        let row = sqlx::query_as::<_, ListingRow>(
            r#"
            INSERT INTO waste_listings (
                seller_id, seller_name, waste_type, quantity_kg, original_quantity,
                price_per_kg, frequency, location, description, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, seller_id, seller_name, waste_type, quantity_kg, original_quantity,
                      price_per_kg, frequency, location, description, status, created_at
            "#,
        )
        .bind(&user.email)
        .bind(seller_name)
        .bind(listing.waste_type.as_str())
        .bind(listing.quantity_kg)
        .bind(listing.original_quantity())
        .bind(listing.price_per_kg)
        .bind(listing.frequency.map(|f| f.as_str()))
        .bind(&listing.location)
        .bind(&listing.description)
        .bind(ListingStatus::Disponible.as_str())
        .fetch_one(&self.db)
        .await?;

        let listing = OrganicWasteListing::try_from(row)?;

        tracing::info!(
            listing_id = %listing.id,
            seller = %user.user_id,
            waste_type = %listing.waste_type,
            quantity_kg = %listing.quantity_kg,
            "Listing published"
        );

        Ok(listing)
    }
}
