//! Purchase service: quotes, purchases and transaction history

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{
    clamp_quantity, default_quantity, plan_purchase, sort_newest_first, AccessState,
    PaymentStatus, PurchaseQuote, Transaction, TransactionStatus, WasteType,
};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::listing::lock_listing;
use crate::services::profile::fetch_profile;

/// Purchase service
#[derive(Clone)]
pub struct PurchaseService {
    db: PgPool,
}

/// Input for pricing or executing a purchase
#[derive(Debug, Deserialize)]
pub struct PurchaseInput {
    pub waste_id: Uuid,
    /// Requested kilograms; defaults to the dialog's opening quantity
    pub quantity_kg: Option<Decimal>,
}

/// Price breakdown shown in the purchase dialog
#[derive(Debug, Clone, Serialize)]
pub struct QuoteResponse {
    pub waste_id: Uuid,
    pub available_kg: Decimal,
    pub default_quantity_kg: Decimal,
    #[serde(flatten)]
    pub quote: PurchaseQuote,
}

/// Result of a completed purchase
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseReceipt {
    pub transaction: Transaction,
    pub remaining_kg: Decimal,
    pub sold_out: bool,
}

/// Which side of a transaction to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Buyer,
    Seller,
}

/// Row for transaction queries
#[derive(Debug, FromRow)]
struct TransactionRow {
    id: Uuid,
    waste_id: Uuid,
    seller_id: String,
    seller_name: String,
    buyer_id: String,
    buyer_name: String,
    waste_type: String,
    quantity_kg: Decimal,
    price_per_kg: Decimal,
    subtotal: Decimal,
    platform_fee: Decimal,
    total_amount: Decimal,
    seller_earnings: Decimal,
    status: String,
    payment_status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = AppError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Transaction {
            id: row.id,
            waste_id: row.waste_id,
            seller_id: row.seller_id,
            seller_name: row.seller_name,
            buyer_id: row.buyer_id,
            buyer_name: row.buyer_name,
            waste_type: WasteType::from_str_or_other(&row.waste_type),
            quantity_kg: row.quantity_kg,
            price_per_kg: row.price_per_kg,
            subtotal: row.subtotal,
            platform_fee: row.platform_fee,
            total_amount: row.total_amount,
            seller_earnings: row.seller_earnings,
            status: row.status.parse::<TransactionStatus>()?,
            payment_status: row.payment_status.parse::<PaymentStatus>()?,
            created_at: row.created_at,
        })
    }
}

impl PurchaseService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Price a purchase without touching stock. The quantity is clamped the
    /// way the purchase dialog clamps it.
    pub async fn quote(&self, input: &PurchaseInput) -> AppResult<QuoteResponse> {
        let listing = crate::services::ListingService::new(self.db.clone())
            .get(input.waste_id)
            .await?;

        if !listing.is_available() {
            return Err(AppError::ListingUnavailable);
        }

        let opening = default_quantity(listing.quantity_kg);
        let quantity = clamp_quantity(input.quantity_kg.unwrap_or(opening), listing.quantity_kg);

        Ok(QuoteResponse {
            waste_id: listing.id,
            available_kg: listing.quantity_kg,
            default_quantity_kg: opening,
            quote: PurchaseQuote::compute(quantity, listing.price_per_kg),
        })
    }

    /// Buy from a listing.
    ///
    /// The buyer's profile and the listing row are read inside one database
    /// transaction with the listing locked, so concurrent purchases against
    /// the same listing serialize and can never oversell it.
    pub async fn purchase(&self, buyer: &AuthUser, input: PurchaseInput) -> AppResult<PurchaseReceipt> {
        let mut tx = self.db.begin().await?;

        let profile = fetch_profile(&mut *tx, buyer.user_id).await?;
        AccessState::for_session(true, profile.as_ref()).ensure_can_buy()?;

        let listing = lock_listing(&mut *tx, input.waste_id).await?;
        let quantity = input
            .quantity_kg
            .unwrap_or_else(|| default_quantity(listing.quantity_kg));
        let plan = plan_purchase(&listing, quantity)?;
        let quote = plan.quote;

        let buyer_name = profile
            .as_ref()
            .map_or(buyer.full_name.as_str(), |p| p.display_name(&buyer.full_name))
            .to_string();

        sqlx::query(
            r#"
            UPDATE waste_listings
            SET quantity_kg = $2, status = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(listing.id)
        .bind(plan.remaining_kg)
        .bind(plan.listing_status.as_str())
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            INSERT INTO transactions (
                waste_id, seller_id, seller_name, buyer_id, buyer_name, waste_type,
                quantity_kg, price_per_kg, subtotal, platform_fee, total_amount,
                seller_earnings, status, payment_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id, waste_id, seller_id, seller_name, buyer_id, buyer_name, waste_type,
                      quantity_kg, price_per_kg, subtotal, platform_fee, total_amount,
                      seller_earnings, status, payment_status, created_at
            "#,
        )
        .bind(listing.id)
        .bind(&listing.seller_id)
        .bind(&listing.seller_name)
        .bind(&buyer.email)
        .bind(&buyer_name)
        .bind(listing.waste_type.as_str())
        .bind(quote.quantity_kg)
        .bind(quote.price_per_kg)
        .bind(quote.subtotal)
        .bind(quote.platform_fee)
        .bind(quote.total_amount)
        .bind(quote.seller_earnings)
        .bind(TransactionStatus::Completada.as_str())
        .bind(PaymentStatus::Pagado.as_str())
        .fetch_one(&mut *tx)
        .await?;

        // Display aggregates on both profiles
        sqlx::query(
            r#"
            UPDATE user_profiles
            SET total_sold_kg = total_sold_kg + $2,
                total_earnings = total_earnings + $3,
                updated_at = NOW()
            WHERE owner_email = $1
            "#,
        )
        .bind(&listing.seller_id)
        .bind(quote.quantity_kg)
        .bind(quote.seller_earnings)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE user_profiles
            SET total_purchased_kg = total_purchased_kg + $2,
                total_spent = total_spent + $3,
                updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(buyer.user_id)
        .bind(quote.quantity_kg)
        .bind(quote.total_amount)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let transaction = Transaction::try_from(row)?;

        tracing::info!(
            transaction_id = %transaction.id,
            waste_id = %listing.id,
            buyer = %buyer.user_id,
            quantity_kg = %quote.quantity_kg,
            total_amount = %quote.total_amount,
            sold_out = plan.sells_out(),
            "Purchase completed"
        );

        Ok(PurchaseReceipt {
            transaction,
            remaining_kg: plan.remaining_kg,
            sold_out: plan.sells_out(),
        })
    }

    /// Transactions where the account is buyer or seller, newest first
    pub async fn history(&self, email: &str, party: Party) -> AppResult<Vec<Transaction>> {
        let column = match party {
            Party::Buyer => "buyer_id",
            Party::Seller => "seller_id",
        };

        let sql = format!(
            r#"
            SELECT id, waste_id, seller_id, seller_name, buyer_id, buyer_name, waste_type,
                   quantity_kg, price_per_kg, subtotal, platform_fee, total_amount,
                   seller_earnings, status, payment_status, created_at
            FROM transactions
            WHERE {} = $1
            "#,
            column
        );

        let rows = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(email)
            .fetch_all(&self.db)
            .await?;

        let mut transactions = rows
            .into_iter()
            .map(Transaction::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        sort_newest_first(&mut transactions);

        Ok(transactions)
    }
}
