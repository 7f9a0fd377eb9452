//! Purchase transaction models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::WasteType;

/// A completed or in-flight purchase between a buyer and a seller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub waste_id: Uuid,
    pub seller_id: String,
    pub seller_name: String,
    pub buyer_id: String,
    pub buyer_name: String,
    pub waste_type: WasteType,
    pub quantity_kg: Decimal,
    pub price_per_kg: Decimal,
    pub subtotal: Decimal,
    pub platform_fee: Decimal,
    pub total_amount: Decimal,
    pub seller_earnings: Decimal,
    pub status: TransactionStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completada
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Pendiente,
    Confirmada,
    Completada,
    Cancelada,
}

wire_enum!(TransactionStatus, "transaction status", {
    Pendiente => "pendiente",
    Confirmada => "confirmada",
    Completada => "completada",
    Cancelada => "cancelada",
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pendiente,
    Pagado,
    Fallido,
}

wire_enum!(PaymentStatus, "payment status", {
    Pendiente => "pendiente",
    Pagado => "pagado",
    Fallido => "fallido",
});
