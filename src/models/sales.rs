// src/models/sales.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Draft,
    Confirmed,
    Invoiced,
    Canceled,
}

impl OrderStatus {
    /// Pedidos nestes status consomem estoque.
    pub fn affects_stock(self) -> bool {
        matches!(self, OrderStatus::Confirmed | OrderStatus::Invoiced)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrder {
    pub id: Uuid,
    // Número sequencial visível para o usuário
    pub display_id: i32,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub total_discount: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
}

// Leitura agregada do pedido (cliente + total líquido), usada na geração
// de Contas a Receber.
#[derive(Debug, Clone, FromRow)]
pub struct OrderSummary {
    pub id: Uuid,
    pub display_id: i32,
    pub customer_id: Uuid,
    pub customer_name: String,
    // soma(quantidade x preço) - desconto do pedido
    pub net_total: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_confirmed_and_invoiced_affect_stock() {
        assert!(OrderStatus::Confirmed.affects_stock());
        assert!(OrderStatus::Invoiced.affects_stock());
        assert!(!OrderStatus::Draft.affects_stock());
        assert!(!OrderStatus::Canceled.affects_stock());
    }
}
