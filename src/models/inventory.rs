// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "movement_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    In,  // Entrada (com custo unitário)
    Adj, // Ajuste manual (quantidade com sinal)
}

// --- STOCK MOVEMENT (Histórico) ---
// Imutável depois de criado; só pode ser excluído.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub kind: MovementKind,
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Leitura com join no produto, usada na geração de Contas a Pagar
// a partir de uma entrada de estoque.
#[derive(Debug, Clone, FromRow)]
pub struct MovementSummary {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    // quantidade x custo unitário
    pub total_cost: Decimal,
}
