// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    Receivable, // CR - Conta a Receber
    Payable,    // CP - Conta a Pagar
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Open,     // Em aberto
    Partial,  // Pago parcialmente
    Paid,     // Quitado
    Canceled, // Cancelado (estado manual, nunca derivado das parcelas)
}

// Origem de um documento gerado a partir de outro registro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "origin_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OriginKind {
    SalesOrder,
    StockMovement,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FinanceDocument {
    pub id: Uuid,
    pub kind: DocumentKind,
    pub description: String,
    pub total_amount: Decimal,
    pub status: DocumentStatus,

    // Vínculos
    pub customer_id: Option<Uuid>,    // CR
    pub supplier_name: Option<String>, // CP

    // No máximo UM documento por (origem, tipo)
    pub origin_kind: Option<OriginKind>,
    pub origin_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Uma parcela de um documento (ou lançamento avulso).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: Uuid,
    pub document_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub kind: DocumentKind,
    pub description: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub paid_on: Option<NaiveDate>,
    // Pix, Boleto, Cartão... ou o NOME da conta usada na baixa
    pub payment_method: Option<String>,

    // Classificação opcional: categoria pai e categoria (filha)
    pub expense_category_id: Option<Uuid>,
    pub expense_category_parent_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Categoria de despesa: árvore estrita de dois níveis (raiz + filha).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseCategory {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FinanceAccount {
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// --- Leituras derivadas (telas de listagem/extrato) ---

// Status de exibição de uma parcela, relativo a "hoje".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryDisplayStatus {
    Paid,
    Overdue,
    DueToday,
    Open,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryView {
    #[serde(flatten)]
    pub entry: LedgerEntry,
    pub status: EntryDisplayStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    pub total_in: Decimal,
    pub total_out: Decimal,
    pub balance: Decimal,
}

// Linha do extrato de caixa (somente parcelas pagas).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashbookLine {
    pub date: NaiveDate,
    pub account_id: Option<Uuid>,
    pub kind: DocumentKind,
    pub description: String,
    pub amount: Decimal,
}
