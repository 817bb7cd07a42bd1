// src/db/inventory_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inventory::{MovementKind, MovementSummary, StockMovement},
};

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---

    pub async fn list_movements_for_product(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<StockMovement>, AppError> {
        let movements = sqlx::query_as::<_, StockMovement>(
            "SELECT * FROM stock_movements WHERE product_id = $1 ORDER BY created_at DESC",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }

    /// Soma das quantidades de um tipo de movimentação (IN ou ADJ).
    /// O CAST para NUMERIC(20, 2) garante a agregação em precisão fixa.
    pub async fn sum_movement_quantity<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        kind: MovementKind,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(quantity), 0)::NUMERIC(20, 2)
            FROM stock_movements
            WHERE product_id = $1 AND kind = $2
            "#,
        )
        .bind(product_id)
        .bind(kind)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    /// Leitura com join no produto: nome + valor total da entrada
    /// (quantidade x custo unitário).
    pub async fn get_movement_summary<'e, E>(
        &self,
        executor: E,
        movement_id: Uuid,
    ) -> Result<Option<MovementSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let summary = sqlx::query_as::<_, MovementSummary>(
            r#"
            SELECT m.id, m.product_id, p.name AS product_name,
                   (m.quantity * COALESCE(m.unit_cost, 0))::NUMERIC(12, 2) AS total_cost
            FROM stock_movements m
            JOIN products p ON p.id = m.product_id
            WHERE m.id = $1
            "#,
        )
        .bind(movement_id)
        .fetch_optional(executor)
        .await?;
        Ok(summary)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---

    pub async fn create_movement<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        kind: MovementKind,
        quantity: Decimal,
        unit_cost: Option<Decimal>,
        reason: Option<&str>,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements (product_id, kind, quantity, unit_cost, reason)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(kind)
        .bind(quantity)
        .bind(unit_cost)
        .bind(reason)
        .fetch_one(executor)
        .await?;
        Ok(movement)
    }

    /// Exclui a movimentação e devolve o produto afetado (para o recálculo).
    pub async fn delete_movement<'e, E>(
        &self,
        executor: E,
        movement_id: Uuid,
    ) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product_id = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM stock_movements WHERE id = $1 RETURNING product_id",
        )
        .bind(movement_id)
        .fetch_optional(executor)
        .await?;
        Ok(product_id)
    }
}
