// src/services/inventory_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::InventoryRepository,
    models::inventory::{MovementKind, StockMovement},
    services::stock_service::StockService,
};

#[derive(Clone)]
pub struct InventoryService {
    repo: InventoryRepository,
    stock_service: StockService,
    pool: PgPool,
}

impl InventoryService {
    pub fn new(repo: InventoryRepository, stock_service: StockService, pool: PgPool) -> Self {
        Self {
            repo,
            stock_service,
            pool,
        }
    }

    /// Registra uma ENTRADA (IN) de estoque e recalcula o saldo do produto.
    pub async fn register_entry(
        &self,
        product_id: Uuid,
        quantity: Decimal,
        unit_cost: Option<Decimal>,
        reason: Option<&str>,
    ) -> Result<StockMovement, AppError> {
        if quantity <= Decimal::ZERO {
            return Err(AppError::InvalidQuantity);
        }

        let movement = self
            .repo
            .create_movement(&self.pool, product_id, MovementKind::In, quantity, unit_cost, reason)
            .await?;

        self.stock_service.recompute_or_log(product_id).await;
        Ok(movement)
    }

    /// Registra um AJUSTE (ADJ) manual; a quantidade carrega o sinal.
    pub async fn register_adjustment(
        &self,
        product_id: Uuid,
        quantity: Decimal,
        reason: Option<&str>,
    ) -> Result<StockMovement, AppError> {
        let movement = self
            .repo
            .create_movement(&self.pool, product_id, MovementKind::Adj, quantity, None, reason)
            .await?;

        self.stock_service.recompute_or_log(product_id).await;
        Ok(movement)
    }

    /// Exclui uma movimentação e recalcula o produto afetado.
    pub async fn delete_movement(&self, movement_id: Uuid) -> Result<(), AppError> {
        let product_id = self
            .repo
            .delete_movement(&self.pool, movement_id)
            .await?
            .ok_or(AppError::MovementNotFound)?;

        self.stock_service.recompute_or_log(product_id).await;
        Ok(())
    }

    pub async fn list_movements(&self, product_id: Uuid) -> Result<Vec<StockMovement>, AppError> {
        self.repo.list_movements_for_product(product_id).await
    }
}
