// src/services/stock_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InventoryRepository, ProductRepository, SalesRepository},
    models::inventory::MovementKind,
};

// Somatórios que alimentam a derivação do saldo de um produto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockTotals {
    pub entries: Decimal,
    pub adjustments: Decimal,
    pub outflows: Decimal,
}

impl StockTotals {
    /// estoque = entradas (IN) + ajustes (ADJ) - saídas
    /// (itens de pedidos confirmados/faturados)
    pub fn net(&self) -> Decimal {
        self.entries + self.adjustments - self.outflows
    }
}

#[derive(Clone)]
pub struct StockService {
    product_repo: ProductRepository,
    inventory_repo: InventoryRepository,
    sales_repo: SalesRepository,
    pool: PgPool,
}

impl StockService {
    pub fn new(
        product_repo: ProductRepository,
        inventory_repo: InventoryRepository,
        sales_repo: SalesRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            product_repo,
            inventory_repo,
            sales_repo,
            pool,
        }
    }

    /// Recalcula o `current_stock` de um produto a partir do histórico
    /// persistido (recálculo completo, sem deltas incrementais).
    /// Grava somente se o valor mudou (evita `updated_at` espúrio) e
    /// devolve o saldo resultante.
    pub async fn recompute_product_stock<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let product = self.product_repo.get_product(&mut *tx, product_id).await?;

        let totals = StockTotals {
            entries: self
                .inventory_repo
                .sum_movement_quantity(&mut *tx, product_id, MovementKind::In)
                .await?,
            adjustments: self
                .inventory_repo
                .sum_movement_quantity(&mut *tx, product_id, MovementKind::Adj)
                .await?,
            outflows: self
                .sales_repo
                .sum_stock_affecting_quantity(&mut *tx, product_id)
                .await?,
        };
        let new_stock = totals.net();

        if product.current_stock != new_stock {
            self.product_repo
                .update_current_stock(&mut *tx, product_id, new_stock)
                .await?;
        }

        tx.commit().await?;
        Ok(new_stock)
    }

    /// Disparo reativo: qualquer falha é registrada e absorvida.
    /// O estoque fica defasado, mas a escrita que disparou o recálculo
    /// nunca é abortada por causa dele.
    pub async fn recompute_or_log(&self, product_id: Uuid) {
        if let Err(e) = self.recompute_product_stock(&self.pool, product_id).await {
            tracing::error!("Falha ao recalcular estoque do produto {}: {}", product_id, e);
        }
    }

    /// Reconstrução administrativa: trava todos os produtos (FOR UPDATE)
    /// numa única transação e recalcula um a um, em sequência.
    /// Devolve quantos produtos foram processados.
    pub async fn rebuild_all_products(&self) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await?;

        let ids = self.product_repo.list_ids_for_update(&mut *tx).await?;
        for product_id in &ids {
            self.recompute_product_stock(&mut *tx, *product_id).await?;
        }

        tx.commit().await?;
        Ok(ids.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn net_is_entries_plus_adjustments_minus_outflows() {
        // Uma entrada de 10, um ajuste de -2 e um item de 3 em pedido
        // confirmado devem resultar em 5.
        let totals = StockTotals {
            entries: dec("10"),
            adjustments: dec("-2"),
            outflows: dec("3"),
        };
        assert_eq!(totals.net(), dec("5"));
    }

    #[test]
    fn net_of_empty_history_is_zero() {
        let totals = StockTotals {
            entries: Decimal::ZERO,
            adjustments: Decimal::ZERO,
            outflows: Decimal::ZERO,
        };
        assert_eq!(totals.net(), Decimal::ZERO);
    }

    #[test]
    fn net_can_go_negative() {
        // Saídas maiores que o histórico de entradas: o saldo derivado
        // reflete o que está persistido, sem truncar em zero.
        let totals = StockTotals {
            entries: dec("1.50"),
            adjustments: Decimal::ZERO,
            outflows: dec("4.00"),
        };
        assert_eq!(totals.net(), dec("-2.50"));
    }
}
