// src/services/sales_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::SalesRepository,
    models::sales::{OrderStatus, SalesOrder, SalesOrderItem},
    services::stock_service::StockService,
};

#[derive(Clone)]
pub struct SalesService {
    repo: SalesRepository,
    stock_service: StockService,
    pool: PgPool,
}

impl SalesService {
    pub fn new(repo: SalesRepository, stock_service: StockService, pool: PgPool) -> Self {
        Self {
            repo,
            stock_service,
            pool,
        }
    }

    // --- PEDIDOS ---

    pub async fn create_order(
        &self,
        customer_id: Uuid,
        status: OrderStatus,
        total_discount: Decimal,
        notes: Option<&str>,
    ) -> Result<SalesOrder, AppError> {
        let order = self
            .repo
            .create_order(&self.pool, customer_id, status, total_discount, notes)
            .await?;

        // O fluxo de "pedido salvo" sempre varre os itens, mesmo que o
        // pedido recém-criado ainda não tenha nenhum.
        self.recompute_order_products(order.id).await;
        Ok(order)
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<SalesOrder, AppError> {
        self.repo
            .get_order(&self.pool, order_id)
            .await?
            .ok_or(AppError::OrderNotFound)
    }

    pub async fn list_orders(&self) -> Result<Vec<SalesOrder>, AppError> {
        self.repo.list_orders().await
    }

    /// Transição de status. Cobre as viradas que ligam/desligam o consumo
    /// de estoque (ex.: draft -> confirmed, confirmed -> canceled):
    /// cada produto dos itens é recalculado na sequência.
    pub async fn set_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<SalesOrder, AppError> {
        let order = self
            .repo
            .set_order_status(&self.pool, order_id, status)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        self.recompute_order_products(order_id).await;
        Ok(order)
    }

    // --- ITENS ---

    pub async fn add_item(
        &self,
        order_id: Uuid,
        product_id: Option<Uuid>,
        description: Option<&str>,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Result<SalesOrderItem, AppError> {
        self.repo
            .get_order(&self.pool, order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        let item = self
            .repo
            .add_order_item(&self.pool, order_id, product_id, description, quantity, unit_price)
            .await?;

        if let Some(product_id) = item.product_id {
            self.stock_service.recompute_or_log(product_id).await;
        }
        Ok(item)
    }

    pub async fn update_item(
        &self,
        item_id: Uuid,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Result<SalesOrderItem, AppError> {
        let item = self
            .repo
            .update_order_item(&self.pool, item_id, quantity, unit_price)
            .await?
            .ok_or(AppError::OrderItemNotFound)?;

        if let Some(product_id) = item.product_id {
            self.stock_service.recompute_or_log(product_id).await;
        }
        Ok(item)
    }

    pub async fn remove_item(&self, item_id: Uuid) -> Result<(), AppError> {
        let (_order_id, product_id) = self
            .repo
            .delete_order_item(&self.pool, item_id)
            .await?
            .ok_or(AppError::OrderItemNotFound)?;

        if let Some(product_id) = product_id {
            self.stock_service.recompute_or_log(product_id).await;
        }
        Ok(())
    }

    pub async fn list_items(&self, order_id: Uuid) -> Result<Vec<SalesOrderItem>, AppError> {
        self.repo.list_order_items(&self.pool, order_id).await
    }

    // Varredura dos itens do pedido: um recálculo por produto (um pedido
    // com K itens dispara K recálculos). Falhas aqui nunca abortam a
    // escrita que disparou a varredura.
    async fn recompute_order_products(&self, order_id: Uuid) {
        let items = match self.repo.list_order_items(&self.pool, order_id).await {
            Ok(items) => items,
            Err(e) => {
                tracing::error!("Falha ao listar itens do pedido {}: {}", order_id, e);
                return;
            }
        };

        for item in items {
            if let Some(product_id) = item.product_id {
                self.stock_service.recompute_or_log(product_id).await;
            }
        }
    }
}
