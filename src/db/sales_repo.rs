// src/db/sales_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sales::{OrderStatus, OrderSummary, SalesOrder, SalesOrderItem},
};

#[derive(Clone)]
pub struct SalesRepository {
    pool: PgPool,
}

impl SalesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---

    pub async fn list_orders(&self) -> Result<Vec<SalesOrder>, AppError> {
        let orders = sqlx::query_as::<_, SalesOrder>(
            "SELECT * FROM sales_orders ORDER BY display_id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    pub async fn get_order<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Option<SalesOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, SalesOrder>("SELECT * FROM sales_orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    pub async fn list_order_items<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<SalesOrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, SalesOrderItem>(
            "SELECT * FROM sales_order_items WHERE order_id = $1 ORDER BY created_at ASC",
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    /// Soma das quantidades de itens cujo pedido está em status que consome
    /// estoque (confirmado/faturado). CAST para NUMERIC(20, 2) como nas
    /// demais agregações do recálculo.
    pub async fn sum_stock_affecting_quantity<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(i.quantity), 0)::NUMERIC(20, 2)
            FROM sales_order_items i
            JOIN sales_orders o ON o.id = i.order_id
            WHERE i.product_id = $1 AND o.status IN ($2, $3)
            "#,
        )
        .bind(product_id)
        .bind(OrderStatus::Confirmed)
        .bind(OrderStatus::Invoiced)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    /// Cliente + total líquido (soma dos itens menos o desconto do pedido).
    pub async fn get_order_summary<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Option<OrderSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let summary = sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT o.id, o.display_id, o.customer_id, c.name AS customer_name,
                   (COALESCE(SUM(i.quantity * i.unit_price), 0) - o.total_discount)::NUMERIC(12, 2) AS net_total
            FROM sales_orders o
            JOIN customers c ON c.id = o.customer_id
            LEFT JOIN sales_order_items i ON i.order_id = o.id
            WHERE o.id = $1
            GROUP BY o.id, c.name
            "#,
        )
        .bind(order_id)
        .fetch_optional(executor)
        .await?;
        Ok(summary)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---

    pub async fn create_order<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
        status: OrderStatus,
        total_discount: Decimal,
        notes: Option<&str>,
    ) -> Result<SalesOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, SalesOrder>(
            r#"
            INSERT INTO sales_orders (customer_id, status, total_discount, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(status)
        .bind(total_discount)
        .bind(notes)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }

    pub async fn set_order_status<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<SalesOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, SalesOrder>(
            r#"
            UPDATE sales_orders SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(status)
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }

    pub async fn add_order_item<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        product_id: Option<Uuid>,
        description: Option<&str>,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Result<SalesOrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, SalesOrderItem>(
            r#"
            INSERT INTO sales_order_items (order_id, product_id, description, quantity, unit_price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(product_id)
        .bind(description)
        .bind(quantity)
        .bind(unit_price)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn update_order_item<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Result<Option<SalesOrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, SalesOrderItem>(
            r#"
            UPDATE sales_order_items SET quantity = $2, unit_price = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(quantity)
        .bind(unit_price)
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }

    /// Exclui o item e devolve (pedido, produto) para o recálculo.
    pub async fn delete_order_item<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
    ) -> Result<Option<(Uuid, Option<Uuid>)>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, (Uuid, Option<Uuid>)>(
            "DELETE FROM sales_order_items WHERE id = $1 RETURNING order_id, product_id",
        )
        .bind(item_id)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }
}
