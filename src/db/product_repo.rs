// src/db/product_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::products::Product};

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---
    // Leituras simples podem usar a pool principal.

    pub async fn get_all_products(&self) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn get_product<'e, E>(&self, executor: E, product_id: Uuid) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::ProductNotFound)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        sku: &str,
        name: &str,
        description: Option<&str>,
        sale_price: Decimal,
        cost: Decimal,
        unit: &str,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (sku, name, description, sale_price, cost, unit)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(sku)
        .bind(name)
        .bind(description)
        .bind(sale_price)
        .bind(cost)
        .bind(unit)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::SkuAlreadyExists(sku.to_string());
                }
            }
            e.into()
        })
    }

    /// Trava (FOR UPDATE) e lista os ids de todos os produtos.
    /// Usado pelo rebuild completo para impedir dois recálculos concorrentes
    /// sobre o mesmo produto.
    pub async fn list_ids_for_update<'e, E>(&self, executor: E) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM products ORDER BY sku ASC FOR UPDATE",
        )
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }

    /// Grava o saldo derivado. O chamador decide se o valor mudou;
    /// aqui também avançamos o `updated_at`.
    pub async fn update_current_stock<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        current_stock: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE products SET current_stock = $2, updated_at = NOW() WHERE id = $1")
            .bind(product_id)
            .bind(current_stock)
            .execute(executor)
            .await?;
        Ok(())
    }
}
