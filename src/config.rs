// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{CustomerRepository, FinanceRepository, InventoryRepository, ProductRepository, SalesRepository},
    services::{FinanceService, InventoryService, SalesService, StockService},
};

// O estado compartilhado que amarra pool, repositórios e serviços.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub product_repo: ProductRepository,
    pub customer_repo: CustomerRepository,
    pub stock_service: StockService,
    pub inventory_service: InventoryService,
    pub sales_service: SalesService,
    pub finance_service: FinanceService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let product_repo = ProductRepository::new(db_pool.clone());
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let sales_repo = SalesRepository::new(db_pool.clone());
        let finance_repo = FinanceRepository::new(db_pool.clone());

        let stock_service = StockService::new(
            product_repo.clone(),
            inventory_repo.clone(),
            sales_repo.clone(),
            db_pool.clone(),
        );
        let inventory_service =
            InventoryService::new(inventory_repo.clone(), stock_service.clone(), db_pool.clone());
        let sales_service =
            SalesService::new(sales_repo.clone(), stock_service.clone(), db_pool.clone());
        let finance_service =
            FinanceService::new(finance_repo, sales_repo, inventory_repo, db_pool.clone());

        Ok(Self {
            db_pool,
            product_repo,
            customer_repo,
            stock_service,
            inventory_service,
            sales_service,
            finance_service,
        })
    }
}
