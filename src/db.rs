pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod sales_repo;
pub use sales_repo::SalesRepository;
pub mod finance_repo;
pub use finance_repo::FinanceRepository;
