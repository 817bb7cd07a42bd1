pub mod stock_service;
pub use stock_service::StockService;
pub mod inventory_service;
pub use inventory_service::InventoryService;
pub mod sales_service;
pub use sales_service::SalesService;
pub mod finance_service;
pub use finance_service::FinanceService;
