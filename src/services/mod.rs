pub mod catalog;
pub mod ledger;
pub mod reports;
pub mod stock;

pub use catalog::CatalogService;
pub use ledger::LedgerService;
pub use reports::ReportService;
pub use stock::StockService;
