use crate::{
    db::DbPool,
    entities::{
        product::{self, Column as ProductColumn, Entity as Product},
        MovementType,
    },
    errors::ServiceError,
    services::ledger::LedgerService,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

/// One line of a sales or restocks report. `product_name` is the product's
/// current name; `unit_price` is the price snapshotted when the movement was
/// written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLine {
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub occurred_at: DateTime<Utc>,
}

/// Sales and restock histories, each most recent first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockReport {
    pub sales: Vec<ReportLine>,
    pub restocks: Vec<ReportLine>,
}

/// Per-product stock position for the overview report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockOverviewLine {
    pub product_id: i64,
    pub product_name: String,
    pub price: Decimal,
    pub stock: i32,
    pub inventory_value: Decimal,
}

/// Read-only aggregation over the ledger and catalog. Never mutates state;
/// safe to run concurrently with any other operation.
pub struct ReportService {
    db_pool: Arc<DbPool>,
    ledger: LedgerService,
}

impl ReportService {
    pub fn new(db_pool: Arc<DbPool>, ledger: LedgerService) -> Self {
        Self { db_pool, ledger }
    }

    /// Builds the combined sales/restocks report from the ledger.
    #[instrument(skip(self))]
    pub async fn build_report(&self) -> Result<StockReport, ServiceError> {
        let sales = self.ledger.list_by_type(MovementType::Sell).await?;
        let restocks = self.ledger.list_by_type(MovementType::Buy).await?;

        Ok(StockReport {
            sales: sales.into_iter().map(Self::to_line).collect(),
            restocks: restocks.into_iter().map(Self::to_line).collect(),
        })
    }

    /// Current stock position per product, with inventory valued at the
    /// current price.
    #[instrument(skip(self))]
    pub async fn stock_overview(&self) -> Result<Vec<StockOverviewLine>, ServiceError> {
        let db = self.db_pool.as_ref();

        let products = Product::find()
            .order_by_asc(ProductColumn::Id)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(products.into_iter().map(Self::to_overview_line).collect())
    }

    fn to_line(row: crate::services::ledger::MovementWithProduct) -> ReportLine {
        ReportLine {
            product_name: row.product_name,
            unit_price: row.movement.unit_price,
            quantity: row.movement.quantity,
            occurred_at: row.movement.created_at,
        }
    }

    fn to_overview_line(p: product::Model) -> StockOverviewLine {
        let inventory_value = p.price * Decimal::from(p.stock);
        StockOverviewLine {
            product_id: p.id,
            product_name: p.name,
            price: p.price,
            stock: p.stock,
            inventory_value,
        }
    }
}
