use crate::{
    db::DbPool,
    entities::{
        product,
        stock_movement::{self, Entity as StockMovement, MovementType},
    },
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::instrument;

/// A ledger entry joined with the owning product's current name.
///
/// The name is live (renames show up in old entries) while `unit_price`
/// stays whatever it was when the movement was written.
#[derive(Debug, Clone)]
pub struct MovementWithProduct {
    pub movement: stock_movement::Model,
    pub product_name: String,
}

/// Read side of the append-only movement ledger. Writes go through
/// [`LedgerService::append`], which only ever runs inside the reconciliation
/// transaction; there is no update or delete surface.
#[derive(Clone)]
pub struct LedgerService {
    db_pool: Arc<DbPool>,
}

impl LedgerService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Appends one movement inside the caller's transaction. The row is
    /// immutable once written; the FK on `product_id` rejects movements for
    /// missing products.
    pub async fn append<C: ConnectionTrait>(
        conn: &C,
        product_id: i64,
        quantity: i32,
        movement_type: MovementType,
        unit_price: Decimal,
    ) -> Result<stock_movement::Model, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::ValidationError(format!(
                "movement quantity must be positive, got {}",
                quantity
            )));
        }

        let movement = stock_movement::ActiveModel {
            product_id: Set(product_id),
            quantity: Set(quantity),
            movement_type: Set(movement_type),
            unit_price: Set(unit_price),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        movement.insert(conn).await.map_err(ServiceError::db_error)
    }

    /// Lists movements of one type joined with the current product name,
    /// most recent first.
    #[instrument(skip(self))]
    pub async fn list_by_type(
        &self,
        movement_type: MovementType,
    ) -> Result<Vec<MovementWithProduct>, ServiceError> {
        let db = self.db_pool.as_ref();

        let rows = StockMovement::find()
            .filter(stock_movement::Column::MovementType.eq(movement_type))
            .find_also_related(product::Entity)
            .order_by_desc(stock_movement::Column::Id)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(rows
            .into_iter()
            .map(|(movement, product)| MovementWithProduct {
                product_name: product.map(|p| p.name).unwrap_or_default(),
                movement,
            })
            .collect())
    }

    /// Full movement history for one product, oldest first.
    #[instrument(skip(self))]
    pub async fn list_for_product(
        &self,
        product_id: i64,
    ) -> Result<Vec<stock_movement::Model>, ServiceError> {
        let db = self.db_pool.as_ref();

        StockMovement::find()
            .filter(stock_movement::Column::ProductId.eq(product_id))
            .order_by_asc(stock_movement::Column::Id)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Whether any ledger entries exist for the product. Used by the catalog's
    /// delete policy.
    pub async fn has_history<C: ConnectionTrait>(
        conn: &C,
        product_id: i64,
    ) -> Result<bool, ServiceError> {
        let count = StockMovement::find()
            .filter(stock_movement::Column::ProductId.eq(product_id))
            .count(conn)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(count > 0)
    }
}
