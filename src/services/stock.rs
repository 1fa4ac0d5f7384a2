use crate::{
    db::DbPool,
    entities::{
        product::{self, Column as ProductColumn, Entity as Product},
        stock_movement::{self, MovementType},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::ledger::LedgerService,
};
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, TransactionError,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Result of one reconciliation step: the refreshed product row and the
/// ledger entry written with it.
#[derive(Debug, Clone)]
pub struct ReconciliationOutcome {
    pub product: product::Model,
    pub movement: stock_movement::Model,
}

/// The stock reconciliation engine.
///
/// Every stock change is one transaction that pairs a guarded update of the
/// product's cached counter with an append to the movement ledger. The guard
/// (`stock >= quantity` inside the UPDATE's predicate) makes concurrent sales
/// on the same product serialize at the store: whichever transaction commits
/// first wins, the loser either matches a smaller remaining stock or fails
/// with insufficient stock. No in-process state is involved, so the guarantee
/// holds across server processes.
pub struct StockService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl StockService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Record a sale: decrement stock and append a SELL movement priced at
    /// the product's current price. Rejected with no effect when stock is
    /// insufficient.
    #[instrument(skip(self))]
    pub async fn record_sale(
        &self,
        product_id: i64,
        quantity: i32,
    ) -> Result<ReconciliationOutcome, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::ValidationError(format!(
                "sale quantity must be positive, got {}",
                quantity
            )));
        }

        let db = self.db_pool.as_ref();

        let outcome = db
            .transaction::<_, ReconciliationOutcome, ServiceError>(move |txn| {
                Box::pin(async move {
                    let res = Product::update_many()
                        .col_expr(
                            ProductColumn::Stock,
                            Expr::col(ProductColumn::Stock).sub(quantity),
                        )
                        .col_expr(ProductColumn::UpdatedAt, Expr::value(Some(Utc::now())))
                        .filter(ProductColumn::Id.eq(product_id))
                        .filter(ProductColumn::Stock.gte(quantity))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    if res.rows_affected == 0 {
                        // Distinguish a missing product from an oversell.
                        let product = Product::find_by_id(product_id)
                            .one(txn)
                            .await
                            .map_err(ServiceError::db_error)?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!("product {} not found", product_id))
                            })?;

                        return Err(ServiceError::InsufficientStock(format!(
                            "product {}: available {}, requested {}",
                            product_id, product.stock, quantity
                        )));
                    }

                    let product = Self::reload(txn, product_id).await?;

                    let movement = LedgerService::append(
                        txn,
                        product_id,
                        quantity,
                        MovementType::Sell,
                        product.price,
                    )
                    .await?;

                    Ok(ReconciliationOutcome { product, movement })
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        self.event_sender
            .send(Event::SaleRecorded {
                product_id,
                movement_id: outcome.movement.id,
                quantity,
                stock_after: outcome.product.stock,
            })
            .await
            .map_err(ServiceError::EventError)?;

        info!(
            product_id,
            quantity,
            stock_after = outcome.product.stock,
            "sale recorded"
        );
        Ok(outcome)
    }

    /// Record a restock: increment stock and append a BUY movement priced at
    /// the product's current price.
    #[instrument(skip(self))]
    pub async fn record_restock(
        &self,
        product_id: i64,
        quantity: i32,
    ) -> Result<ReconciliationOutcome, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::ValidationError(format!(
                "restock quantity must be positive, got {}",
                quantity
            )));
        }

        let db = self.db_pool.as_ref();

        let outcome = db
            .transaction::<_, ReconciliationOutcome, ServiceError>(move |txn| {
                Box::pin(async move {
                    let res = Product::update_many()
                        .col_expr(
                            ProductColumn::Stock,
                            Expr::col(ProductColumn::Stock).add(quantity),
                        )
                        .col_expr(ProductColumn::UpdatedAt, Expr::value(Some(Utc::now())))
                        .filter(ProductColumn::Id.eq(product_id))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    if res.rows_affected == 0 {
                        return Err(ServiceError::NotFound(format!(
                            "product {} not found",
                            product_id
                        )));
                    }

                    let product = Self::reload(txn, product_id).await?;

                    let movement = LedgerService::append(
                        txn,
                        product_id,
                        quantity,
                        MovementType::Buy,
                        product.price,
                    )
                    .await?;

                    Ok(ReconciliationOutcome { product, movement })
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        self.event_sender
            .send(Event::StockRestocked {
                product_id,
                movement_id: outcome.movement.id,
                quantity,
                stock_after: outcome.product.stock,
            })
            .await
            .map_err(ServiceError::EventError)?;

        info!(
            product_id,
            quantity,
            stock_after = outcome.product.stock,
            "stock restocked"
        );
        Ok(outcome)
    }

    /// Re-reads the product inside the transaction after a successful
    /// guarded update. The row matched a moment ago, so absence here is a
    /// store failure rather than a caller error.
    async fn reload(
        txn: &DatabaseTransaction,
        product_id: i64,
    ) -> Result<product::Model, ServiceError> {
        Product::find_by_id(product_id)
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "product {} vanished mid-transaction",
                    product_id
                ))
            })
    }
}
