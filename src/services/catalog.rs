use crate::{
    db::DbPool,
    entities::{
        product::{self, Column as ProductColumn, Entity as Product},
        stock_movement::MovementType,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::ledger::LedgerService,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, EntityTrait, ModelTrait, QueryOrder, Set, TransactionError, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Service for managing the product catalog.
///
/// Stock is never mutated here except at creation time, where the opening
/// balance is written together with its BUY ledger entry so the stock cache
/// and the ledger agree from the first row.
pub struct CatalogService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Create a new product, seeding an opening BUY movement when
    /// `initial_stock > 0`.
    #[instrument(skip(self))]
    pub async fn create_product(
        &self,
        name: String,
        description: Option<String>,
        price: Decimal,
        initial_stock: i32,
    ) -> Result<product::Model, ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "product name must not be empty".to_string(),
            ));
        }
        if price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "price must not be negative, got {}",
                price
            )));
        }
        if initial_stock < 0 {
            return Err(ServiceError::ValidationError(format!(
                "initial stock must not be negative, got {}",
                initial_stock
            )));
        }

        let db = self.db_pool.as_ref();

        let created = db
            .transaction::<_, product::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let model = product::ActiveModel {
                        name: Set(name),
                        description: Set(description),
                        price: Set(price),
                        stock: Set(initial_stock),
                        created_at: Set(Utc::now()),
                        updated_at: Set(None),
                        ..Default::default()
                    };

                    let created = model.insert(txn).await.map_err(ServiceError::db_error)?;

                    if initial_stock > 0 {
                        LedgerService::append(
                            txn,
                            created.id,
                            initial_stock,
                            MovementType::Buy,
                            created.price,
                        )
                        .await?;
                    }

                    Ok(created)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        self.event_sender
            .send(Event::ProductCreated {
                product_id: created.id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        info!(product_id = created.id, "product created");
        Ok(created)
    }

    /// Get a product by id.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i64) -> Result<product::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        Product::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("product {} not found", id)))
    }

    /// List all products in insertion (id) order.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        let db = self.db_pool.as_ref();

        Product::find()
            .order_by_asc(ProductColumn::Id)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Update the price. Never touches stock or the ledger; existing
    /// movements keep the unit price they were written with.
    #[instrument(skip(self))]
    pub async fn set_price(
        &self,
        id: i64,
        new_price: Decimal,
    ) -> Result<product::Model, ServiceError> {
        if new_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "price must not be negative, got {}",
                new_price
            )));
        }

        let db = self.db_pool.as_ref();

        let existing = self.get_product(id).await?;
        let old_price = existing.price;

        let mut active: product::ActiveModel = existing.into();
        active.price = Set(new_price);
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::ProductPriceChanged {
                product_id: id,
                old_price,
                new_price,
            })
            .await
            .map_err(ServiceError::EventError)?;

        info!(product_id = id, %old_price, %new_price, "product price updated");
        Ok(updated)
    }

    /// Update name and/or description.
    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: i64,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<product::Model, ServiceError> {
        if let Some(name) = &name {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "product name must not be empty".to_string(),
                ));
            }
        }

        let db = self.db_pool.as_ref();

        let existing = self.get_product(id).await?;
        let mut active: product::ActiveModel = existing.into();

        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(description) = description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::ProductUpdated { product_id: id })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    /// Delete a product. Products with ledger history are never deleted:
    /// the movement log is an audit trail, and removing its owner would
    /// orphan it. Such deletes are rejected with a conflict.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i64) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();

        db.transaction::<_, (), ServiceError>(move |txn| {
            Box::pin(async move {
                let product = Product::find_by_id(id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or_else(|| ServiceError::NotFound(format!("product {} not found", id)))?;

                if LedgerService::has_history(txn, id).await? {
                    return Err(ServiceError::Conflict(format!(
                        "product {} has ledger history and cannot be deleted",
                        id
                    )));
                }

                product.delete(txn).await.map_err(ServiceError::db_error)?;
                Ok(())
            })
        })
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
            TransactionError::Transaction(service_err) => service_err,
        })?;

        self.event_sender
            .send(Event::ProductDeleted { product_id: id })
            .await
            .map_err(ServiceError::EventError)?;

        info!(product_id = id, "product deleted");
        Ok(())
    }
}
