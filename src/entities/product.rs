use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product entity. `stock` is a derived cache of the signed sum of this
/// product's stock movements and is only ever changed together with a
/// matching ledger append.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Primary key, assigned by the store in insertion order
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Product name, non-empty
    pub name: String,

    /// Product description
    pub description: Option<String>,

    /// Unit price, non-negative
    pub price: Decimal,

    /// Current quantity on hand, non-negative
    pub stock: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stock_movement::Entity")]
    StockMovement,
}

impl Related<super::stock_movement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockMovement.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
