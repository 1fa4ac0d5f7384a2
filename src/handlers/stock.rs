use crate::{errors::ServiceError, services::stock::ReconciliationOutcome, AppState};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct MovementRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct MovementResponse {
    pub movement: crate::entities::stock_movement::Model,
    pub product: crate::entities::product::Model,
}

impl From<ReconciliationOutcome> for MovementResponse {
    fn from(outcome: ReconciliationOutcome) -> Self {
        Self {
            movement: outcome.movement,
            product: outcome.product,
        }
    }
}

/// Routes for recording stock movements, mounted alongside the catalog
/// routes under /products.
pub fn stock_router() -> Router<AppState> {
    Router::new()
        .route("/:id/sales", post(record_sale))
        .route("/:id/restocks", post(record_restock))
}

async fn record_sale(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<MovementRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state.stock.record_sale(id, req.quantity).await?;
    Ok((StatusCode::CREATED, Json(MovementResponse::from(outcome))))
}

async fn record_restock(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<MovementRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state.stock.record_restock(id, req.quantity).await?;
    Ok((StatusCode::CREATED, Json(MovementResponse::from(outcome))))
}
