use crate::{errors::ServiceError, AppState};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255, message = "name must be between 1 and 255 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub initial_stock: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255, message = "name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetPriceRequest {
    pub price: Decimal,
}

/// Create the products router
pub fn products_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/:id/price", put(set_price))
        .route("/:id/movements", get(list_movements))
}

async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate()?;

    let product = state
        .catalog
        .create_product(req.name, req.description, req.price, req.initial_stock)
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.catalog.get_product(id).await?;
    Ok(Json(product))
}

async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let products = state.catalog.list_products().await?;
    Ok(Json(products))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate()?;

    let product = state
        .catalog
        .update_product(id, req.name, req.description)
        .await?;

    Ok(Json(product))
}

async fn set_price(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<SetPriceRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.catalog.set_price(id, req.price).await?;
    Ok(Json(product))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state.catalog.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_movements(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    // 404 for unknown products rather than an empty history
    state.catalog.get_product(id).await?;
    let movements = state.ledger.list_for_product(id).await?;
    Ok(Json(movements))
}
