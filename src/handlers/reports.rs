use crate::{errors::ServiceError, AppState};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

/// Create the reports router
pub fn reports_router() -> Router<AppState> {
    Router::new()
        .route("/", get(build_report))
        .route("/stock", get(stock_overview))
}

async fn build_report(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let report = state.reports.build_report().await?;
    Ok(Json(report))
}

async fn stock_overview(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let overview = state.reports.stock_overview().await?;
    Ok(Json(overview))
}
