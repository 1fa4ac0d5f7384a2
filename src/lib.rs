//! Stockroom API Library
//!
//! Inventory management service: a product catalog, an append-only stock
//! ledger, and the reconciliation protocol that keeps the two consistent.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod services;

use axum::{extract::State, response::Json, routing::get, Router};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use db::DbPool;
use events::EventSender;
use services::{CatalogService, LedgerService, ReportService, StockService};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: config::AppConfig,
    pub event_sender: EventSender,
    pub catalog: Arc<CatalogService>,
    pub ledger: LedgerService,
    pub stock: Arc<StockService>,
    pub reports: Arc<ReportService>,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, config: config::AppConfig, event_sender: EventSender) -> Self {
        let catalog = Arc::new(CatalogService::new(db.clone(), event_sender.clone()));
        let ledger = LedgerService::new(db.clone());
        let stock = Arc::new(StockService::new(db.clone(), event_sender.clone()));
        let reports = Arc::new(ReportService::new(db.clone(), ledger.clone()));

        Self {
            db,
            config,
            event_sender,
            catalog,
            ledger,
            stock,
            reports,
        }
    }
}

/// Builds the application router with all resource routes mounted.
pub fn app(state: AppState) -> Router {
    let products = handlers::products::products_router().merge(handlers::stock::stock_router());

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/products", products)
        .nest("/api/v1/reports", handlers::reports::reports_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness and database reachability check.
async fn health(State(state): State<AppState>) -> Json<Value> {
    let db_ok = state.db.ping().await.is_ok();
    Json(json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "database": db_ok,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
