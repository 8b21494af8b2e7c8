//! Business directory API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Business, BusinessUpsert, Category, CategoryUpsert};

use crate::core::ServerState;
use crate::utils::AppResult;

/// PUT /api/businesses/:id
pub async fn upsert_business(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<BusinessUpsert>,
) -> AppResult<Json<Business>> {
    let business = state.catalog.upsert_business(id, payload)?;
    Ok(Json(business))
}

/// PUT /api/categories/:id
pub async fn upsert_category(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpsert>,
) -> AppResult<Json<Category>> {
    let category = state.catalog.upsert_category(id, payload)?;
    Ok(Json(category))
}
