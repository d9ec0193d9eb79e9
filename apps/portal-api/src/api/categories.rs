//! Category Handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{ensure_admin, CurrentUser};
use crate::error::ApiError;
use crate::state::AppState;
use mercato_core::validation::{validate_id, validate_name};
use mercato_core::Category;
use mercato_db::repository::category::generate_category_id;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    /// Optional human-chosen slug; a UUID is generated when absent.
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub id: String,
}

/// GET /api/categories - list all categories (public)
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = state.db.categories().list().await?;
    Ok(Json(categories))
}

/// POST /api/categories - create a category (admin)
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    ensure_admin(&user)?;
    validate_name("name", &req.name)?;

    let id = match req.id {
        Some(id) => {
            validate_id("id", &id)?;
            id
        }
        None => generate_category_id(),
    };

    let category = Category {
        id: id.clone(),
        name: req.name.trim().to_string(),
    };
    state.db.categories().insert(&category).await?;

    info!(id = %id, name = %category.name, "Category created");

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// DELETE /api/categories/{id} - delete a category and everything under
/// it (admin, cascading)
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ensure_admin(&user)?;

    state.db.categories().delete_cascade(&id).await?;

    info!(id = %id, "Category deleted (cascading)");

    Ok(StatusCode::NO_CONTENT)
}
