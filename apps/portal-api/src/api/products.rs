//! Product Handlers
//!
//! The create and update paths are the transactional edge of the admin
//! panel: one product row plus its variant rows commit together or not
//! at all (see `ProductRepository`).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{ensure_admin, CurrentUser};
use crate::error::ApiError;
use crate::state::AppState;
use mercato_core::validation::{validate_name, validate_variants, VariantInput};
use mercato_core::{Product, ProductVariant, TierPrices};
use mercato_db::repository::product::{generate_product_id, generate_variant_id};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    pub category_id: String,
    /// Icon URL; empty string when the product has none.
    #[serde(default)]
    pub icon: String,
    pub variants: Vec<VariantRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantRequest {
    pub size: String,
    pub price_a_cents: i64,
    pub price_b_cents: i64,
    pub price_c_cents: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub category_id: String,
    pub icon: String,
    pub variants: Vec<VariantDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantDto {
    pub id: String,
    pub size: String,
    pub price_a_cents: i64,
    pub price_b_cents: i64,
    pub price_c_cents: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub id: String,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        ProductDto {
            id: product.id,
            name: product.name,
            category_id: product.category_id,
            icon: product.icon,
            variants: product.variants.into_iter().map(VariantDto::from).collect(),
        }
    }
}

impl From<ProductVariant> for VariantDto {
    fn from(variant: ProductVariant) -> Self {
        VariantDto {
            id: variant.id,
            size: variant.size,
            price_a_cents: variant.prices.a_cents,
            price_b_cents: variant.prices.b_cents,
            price_c_cents: variant.prices.c_cents,
        }
    }
}

impl VariantRequest {
    fn prices(&self) -> TierPrices {
        TierPrices {
            a_cents: self.price_a_cents,
            b_cents: self.price_b_cents,
            c_cents: self.price_c_cents,
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Validates a product request and checks the category reference.
///
/// The referential invariant (`category_id` names an existing category) is
/// enforced here at write time; the schema's foreign key is the backstop.
async fn validate_request(state: &AppState, req: &ProductRequest) -> Result<(), ApiError> {
    validate_name("name", &req.name)?;

    let inputs: Vec<VariantInput> = req
        .variants
        .iter()
        .map(|v| VariantInput {
            size: v.size.clone(),
            prices: v.prices(),
        })
        .collect();
    validate_variants(&inputs)?;

    if req.category_id.trim().is_empty() {
        return Err(ApiError::validation("categoryId is required"));
    }

    let category = state.db.categories().get_by_id(&req.category_id).await?;
    if category.is_none() {
        return Err(ApiError::validation(format!(
            "Unknown category: {}",
            req.category_id
        )));
    }

    Ok(())
}

fn build_variants(requests: &[VariantRequest]) -> Vec<ProductVariant> {
    requests
        .iter()
        .map(|v| ProductVariant {
            id: generate_variant_id(),
            size: v.size.trim().to_string(),
            prices: v.prices(),
        })
        .collect()
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/products - list the catalog with resolved variants (public)
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProductDto>>, ApiError> {
    let products = state.db.products().list().await?;
    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}

/// POST /api/products - create a product with its variants (admin,
/// transactional)
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    ensure_admin(&user)?;
    validate_request(&state, &req).await?;

    let now = Utc::now();
    let product = Product {
        id: generate_product_id(),
        name: req.name.trim().to_string(),
        category_id: req.category_id.clone(),
        icon: req.icon.clone(),
        created_at: now,
        updated_at: now,
        variants: build_variants(&req.variants),
    };

    state.db.products().insert_with_variants(&product).await?;

    info!(
        id = %product.id,
        name = %product.name,
        variants = product.variants.len(),
        "Product created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { id: product.id }),
    ))
}

/// PUT /api/products/{id} - update a product, replacing its full variant
/// set (admin, transactional; no diffing)
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<ProductDto>, ApiError> {
    ensure_admin(&user)?;
    validate_request(&state, &req).await?;

    let product = Product {
        id: id.clone(),
        name: req.name.trim().to_string(),
        category_id: req.category_id.clone(),
        icon: req.icon.clone(),
        // created_at is not touched by updates; the repository only
        // writes updated_at
        created_at: Utc::now(),
        updated_at: Utc::now(),
        variants: build_variants(&req.variants),
    };

    state.db.products().update_replace_variants(&product).await?;

    info!(id = %id, variants = product.variants.len(), "Product updated");

    Ok(Json(ProductDto::from(product)))
}

/// DELETE /api/products/{id} - delete a product and its variants (admin)
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ensure_admin(&user)?;

    state.db.products().delete(&id).await?;

    info!(id = %id, "Product deleted");

    Ok(StatusCode::NO_CONTENT)
}
