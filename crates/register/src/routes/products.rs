//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{info, instrument};

use tillpoint_core::{Feature, ProductId};

use super::document_response;
use crate::documents::DocumentRequest;
use crate::error::{AppError, Result};
use crate::import::{ImportReport, export_products, import_products};
use crate::middleware::CurrentUser;
use crate::models::{NewProduct, Product, ProductUpdate};
use crate::state::AppState;

/// Cashiers ring up products without managing them.
fn require_read(user: &CurrentUser) -> Result<()> {
    if user.user().permissions.allows(Feature::Pos) {
        Ok(())
    } else {
        user.require(Feature::Products)
    }
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub barcode: Option<String>,
}

/// List products, or look one up by barcode.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    require_read(&user)?;
    let products = match query.barcode {
        Some(barcode) => state
            .catalog()
            .find_product_by_barcode(&barcode)?
            .into_iter()
            .collect(),
        None => state.catalog().list_products()?,
    };
    Ok(Json(products))
}

#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<Product>> {
    require_read(&user)?;
    let id = ProductId::new(id);
    state
        .catalog()
        .get_product(id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

#[instrument(skip(state, user, product), fields(name = %product.name))]
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(product): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    user.require(Feature::Products)?;
    let product = state.catalog().add_product(product)?;
    info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state, user, update))]
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<Product>> {
    user.require(Feature::Products)?;
    let id = ProductId::new(id);
    state
        .catalog()
        .update_product(id, update)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

#[instrument(skip(state, user))]
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    user.require(Feature::Products)?;
    let id = ProductId::new(id);
    if state.catalog().delete_product(id)? {
        info!(product_id = %id, "Product deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("product {id}")))
    }
}

/// Bulk import from a CSV request body.
#[instrument(skip(state, user, body))]
pub async fn import(
    State(state): State<AppState>,
    user: CurrentUser,
    body: String,
) -> Result<Json<ImportReport>> {
    user.require(Feature::Products)?;
    Ok(Json(import_products(state.catalog(), body.as_bytes())?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Html,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

/// Export the catalog as CSV or as a printable HTML list.
#[instrument(skip(state, user))]
pub async fn export(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ExportQuery>,
) -> Result<Response> {
    user.require(Feature::Products)?;
    let products = state.catalog().list_products()?;
    match query.format {
        ExportFormat::Csv => {
            let mut out = Vec::new();
            export_products(&products, &mut out)?;
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                    (header::CONTENT_DISPOSITION, "attachment; filename=\"products.csv\""),
                ],
                out,
            )
                .into_response())
        }
        ExportFormat::Html => {
            let document = state
                .documents()
                .render(DocumentRequest::Catalog(&products))?;
            Ok(document_response(document))
        }
    }
}
