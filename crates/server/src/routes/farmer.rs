//! Farmer route handlers.

use axum::{
    Form, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use paddyhouse_core::ProductId;

use crate::db::{OrderRepository, ProductRepository};
use crate::error::AppError;
use crate::middleware::RequireFarmer;
use crate::models::{FarmerOrderRow, NewProduct, Product};
use crate::state::AppState;

/// Farmer dashboard data: own listings plus orders on own produce.
#[derive(Debug, Serialize)]
pub struct FarmerDashboard {
    pub products: Vec<Product>,
    pub orders: Vec<FarmerOrderRow>,
}

/// New product form data.
#[derive(Debug, Deserialize)]
pub struct NewProductForm {
    pub name: String,
    pub kind: String,
    pub quantity_kg: i64,
    pub price_per_kg: Decimal,
    #[serde(default)]
    pub batch: String,
}

/// Show the farmer's products and the orders placed against them.
#[instrument(skip_all, fields(farmer_id = %farmer.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireFarmer(farmer): RequireFarmer,
) -> Result<Json<FarmerDashboard>, AppError> {
    let products = ProductRepository::new(state.pool())
        .list_for_farmer(farmer.id)
        .await?;
    let orders = OrderRepository::new(state.pool())
        .list_for_farmer(farmer.id)
        .await?;

    Ok(Json(FarmerDashboard { products, orders }))
}

/// List a new product for sale.
#[instrument(skip_all, fields(farmer_id = %farmer.id, name = %form.name))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireFarmer(farmer): RequireFarmer,
    Form(form): Form<NewProductForm>,
) -> Result<Response, AppError> {
    if form.name.trim().is_empty() {
        return Err(AppError::BadRequest("product name is required".to_string()));
    }
    if form.quantity_kg < 0 {
        return Err(AppError::BadRequest(
            "quantity must not be negative".to_string(),
        ));
    }
    if form.price_per_kg <= Decimal::ZERO {
        return Err(AppError::BadRequest("price must be positive".to_string()));
    }

    let product = ProductRepository::new(state.pool())
        .create(
            farmer.id,
            &NewProduct {
                name: form.name,
                kind: form.kind,
                quantity_kg: form.quantity_kg,
                price_per_kg: form.price_per_kg,
                batch: form.batch,
            },
        )
        .await?;

    tracing::info!(product_id = %product.id, "product listed");
    Ok(Redirect::to("/farmer/dashboard").into_response())
}

/// Withdraw one of the farmer's own products.
///
/// The delete is scoped by owner in the query, so a farmer cannot remove
/// another farmer's listing.
#[instrument(skip_all, fields(farmer_id = %farmer.id, product_id = id))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireFarmer(farmer): RequireFarmer,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let deleted = ProductRepository::new(state.pool())
        .delete(ProductId::new(id), farmer.id)
        .await?;

    if !deleted {
        return Err(AppError::NotFound(format!("product {id}")));
    }

    Ok(Redirect::to("/farmer/dashboard").into_response())
}
