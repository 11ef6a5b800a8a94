//! Item endpoints: CRUD, barcode management, barcode lookup, low-stock view.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use pantryctl_core::models::{Item, ItemFields};
use pantryctl_core::validate::{coerce_int, normalize_barcodes, ValidationError};

use crate::http::error::ApiError;
use crate::http::extractors::ApiJson;
use crate::http::routes::MessageResponse;
use crate::http::server::AppState;
use crate::store::{CategoryStore, ItemStore, StoreError};

/// Item response, `updated_at` surfaced as `last_updated` in RFC 3339.
#[derive(Serialize)]
pub struct ItemResponse {
    pub id: String,
    pub name: String,
    pub barcodes: Vec<String>,
    pub category: String,
    pub category_name: String,
    pub current_stock: i64,
    pub min_stock: i64,
    pub unit: String,
    pub location: String,
    pub last_updated: String,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            barcodes: item.barcodes,
            category: item.category,
            category_name: item.category_name,
            current_stock: item.current_stock,
            min_stock: item.min_stock,
            unit: item.unit,
            location: item.location,
            last_updated: item.updated_at.to_rfc3339(),
        }
    }
}

/// Create item request. Stock fields stay raw JSON so numeric strings coerce;
/// barcodes stay raw so a single string, a list, or nothing all normalize.
#[derive(Deserialize)]
pub struct CreateItemRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub current_stock: Option<Value>,
    pub min_stock: Option<Value>,
    pub unit: Option<String>,
    pub location: Option<String>,
    pub barcodes: Option<Value>,
}

/// Update item request; absent fields keep their current values.
#[derive(Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub current_stock: Option<Value>,
    pub min_stock: Option<Value>,
    pub unit: Option<String>,
    pub location: Option<String>,
    pub barcodes: Option<Value>,
}

#[derive(Deserialize)]
pub struct AddBarcodeRequest {
    pub barcode: Option<String>,
}

/// GET /items - all items with category names
async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let items = state.store.list_items().await?;
    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

/// GET /items/{id}
async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ItemResponse>, ApiError> {
    let item = state
        .store
        .get_item(&id)
        .await?
        .ok_or_else(ApiError::item_not_found)?;
    Ok(Json(item.into()))
}

/// POST /items - create an item
async fn create_item(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let name = req.name.ok_or(ValidationError::MissingFields)?;
    let category = req.category.ok_or(ValidationError::MissingFields)?;
    let current_stock = req.current_stock.ok_or(ValidationError::MissingFields)?;
    let min_stock = req.min_stock.ok_or(ValidationError::MissingFields)?;
    let unit = req.unit.ok_or(ValidationError::MissingFields)?;

    if !state.store.category_exists(&category).await? {
        return Err(ValidationError::UnknownCategory.into());
    }

    let fields = ItemFields {
        name,
        barcodes: normalize_barcodes(req.barcodes.as_ref()),
        category,
        current_stock: coerce_int(&current_stock, "current_stock")?,
        min_stock: coerce_int(&min_stock, "min_stock")?,
        unit,
        location: req.location.unwrap_or_default(),
    };

    let id = state.store.create_item(fields).await?;
    let item = refetch_item(&state, &id).await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// PUT /items/{id} - merge provided fields over the existing row
async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateItemRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let existing = state
        .store
        .get_item(&id)
        .await?
        .ok_or_else(ApiError::item_not_found)?;

    let category = req.category.unwrap_or(existing.category);
    if !state.store.category_exists(&category).await? {
        return Err(ValidationError::UnknownCategory.into());
    }

    let fields = ItemFields {
        name: req.name.unwrap_or(existing.name),
        barcodes: match req.barcodes {
            Some(value) => normalize_barcodes(Some(&value)),
            None => existing.barcodes,
        },
        category,
        current_stock: match req.current_stock {
            Some(value) => coerce_int(&value, "current_stock")?,
            None => existing.current_stock,
        },
        min_stock: match req.min_stock {
            Some(value) => coerce_int(&value, "min_stock")?,
            None => existing.min_stock,
        },
        unit: req.unit.unwrap_or(existing.unit),
        location: req.location.unwrap_or(existing.location),
    };

    if !state.store.update_item(&id, fields).await? {
        return Err(ApiError::item_not_found());
    }
    let item = refetch_item(&state, &id).await?;
    Ok(Json(item.into()))
}

/// DELETE /items/{id} - cascades to the item's transactions and barcodes
async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.store.delete_item(&id).await? {
        return Err(ApiError::item_not_found());
    }
    Ok(Json(MessageResponse {
        message: "Item deleted successfully",
    }))
}

/// GET /items/barcode/{code}
async fn get_item_by_barcode(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ItemResponse>, ApiError> {
    let item = state
        .store
        .get_item_by_barcode(&code)
        .await?
        .ok_or_else(ApiError::item_not_found)?;
    Ok(Json(item.into()))
}

/// POST /items/{id}/barcodes - attach a barcode to an item
async fn add_barcode(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<AddBarcodeRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    if state.store.get_item(&id).await?.is_none() {
        return Err(ApiError::item_not_found());
    }

    let code = req
        .barcode
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(ValidationError::MissingBarcode)?
        .to_owned();

    match state.store.add_barcode(&id, &code).await {
        Ok(()) => {}
        Err(StoreError::BarcodeInUse { item_id, .. }) if item_id == id => {
            return Err(ApiError::Conflict {
                message: "Barcode already exists for this item".to_owned(),
            });
        }
        Err(err) => return Err(err.into()),
    }

    let item = refetch_item(&state, &id).await?;
    Ok(Json(item.into()))
}

/// DELETE /items/{id}/barcodes/{code}
async fn remove_barcode(
    State(state): State<AppState>,
    Path((id, code)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.store.get_item(&id).await?.is_none() {
        return Err(ApiError::item_not_found());
    }
    if !state.store.remove_barcode(&id, &code).await? {
        return Err(ApiError::barcode_not_found());
    }
    Ok(Json(MessageResponse {
        message: "Barcode removed successfully",
    }))
}

/// GET /low-stock - items at or under their minimum (boundary inclusive)
async fn list_low_stock(
    State(state): State<AppState>,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let items = state.store.list_low_stock_items().await?;
    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

async fn refetch_item(state: &AppState, id: &str) -> Result<Item, ApiError> {
    state
        .store
        .get_item(id)
        .await?
        .ok_or_else(|| ApiError::Internal {
            message: format!("item '{id}' vanished after write"),
        })
}

/// Item routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/items/barcode/{code}", get(get_item_by_barcode))
        .route("/items/{id}/barcodes", post(add_barcode))
        .route("/items/{id}/barcodes/{code}", delete(remove_barcode))
        .route("/low-stock", get(list_low_stock))
}
