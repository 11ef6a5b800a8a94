//! Transaction endpoints. Recording a transaction is the only way stock
//! levels change; records themselves are immutable.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use pantryctl_core::models::{
    NewTransaction, StockTransaction, TransactionKind, TransactionWithItem,
};
use pantryctl_core::validate::{coerce_positive_int, ValidationError};

use crate::http::error::ApiError;
use crate::http::extractors::ApiJson;
use crate::http::server::AppState;
use crate::store::{ItemStore, TransactionStore};

#[derive(Deserialize)]
pub struct CreateTransactionRequest {
    pub item_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub quantity: Option<Value>,
    pub notes: Option<String>,
}

#[derive(Serialize)]
pub struct TransactionResponse {
    pub id: String,
    pub item_id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub quantity: i64,
    pub notes: String,
    pub timestamp: String,
}

impl From<StockTransaction> for TransactionResponse {
    fn from(tx: StockTransaction) -> Self {
        Self {
            id: tx.id,
            item_id: tx.item_id,
            kind: tx.kind.as_str(),
            quantity: tx.quantity,
            notes: tx.notes,
            timestamp: tx.created_at.to_rfc3339(),
        }
    }
}

/// Listing row carries the item display name alongside.
#[derive(Serialize)]
pub struct TransactionListResponse {
    pub id: String,
    pub item_id: String,
    pub item_name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub quantity: i64,
    pub notes: String,
    pub timestamp: String,
}

impl From<TransactionWithItem> for TransactionListResponse {
    fn from(tx: TransactionWithItem) -> Self {
        Self {
            id: tx.id,
            item_id: tx.item_id,
            item_name: tx.item_name,
            kind: tx.kind.as_str(),
            quantity: tx.quantity,
            notes: tx.notes,
            timestamp: tx.created_at.to_rfc3339(),
        }
    }
}

/// POST /transactions - record a restock or usage movement
async fn create_transaction(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), ApiError> {
    let item_id = req.item_id.ok_or(ValidationError::MissingFields)?;
    let kind_raw = req.kind.ok_or(ValidationError::MissingFields)?;
    let quantity_raw = req.quantity.ok_or(ValidationError::MissingFields)?;
    let notes = req.notes.ok_or(ValidationError::MissingFields)?;

    if state.store.get_item(&item_id).await?.is_none() {
        return Err(ApiError::item_not_found());
    }

    let kind =
        TransactionKind::from_str(&kind_raw).ok_or(ValidationError::BadTransactionKind)?;
    let quantity = coerce_positive_int(&quantity_raw, "quantity")?;

    let tx = state
        .store
        .create_transaction(NewTransaction {
            item_id,
            kind,
            quantity,
            notes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(tx.into())))
}

/// GET /transactions - all movements, newest first
async fn list_transactions(
    State(state): State<AppState>,
) -> Result<Json<Vec<TransactionListResponse>>, ApiError> {
    let transactions = state.store.list_transactions().await?;
    Ok(Json(
        transactions
            .into_iter()
            .map(TransactionListResponse::from)
            .collect(),
    ))
}

/// Transaction routes
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/transactions",
        get(list_transactions).post(create_transaction),
    )
}
