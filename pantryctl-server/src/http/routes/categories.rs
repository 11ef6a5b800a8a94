//! Category endpoint. Read-only: the category set is seeded at migration.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::store::{CategoryStore, ItemStore};

/// Value side of the categories map: display name plus the ids of the items
/// currently filed under the category.
#[derive(Serialize)]
pub struct CategoryEntry {
    pub name: String,
    pub items: Vec<String>,
}

/// GET /categories - map of category id to entry
async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, CategoryEntry>>, ApiError> {
    let categories = state.store.list_categories().await?;
    let items = state.store.list_items().await?;

    let mut map: BTreeMap<String, CategoryEntry> = categories
        .into_iter()
        .map(|c| {
            (
                c.id,
                CategoryEntry {
                    name: c.name,
                    items: Vec::new(),
                },
            )
        })
        .collect();

    for item in items {
        if let Some(entry) = map.get_mut(&item.category) {
            entry.items.push(item.id);
        }
    }

    Ok(Json(map))
}

/// Category routes
pub fn router() -> Router<AppState> {
    Router::new().route("/categories", get(list_categories))
}
