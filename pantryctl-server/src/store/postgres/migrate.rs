//! Schema bootstrap for the Postgres store.
//!
//! Everything here is idempotent: CREATE IF NOT EXISTS plus ON CONFLICT DO
//! NOTHING seeding, so it runs unconditionally on every start. The barcode
//! side table keys on the code itself; that unique key is what closes the
//! check-then-insert race the application-level scan had.

use super::{PgStore, StoreResult};
use crate::store::DEFAULT_CATEGORIES;

pub(super) async fn run(store: &PgStore) -> StoreResult<()> {
    let pool = store.pool();
    tracing::info!(schema = %store.schema, "running inventory migrations");

    if store.schema != "public" {
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", store.schema))
            .execute(pool)
            .await?;
    }

    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {} (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL
        )",
        store.table("categories"),
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {items} (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            category_id TEXT NOT NULL REFERENCES {categories}(id),
            current_stock BIGINT NOT NULL DEFAULT 0,
            min_stock BIGINT NOT NULL DEFAULT 0,
            unit TEXT NOT NULL,
            location TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
        items = store.table("items"),
        categories = store.table("categories"),
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {barcodes} (
            code TEXT PRIMARY KEY,
            item_id TEXT NOT NULL REFERENCES {items}(id) ON DELETE CASCADE
        )",
        barcodes = store.table("item_barcodes"),
        items = store.table("items"),
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {transactions} (
            id TEXT PRIMARY KEY,
            item_id TEXT NOT NULL REFERENCES {items}(id) ON DELETE CASCADE,
            kind TEXT NOT NULL CHECK (kind IN ('restock', 'usage')),
            quantity BIGINT NOT NULL,
            notes TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
        transactions = store.table("transactions"),
        items = store.table("items"),
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {projects} (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            start_date DATE NOT NULL,
            ready_date DATE,
            expiry_date DATE,
            status TEXT NOT NULL DEFAULT 'active'
                CHECK (status IN ('active', 'completed', 'expired', 'discarded')),
            location TEXT NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
        projects = store.table("projects"),
    ))
    .execute(pool)
    .await?;

    create_indexes(store).await?;

    for (id, name) in DEFAULT_CATEGORIES {
        sqlx::query(&format!(
            "INSERT INTO {} (id, name) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
            store.table("categories"),
        ))
        .bind(id)
        .bind(name)
        .execute(pool)
        .await?;
    }

    tracing::info!("inventory migrations complete");
    Ok(())
}

async fn create_indexes(store: &PgStore) -> StoreResult<()> {
    let pool = store.pool();

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_items_category ON {}(category_id)",
        store.table("items"),
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_item_barcodes_item ON {}(item_id)",
        store.table("item_barcodes"),
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_transactions_item ON {}(item_id)",
        store.table("transactions"),
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_transactions_created ON {}(created_at DESC)",
        store.table("transactions"),
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_projects_expiry ON {}(expiry_date) WHERE expiry_date IS NOT NULL",
        store.table("projects"),
    ))
    .execute(pool)
    .await?;

    Ok(())
}
