//! Postgres-backed store.
//!
//! One file per entity, sqlx throughout, parameterized statements only.
//! Table names are schema-qualified at runtime from the configured namespace;
//! the namespace is validated as a plain identifier at config time, which is
//! why interpolating it here is sound (binds cannot cover identifiers).

mod categories;
mod items;
mod migrate;
mod projects;
mod transactions;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use pantryctl_core::models::{Item, Project, ProjectStatus};

use super::{Store, StoreError, StoreResult};

/// sqlx [`Store`] implementation over a bounded connection pool.
pub struct PgStore {
    pool: PgPool,
    schema: String,
}

impl PgStore {
    /// Connect a pool and wrap it. The schema must already be validated as an
    /// identifier (see `pantryctl_core::config`).
    pub async fn connect(
        database_url: &str,
        schema: impl Into<String>,
        max_connections: u32,
    ) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool, schema))
    }

    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn table(&self, name: &str) -> String {
        format!("{}.{}", self.schema, name)
    }

    /// Items are always read joined with the category name and aggregated
    /// barcodes; `where_clause` slots in before the GROUP BY.
    fn item_select(&self, where_clause: &str) -> String {
        format!(
            "SELECT i.id, i.name, i.category_id, c.name AS category_name, \
                    i.current_stock, i.min_stock, i.unit, i.location, \
                    i.created_at, i.updated_at, \
                    COALESCE(array_agg(b.code ORDER BY b.code) \
                             FILTER (WHERE b.code IS NOT NULL), '{{}}') AS barcodes \
             FROM {items} i \
             JOIN {categories} c ON i.category_id = c.id \
             LEFT JOIN {barcodes} b ON b.item_id = i.id \
             {where_clause} \
             GROUP BY i.id, c.name",
            items = self.table("items"),
            categories = self.table("categories"),
            barcodes = self.table("item_barcodes"),
            where_clause = where_clause,
        )
    }

    /// Build the conflict error for a barcode that failed the unique key,
    /// naming the owning item. Falls back to blanks if the owner vanished in
    /// the meantime.
    async fn barcode_conflict(&self, code: &str) -> StoreError {
        let sql = format!(
            "SELECT b.item_id, i.name FROM {barcodes} b \
             JOIN {items} i ON i.id = b.item_id WHERE b.code = $1",
            barcodes = self.table("item_barcodes"),
            items = self.table("items"),
        );
        let owner = sqlx::query(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .ok()
            .flatten();
        let (item_id, item_name) = match owner {
            Some(row) => (row.get("item_id"), row.get("name")),
            None => (String::new(), String::new()),
        };
        StoreError::BarcodeInUse {
            code: code.to_owned(),
            item_id,
            item_name,
        }
    }
}

/// Postgres unique-key violation (SQLSTATE 23505).
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

fn item_from_row(row: &PgRow) -> Item {
    Item {
        id: row.get("id"),
        name: row.get("name"),
        barcodes: row.get("barcodes"),
        category: row.get("category_id"),
        category_name: row.get("category_name"),
        current_stock: row.get("current_stock"),
        min_stock: row.get("min_stock"),
        unit: row.get("unit"),
        location: row.get("location"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn project_from_row(row: &PgRow) -> StoreResult<Project> {
    let status_raw: String = row.get("status");
    let status = ProjectStatus::from_str(&status_raw).ok_or(StoreError::Decode {
        column: "status",
        value: status_raw,
    })?;
    Ok(Project {
        id: row.get("id"),
        name: row.get("name"),
        kind: row.get("kind"),
        start_date: row.get("start_date"),
        ready_date: row.get("ready_date"),
        expiry_date: row.get("expiry_date"),
        status,
        location: row.get("location"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl Store for PgStore {
    async fn migrate(&self) -> StoreResult<()> {
        migrate::run(self).await
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
