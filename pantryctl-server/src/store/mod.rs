//! Storage capability traits and their implementations.
//!
//! One trait per entity, combined into [`Store`]. The backend is picked once
//! at process start; handlers only ever see `Arc<dyn Store>`. Barcode
//! uniqueness is enforced here, not in the handlers: Postgres keys the
//! barcode table on the code, the memory store keeps a code → item index
//! behind a single lock, so concurrent adds of the same code cannot both
//! succeed.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use pantryctl_core::models::{
    Category, Item, ItemFields, NewTransaction, Project, ProjectFields, StockTransaction,
    TransactionWithItem,
};

pub use memory::MemStore;
pub use postgres::PgStore;

/// Category set seeded on migration. The later revision of the source schema
/// wins here (it added `alcohol`); seeding is idempotent.
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("paper-products", "Paper Products"),
    ("canned-goods", "Canned Goods"),
    ("cleaning-supplies", "Cleaning Supplies"),
    ("personal-care", "Personal Care"),
    ("beverages", "Beverages"),
    ("snacks", "Snacks"),
    ("alcohol", "Alcohol"),
    ("other", "Other"),
];

/// Storage failure. Queries propagate as-is; typed variants exist for the
/// conditions handlers map to 404/400.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("barcode '{code}' already belongs to item '{item_name}'")]
    BarcodeInUse {
        code: String,
        item_id: String,
        item_name: String,
    },

    #[error("unexpected {column} value '{value}' in storage")]
    Decode { column: &'static str, value: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait CategoryStore {
    /// All categories ordered by display name.
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;

    async fn category_exists(&self, id: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait ItemStore {
    /// All items joined with category display name, ordered by item name.
    async fn list_items(&self) -> StoreResult<Vec<Item>>;

    async fn get_item(&self, id: &str) -> StoreResult<Option<Item>>;

    /// Point lookup through the barcode index.
    async fn get_item_by_barcode(&self, code: &str) -> StoreResult<Option<Item>>;

    /// Assigns a fresh id and inserts. Errors with [`StoreError::BarcodeInUse`]
    /// when any barcode already belongs to another item.
    async fn create_item(&self, fields: ItemFields) -> StoreResult<String>;

    /// Full-row overwrite of the mutable fields, bumping `updated_at`.
    /// Returns false when no such item exists.
    async fn update_item(&self, id: &str, fields: ItemFields) -> StoreResult<bool>;

    /// Returns false when no such item exists. Cascades to transactions and
    /// barcodes.
    async fn delete_item(&self, id: &str) -> StoreResult<bool>;

    /// Errors with [`StoreError::BarcodeInUse`] when the code exists anywhere
    /// (including on the target item), [`StoreError::NotFound`] when the item
    /// is gone.
    async fn add_barcode(&self, item_id: &str, code: &str) -> StoreResult<()>;

    /// Returns false when the barcode is not on the item.
    async fn remove_barcode(&self, item_id: &str, code: &str) -> StoreResult<bool>;

    /// Items with `current_stock <= min_stock` (inclusive), ordered by name.
    async fn list_low_stock_items(&self) -> StoreResult<Vec<Item>>;
}

#[async_trait]
pub trait TransactionStore {
    /// Inserts the transaction and applies the stock delta to the item in the
    /// same transaction scope. Restock adds; usage subtracts, clamped at
    /// zero. Errors with [`StoreError::NotFound`] when the item is gone.
    async fn create_transaction(&self, new: NewTransaction) -> StoreResult<StockTransaction>;

    /// All transactions joined with item name, newest first. Rows whose item
    /// has been deleted do not appear (the delete cascades).
    async fn list_transactions(&self) -> StoreResult<Vec<TransactionWithItem>>;
}

#[async_trait]
pub trait ProjectStore {
    async fn list_projects(&self) -> StoreResult<Vec<Project>>;

    async fn get_project(&self, id: &str) -> StoreResult<Option<Project>>;

    async fn create_project(&self, fields: ProjectFields) -> StoreResult<String>;

    /// Full-row overwrite, bumping `updated_at`. Returns false when no such
    /// project exists.
    async fn update_project(&self, id: &str, fields: ProjectFields) -> StoreResult<bool>;

    async fn delete_project(&self, id: &str) -> StoreResult<bool>;

    /// Active projects whose expiry date falls within `[today, today + days]`,
    /// ordered by expiry date.
    async fn list_expiring_projects(&self, days: i64) -> StoreResult<Vec<Project>>;

    /// Active projects already past their expiry date, ordered by expiry date.
    async fn list_expired_projects(&self) -> StoreResult<Vec<Project>>;
}

/// Combined storage interface, selected at process start.
#[async_trait]
pub trait Store:
    CategoryStore + ItemStore + TransactionStore + ProjectStore + Send + Sync
{
    /// Create the namespace, tables, and indexes, and seed default
    /// categories. Idempotent.
    async fn migrate(&self) -> StoreResult<()>;

    /// Connectivity probe.
    async fn health_check(&self) -> StoreResult<()>;
}
