//! In-memory store.
//!
//! Same observable contract as the Postgres backend, backed by maps behind a
//! single `RwLock`. Holding one lock for the whole operation is what makes
//! check-then-insert sequences (barcode uniqueness, existence checks) atomic
//! here. Used for tests and for running without a database.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use pantryctl_core::models::{
    Category, Item, ItemFields, NewTransaction, Project, ProjectFields, ProjectStatus,
    StockTransaction, TransactionWithItem,
};

use super::{
    CategoryStore, ItemStore, ProjectStore, Store, StoreError, StoreResult, TransactionStore,
    DEFAULT_CATEGORIES,
};

#[derive(Debug, Clone)]
struct StoredItem {
    id: String,
    name: String,
    barcodes: BTreeSet<String>,
    category: String,
    current_stock: i64,
    min_stock: i64,
    unit: String,
    location: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    /// category id → display name
    categories: HashMap<String, String>,
    items: HashMap<String, StoredItem>,
    /// barcode → owning item id; the uniqueness invariant lives here
    barcode_index: HashMap<String, String>,
    /// insertion order is chronological
    transactions: Vec<StockTransaction>,
    projects: HashMap<String, Project>,
}

impl Inner {
    fn to_item(&self, stored: &StoredItem) -> Item {
        Item {
            id: stored.id.clone(),
            name: stored.name.clone(),
            barcodes: stored.barcodes.iter().cloned().collect(),
            category: stored.category.clone(),
            category_name: self
                .categories
                .get(&stored.category)
                .cloned()
                .unwrap_or_else(|| stored.category.clone()),
            current_stock: stored.current_stock,
            min_stock: stored.min_stock,
            unit: stored.unit.clone(),
            location: stored.location.clone(),
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }

    fn barcode_owner(&self, code: &str) -> Option<StoreError> {
        self.barcode_index.get(code).map(|owner_id| {
            let item_name = self
                .items
                .get(owner_id)
                .map(|it| it.name.clone())
                .unwrap_or_default();
            StoreError::BarcodeInUse {
                code: code.to_owned(),
                item_id: owner_id.clone(),
                item_name,
            }
        })
    }
}

/// Map-backed [`Store`] implementation.
#[derive(Default)]
pub struct MemStore {
    inner: RwLock<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CategoryStore for MemStore {
    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let inner = self.read();
        let mut categories: Vec<Category> = inner
            .categories
            .iter()
            .map(|(id, name)| Category {
                id: id.clone(),
                name: name.clone(),
            })
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn category_exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.read().categories.contains_key(id))
    }
}

#[async_trait]
impl ItemStore for MemStore {
    async fn list_items(&self) -> StoreResult<Vec<Item>> {
        let inner = self.read();
        let mut items: Vec<Item> = inner.items.values().map(|it| inner.to_item(it)).collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn get_item(&self, id: &str) -> StoreResult<Option<Item>> {
        let inner = self.read();
        Ok(inner.items.get(id).map(|it| inner.to_item(it)))
    }

    async fn get_item_by_barcode(&self, code: &str) -> StoreResult<Option<Item>> {
        let inner = self.read();
        Ok(inner
            .barcode_index
            .get(code)
            .and_then(|id| inner.items.get(id))
            .map(|it| inner.to_item(it)))
    }

    async fn create_item(&self, fields: ItemFields) -> StoreResult<String> {
        let mut inner = self.write();
        for code in &fields.barcodes {
            if let Some(err) = inner.barcode_owner(code) {
                return Err(err);
            }
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        for code in &fields.barcodes {
            inner.barcode_index.insert(code.clone(), id.clone());
        }
        inner.items.insert(
            id.clone(),
            StoredItem {
                id: id.clone(),
                name: fields.name,
                barcodes: fields.barcodes.into_iter().collect(),
                category: fields.category,
                current_stock: fields.current_stock,
                min_stock: fields.min_stock,
                unit: fields.unit,
                location: fields.location,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn update_item(&self, id: &str, fields: ItemFields) -> StoreResult<bool> {
        let mut inner = self.write();
        if !inner.items.contains_key(id) {
            return Ok(false);
        }
        for code in &fields.barcodes {
            if let Some(owner) = inner.barcode_index.get(code) {
                if owner != id {
                    let item_name = inner
                        .items
                        .get(owner)
                        .map(|it| it.name.clone())
                        .unwrap_or_default();
                    return Err(StoreError::BarcodeInUse {
                        code: code.clone(),
                        item_id: owner.clone(),
                        item_name,
                    });
                }
            }
        }

        let old_codes: Vec<String> = inner.items[id].barcodes.iter().cloned().collect();
        for code in old_codes {
            inner.barcode_index.remove(&code);
        }
        for code in &fields.barcodes {
            inner.barcode_index.insert(code.clone(), id.to_owned());
        }

        let item = inner.items.get_mut(id).expect("presence checked above");
        item.name = fields.name;
        item.barcodes = fields.barcodes.into_iter().collect();
        item.category = fields.category;
        item.current_stock = fields.current_stock;
        item.min_stock = fields.min_stock;
        item.unit = fields.unit;
        item.location = fields.location;
        item.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete_item(&self, id: &str) -> StoreResult<bool> {
        let mut inner = self.write();
        let Some(item) = inner.items.remove(id) else {
            return Ok(false);
        };
        for code in &item.barcodes {
            inner.barcode_index.remove(code);
        }
        // cascade, as the relational backend does via the foreign key
        inner.transactions.retain(|tx| tx.item_id != id);
        Ok(true)
    }

    async fn add_barcode(&self, item_id: &str, code: &str) -> StoreResult<()> {
        let mut inner = self.write();
        if !inner.items.contains_key(item_id) {
            return Err(StoreError::NotFound {
                resource: "item",
                id: item_id.to_owned(),
            });
        }
        if let Some(err) = inner.barcode_owner(code) {
            return Err(err);
        }
        inner
            .barcode_index
            .insert(code.to_owned(), item_id.to_owned());
        let item = inner.items.get_mut(item_id).expect("presence checked above");
        item.barcodes.insert(code.to_owned());
        item.updated_at = Utc::now();
        Ok(())
    }

    async fn remove_barcode(&self, item_id: &str, code: &str) -> StoreResult<bool> {
        let mut inner = self.write();
        let Some(item) = inner.items.get_mut(item_id) else {
            return Err(StoreError::NotFound {
                resource: "item",
                id: item_id.to_owned(),
            });
        };
        if !item.barcodes.remove(code) {
            return Ok(false);
        }
        item.updated_at = Utc::now();
        inner.barcode_index.remove(code);
        Ok(true)
    }

    async fn list_low_stock_items(&self) -> StoreResult<Vec<Item>> {
        let inner = self.read();
        let mut items: Vec<Item> = inner
            .items
            .values()
            .filter(|it| it.current_stock <= it.min_stock)
            .map(|it| inner.to_item(it))
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }
}

#[async_trait]
impl TransactionStore for MemStore {
    async fn create_transaction(&self, new: NewTransaction) -> StoreResult<StockTransaction> {
        let mut inner = self.write();
        let item = inner
            .items
            .get_mut(&new.item_id)
            .ok_or_else(|| StoreError::NotFound {
                resource: "item",
                id: new.item_id.clone(),
            })?;

        let now = Utc::now();
        item.current_stock = new.kind.apply(item.current_stock, new.quantity);
        item.updated_at = now;

        let tx = StockTransaction {
            id: Uuid::new_v4().to_string(),
            item_id: new.item_id,
            kind: new.kind,
            quantity: new.quantity,
            notes: new.notes,
            created_at: now,
        };
        inner.transactions.push(tx.clone());
        Ok(tx)
    }

    async fn list_transactions(&self) -> StoreResult<Vec<TransactionWithItem>> {
        let inner = self.read();
        Ok(inner
            .transactions
            .iter()
            .rev()
            .filter_map(|tx| {
                let item = inner.items.get(&tx.item_id)?;
                Some(TransactionWithItem {
                    id: tx.id.clone(),
                    item_id: tx.item_id.clone(),
                    item_name: item.name.clone(),
                    kind: tx.kind,
                    quantity: tx.quantity,
                    notes: tx.notes.clone(),
                    created_at: tx.created_at,
                })
            })
            .collect())
    }
}

#[async_trait]
impl ProjectStore for MemStore {
    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let mut projects: Vec<Project> = self.read().projects.values().cloned().collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    async fn get_project(&self, id: &str) -> StoreResult<Option<Project>> {
        Ok(self.read().projects.get(id).cloned())
    }

    async fn create_project(&self, fields: ProjectFields) -> StoreResult<String> {
        let mut inner = self.write();
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        inner.projects.insert(
            id.clone(),
            Project {
                id: id.clone(),
                name: fields.name,
                kind: fields.kind,
                start_date: fields.start_date,
                ready_date: fields.ready_date,
                expiry_date: fields.expiry_date,
                status: fields.status,
                location: fields.location,
                notes: fields.notes,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn update_project(&self, id: &str, fields: ProjectFields) -> StoreResult<bool> {
        let mut inner = self.write();
        let Some(project) = inner.projects.get_mut(id) else {
            return Ok(false);
        };
        project.name = fields.name;
        project.kind = fields.kind;
        project.start_date = fields.start_date;
        project.ready_date = fields.ready_date;
        project.expiry_date = fields.expiry_date;
        project.status = fields.status;
        project.location = fields.location;
        project.notes = fields.notes;
        project.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete_project(&self, id: &str) -> StoreResult<bool> {
        Ok(self.write().projects.remove(id).is_some())
    }

    async fn list_expiring_projects(&self, days: i64) -> StoreResult<Vec<Project>> {
        let today = Utc::now().date_naive();
        let horizon = today + chrono::Duration::days(days);
        let mut projects: Vec<Project> = self
            .read()
            .projects
            .values()
            .filter(|p| {
                p.status == ProjectStatus::Active
                    && p.expiry_date.is_some_and(|d| d >= today && d <= horizon)
            })
            .cloned()
            .collect();
        projects.sort_by_key(|p| p.expiry_date);
        Ok(projects)
    }

    async fn list_expired_projects(&self) -> StoreResult<Vec<Project>> {
        let today = Utc::now().date_naive();
        let mut projects: Vec<Project> = self
            .read()
            .projects
            .values()
            .filter(|p| p.status == ProjectStatus::Active && p.expiry_date.is_some_and(|d| d < today))
            .cloned()
            .collect();
        projects.sort_by_key(|p| p.expiry_date);
        Ok(projects)
    }
}

#[async_trait]
impl Store for MemStore {
    async fn migrate(&self) -> StoreResult<()> {
        let mut inner = self.write();
        for (id, name) in DEFAULT_CATEGORIES {
            inner
                .categories
                .entry((*id).to_owned())
                .or_insert_with(|| (*name).to_owned());
        }
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
