//! Stock transaction persistence.
//!
//! The insert and the stock delta happen in one database transaction; usage
//! clamps at zero via GREATEST rather than application-side math.

use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use pantryctl_core::models::{
    NewTransaction, StockTransaction, TransactionKind, TransactionWithItem,
};

use super::PgStore;
use crate::store::{StoreError, StoreResult, TransactionStore};

#[async_trait]
impl TransactionStore for PgStore {
    async fn create_transaction(&self, new: NewTransaction) -> StoreResult<StockTransaction> {
        let mut tx = self.pool().begin().await?;

        let exists_sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
            self.table("items"),
        );
        let (exists,): (bool,) = sqlx::query_as(&exists_sql)
            .bind(&new.item_id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(StoreError::NotFound {
                resource: "item",
                id: new.item_id,
            });
        }

        let id = Uuid::new_v4().to_string();
        let insert_sql = format!(
            "INSERT INTO {} (id, item_id, kind, quantity, notes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING created_at",
            self.table("transactions"),
        );
        let row = sqlx::query(&insert_sql)
            .bind(&id)
            .bind(&new.item_id)
            .bind(new.kind.as_str())
            .bind(new.quantity)
            .bind(&new.notes)
            .fetch_one(&mut *tx)
            .await?;
        let created_at = row.get("created_at");

        let stock_sql = match new.kind {
            TransactionKind::Restock => format!(
                "UPDATE {} SET current_stock = current_stock + $1, updated_at = NOW()
                 WHERE id = $2",
                self.table("items"),
            ),
            TransactionKind::Usage => format!(
                "UPDATE {} SET current_stock = GREATEST(0, current_stock - $1), updated_at = NOW()
                 WHERE id = $2",
                self.table("items"),
            ),
        };
        sqlx::query(&stock_sql)
            .bind(new.quantity)
            .bind(&new.item_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(StockTransaction {
            id,
            item_id: new.item_id,
            kind: new.kind,
            quantity: new.quantity,
            notes: new.notes,
            created_at,
        })
    }

    async fn list_transactions(&self) -> StoreResult<Vec<TransactionWithItem>> {
        let sql = format!(
            "SELECT t.id, t.item_id, t.kind, t.quantity, t.notes, t.created_at,
                    i.name AS item_name
             FROM {transactions} t
             JOIN {items} i ON t.item_id = i.id
             ORDER BY t.created_at DESC",
            transactions = self.table("transactions"),
            items = self.table("items"),
        );
        let rows = sqlx::query(&sql).fetch_all(self.pool()).await?;

        rows.into_iter()
            .map(|row| {
                let kind_raw: String = row.get("kind");
                let kind = TransactionKind::from_str(&kind_raw).ok_or(StoreError::Decode {
                    column: "kind",
                    value: kind_raw,
                })?;
                Ok(TransactionWithItem {
                    id: row.get("id"),
                    item_id: row.get("item_id"),
                    item_name: row.get("item_name"),
                    kind,
                    quantity: row.get("quantity"),
                    notes: row.get("notes"),
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }
}
