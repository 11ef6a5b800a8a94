//! Item persistence.
//!
//! Barcodes live in a side table keyed on the code; inserts that trip the
//! unique key are surfaced as [`StoreError::BarcodeInUse`] with the owning
//! item resolved for the message.

use async_trait::async_trait;
use uuid::Uuid;

use pantryctl_core::models::{Item, ItemFields};

use super::{is_unique_violation, item_from_row, PgStore};
use crate::store::{ItemStore, StoreError, StoreResult};

#[async_trait]
impl ItemStore for PgStore {
    async fn list_items(&self) -> StoreResult<Vec<Item>> {
        let sql = format!("{} ORDER BY i.name", self.item_select(""));
        let rows = sqlx::query(&sql).fetch_all(self.pool()).await?;
        Ok(rows.iter().map(item_from_row).collect())
    }

    async fn get_item(&self, id: &str) -> StoreResult<Option<Item>> {
        let sql = self.item_select("WHERE i.id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.as_ref().map(item_from_row))
    }

    async fn get_item_by_barcode(&self, code: &str) -> StoreResult<Option<Item>> {
        // point lookup through the unique key, not a scan over items
        let sql = self.item_select(&format!(
            "WHERE i.id = (SELECT item_id FROM {} WHERE code = $1)",
            self.table("item_barcodes"),
        ));
        let row = sqlx::query(&sql)
            .bind(code)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.as_ref().map(item_from_row))
    }

    async fn create_item(&self, fields: ItemFields) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        let mut tx = self.pool().begin().await?;

        let sql = format!(
            "INSERT INTO {} (id, name, category_id, current_stock, min_stock, unit, location)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
            self.table("items"),
        );
        sqlx::query(&sql)
            .bind(&id)
            .bind(&fields.name)
            .bind(&fields.category)
            .bind(fields.current_stock)
            .bind(fields.min_stock)
            .bind(&fields.unit)
            .bind(&fields.location)
            .execute(&mut *tx)
            .await?;

        let barcode_sql = format!(
            "INSERT INTO {} (code, item_id) VALUES ($1, $2)",
            self.table("item_barcodes"),
        );
        for code in &fields.barcodes {
            if let Err(err) = sqlx::query(&barcode_sql)
                .bind(code)
                .bind(&id)
                .execute(&mut *tx)
                .await
            {
                if is_unique_violation(&err) {
                    drop(tx);
                    return Err(self.barcode_conflict(code).await);
                }
                return Err(err.into());
            }
        }

        tx.commit().await?;
        Ok(id)
    }

    async fn update_item(&self, id: &str, fields: ItemFields) -> StoreResult<bool> {
        let mut tx = self.pool().begin().await?;

        let sql = format!(
            "UPDATE {} SET name = $1, category_id = $2, current_stock = $3,
                    min_stock = $4, unit = $5, location = $6, updated_at = NOW()
             WHERE id = $7",
            self.table("items"),
        );
        let affected = sqlx::query(&sql)
            .bind(&fields.name)
            .bind(&fields.category)
            .bind(fields.current_stock)
            .bind(fields.min_stock)
            .bind(&fields.unit)
            .bind(&fields.location)
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if affected == 0 {
            return Ok(false);
        }

        // full-row overwrite includes the barcode set
        sqlx::query(&format!(
            "DELETE FROM {} WHERE item_id = $1",
            self.table("item_barcodes"),
        ))
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let barcode_sql = format!(
            "INSERT INTO {} (code, item_id) VALUES ($1, $2)",
            self.table("item_barcodes"),
        );
        for code in &fields.barcodes {
            if let Err(err) = sqlx::query(&barcode_sql)
                .bind(code)
                .bind(id)
                .execute(&mut *tx)
                .await
            {
                if is_unique_violation(&err) {
                    drop(tx);
                    return Err(self.barcode_conflict(code).await);
                }
                return Err(err.into());
            }
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_item(&self, id: &str) -> StoreResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table("items"));
        let affected = sqlx::query(&sql)
            .bind(id)
            .execute(self.pool())
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn add_barcode(&self, item_id: &str, code: &str) -> StoreResult<()> {
        let mut tx = self.pool().begin().await?;

        let exists_sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
            self.table("items"),
        );
        let (exists,): (bool,) = sqlx::query_as(&exists_sql)
            .bind(item_id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(StoreError::NotFound {
                resource: "item",
                id: item_id.to_owned(),
            });
        }

        let insert_sql = format!(
            "INSERT INTO {} (code, item_id) VALUES ($1, $2)",
            self.table("item_barcodes"),
        );
        if let Err(err) = sqlx::query(&insert_sql)
            .bind(code)
            .bind(item_id)
            .execute(&mut *tx)
            .await
        {
            if is_unique_violation(&err) {
                drop(tx);
                return Err(self.barcode_conflict(code).await);
            }
            return Err(err.into());
        }

        sqlx::query(&format!(
            "UPDATE {} SET updated_at = NOW() WHERE id = $1",
            self.table("items"),
        ))
        .bind(item_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn remove_barcode(&self, item_id: &str, code: &str) -> StoreResult<bool> {
        let mut tx = self.pool().begin().await?;

        let exists_sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
            self.table("items"),
        );
        let (exists,): (bool,) = sqlx::query_as(&exists_sql)
            .bind(item_id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(StoreError::NotFound {
                resource: "item",
                id: item_id.to_owned(),
            });
        }

        let affected = sqlx::query(&format!(
            "DELETE FROM {} WHERE item_id = $1 AND code = $2",
            self.table("item_barcodes"),
        ))
        .bind(item_id)
        .bind(code)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if affected == 0 {
            return Ok(false);
        }

        sqlx::query(&format!(
            "UPDATE {} SET updated_at = NOW() WHERE id = $1",
            self.table("items"),
        ))
        .bind(item_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn list_low_stock_items(&self) -> StoreResult<Vec<Item>> {
        let sql = format!(
            "{} ORDER BY i.name",
            self.item_select("WHERE i.current_stock <= i.min_stock"),
        );
        let rows = sqlx::query(&sql).fetch_all(self.pool()).await?;
        Ok(rows.iter().map(item_from_row).collect())
    }
}
