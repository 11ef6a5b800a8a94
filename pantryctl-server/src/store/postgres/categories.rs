use async_trait::async_trait;
use sqlx::Row;

use pantryctl_core::models::Category;

use super::PgStore;
use crate::store::{CategoryStore, StoreResult};

#[async_trait]
impl CategoryStore for PgStore {
    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let sql = format!(
            "SELECT id, name FROM {} ORDER BY name",
            self.table("categories"),
        );
        let rows = sqlx::query(&sql).fetch_all(self.pool()).await?;
        Ok(rows
            .into_iter()
            .map(|row| Category {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    async fn category_exists(&self, id: &str) -> StoreResult<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
            self.table("categories"),
        );
        let (exists,): (bool,) = sqlx::query_as(&sql)
            .bind(id)
            .fetch_one(self.pool())
            .await?;
        Ok(exists)
    }
}
