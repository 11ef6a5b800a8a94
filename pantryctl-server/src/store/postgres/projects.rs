//! Project persistence. "Expiring" and "expired" are query filters over
//! active projects; nothing here ever writes a status transition.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use pantryctl_core::models::{Project, ProjectFields};

use super::{project_from_row, PgStore};
use crate::store::{ProjectStore, StoreResult};

const PROJECT_COLUMNS: &str =
    "id, name, kind, start_date, ready_date, expiry_date, status, location, notes, \
     created_at, updated_at";

#[async_trait]
impl ProjectStore for PgStore {
    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM {} ORDER BY name",
            self.table("projects"),
        );
        let rows = sqlx::query(&sql).fetch_all(self.pool()).await?;
        rows.iter().map(project_from_row).collect()
    }

    async fn get_project(&self, id: &str) -> StoreResult<Option<Project>> {
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM {} WHERE id = $1",
            self.table("projects"),
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(project_from_row).transpose()
    }

    async fn create_project(&self, fields: ProjectFields) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        let sql = format!(
            "INSERT INTO {} (id, name, kind, start_date, ready_date, expiry_date,
                             status, location, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            self.table("projects"),
        );
        sqlx::query(&sql)
            .bind(&id)
            .bind(&fields.name)
            .bind(&fields.kind)
            .bind(fields.start_date)
            .bind(fields.ready_date)
            .bind(fields.expiry_date)
            .bind(fields.status.as_str())
            .bind(&fields.location)
            .bind(&fields.notes)
            .execute(self.pool())
            .await?;
        Ok(id)
    }

    async fn update_project(&self, id: &str, fields: ProjectFields) -> StoreResult<bool> {
        let sql = format!(
            "UPDATE {} SET name = $1, kind = $2, start_date = $3, ready_date = $4,
                    expiry_date = $5, status = $6, location = $7, notes = $8,
                    updated_at = NOW()
             WHERE id = $9",
            self.table("projects"),
        );
        let affected = sqlx::query(&sql)
            .bind(&fields.name)
            .bind(&fields.kind)
            .bind(fields.start_date)
            .bind(fields.ready_date)
            .bind(fields.expiry_date)
            .bind(fields.status.as_str())
            .bind(&fields.location)
            .bind(&fields.notes)
            .bind(id)
            .execute(self.pool())
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn delete_project(&self, id: &str) -> StoreResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table("projects"));
        let affected = sqlx::query(&sql)
            .bind(id)
            .execute(self.pool())
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn list_expiring_projects(&self, days: i64) -> StoreResult<Vec<Project>> {
        let today = Utc::now().date_naive();
        let horizon = today + chrono::Duration::days(days);
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM {}
             WHERE status = 'active' AND expiry_date >= $1 AND expiry_date <= $2
             ORDER BY expiry_date",
            self.table("projects"),
        );
        let rows = sqlx::query(&sql)
            .bind(today)
            .bind(horizon)
            .fetch_all(self.pool())
            .await?;
        rows.iter().map(project_from_row).collect()
    }

    async fn list_expired_projects(&self) -> StoreResult<Vec<Project>> {
        let today = Utc::now().date_naive();
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM {}
             WHERE status = 'active' AND expiry_date < $1
             ORDER BY expiry_date",
            self.table("projects"),
        );
        let rows = sqlx::query(&sql)
            .bind(today)
            .fetch_all(self.pool())
            .await?;
        rows.iter().map(project_from_row).collect()
    }
}
