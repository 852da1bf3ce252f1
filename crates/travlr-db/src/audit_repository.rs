use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use travlr_core::audit::{AuditEntry, AuditSink, NewAuditEntry};
use travlr_core::error::AppError;

use crate::query::db_error;

/// Append-only `audit_log` table.
#[derive(Clone)]
pub struct AuditRepository {
    pool: Pool<Postgres>,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Entries for one document, newest first.
    pub async fn history(
        &self,
        collection: &str,
        document_id: Uuid,
    ) -> Result<Vec<AuditEntry>, AppError> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT id, collection, document_id, action, user_id, created_at
            FROM audit_log
            WHERE collection = $1 AND document_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(collection)
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(AuditEntry::try_from).collect()
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    collection: String,
    document_id: Uuid,
    action: String,
    user_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditEntry {
    type Error = AppError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        Ok(AuditEntry {
            id: row.id,
            collection: row.collection,
            document_id: row.document_id,
            action: row.action.parse().map_err(AppError::DatabaseError)?,
            user_id: row.user_id,
            created_at: row.created_at,
        })
    }
}

impl AuditSink for AuditRepository {
    async fn record(&self, entry: &NewAuditEntry) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO audit_log (collection, document_id, action, user_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(entry.collection)
        .bind(entry.document_id)
        .bind(entry.action.as_str())
        .bind(entry.user_id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }
}
