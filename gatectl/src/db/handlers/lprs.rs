//! Database repository for LPR profiles.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::lprs::{LprCreateDBRequest, LprDBResponse, LprUpdateDBRequest},
};
use crate::types::{LprId, Pagination};
use sqlx::PgConnection;
use std::collections::HashMap;
use tracing::instrument;

pub struct Lprs<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Lprs<'c> {
    type CreateRequest = LprCreateDBRequest;
    type UpdateRequest = LprUpdateDBRequest;
    type Response = LprDBResponse;
    type Id = LprId;

    #[instrument(skip(self, request), fields(name = %request.name, value_type = %request.value_type), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let lpr = sqlx::query_as::<_, LprDBResponse>(
            r#"
            INSERT INTO lprs (name, description, value, type)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.value)
        .bind(request.value_type)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(lpr)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let lpr = sqlx::query_as::<_, LprDBResponse>("SELECT * FROM lprs WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(lpr)
    }

    #[instrument(skip(self, page), fields(limit = page.limit, skip = page.skip), err)]
    async fn list(&mut self, page: &Pagination) -> Result<Vec<Self::Response>> {
        let lprs = sqlx::query_as::<_, LprDBResponse>("SELECT * FROM lprs ORDER BY id LIMIT $1 OFFSET $2")
            .bind(page.limit)
            .bind(page.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(lprs)
    }

    /// LPR profiles own no join rows. Deleting one that clients still reference fails with a
    /// foreign key violation and leaves everything in place.
    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM lprs WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let lpr = sqlx::query_as::<_, LprDBResponse>(
            r#"
            UPDATE lprs SET
                name = COALESCE($2, name),
                description = CASE
                    WHEN $3 THEN $4
                    ELSE description
                END,
                value = COALESCE($5, value),
                type = COALESCE($6, type),
                is_active = COALESCE($7, is_active),
                updated_at = clock_timestamp()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(request.description.is_some())
        .bind(request.description.as_ref().and_then(|inner| inner.as_deref()))
        .bind(&request.value)
        .bind(request.value_type)
        .bind(request.is_active)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(lpr)
    }
}

impl<'c> Lprs<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    /// Fetch profiles by id regardless of state, keyed by id.
    pub async fn get_bulk(&mut self, ids: &[LprId]) -> Result<HashMap<LprId, LprDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let lprs = sqlx::query_as::<_, LprDBResponse>("SELECT * FROM lprs WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(lprs.into_iter().map(|l| (l.id, l)).collect())
    }

    /// Fetch an LPR profile only if it can still be referenced by new clients.
    #[instrument(skip(self), err)]
    pub async fn get_live(&mut self, id: LprId) -> Result<Option<LprDBResponse>> {
        let lpr = sqlx::query_as::<_, LprDBResponse>("SELECT * FROM lprs WHERE id = $1 AND is_active")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(lpr)
    }
}
