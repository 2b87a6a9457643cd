//! Database repository for gates.

use crate::{
    db::{
        errors::Result,
        models::gates::{GateCreateDBRequest, GateDBResponse},
    },
    types::{GateId, Pagination},
};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Gates<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Gates<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(name = %request.name, building_id = request.building_id), err)]
    pub async fn create(&mut self, request: &GateCreateDBRequest) -> Result<GateDBResponse> {
        let gate = sqlx::query_as::<_, GateDBResponse>(
            r#"
            INSERT INTO gates (name, location, building_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.location)
        .bind(request.building_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(gate)
    }

    /// Fetch a gate only if it is live (`is_active`). This is the lookup used when another
    /// entity wants to reference the gate.
    #[instrument(skip(self), err)]
    pub async fn get_live(&mut self, id: GateId) -> Result<Option<GateDBResponse>> {
        let gate = sqlx::query_as::<_, GateDBResponse>("SELECT * FROM gates WHERE id = $1 AND is_active")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(gate)
    }

    #[instrument(skip(self, page), fields(limit = page.limit, skip = page.skip), err)]
    pub async fn list(&mut self, page: &Pagination) -> Result<Vec<GateDBResponse>> {
        let gates = sqlx::query_as::<_, GateDBResponse>("SELECT * FROM gates ORDER BY id LIMIT $1 OFFSET $2")
            .bind(page.limit)
            .bind(page.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(gates)
    }

    /// Retire a gate. Retired gates stay in place for existing cameras but can no longer be
    /// referenced.
    #[instrument(skip(self), err)]
    pub async fn deactivate(&mut self, id: GateId) -> Result<Option<GateDBResponse>> {
        let gate = sqlx::query_as::<_, GateDBResponse>(
            "UPDATE gates SET is_active = FALSE, updated_at = clock_timestamp() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(gate)
    }
}
