//! Database repository for buildings.

use crate::{
    db::{
        errors::Result,
        models::buildings::{BuildingCreateDBRequest, BuildingDBResponse},
    },
    types::{BuildingId, Pagination},
};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Buildings<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Buildings<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    pub async fn create(&mut self, request: &BuildingCreateDBRequest) -> Result<BuildingDBResponse> {
        let building = sqlx::query_as::<_, BuildingDBResponse>(
            r#"
            INSERT INTO buildings (name, address)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.address)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(building)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: BuildingId) -> Result<Option<BuildingDBResponse>> {
        let building = sqlx::query_as::<_, BuildingDBResponse>("SELECT * FROM buildings WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(building)
    }

    #[instrument(skip(self, page), fields(limit = page.limit, skip = page.skip), err)]
    pub async fn list(&mut self, page: &Pagination) -> Result<Vec<BuildingDBResponse>> {
        let buildings = sqlx::query_as::<_, BuildingDBResponse>("SELECT * FROM buildings ORDER BY id LIMIT $1 OFFSET $2")
            .bind(page.limit)
            .bind(page.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(buildings)
    }
}
