//! Building directory.

use crate::{
    db::{
        handlers::Buildings,
        models::buildings::{BuildingCreateDBRequest, BuildingDBResponse},
    },
    errors::{Error, Result},
    registry::commit,
    types::{BuildingId, Pagination},
};
use sqlx::PgPool;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct BuildingDirectory {
    pool: PgPool,
}

impl BuildingDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self), err)]
    pub async fn get(&self, id: BuildingId) -> Result<BuildingDBResponse> {
        let mut tx = self.pool.begin().await?;
        let building = Buildings::new(&mut tx)
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("Building", id))?;
        tx.commit().await?;

        Ok(building)
    }

    #[instrument(skip(self, page), fields(limit = page.limit, skip = page.skip), err)]
    pub async fn list(&self, page: &Pagination) -> Result<Vec<BuildingDBResponse>> {
        let mut tx = self.pool.begin().await?;
        let buildings = Buildings::new(&mut tx).list(page).await?;
        tx.commit().await?;

        Ok(buildings)
    }

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    pub async fn create(&self, request: &BuildingCreateDBRequest) -> Result<BuildingDBResponse> {
        let mut tx = self.pool.begin().await?;
        let building = Buildings::new(&mut tx)
            .create(request)
            .await
            .map_err(Error::on_write("create building"))?;
        commit(tx, "create building").await?;

        tracing::info!("Building {} created", building.id);
        Ok(building)
    }
}
