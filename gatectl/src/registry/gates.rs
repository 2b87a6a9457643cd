//! Gate directory.
//!
//! Cameras reference gates, so the directory's main job is answering "is this gate live" during
//! camera validation. [`require_live_gate`] is that lookup, run on the caller's transaction.

use crate::{
    db::{
        handlers::{Buildings, Gates},
        models::gates::{GateCreateDBRequest, GateDBResponse},
    },
    errors::{Error, Result},
    registry::commit,
    types::{GateId, Pagination},
};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct GateDirectory {
    pool: PgPool,
}

/// Resolve a gate reference, failing with `NotFound` unless the gate exists and is live.
pub(crate) async fn require_live_gate(conn: &mut PgConnection, id: GateId) -> Result<GateDBResponse> {
    Gates::new(conn).get_live(id).await?.ok_or_else(|| Error::not_found("Gate", id))
}

impl GateDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a live gate. Retired gates are reported as not found.
    #[instrument(skip(self), err)]
    pub async fn get(&self, id: GateId) -> Result<GateDBResponse> {
        let mut tx = self.pool.begin().await?;
        let gate = require_live_gate(&mut tx, id).await?;
        tx.commit().await?;

        Ok(gate)
    }

    #[instrument(skip(self, page), fields(limit = page.limit, skip = page.skip), err)]
    pub async fn list(&self, page: &Pagination) -> Result<Vec<GateDBResponse>> {
        let mut tx = self.pool.begin().await?;
        let gates = Gates::new(&mut tx).list(page).await?;
        tx.commit().await?;

        Ok(gates)
    }

    #[instrument(skip(self, request), fields(name = %request.name, building_id = request.building_id), err)]
    pub async fn create(&self, request: &GateCreateDBRequest) -> Result<GateDBResponse> {
        let mut tx = self.pool.begin().await?;

        if Buildings::new(&mut tx).get_by_id(request.building_id).await?.is_none() {
            return Err(Error::not_found("Building", request.building_id));
        }

        let gate = Gates::new(&mut tx).create(request).await.map_err(Error::on_write("create gate"))?;
        commit(tx, "create gate").await?;

        tracing::info!("Gate {} created in building {}", gate.id, gate.building_id);
        Ok(gate)
    }

    /// Retire a gate. Cameras already on it keep their `gate_id`.
    #[instrument(skip(self), err)]
    pub async fn deactivate(&self, id: GateId) -> Result<GateDBResponse> {
        let mut tx = self.pool.begin().await?;
        let gate = Gates::new(&mut tx)
            .deactivate(id)
            .await
            .map_err(Error::on_write("deactivate gate"))?
            .ok_or_else(|| Error::not_found("Gate", id))?;
        commit(tx, "deactivate gate").await?;

        tracing::info!("Gate {} deactivated", gate.id);
        Ok(gate)
    }
}
