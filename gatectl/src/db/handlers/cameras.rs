//! Database repository for cameras and the camera×setting association.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::cameras::{CameraCreateDBRequest, CameraDBResponse, CameraUpdateDBRequest},
};
use crate::types::{CameraId, CameraSettingId, ClientId, Pagination};
use sqlx::{FromRow, PgConnection};
use std::collections::HashMap;
use tracing::instrument;

#[derive(Debug, FromRow)]
struct SettingCameraLink {
    setting_id: CameraSettingId,
    #[sqlx(flatten)]
    camera: CameraDBResponse,
}

#[derive(Debug, FromRow)]
struct ClientCameraLink {
    client_id: ClientId,
    #[sqlx(flatten)]
    camera: CameraDBResponse,
}

pub struct Cameras<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Cameras<'c> {
    type CreateRequest = CameraCreateDBRequest;
    type UpdateRequest = CameraUpdateDBRequest;
    type Response = CameraDBResponse;
    type Id = CameraId;

    #[instrument(skip(self, request), fields(name = %request.name, gate_id = request.gate_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let camera = sqlx::query_as::<_, CameraDBResponse>(
            r#"
            INSERT INTO cameras (name, location, latitude, longitude, description, gate_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.location)
        .bind(&request.latitude)
        .bind(&request.longitude)
        .bind(&request.description)
        .bind(request.gate_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(camera)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let camera = sqlx::query_as::<_, CameraDBResponse>("SELECT * FROM cameras WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(camera)
    }

    #[instrument(skip(self, page), fields(limit = page.limit, skip = page.skip), err)]
    async fn list(&mut self, page: &Pagination) -> Result<Vec<Self::Response>> {
        let cameras = sqlx::query_as::<_, CameraDBResponse>("SELECT * FROM cameras ORDER BY id LIMIT $1 OFFSET $2")
            .bind(page.limit)
            .bind(page.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(cameras)
    }

    /// Removes the camera's setting links and client links before the row itself.
    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        sqlx::query("DELETE FROM camera_settings_association WHERE camera_id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        sqlx::query("DELETE FROM client_camera_association WHERE camera_id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        let result = sqlx::query("DELETE FROM cameras WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let camera = sqlx::query_as::<_, CameraDBResponse>(
            r#"
            UPDATE cameras SET
                name = COALESCE($2, name),
                location = CASE
                    WHEN $3 THEN $4
                    ELSE location
                END,
                latitude = COALESCE($5, latitude),
                longitude = COALESCE($6, longitude),
                description = CASE
                    WHEN $7 THEN $8
                    ELSE description
                END,
                gate_id = COALESCE($9, gate_id),
                is_active = COALESCE($10, is_active),
                updated_at = clock_timestamp()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(request.location.is_some())
        .bind(request.location.as_ref().and_then(|inner| inner.as_deref()))
        .bind(&request.latitude)
        .bind(&request.longitude)
        .bind(request.description.is_some())
        .bind(request.description.as_ref().and_then(|inner| inner.as_deref()))
        .bind(request.gate_id)
        .bind(request.is_active)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(camera)
    }
}

impl<'c> Cameras<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Resolve a set of ids against live cameras in a single query, ordered by id.
    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    pub async fn get_live_bulk(&mut self, ids: &[CameraId]) -> Result<Vec<CameraDBResponse>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let cameras = sqlx::query_as::<_, CameraDBResponse>("SELECT * FROM cameras WHERE id = ANY($1) AND is_active ORDER BY id")
            .bind(ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(cameras)
    }

    /// Write one camera×setting join row per setting id.
    #[instrument(skip(self, setting_ids), fields(count = setting_ids.len()), err)]
    pub async fn attach_settings(&mut self, camera_id: CameraId, setting_ids: &[CameraSettingId]) -> Result<u64> {
        if setting_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO camera_settings_association (camera_id, setting_id)
            SELECT $1, setting_id FROM unnest($2::bigint[]) AS setting_id
            "#,
        )
        .bind(camera_id)
        .bind(setting_ids)
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected())
    }

    /// Cameras holding each of the given settings, in one round trip.
    #[instrument(skip(self, setting_ids), fields(count = setting_ids.len()), err)]
    pub async fn list_for_settings(&mut self, setting_ids: &[CameraSettingId]) -> Result<HashMap<CameraSettingId, Vec<CameraDBResponse>>> {
        if setting_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let links = sqlx::query_as::<_, SettingCameraLink>(
            r#"
            SELECT a.setting_id, c.*
            FROM cameras c
            INNER JOIN camera_settings_association a ON a.camera_id = c.id
            WHERE a.setting_id = ANY($1)
            ORDER BY a.setting_id, c.id
            "#,
        )
        .bind(setting_ids)
        .fetch_all(&mut *self.db)
        .await?;

        let mut result: HashMap<CameraSettingId, Vec<CameraDBResponse>> = HashMap::new();
        for link in links {
            result.entry(link.setting_id).or_default().push(link.camera);
        }

        Ok(result)
    }

    /// Cameras bound to each of the given clients, in one round trip.
    #[instrument(skip(self, client_ids), fields(count = client_ids.len()), err)]
    pub async fn list_for_clients(&mut self, client_ids: &[ClientId]) -> Result<HashMap<ClientId, Vec<CameraDBResponse>>> {
        if client_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let links = sqlx::query_as::<_, ClientCameraLink>(
            r#"
            SELECT a.client_id, c.*
            FROM cameras c
            INNER JOIN client_camera_association a ON a.camera_id = c.id
            WHERE a.client_id = ANY($1)
            ORDER BY a.client_id, c.id
            "#,
        )
        .bind(client_ids)
        .fetch_all(&mut *self.db)
        .await?;

        let mut result: HashMap<ClientId, Vec<CameraDBResponse>> = HashMap::new();
        for link in links {
            result.entry(link.client_id).or_default().push(link.camera);
        }

        Ok(result)
    }
}
