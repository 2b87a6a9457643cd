//! Database repository for camera settings.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::camera_settings::{CameraSettingCreateDBRequest, CameraSettingDBResponse, CameraSettingUpdateDBRequest},
};
use crate::types::{CameraId, CameraSettingId, Pagination};
use sqlx::{FromRow, PgConnection};
use std::collections::HashMap;
use tracing::instrument;

// A setting joined to one of the cameras that holds it
#[derive(Debug, FromRow)]
struct CameraSettingLink {
    camera_id: CameraId,
    #[sqlx(flatten)]
    setting: CameraSettingDBResponse,
}

pub struct CameraSettings<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for CameraSettings<'c> {
    type CreateRequest = CameraSettingCreateDBRequest;
    type UpdateRequest = CameraSettingUpdateDBRequest;
    type Response = CameraSettingDBResponse;
    type Id = CameraSettingId;

    #[instrument(skip(self, request), fields(name = %request.name, setting_type = %request.setting_type), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        // created_at and updated_at use database DEFAULT NOW()
        let setting = sqlx::query_as::<_, CameraSettingDBResponse>(
            r#"
            INSERT INTO camera_settings (name, description, value, setting_type)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.value)
        .bind(request.setting_type)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(setting)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let setting = sqlx::query_as::<_, CameraSettingDBResponse>("SELECT * FROM camera_settings WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(setting)
    }

    #[instrument(skip(self, page), fields(limit = page.limit, skip = page.skip), err)]
    async fn list(&mut self, page: &Pagination) -> Result<Vec<Self::Response>> {
        let settings = sqlx::query_as::<_, CameraSettingDBResponse>("SELECT * FROM camera_settings ORDER BY id LIMIT $1 OFFSET $2")
            .bind(page.limit)
            .bind(page.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(settings)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        sqlx::query("DELETE FROM camera_settings_association WHERE setting_id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        let result = sqlx::query("DELETE FROM camera_settings WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // clock_timestamp() rather than NOW() so updated_at moves even within one transaction
        let setting = sqlx::query_as::<_, CameraSettingDBResponse>(
            r#"
            UPDATE camera_settings SET
                name = COALESCE($2, name),
                description = CASE
                    WHEN $3 THEN $4
                    ELSE description
                END,
                value = COALESCE($5, value),
                setting_type = COALESCE($6, setting_type),
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
        .bind(request.setting_type)
        .bind(request.is_active)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(setting)
    }
}

impl<'c> CameraSettings<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Resolve a set of ids against live settings in a single query, ordered by id.
    ///
    /// Ids that are unknown or retired are silently absent from the result; callers compare
    /// lengths to decide whether the whole set resolved.
    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    pub async fn get_live_bulk(&mut self, ids: &[CameraSettingId]) -> Result<Vec<CameraSettingDBResponse>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let settings = sqlx::query_as::<_, CameraSettingDBResponse>(
            "SELECT * FROM camera_settings WHERE id = ANY($1) AND is_active ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(settings)
    }

    /// Settings held by each of the given cameras, in one round trip.
    #[instrument(skip(self, camera_ids), fields(count = camera_ids.len()), err)]
    pub async fn list_for_cameras(&mut self, camera_ids: &[CameraId]) -> Result<HashMap<CameraId, Vec<CameraSettingDBResponse>>> {
        if camera_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let links = sqlx::query_as::<_, CameraSettingLink>(
            r#"
            SELECT a.camera_id, s.*
            FROM camera_settings s
            INNER JOIN camera_settings_association a ON a.setting_id = s.id
            WHERE a.camera_id = ANY($1)
            ORDER BY a.camera_id, s.id
            "#,
        )
        .bind(camera_ids)
        .fetch_all(&mut *self.db)
        .await?;

        let mut result: HashMap<CameraId, Vec<CameraSettingDBResponse>> = HashMap::new();
        for link in links {
            result.entry(link.camera_id).or_default().push(link.setting);
        }

        Ok(result)
    }
}
