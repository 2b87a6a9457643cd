//! Camera setting registry.

use crate::{
    db::{
        handlers::{CameraSettings, Cameras, Repository},
        models::camera_settings::{CameraSettingCreateDBRequest, CameraSettingDBResponse, CameraSettingUpdateDBRequest},
    },
    errors::{Error, Result},
    registry::{commit, missing_ids, models::CameraSettingResponse},
    types::{CameraSettingId, Pagination, distinct_ids},
};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct CameraSettingRegistry {
    pool: PgPool,
}

/// Resolve a requested setting id set against live settings, all or nothing.
///
/// Duplicates in `ids` count once. Any unknown or retired id fails the whole set with
/// `ValidationMismatch`, before the caller has written anything.
pub(crate) async fn resolve_settings(conn: &mut PgConnection, ids: &[CameraSettingId]) -> Result<Vec<CameraSettingDBResponse>> {
    let requested = distinct_ids(ids);
    if requested.is_empty() {
        return Ok(Vec::new());
    }

    let resolved = CameraSettings::new(conn).get_live_bulk(&requested).await?;
    if resolved.len() < requested.len() {
        return Err(Error::ValidationMismatch {
            resource: "settings".to_string(),
            requested: requested.len(),
            resolved: resolved.len(),
            missing: missing_ids(&requested, resolved.iter().map(|s| s.id)),
        });
    }

    Ok(resolved)
}

impl CameraSettingRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self), err)]
    pub async fn get(&self, id: CameraSettingId) -> Result<CameraSettingResponse> {
        let mut tx = self.pool.begin().await?;
        let setting = Self::load(&mut tx, id).await?;
        tx.commit().await?;

        Ok(setting)
    }

    /// List settings in insertion order, each with the cameras that hold it.
    #[instrument(skip(self, page), fields(limit = page.limit, skip = page.skip), err)]
    pub async fn list(&self, page: &Pagination) -> Result<Vec<CameraSettingResponse>> {
        let mut tx = self.pool.begin().await?;

        let settings = CameraSettings::new(&mut tx).list(page).await?;
        let ids: Vec<CameraSettingId> = settings.iter().map(|s| s.id).collect();
        let mut cameras = Cameras::new(&mut tx).list_for_settings(&ids).await?;

        tx.commit().await?;

        Ok(settings
            .into_iter()
            .map(|setting| CameraSettingResponse {
                cameras: cameras.remove(&setting.id).unwrap_or_default(),
                setting,
            })
            .collect())
    }

    #[instrument(skip(self, request), fields(name = %request.name, setting_type = %request.setting_type), err)]
    pub async fn create(&self, request: &CameraSettingCreateDBRequest) -> Result<CameraSettingResponse> {
        let mut tx = self.pool.begin().await?;
        let setting = CameraSettings::new(&mut tx)
            .create(request)
            .await
            .map_err(Error::on_write("create camera setting"))?;
        commit(tx, "create camera setting").await?;

        tracing::info!("Camera setting {} created", setting.id);
        Ok(CameraSettingResponse {
            setting,
            cameras: Vec::new(),
        })
    }

    /// Apply a merge-patch. Camera links are untouched.
    #[instrument(skip(self, patch), err)]
    pub async fn update(&self, id: CameraSettingId, patch: &CameraSettingUpdateDBRequest) -> Result<CameraSettingResponse> {
        let mut tx = self.pool.begin().await?;

        let current = Self::load(&mut tx, id).await?;
        let setting = CameraSettings::new(&mut tx)
            .update(id, patch)
            .await
            .map_err(Error::on_write("update camera setting"))?;

        commit(tx, "update camera setting").await?;

        tracing::info!("Camera setting {} updated", id);
        Ok(CameraSettingResponse {
            setting,
            cameras: current.cameras,
        })
    }

    /// Delete a setting and its camera links. Returns the setting as it was before deletion.
    #[instrument(skip(self), err)]
    pub async fn delete(&self, id: CameraSettingId) -> Result<CameraSettingResponse> {
        let mut tx = self.pool.begin().await?;

        let snapshot = Self::load(&mut tx, id).await?;
        CameraSettings::new(&mut tx)
            .delete(id)
            .await
            .map_err(Error::on_write("delete camera setting"))?;

        commit(tx, "delete camera setting").await?;

        tracing::info!("Camera setting {} deleted, unlinked from {} cameras", id, snapshot.cameras.len());
        Ok(snapshot)
    }

    async fn load(conn: &mut PgConnection, id: CameraSettingId) -> Result<CameraSettingResponse> {
        let setting = CameraSettings::new(&mut *conn)
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("Camera setting", id))?;
        let cameras = Cameras::new(conn).list_for_settings(&[id]).await?.remove(&id).unwrap_or_default();

        Ok(CameraSettingResponse { setting, cameras })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::ErrorKind,
        registry::{Catalog, models::CameraCreate},
        test_utils::{create_test_gate, setting_request},
        types::ValueType,
    };

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_get_update(pool: PgPool) {
        let settings = Catalog::new(pool).camera_settings();

        let created = settings.create(&setting_request("fps", "30")).await.unwrap();
        assert!(created.cameras.is_empty());
        assert_eq!(settings.get(created.setting.id).await.unwrap(), created);

        let updated = settings
            .update(
                created.setting.id,
                &CameraSettingUpdateDBRequest {
                    description: Some(Some("Frames per second".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.setting.description.as_deref(), Some("Frames per second"));
        assert_eq!(updated.setting.value, "30");
        assert_eq!(updated.setting.setting_type, ValueType::Int);
        assert!(updated.setting.updated_at > created.setting.updated_at);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_clears_description(pool: PgPool) {
        let settings = Catalog::new(pool).camera_settings();

        let mut request = setting_request("fps", "30");
        request.description = Some("Frames per second".to_string());
        let created = settings.create(&request).await.unwrap();

        let kept = settings
            .update(
                created.setting.id,
                &CameraSettingUpdateDBRequest {
                    value: Some("25".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(kept.setting.description.as_deref(), Some("Frames per second"));

        let cleared = settings
            .update(
                created.setting.id,
                &CameraSettingUpdateDBRequest {
                    description: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.setting.description, None);
        assert_eq!(cleared.setting.value, "25");
        assert_eq!(settings.get(created.setting.id).await.unwrap().setting.description, None);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_and_delete_unknown_setting(pool: PgPool) {
        let settings = Catalog::new(pool).camera_settings();

        let err = settings.update(31337, &CameraSettingUpdateDBRequest::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = settings.delete(31337).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_rename_onto_existing_name_conflicts(pool: PgPool) {
        let settings = Catalog::new(pool).camera_settings();

        settings.create(&setting_request("fps", "30")).await.unwrap();
        let other = settings.create(&setting_request("gain", "2")).await.unwrap();

        let err = settings
            .update(
                other.setting.id,
                &CameraSettingUpdateDBRequest {
                    name: Some("fps".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(settings.get(other.setting.id).await.unwrap().setting.name, "gain");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_unlinks_every_camera(pool: PgPool) {
        let gate = create_test_gate(&pool, "North").await;
        let catalog = Catalog::new(pool);

        let ir = catalog.camera_settings().create(&setting_request("ir", "on")).await.unwrap();
        let fps = catalog.camera_settings().create(&setting_request("fps", "30")).await.unwrap();

        let mut camera_ids = Vec::new();
        for name in ["Lobby", "Dock"] {
            let camera = catalog
                .cameras()
                .create(
                    &CameraCreate::builder()
                        .name(name.to_string())
                        .latitude("0".to_string())
                        .longitude("0".to_string())
                        .gate_id(gate.id)
                        .setting_ids(vec![ir.setting.id, fps.setting.id])
                        .build(),
                )
                .await
                .unwrap();
            camera_ids.push(camera.camera.id);
        }

        let snapshot = catalog.camera_settings().delete(ir.setting.id).await.unwrap();
        assert_eq!(snapshot.setting.name, "ir");
        assert_eq!(snapshot.cameras.iter().map(|c| c.id).collect::<Vec<_>>(), camera_ids);

        for camera_id in camera_ids {
            let camera = catalog.cameras().get(camera_id).await.unwrap();
            assert_eq!(camera.setting_ids(), vec![fps.setting.id]);
        }

        let err = catalog.camera_settings().get(ir.setting.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_includes_cameras(pool: PgPool) {
        let gate = create_test_gate(&pool, "South").await;
        let catalog = Catalog::new(pool);

        let used = catalog.camera_settings().create(&setting_request("used", "1")).await.unwrap();
        let unused = catalog.camera_settings().create(&setting_request("unused", "1")).await.unwrap();
        let camera = catalog
            .cameras()
            .create(
                &CameraCreate::builder()
                    .name("Yard".to_string())
                    .latitude("0".to_string())
                    .longitude("0".to_string())
                    .gate_id(gate.id)
                    .setting_ids(vec![used.setting.id])
                    .build(),
            )
            .await
            .unwrap();

        let listed = catalog.camera_settings().list(&Pagination::default()).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].setting.id, used.setting.id);
        assert_eq!(listed[0].cameras, vec![camera.camera]);
        assert_eq!(listed[1].setting.id, unused.setting.id);
        assert!(listed[1].cameras.is_empty());
    }
}
