//! Camera registry.
//!
//! A camera belongs to one live gate and holds any number of settings. Creating a camera
//! resolves the gate and the whole setting id set first, then writes the camera row and its
//! join rows in the same transaction. Updates never touch the setting links.

use crate::{
    db::{
        handlers::{CameraSettings, Cameras, Repository},
        models::cameras::{CameraCreateDBRequest, CameraDBResponse, CameraUpdateDBRequest},
    },
    errors::{Error, Result},
    registry::{
        camera_settings::resolve_settings,
        commit,
        gates::require_live_gate,
        models::{CameraCreate, CameraResponse},
    },
    types::{CameraId, Pagination},
};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct CameraRegistry {
    pool: PgPool,
}

/// Attach each camera's settings, in one query for the whole batch.
pub(crate) async fn with_settings(conn: &mut PgConnection, cameras: Vec<CameraDBResponse>) -> Result<Vec<CameraResponse>> {
    let ids: Vec<CameraId> = cameras.iter().map(|c| c.id).collect();
    let mut settings = CameraSettings::new(conn).list_for_cameras(&ids).await?;

    Ok(cameras
        .into_iter()
        .map(|camera| CameraResponse {
            settings: settings.remove(&camera.id).unwrap_or_default(),
            camera,
        })
        .collect())
}

impl CameraRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self), err)]
    pub async fn get(&self, id: CameraId) -> Result<CameraResponse> {
        let mut tx = self.pool.begin().await?;
        let camera = Self::load(&mut tx, id).await?;
        tx.commit().await?;

        Ok(camera)
    }

    /// List cameras in insertion order, each with its settings.
    #[instrument(skip(self, page), fields(limit = page.limit, skip = page.skip), err)]
    pub async fn list(&self, page: &Pagination) -> Result<Vec<CameraResponse>> {
        let mut tx = self.pool.begin().await?;
        let cameras = Cameras::new(&mut tx).list(page).await?;
        let cameras = with_settings(&mut tx, cameras).await?;
        tx.commit().await?;

        Ok(cameras)
    }

    /// Create a camera on a live gate, linked to every requested setting.
    ///
    /// Fails with `NotFound` for an unknown or retired gate and with `ValidationMismatch` if any
    /// setting id does not resolve. Nothing is written in either case.
    #[instrument(skip(self, request), fields(name = %request.name, gate_id = request.gate_id, settings = request.setting_ids.len()), err)]
    pub async fn create(&self, request: &CameraCreate) -> Result<CameraResponse> {
        let mut tx = self.pool.begin().await?;

        require_live_gate(&mut tx, request.gate_id).await?;
        let settings = resolve_settings(&mut tx, &request.setting_ids).await?;

        let camera = Cameras::new(&mut tx)
            .create(&CameraCreateDBRequest::from(request))
            .await
            .map_err(Error::on_write("create camera"))?;

        let setting_ids: Vec<_> = settings.iter().map(|s| s.id).collect();
        Cameras::new(&mut tx)
            .attach_settings(camera.id, &setting_ids)
            .await
            .map_err(Error::on_write("create camera"))?;

        commit(tx, "create camera").await?;

        tracing::info!("Camera {} created on gate {} with {} settings", camera.id, camera.gate_id, settings.len());
        Ok(CameraResponse { camera, settings })
    }

    /// Apply a merge-patch. A new `gate_id` must name a live gate. `updated_at` advances even when
    /// the patch is empty.
    #[instrument(skip(self, patch), fields(gate_id = ?patch.gate_id), err)]
    pub async fn update(&self, id: CameraId, patch: &CameraUpdateDBRequest) -> Result<CameraResponse> {
        let mut tx = self.pool.begin().await?;

        let current = Self::load(&mut tx, id).await?;
        if patch.is_empty() {
            tracing::debug!("Empty patch for camera {}, only updated_at moves", id);
        }
        if let Some(gate_id) = patch.gate_id {
            require_live_gate(&mut tx, gate_id).await?;
        }

        let camera = Cameras::new(&mut tx)
            .update(id, patch)
            .await
            .map_err(Error::on_write("update camera"))?;

        commit(tx, "update camera").await?;

        tracing::info!("Camera {} updated", id);
        Ok(CameraResponse {
            camera,
            settings: current.settings,
        })
    }

    /// Delete a camera with its setting links and client links. Returns the camera as it was
    /// before deletion.
    #[instrument(skip(self), err)]
    pub async fn delete(&self, id: CameraId) -> Result<CameraResponse> {
        let mut tx = self.pool.begin().await?;

        let snapshot = Self::load(&mut tx, id).await?;
        Cameras::new(&mut tx)
            .delete(id)
            .await
            .map_err(Error::on_write("delete camera"))?;

        commit(tx, "delete camera").await?;

        tracing::info!("Camera {} deleted", id);
        Ok(snapshot)
    }

    async fn load(conn: &mut PgConnection, id: CameraId) -> Result<CameraResponse> {
        let camera = Cameras::new(&mut *conn)
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("Camera", id))?;

        with_settings(conn, vec![camera])
            .await?
            .pop()
            .ok_or_else(|| Error::not_found("Camera", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{handlers::Clients, models::camera_settings::CameraSettingUpdateDBRequest},
        errors::ErrorKind,
        registry::{Catalog, models::ClientCreate},
        test_utils::{create_test_gate, lpr_request, setting_request},
    };

    fn camera(name: &str, gate_id: i64, setting_ids: Vec<i64>) -> CameraCreate {
        CameraCreate::builder()
            .name(name.to_string())
            .latitude("51.5072".to_string())
            .longitude("-0.1276".to_string())
            .gate_id(gate_id)
            .setting_ids(setting_ids)
            .build()
    }

    async fn table_count(pool: &PgPool, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_links_every_setting(pool: PgPool) {
        let gate = create_test_gate(&pool, "North").await;
        let catalog = Catalog::new(pool.clone());

        let fps = catalog.camera_settings().create(&setting_request("fps", "30")).await.unwrap();
        let ir = catalog.camera_settings().create(&setting_request("ir", "auto")).await.unwrap();

        // Repeated ids count once
        let created = catalog
            .cameras()
            .create(&camera("Lobby", gate.id, vec![ir.setting.id, fps.setting.id, ir.setting.id]))
            .await
            .unwrap();

        assert_eq!(created.setting_ids(), vec![fps.setting.id, ir.setting.id]);
        assert_eq!(catalog.cameras().get(created.camera.id).await.unwrap(), created);
        assert_eq!(table_count(&pool, "camera_settings_association").await, 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unknown_gate_writes_nothing(pool: PgPool) {
        let catalog = Catalog::new(pool.clone());
        let fps = catalog.camera_settings().create(&setting_request("fps", "30")).await.unwrap();

        let err = catalog
            .cameras()
            .create(&camera("Lobby", 999, vec![fps.setting.id]))
            .await
            .unwrap_err();

        assert!(matches!(&err, Error::NotFound { resource, id } if resource == "Gate" && id == "999"));
        assert_eq!(table_count(&pool, "cameras").await, 0);
        assert_eq!(table_count(&pool, "camera_settings_association").await, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_retired_gate_cannot_be_referenced(pool: PgPool) {
        let gate = create_test_gate(&pool, "Old gate").await;
        let catalog = Catalog::new(pool.clone());
        catalog.gates().deactivate(gate.id).await.unwrap();

        let err = catalog.cameras().create(&camera("Lobby", gate.id, vec![])).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(table_count(&pool, "cameras").await, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_partial_setting_set_is_rejected(pool: PgPool) {
        let gate = create_test_gate(&pool, "North").await;
        let catalog = Catalog::new(pool.clone());

        let fps = catalog.camera_settings().create(&setting_request("fps", "30")).await.unwrap();
        let retired = catalog.camera_settings().create(&setting_request("legacy", "1")).await.unwrap();
        catalog
            .camera_settings()
            .update(
                retired.setting.id,
                &CameraSettingUpdateDBRequest {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = catalog
            .cameras()
            .create(&camera("Lobby", gate.id, vec![fps.setting.id, retired.setting.id, 999]))
            .await
            .unwrap_err();

        match err {
            Error::ValidationMismatch {
                requested,
                resolved,
                missing,
                ..
            } => {
                assert_eq!(requested, 3);
                assert_eq!(resolved, 1);
                assert_eq!(missing, vec![retired.setting.id, 999]);
            }
            other => panic!("expected validation mismatch, got {other:?}"),
        }

        assert_eq!(table_count(&pool, "cameras").await, 0);
        assert_eq!(table_count(&pool, "camera_settings_association").await, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_empty_patch_only_advances_updated_at(pool: PgPool) {
        let gate = create_test_gate(&pool, "North").await;
        let catalog = Catalog::new(pool);
        let fps = catalog.camera_settings().create(&setting_request("fps", "30")).await.unwrap();
        let created = catalog.cameras().create(&camera("Lobby", gate.id, vec![fps.setting.id])).await.unwrap();

        let updated = catalog
            .cameras()
            .update(created.camera.id, &CameraUpdateDBRequest::default())
            .await
            .unwrap();

        assert!(updated.camera.updated_at > created.camera.updated_at);
        let mut expected = created.clone();
        expected.camera.updated_at = updated.camera.updated_at;
        assert_eq!(updated, expected);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_moves_gate_but_never_settings(pool: PgPool) {
        let north = create_test_gate(&pool, "North").await;
        let south = create_test_gate(&pool, "South").await;
        let catalog = Catalog::new(pool);
        let fps = catalog.camera_settings().create(&setting_request("fps", "30")).await.unwrap();
        let created = catalog.cameras().create(&camera("Lobby", north.id, vec![fps.setting.id])).await.unwrap();

        let moved = catalog
            .cameras()
            .update(
                created.camera.id,
                &CameraUpdateDBRequest {
                    gate_id: Some(south.id),
                    location: Some(Some("Reception".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(moved.camera.gate_id, south.id);
        assert_eq!(moved.camera.location.as_deref(), Some("Reception"));
        assert_eq!(moved.camera.name, "Lobby");
        assert_eq!(moved.setting_ids(), vec![fps.setting.id]);

        catalog.gates().deactivate(north.id).await.unwrap();
        let err = catalog
            .cameras()
            .update(
                created.camera.id,
                &CameraUpdateDBRequest {
                    gate_id: Some(north.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(catalog.cameras().get(created.camera.id).await.unwrap().camera.gate_id, south.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_clears_location_and_description(pool: PgPool) {
        let gate = create_test_gate(&pool, "East").await;
        let cameras = Catalog::new(pool).cameras();

        let mut request = camera("Hall", gate.id, vec![]);
        request.location = Some("Hall".to_string());
        request.description = Some("Entrance hall".to_string());
        let created = cameras.create(&request).await.unwrap();
        assert_eq!(created.camera.location.as_deref(), Some("Hall"));

        let cleared = cameras
            .update(
                created.camera.id,
                &CameraUpdateDBRequest {
                    location: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.camera.location, None);
        assert_eq!(cleared.camera.description.as_deref(), Some("Entrance hall"));

        let cleared = cameras
            .update(
                created.camera.id,
                &CameraUpdateDBRequest {
                    description: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.camera.location, None);
        assert_eq!(cleared.camera.description, None);
        assert_eq!(cameras.get(created.camera.id).await.unwrap(), cleared);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_unknown_camera(pool: PgPool) {
        let err = Catalog::new(pool)
            .cameras()
            .update(5, &CameraUpdateDBRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(&err, Error::NotFound { resource, .. } if resource == "Camera"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_removes_setting_and_client_links(pool: PgPool) {
        let gate = create_test_gate(&pool, "North").await;
        let catalog = Catalog::new(pool.clone());

        let fps = catalog.camera_settings().create(&setting_request("fps", "30")).await.unwrap();
        let lobby = catalog.cameras().create(&camera("Lobby", gate.id, vec![fps.setting.id])).await.unwrap();
        let dock = catalog.cameras().create(&camera("Dock", gate.id, vec![])).await.unwrap();
        let lpr = catalog.lprs().create(&lpr_request("eu-plates")).await.unwrap();
        let client = catalog
            .clients()
            .create(
                &ClientCreate::builder()
                    .ip("10.0.0.5".to_string())
                    .port(9000)
                    .auth_token("secret".to_string())
                    .lpr_id(lpr.lpr.id)
                    .camera_ids(vec![lobby.camera.id, dock.camera.id])
                    .build(),
            )
            .await
            .unwrap();

        let snapshot = catalog.cameras().delete(lobby.camera.id).await.unwrap();
        assert_eq!(snapshot, lobby);

        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(Clients::new(&mut conn).count_for_camera(lobby.camera.id).await.unwrap(), 0);
        assert_eq!(Clients::new(&mut conn).count_for_camera(dock.camera.id).await.unwrap(), 1);
        assert_eq!(table_count(&pool, "camera_settings_association").await, 0);

        let client = catalog.clients().get(client.client.id).await.unwrap();
        assert_eq!(client.camera_ids(), vec![dock.camera.id]);
        assert!(catalog.camera_settings().get(fps.setting.id).await.unwrap().cameras.is_empty());

        assert_eq!(catalog.cameras().delete(lobby.camera.id).await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_pages_are_disjoint_and_ordered(pool: PgPool) {
        let gate = create_test_gate(&pool, "North").await;
        let cameras = Catalog::new(pool).cameras();

        for i in 0..25 {
            cameras.create(&camera(&format!("cam-{i:02}"), gate.id, vec![])).await.unwrap();
        }

        let first = cameras.list(&Pagination::new(0, 10)).await.unwrap();
        let second = cameras.list(&Pagination::new(10, 10)).await.unwrap();
        let both = cameras.list(&Pagination::new(0, 20)).await.unwrap();

        assert_eq!(first.len(), 10);
        assert_eq!(second.len(), 10);
        assert!(first.iter().all(|a| second.iter().all(|b| a.camera.id != b.camera.id)));

        let concatenated: Vec<_> = first.into_iter().chain(second).collect();
        assert_eq!(concatenated, both);
        assert_eq!(both[0].camera.name, "cam-00");
    }
}
