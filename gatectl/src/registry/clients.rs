//! Client device registry.
//!
//! A client is bound to one live LPR profile and any number of live cameras. The camera id set
//! is resolved in a single query before anything is written; a single unknown id fails the
//! whole create with `NotFound`.

use crate::{
    db::{
        handlers::{CameraSettings, Cameras, Clients, Lprs},
        models::{
            cameras::CameraDBResponse,
            clients::{ClientCreateDBRequest, ClientDBResponse},
        },
    },
    errors::{Error, Result},
    registry::{
        cameras::with_settings,
        commit, missing_ids,
        models::{CameraResponse, ClientCreate, ClientResponse},
    },
    types::{CameraId, ClientId, LprId, Pagination, distinct_ids},
};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct ClientRegistry {
    pool: PgPool,
}

/// Resolve a requested camera id set against live cameras, all or nothing.
async fn resolve_cameras(conn: &mut PgConnection, ids: &[CameraId]) -> Result<Vec<CameraDBResponse>> {
    let requested = distinct_ids(ids);
    if requested.is_empty() {
        return Ok(Vec::new());
    }

    let resolved = Cameras::new(conn).get_live_bulk(&requested).await?;
    if resolved.len() < requested.len() {
        let missing = missing_ids(&requested, resolved.iter().map(|c| c.id));
        let missing: Vec<String> = missing.iter().map(|id| id.to_string()).collect();
        return Err(Error::not_found("Camera", missing.join(", ")));
    }

    Ok(resolved)
}

/// Load each client's LPR profile and cameras (with settings) for a batch of clients.
async fn hydrate(conn: &mut PgConnection, clients: Vec<ClientDBResponse>) -> Result<Vec<ClientResponse>> {
    if clients.is_empty() {
        return Ok(Vec::new());
    }

    let client_ids: Vec<ClientId> = clients.iter().map(|c| c.id).collect();
    let lpr_ids: Vec<LprId> = distinct_ids(&clients.iter().map(|c| c.lpr_id).collect::<Vec<_>>());

    let lprs = Lprs::new(&mut *conn).get_bulk(&lpr_ids).await?;
    let mut cameras_by_client = Cameras::new(&mut *conn).list_for_clients(&client_ids).await?;

    // Cameras can be shared between clients, so fetch each one's settings once
    let camera_ids = distinct_ids(&cameras_by_client.values().flatten().map(|c| c.id).collect::<Vec<_>>());
    let settings = CameraSettings::new(conn).list_for_cameras(&camera_ids).await?;

    let mut responses = Vec::with_capacity(clients.len());
    for client in clients {
        let lpr = lprs
            .get(&client.lpr_id)
            .cloned()
            .ok_or_else(|| Error::not_found("LPR", client.lpr_id))?;
        let cameras = cameras_by_client
            .remove(&client.id)
            .unwrap_or_default()
            .into_iter()
            .map(|camera| CameraResponse {
                settings: settings.get(&camera.id).cloned().unwrap_or_default(),
                camera,
            })
            .collect();
        responses.push(ClientResponse { client, lpr, cameras });
    }

    Ok(responses)
}

impl ClientRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self), err)]
    pub async fn get(&self, id: ClientId) -> Result<ClientResponse> {
        let mut tx = self.pool.begin().await?;

        let client = Clients::new(&mut tx)
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("Client", id))?;
        let client = hydrate(&mut tx, vec![client])
            .await?
            .pop()
            .ok_or_else(|| Error::not_found("Client", id))?;

        tx.commit().await?;
        Ok(client)
    }

    /// List clients in insertion order with their LPR profile and cameras.
    #[instrument(skip(self, page), fields(limit = page.limit, skip = page.skip), err)]
    pub async fn list(&self, page: &Pagination) -> Result<Vec<ClientResponse>> {
        let mut tx = self.pool.begin().await?;
        let clients = Clients::new(&mut tx).list(page).await?;
        let clients = hydrate(&mut tx, clients).await?;
        tx.commit().await?;

        Ok(clients)
    }

    /// Register a client device against a live LPR profile and a set of live cameras.
    #[instrument(skip(self, request), fields(ip = %request.ip, port = request.port, lpr_id = request.lpr_id, cameras = request.camera_ids.len()), err)]
    pub async fn create(&self, request: &ClientCreate) -> Result<ClientResponse> {
        let mut tx = self.pool.begin().await?;

        let lpr = Lprs::new(&mut tx)
            .get_live(request.lpr_id)
            .await?
            .ok_or_else(|| Error::not_found("LPR", request.lpr_id))?;
        let cameras = resolve_cameras(&mut tx, &request.camera_ids).await?;

        let client = Clients::new(&mut tx)
            .create(&ClientCreateDBRequest::from(request))
            .await
            .map_err(Error::on_write("create client"))?;

        let camera_ids: Vec<CameraId> = cameras.iter().map(|c| c.id).collect();
        Clients::new(&mut tx)
            .attach_cameras(client.id, &camera_ids)
            .await
            .map_err(Error::on_write("create client"))?;

        let cameras = with_settings(&mut tx, cameras).await?;
        commit(tx, "create client").await?;

        tracing::info!("Client {} created for {}:{} with {} cameras", client.id, client.ip, client.port, cameras.len());
        Ok(ClientResponse { client, lpr, cameras })
    }
}
