//! Database repository for client devices and the client×camera association.

use crate::db::{
    errors::Result,
    models::clients::{ClientCreateDBRequest, ClientDBResponse},
};
use crate::types::{CameraId, ClientId, LprId, Pagination};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use std::collections::HashMap;
use tracing::instrument;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Client {
    pub id: ClientId,
    pub ip: String,
    pub port: i32,
    pub auth_token: String,
    pub lpr_id: LprId,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<Client> for ClientDBResponse {
    type Error = anyhow::Error;

    fn try_from(src: Client) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: src.id,
            ip: src.ip,
            port: u16::try_from(src.port)?, // the clients_port_range check keeps this in range
            auth_token: src.auth_token,
            lpr_id: src.lpr_id,
            is_active: src.is_active,
            created_at: src.created_at,
            updated_at: src.updated_at,
        })
    }
}

pub struct Clients<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Clients<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(ip = %request.ip, port = request.port, lpr_id = request.lpr_id), err)]
    pub async fn create(&mut self, request: &ClientCreateDBRequest) -> Result<ClientDBResponse> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (ip, port, auth_token, lpr_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&request.ip)
        .bind(i32::from(request.port))
        .bind(&request.auth_token)
        .bind(request.lpr_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(client.try_into()?)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: ClientId) -> Result<Option<ClientDBResponse>> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        match client {
            Some(c) => Ok(Some(c.try_into()?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, page), fields(limit = page.limit, skip = page.skip), err)]
    pub async fn list(&mut self, page: &Pagination) -> Result<Vec<ClientDBResponse>> {
        let clients = sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY id LIMIT $1 OFFSET $2")
            .bind(page.limit)
            .bind(page.skip)
            .fetch_all(&mut *self.db)
            .await?;

        clients.into_iter().map(|c| Ok(c.try_into()?)).collect()
    }

    /// Clients of each of the given LPR profiles, in one round trip.
    #[instrument(skip(self, lpr_ids), fields(count = lpr_ids.len()), err)]
    pub async fn list_for_lprs(&mut self, lpr_ids: &[LprId]) -> Result<HashMap<LprId, Vec<ClientDBResponse>>> {
        if lpr_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let clients = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE lpr_id = ANY($1) ORDER BY lpr_id, id")
            .bind(lpr_ids)
            .fetch_all(&mut *self.db)
            .await?;

        let mut result: HashMap<LprId, Vec<ClientDBResponse>> = HashMap::new();
        for client in clients {
            result.entry(client.lpr_id).or_default().push(client.try_into()?);
        }

        Ok(result)
    }

    /// Write one client×camera join row per camera id.
    #[instrument(skip(self, camera_ids), fields(count = camera_ids.len()), err)]
    pub async fn attach_cameras(&mut self, client_id: ClientId, camera_ids: &[CameraId]) -> Result<u64> {
        if camera_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO client_camera_association (client_id, camera_id)
            SELECT $1, camera_id FROM unnest($2::bigint[]) AS camera_id
            "#,
        )
        .bind(client_id)
        .bind(camera_ids)
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected())
    }

    /// Number of clients bound to a camera.
    #[instrument(skip(self), err)]
    pub async fn count_for_camera(&mut self, camera_id: CameraId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM client_camera_association WHERE camera_id = $1")
            .bind(camera_id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }
}
