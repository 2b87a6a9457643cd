//! LPR profile registry.

use crate::{
    db::{
        handlers::{Clients, Lprs, Repository},
        models::lprs::{LprCreateDBRequest, LprUpdateDBRequest},
    },
    errors::{Error, Result},
    registry::{commit, models::LprResponse},
    types::{LprId, Pagination},
};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct LprRegistry {
    pool: PgPool,
}

impl LprRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self), err)]
    pub async fn get(&self, id: LprId) -> Result<LprResponse> {
        let mut tx = self.pool.begin().await?;
        let lpr = Self::load(&mut tx, id).await?;
        tx.commit().await?;

        Ok(lpr)
    }

    /// List profiles in insertion order, each with its clients.
    #[instrument(skip(self, page), fields(limit = page.limit, skip = page.skip), err)]
    pub async fn list(&self, page: &Pagination) -> Result<Vec<LprResponse>> {
        let mut tx = self.pool.begin().await?;

        let lprs = Lprs::new(&mut tx).list(page).await?;
        let ids: Vec<LprId> = lprs.iter().map(|l| l.id).collect();
        let mut clients = Clients::new(&mut tx).list_for_lprs(&ids).await?;

        tx.commit().await?;

        Ok(lprs
            .into_iter()
            .map(|lpr| LprResponse {
                clients: clients.remove(&lpr.id).unwrap_or_default(),
                lpr,
            })
            .collect())
    }

    #[instrument(skip(self, request), fields(name = %request.name, value_type = %request.value_type), err)]
    pub async fn create(&self, request: &LprCreateDBRequest) -> Result<LprResponse> {
        let mut tx = self.pool.begin().await?;
        let lpr = Lprs::new(&mut tx).create(request).await.map_err(Error::on_write("create LPR"))?;
        commit(tx, "create LPR").await?;

        tracing::info!("LPR profile {} created", lpr.id);
        Ok(LprResponse { lpr, clients: Vec::new() })
    }

    #[instrument(skip(self, patch), err)]
    pub async fn update(&self, id: LprId, patch: &LprUpdateDBRequest) -> Result<LprResponse> {
        let mut tx = self.pool.begin().await?;

        let current = Self::load(&mut tx, id).await?;
        let lpr = Lprs::new(&mut tx).update(id, patch).await.map_err(Error::on_write("update LPR"))?;

        commit(tx, "update LPR").await?;

        tracing::info!("LPR profile {} updated", id);
        Ok(LprResponse {
            lpr,
            clients: current.clients,
        })
    }

    /// Delete a profile. A profile that clients still use is rejected with `Conflict` and left
    /// in place.
    #[instrument(skip(self), err)]
    pub async fn delete(&self, id: LprId) -> Result<LprResponse> {
        let mut tx = self.pool.begin().await?;

        let snapshot = Self::load(&mut tx, id).await?;
        Lprs::new(&mut tx).delete(id).await.map_err(Error::on_write("delete LPR"))?;

        commit(tx, "delete LPR").await?;

        tracing::info!("LPR profile {} deleted", id);
        Ok(snapshot)
    }

    async fn load(conn: &mut PgConnection, id: LprId) -> Result<LprResponse> {
        let lpr = Lprs::new(&mut *conn)
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("LPR", id))?;
        let clients = Clients::new(conn).list_for_lprs(&[id]).await?.remove(&id).unwrap_or_default();

        Ok(LprResponse { lpr, clients })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::ErrorKind,
        registry::{Catalog, models::ClientCreate},
        test_utils::lpr_request,
        types::{TypedValue, ValueType},
    };

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_update_and_typed_value(pool: PgPool) {
        let lprs = Catalog::new(pool).lprs();

        let created = lprs.create(&lpr_request("eu-plates")).await.unwrap();
        assert_eq!(created.lpr.value_type, ValueType::String);
        assert!(created.clients.is_empty());

        let updated = lprs
            .update(
                created.lpr.id,
                &LprUpdateDBRequest {
                    value: Some("0.85".to_string()),
                    value_type: Some(ValueType::Float),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.lpr.name, "eu-plates");
        assert_eq!(updated.lpr.typed_value(), Some(TypedValue::Float(0.85)));
        assert!(updated.lpr.updated_at > created.lpr.updated_at);
        assert_eq!(lprs.get(created.lpr.id).await.unwrap(), updated);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_clears_description(pool: PgPool) {
        let lprs = Catalog::new(pool).lprs();

        let created = lprs.create(&lpr_request("eu-plates")).await.unwrap();
        assert!(created.lpr.description.is_some());

        let cleared = lprs
            .update(
                created.lpr.id,
                &LprUpdateDBRequest {
                    description: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(cleared.lpr.description, None);
        assert_eq!(cleared.lpr.name, "eu-plates");
        assert_eq!(lprs.get(created.lpr.id).await.unwrap().lpr.description, None);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_mismatched_value_is_stored_as_is(pool: PgPool) {
        let lprs = Catalog::new(pool).lprs();

        let created = lprs
            .create(&LprCreateDBRequest {
                name: "threshold".to_string(),
                description: None,
                value: "high".to_string(),
                value_type: ValueType::Int,
            })
            .await
            .unwrap();

        assert_eq!(created.lpr.value, "high");
        assert_eq!(created.lpr.typed_value(), None);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_in_use_profile_conflicts(pool: PgPool) {
        let catalog = Catalog::new(pool.clone());
        let lpr = catalog.lprs().create(&lpr_request("eu-plates")).await.unwrap();
        let client = catalog
            .clients()
            .create(
                &ClientCreate::builder()
                    .ip("10.0.0.9".to_string())
                    .port(7000)
                    .auth_token("token".to_string())
                    .lpr_id(lpr.lpr.id)
                    .build(),
            )
            .await
            .unwrap();

        let err = catalog.lprs().delete(lpr.lpr.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let still_there = catalog.lprs().get(lpr.lpr.id).await.unwrap();
        assert_eq!(still_there.clients, vec![client.client]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_unused_profile(pool: PgPool) {
        let catalog = Catalog::new(pool.clone());
        let lpr = catalog.lprs().create(&lpr_request("spare")).await.unwrap();

        let snapshot = catalog.lprs().delete(lpr.lpr.id).await.unwrap();
        assert_eq!(snapshot, lpr);

        let mut conn = pool.acquire().await.unwrap();
        assert!(Lprs::new(&mut conn).get_by_id(lpr.lpr.id).await.unwrap().is_none());
        assert_eq!(catalog.lprs().get(lpr.lpr.id).await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_name_conflicts(pool: PgPool) {
        let lprs = Catalog::new(pool).lprs();
        lprs.create(&lpr_request("eu-plates")).await.unwrap();

        let err = lprs.create(&lpr_request("eu-plates")).await.unwrap_err();
        assert!(matches!(&err, Error::Conflict { operation, .. } if operation == "create LPR"));
        assert_eq!(lprs.list(&Pagination::default()).await.unwrap().len(), 1);
    }
}
