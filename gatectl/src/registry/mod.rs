//! Registries: the transactional operations exposed to the layer above the catalog.
//!
//! Every registry operation runs in exactly one transaction. Validation reads, row writes and
//! association writes all go through that transaction, which is committed once at the end.
//! Returning early with an error drops the transaction, and SQLx rolls it back on drop, so a
//! failed operation leaves the store exactly as it found it.
//!
//! Registries are cheap handles over the shared pool and are obtained from a [`Catalog`]:
//!
//! ```ignore
//! let catalog = Catalog::connect(&config).await?;
//! let camera = catalog.cameras().create(&request).await?;
//! catalog.close().await;
//! ```

pub mod buildings;
pub mod camera_settings;
pub mod cameras;
pub mod clients;
pub mod gates;
pub mod lprs;
pub mod models;

pub use buildings::BuildingDirectory;
pub use camera_settings::CameraSettingRegistry;
pub use cameras::CameraRegistry;
pub use clients::ClientRegistry;
pub use gates::GateDirectory;
pub use lprs::LprRegistry;

use crate::{config::Config, errors::Error};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::collections::HashSet;
use tracing::info;

/// Explicitly constructed handle to the catalog store.
///
/// Owns the connection pool; every registry borrows a clone of it. Create one at process start
/// and [`close`](Catalog::close) it on shutdown.
#[derive(Debug, Clone)]
pub struct Catalog {
    pool: PgPool,
}

impl Catalog {
    /// Wrap an existing pool, e.g. the one handed out by `#[sqlx::test]`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open the pool described by the configuration and apply migrations if enabled.
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let settings = &config.database.pool;
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.acquire_timeout())
            .idle_timeout(settings.idle_timeout())
            .max_lifetime(settings.max_lifetime())
            .connect(&config.database.url)
            .await?;

        if config.run_migrations {
            info!("Running database migrations...");
            crate::migrator().run(&pool).await?;
        }

        info!(
            "Catalog connected (max_connections={}, min_connections={})",
            settings.max_connections, settings.min_connections
        );
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn buildings(&self) -> BuildingDirectory {
        BuildingDirectory::new(self.pool.clone())
    }

    pub fn gates(&self) -> GateDirectory {
        GateDirectory::new(self.pool.clone())
    }

    pub fn camera_settings(&self) -> CameraSettingRegistry {
        CameraSettingRegistry::new(self.pool.clone())
    }

    pub fn cameras(&self) -> CameraRegistry {
        CameraRegistry::new(self.pool.clone())
    }

    pub fn lprs(&self) -> LprRegistry {
        LprRegistry::new(self.pool.clone())
    }

    pub fn clients(&self) -> ClientRegistry {
        ClientRegistry::new(self.pool.clone())
    }

    /// Close the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        info!("Closing catalog connection pool");
        self.pool.close().await;
    }
}

/// Ids from `requested` that are absent from `resolved`, in ascending order.
pub(crate) fn missing_ids(requested: &[i64], resolved: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let resolved: HashSet<i64> = resolved.into_iter().collect();
    let mut missing: Vec<i64> = requested.iter().copied().filter(|id| !resolved.contains(id)).collect();
    missing.sort_unstable();
    missing.dedup();
    missing
}

/// Commit a registry transaction. A rejection at commit time is a conflict like any other
/// rejected write.
pub(crate) async fn commit(tx: sqlx::Transaction<'_, sqlx::Postgres>, operation: &'static str) -> Result<(), Error> {
    tx.commit().await.map_err(|e| Error::on_write(operation)(e.into()))
}
