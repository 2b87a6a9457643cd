//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with PostgreSQL.
//! It follows the Repository pattern to provide clean abstractions over database operations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │ Registries  │  (crate::registry - transactions & association rules)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries over one connection)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - database records)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │  PostgreSQL │
//! └─────────────┘
//! ```
//!
//! # Transactions
//!
//! Repositories borrow a `PgConnection` and never begin or commit anything themselves. Create
//! them from a transaction so that several repositories share one atomic unit:
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! let camera = Cameras::new(&mut tx).create(&request).await?;
//! Cameras::new(&mut tx).attach_settings(camera.id, &setting_ids).await?;
//! tx.commit().await?;
//! ```
//!
//! Dropping the transaction without committing rolls it back.
//!
//! # Migrations
//!
//! The schema lives in `migrations/` and is applied by [`crate::migrator`].

pub mod errors;
pub mod handlers;
pub mod models;
