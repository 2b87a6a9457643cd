//! The repository trait shared by the catalog tables that support the full create, read, update
//! and delete cycle.
//!
//! Buildings, gates and clients only need a subset of it and keep inherent methods instead.

use crate::{db::errors::Result, types::Pagination};

/// CRUD over one table through a borrowed connection.
///
/// Implementors hold `&mut PgConnection`, so the same repository works over a pool connection or
/// inside a registry transaction.
#[async_trait::async_trait]
pub trait Repository {
    type CreateRequest;
    type UpdateRequest;
    type Response;
    type Id: Send + Sync;

    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// One page of rows in id order
    async fn list(&mut self, page: &Pagination) -> Result<Vec<Self::Response>>;

    /// Delete a row together with the association rows it owns. `false` if nothing was deleted.
    async fn delete(&mut self, id: Self::Id) -> Result<bool>;

    /// Apply the fields present in the request. Fails with `NotFound` for an unknown id.
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response>;
}
