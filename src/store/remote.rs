use uuid::Uuid;

use crate::error::RemoteError;
use crate::models::{Entity, ListQuery, Page};

/// The authoritative store for one entity kind.
///
/// Implemented over HTTP by [`crate::client::HttpRemote`]; tests substitute
/// in-memory fakes. Every method is a suspension point.
#[allow(async_fn_in_trait)]
pub trait Remote<E: Entity> {
    /// Reads one page. Bare-array responses are normalized into a [`Page`].
    async fn list(&self, query: &ListQuery) -> Result<Page<E>, RemoteError>;

    async fn get(&self, id: Uuid) -> Result<E, RemoteError>;

    /// Creates an entity; the server assigns its id.
    async fn create(&self, input: &E::Create) -> Result<E, RemoteError>;

    async fn update(&self, id: Uuid, input: &E::Update) -> Result<E, RemoteError>;

    async fn delete(&self, id: Uuid) -> Result<(), RemoteError>;
}
