//! Persistence gateway for records kept by a remote REST backend.
//!
//! [`RecordGateway`] is the seam product code depends on; [`RestGateway`]
//! talks to a single resource collection over HTTP. Every call is one
//! request/response: no retries, no caching.

mod error;
mod rest;

use std::{future::Future, sync::Arc};

pub use error::{GatewayError, GatewayResult};
pub use rest::{GatewayConfig, REQUEST_ID_HEADER, RestGateway};

/// Backend-assigned record identity.
pub type RecordId = i64;

/// Opaque acknowledgement body returned by mutating calls.
pub type Payload = serde_json::Value;

pub trait RecordGateway<T>: Send + Sync {
    fn list(&self) -> impl Future<Output = GatewayResult<Vec<T>>> + Send;

    fn create(&self, record: &T) -> impl Future<Output = GatewayResult<Payload>> + Send;

    fn get_by_id(&self, id: RecordId) -> impl Future<Output = GatewayResult<T>> + Send;

    fn update(
        &self,
        id: RecordId,
        record: &T,
    ) -> impl Future<Output = GatewayResult<Payload>> + Send;

    fn delete(&self, id: RecordId) -> impl Future<Output = GatewayResult<Payload>> + Send;
}

impl<T, G> RecordGateway<T> for Arc<G>
where
    T: Sync,
    G: RecordGateway<T>,
{
    fn list(&self) -> impl Future<Output = GatewayResult<Vec<T>>> + Send {
        (**self).list()
    }

    fn create(&self, record: &T) -> impl Future<Output = GatewayResult<Payload>> + Send {
        (**self).create(record)
    }

    fn get_by_id(&self, id: RecordId) -> impl Future<Output = GatewayResult<T>> + Send {
        (**self).get_by_id(id)
    }

    fn update(
        &self,
        id: RecordId,
        record: &T,
    ) -> impl Future<Output = GatewayResult<Payload>> + Send {
        (**self).update(id, record)
    }

    fn delete(&self, id: RecordId) -> impl Future<Output = GatewayResult<Payload>> + Send {
        (**self).delete(id)
    }
}
