//! Resource abstraction layer
//!
//! Declarative resources on top of the Azure client: an attribute bag, a
//! schema to validate it, and lifecycle operations that reconcile it with the
//! management API.
//!
//! # Architecture
//!
//! - [`data`] - The flat attribute bag passed to every operation
//! - [`schema`] - Field definitions and validators
//! - [`id`] - Composite ARM resource ids
//! - [`registry`] - Explicitly composed resource definitions
//! - [`elastic_pool`] - The `azurerm_sql_elasticpool` resource
//!
//! # Example
//!
//! ```ignore
//! use azsqlpool::resource::{ElasticPoolResource, ResourceData};
//! use azsqlpool::azure::elastic_pools::ElasticPoolsClient;
//!
//! async fn refresh(client: &ElasticPoolsClient, id: &str) -> anyhow::Result<ResourceData> {
//!     let mut data = ResourceData::new();
//!     data.set_id(id);
//!     ElasticPoolResource::new().read(&mut data, client).await?;
//!     Ok(data)
//! }
//! ```

pub mod data;
pub mod elastic_pool;
pub mod id;
pub mod registry;
pub mod schema;

pub use data::ResourceData;
pub use elastic_pool::{elastic_pool_definition, Edition, ElasticPoolResource, RESOURCE_TYPE};
pub use id::{ElasticPoolId, IdParseError, ResourceId};
pub use registry::{ResourceDefinition, ResourceRegistry};
