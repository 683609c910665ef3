//! Declarative resource adapter for Azure SQL elastic pools.
//!
//! [`resource::ElasticPoolResource`] implements create, read, update, delete
//! and import for `azurerm_sql_elasticpool` on top of the
//! [`azure::elastic_pools::ElasticPoolsApi`] trait, whose ARM implementation
//! lives in [`azure`].

pub mod azure;
pub mod config;
pub mod error;
pub mod resource;

pub use error::{Operation, ResourceError, ResourceResult};
