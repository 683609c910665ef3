//! Azure API interaction module
//!
//! This module provides the pieces needed to talk to the Azure Resource
//! Manager API for SQL elastic pools.
//!
//! # Module Structure
//!
//! - [`auth`] - Bearer token holder
//! - [`client`] - Main client: endpoint, subscription, URL builders
//! - [`http`] - HTTP utilities and the [`ApiError`](http::ApiError) type
//! - [`operation`] - Long-running operation polling
//! - [`elastic_pools`] - Elastic pool wire models and operations
//!
//! # Example
//!
//! ```ignore
//! use azsqlpool::azure::{auth::AzureCredentials, client::AzureClient};
//! use azsqlpool::azure::elastic_pools::{ElasticPoolsApi, ElasticPoolsClient};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = AzureClient::new(AzureCredentials::from_token("..."), "my-subscription")?;
//!     let pools = ElasticPoolsClient::new(client);
//!     let pool = pools.get("rg1", "srv1", "pool1").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod elastic_pools;
pub mod http;
pub mod operation;
