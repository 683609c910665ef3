//! SQL Elastic Pools
//!
//! Wire models and the four management operations the elastic pool
//! resource needs. The operations sit behind [`ElasticPoolsApi`] so the
//! resource adapter can be driven against a fake in tests.

use super::client::AzureClient;
use super::http::ApiError;
use super::operation::LongRunningOperation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An elastic pool as exchanged with the management API
///
/// Every field is optional on the way in: a partial response must not fail
/// to decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElasticPool {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "type")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ElasticPoolProperties>,
}

/// `properties` block of an elastic pool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElasticPoolProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtu: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_dtu_min: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_dtu_max: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "storageMB")]
    pub storage_mb: Option<i32>,
    /// Read-only, RFC 3339 as sent by the server
    #[serde(default, skip_serializing)]
    pub creation_date: Option<String>,
    /// Read-only
    #[serde(default, skip_serializing)]
    pub state: Option<String>,
}

/// Management operations on elastic pools, addressed by
/// (resource group, server, pool name)
#[async_trait]
pub trait ElasticPoolsApi: Send + Sync {
    /// Start a create-or-update (PUT). The returned handle may still be running.
    async fn create_or_update(
        &self,
        resource_group: &str,
        server_name: &str,
        name: &str,
        pool: &ElasticPool,
    ) -> Result<LongRunningOperation, ApiError>;

    /// Block until a handle from [`create_or_update`](Self::create_or_update) is terminal
    async fn wait_for_completion(&self, operation: &LongRunningOperation) -> Result<(), ApiError>;

    async fn get(
        &self,
        resource_group: &str,
        server_name: &str,
        name: &str,
    ) -> Result<ElasticPool, ApiError>;

    /// Issue a delete. Completion of the deletion is not awaited.
    async fn delete(&self, resource_group: &str, server_name: &str, name: &str)
        -> Result<(), ApiError>;
}

/// [`ElasticPoolsApi`] over the ARM REST API
#[derive(Clone, Debug)]
pub struct ElasticPoolsClient {
    client: AzureClient,
}

impl ElasticPoolsClient {
    pub fn new(client: AzureClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ElasticPoolsApi for ElasticPoolsClient {
    async fn create_or_update(
        &self,
        resource_group: &str,
        server_name: &str,
        name: &str,
        pool: &ElasticPool,
    ) -> Result<LongRunningOperation, ApiError> {
        let url = self.client.elastic_pool_url(resource_group, server_name, name);
        let body = serde_json::to_value(pool)?;
        let response = self.client.put(&url, &body).await?;
        LongRunningOperation::from_response(&response)
    }

    async fn wait_for_completion(&self, operation: &LongRunningOperation) -> Result<(), ApiError> {
        operation.wait(&self.client).await
    }

    async fn get(
        &self,
        resource_group: &str,
        server_name: &str,
        name: &str,
    ) -> Result<ElasticPool, ApiError> {
        let url = self.client.elastic_pool_url(resource_group, server_name, name);
        let response = self.client.get(&url).await?;
        Ok(serde_json::from_value(response.body)?)
    }

    async fn delete(
        &self,
        resource_group: &str,
        server_name: &str,
        name: &str,
    ) -> Result<(), ApiError> {
        let url = self.client.elastic_pool_url(resource_group, server_name, name);
        let response = self.client.delete(&url).await?;
        tracing::debug!("Delete of elastic pool {} answered {}", name, response.status);
        Ok(())
    }
}
