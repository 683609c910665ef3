//! Azure Client
//!
//! Main client for the Azure Resource Manager API, combining the bearer
//! token, the HTTP layer and the subscription/endpoint settings.

use super::auth::AzureCredentials;
use super::http::{ApiError, ArmHttpClient, ArmResponse};
use serde_json::Value;
use std::time::Duration;

/// Public-cloud management endpoint
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// API version of the `Microsoft.Sql` elastic pool operations
pub const SQL_API_VERSION: &str = "2015-05-01-preview";

/// Poll interval used when the server does not send `Retry-After`
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Main Azure client
#[derive(Clone, Debug)]
pub struct AzureClient {
    pub credentials: AzureCredentials,
    pub http: ArmHttpClient,
    pub subscription_id: String,
    pub endpoint: String,
    pub api_version: String,
    pub poll_interval: Duration,
}

impl AzureClient {
    /// Create a new client against the public cloud endpoint
    pub fn new(credentials: AzureCredentials, subscription_id: &str) -> Result<Self, ApiError> {
        Ok(Self {
            credentials,
            http: ArmHttpClient::new()?,
            subscription_id: subscription_id.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_version: SQL_API_VERSION.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Point the client at another endpoint (sovereign clouds, test servers)
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_version(mut self, api_version: &str) -> Self {
        self.api_version = api_version.to_string();
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Make a GET request
    pub async fn get(&self, url: &str) -> Result<ArmResponse, ApiError> {
        let token = self.credentials.get_token().await;
        self.http.get(url, &token).await
    }

    /// Make a PUT request
    pub async fn put(&self, url: &str, body: &Value) -> Result<ArmResponse, ApiError> {
        let token = self.credentials.get_token().await;
        self.http.put(url, &token, body).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str) -> Result<ArmResponse, ApiError> {
        let token = self.credentials.get_token().await;
        self.http.delete(url, &token).await
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// Build a subscription-scoped management URL
    pub fn subscription_url(&self, path: &str) -> String {
        format!(
            "{}/subscriptions/{}/{}",
            self.endpoint,
            urlencoding::encode(&self.subscription_id),
            path
        )
    }

    /// Build a `Microsoft.Sql` server-scoped URL
    pub fn sql_server_url(&self, resource_group: &str, server_name: &str, resource: &str) -> String {
        self.subscription_url(&format!(
            "resourceGroups/{}/providers/Microsoft.Sql/servers/{}/{}",
            urlencoding::encode(resource_group),
            urlencoding::encode(server_name),
            resource
        ))
    }

    /// Build the URL of one elastic pool, including the api-version query
    pub fn elastic_pool_url(&self, resource_group: &str, server_name: &str, name: &str) -> String {
        let url = self.sql_server_url(
            resource_group,
            server_name,
            &format!("elasticPools/{}", urlencoding::encode(name)),
        );
        format!("{}?api-version={}", url, self.api_version)
    }
}
