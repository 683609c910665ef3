//! Azure resource identifiers
//!
//! ARM ids are `/`-separated key/value pairs:
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/{ns}/{type}/{name}/...`

use std::collections::BTreeMap;
use std::fmt;

/// Why an id could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    #[error("cannot parse an empty resource id")]
    Empty,
    #[error("the number of path segments is not divisible by 2 in {0:?}")]
    OddSegments(String),
    #[error("key/value pair has an empty key or value in {0:?}")]
    EmptySegment(String),
    #[error("no subscription ID found in {0:?}")]
    MissingSubscription(String),
    #[error("no resource group name found in {0:?}")]
    MissingResourceGroup(String),
    #[error("no {key:?} segment found in {id:?}")]
    MissingSegment { key: &'static str, id: String },
}

/// A generic ARM id broken into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    pub subscription_id: String,
    pub resource_group: String,
    pub provider: Option<String>,
    pub path: BTreeMap<String, String>,
}

impl ResourceId {
    pub fn parse(id: &str) -> Result<Self, IdParseError> {
        let trimmed = id.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(IdParseError::Empty);
        }

        let components: Vec<&str> = trimmed.split('/').collect();
        if components.len() % 2 != 0 {
            return Err(IdParseError::OddSegments(id.to_string()));
        }

        let mut map = BTreeMap::new();
        for pair in components.chunks(2) {
            let (key, value) = (pair[0], pair[1]);
            if key.is_empty() || value.is_empty() {
                return Err(IdParseError::EmptySegment(id.to_string()));
            }
            map.insert(key.to_string(), value.to_string());
        }

        let subscription_id = map
            .remove("subscriptions")
            .ok_or_else(|| IdParseError::MissingSubscription(id.to_string()))?;

        // Some APIs hand back the lower-case spelling
        let resource_group = map
            .remove("resourceGroups")
            .or_else(|| map.remove("resourcegroups"))
            .ok_or_else(|| IdParseError::MissingResourceGroup(id.to_string()))?;

        let provider = map.remove("providers");

        Ok(Self {
            subscription_id,
            resource_group,
            provider,
            path: map,
        })
    }

    /// Take a required path segment
    fn segment(&self, key: &'static str, id: &str) -> Result<String, IdParseError> {
        self.path
            .get(key)
            .cloned()
            .ok_or_else(|| IdParseError::MissingSegment {
                key,
                id: id.to_string(),
            })
    }
}

/// Id of a SQL elastic pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElasticPoolId {
    pub subscription_id: String,
    pub resource_group: String,
    pub server_name: String,
    pub name: String,
}

impl ElasticPoolId {
    pub fn new(subscription_id: &str, resource_group: &str, server_name: &str, name: &str) -> Self {
        Self {
            subscription_id: subscription_id.to_string(),
            resource_group: resource_group.to_string(),
            server_name: server_name.to_string(),
            name: name.to_string(),
        }
    }

    /// Parse `.../servers/{server}/elasticPools/{name}`
    pub fn parse(id: &str) -> Result<Self, IdParseError> {
        let parsed = ResourceId::parse(id)?;
        Ok(Self {
            server_name: parsed.segment("servers", id)?,
            name: parsed.segment("elasticPools", id)?,
            subscription_id: parsed.subscription_id,
            resource_group: parsed.resource_group,
        })
    }
}

impl fmt::Display for ElasticPoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Sql/servers/{}/elasticPools/{}",
            self.subscription_id, self.resource_group, self.server_name, self.name
        )
    }
}
