//! SQL Elastic Pool resource
//!
//! Translates the `azurerm_sql_elasticpool` attribute set into elastic pool
//! API calls and writes the server's view back into [`ResourceData`].
//!
//! Update has no patch path: the API's create-or-update is a full upsert, so
//! update runs the create flow with the merged attributes.

use super::data::ResourceData;
use super::id::ElasticPoolId;
use super::registry::ResourceDefinition;
use super::schema::{
    location_schema, normalize_location, resource_group_name_schema, tags_schema, FieldSchema,
    Schema, ValidationError, Validator,
};
use crate::azure::elastic_pools::{ElasticPool, ElasticPoolProperties, ElasticPoolsApi};
use crate::azure::http::ApiError;
use crate::error::{Operation, ResourceError, ResourceResult};
use chrono::{DateTime, SecondsFormat};
use std::fmt;
use std::str::FromStr;

pub const RESOURCE_TYPE: &str = "azurerm_sql_elasticpool";

/// Pricing tier of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edition {
    Basic,
    Standard,
    Premium,
}

impl Edition {
    pub const NAMES: &'static [&'static str] = &["Basic", "Standard", "Premium"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Edition::Basic => "Basic",
            Edition::Standard => "Standard",
            Edition::Premium => "Premium",
        }
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Edition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Basic" => Ok(Edition::Basic),
            "Standard" => Ok(Edition::Standard),
            "Premium" => Ok(Edition::Premium),
            other => Err(format!("expected one of {:?}, got {:?}", Edition::NAMES, other)),
        }
    }
}

/// Definition of `azurerm_sql_elasticpool` for a [`ResourceRegistry`](super::ResourceRegistry)
pub fn elastic_pool_definition() -> ResourceDefinition {
    ResourceDefinition {
        type_name: RESOURCE_TYPE,
        schema: elastic_pool_schema(),
        importable: true,
    }
}

fn elastic_pool_schema() -> Schema {
    Schema::new(vec![
        FieldSchema::string("name").required().force_new(),
        location_schema(),
        resource_group_name_schema(),
        FieldSchema::string("server_name").required().force_new(),
        FieldSchema::string("edition")
            .required()
            .force_new()
            .validate_with(Validator::StringInSlice {
                valid: Edition::NAMES,
                ignore_case: false,
            }),
        FieldSchema::int("dtu").required(),
        FieldSchema::int("db_dtu_min").optional().computed(),
        FieldSchema::int("db_dtu_max").optional().computed(),
        FieldSchema::int("pool_size").optional().computed(),
        FieldSchema::string("creation_date").computed(),
        tags_schema(),
    ])
}

/// Lifecycle operations for SQL elastic pools
#[derive(Debug, Clone)]
pub struct ElasticPoolResource {
    definition: ResourceDefinition,
}

impl Default for ElasticPoolResource {
    fn default() -> Self {
        Self::new()
    }
}

impl ElasticPoolResource {
    pub fn new() -> Self {
        Self {
            definition: elastic_pool_definition(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.definition.schema
    }

    /// Check the attributes against the schema; no network access
    pub fn validate(&self, d: &ResourceData) -> ResourceResult<()> {
        self.schema().validate(d).map_err(ResourceError::Validation)
    }

    pub async fn create(&self, d: &mut ResourceData, client: &dyn ElasticPoolsApi) -> ResourceResult<()> {
        self.create_or_update(d, client, Operation::Create).await
    }

    /// Re-apply the attributes to the pool named by the id in `d`
    pub async fn update(&self, d: &mut ResourceData, client: &dyn ElasticPoolsApi) -> ResourceResult<()> {
        if d.has_id() {
            let id = parse_id(d.id(), Operation::Update)?;
            merge_id_fields(d, &id)?;
        }
        self.create_or_update(d, client, Operation::Update).await
    }

    async fn create_or_update(
        &self,
        d: &mut ResourceData,
        client: &dyn ElasticPoolsApi,
        operation: Operation,
    ) -> ResourceResult<()> {
        tracing::info!("Preparing arguments for SQL elastic pool {}", operation);

        self.validate(d)?;

        let name = required_str(d, "name")?;
        let server_name = required_str(d, "server_name")?;
        let location = required_str(d, "location")?;
        let resource_group = required_str(d, "resource_group_name")?;

        let pool = ElasticPool {
            name: Some(name.clone()),
            location: Some(location),
            tags: Some(d.get_string_map("tags")),
            properties: Some(expand_properties(d)?),
            ..Default::default()
        };

        let api_err = |source: ApiError| ResourceError::Api {
            operation,
            name: name.clone(),
            source,
        };

        let pending = client
            .create_or_update(&resource_group, &server_name, &name, &pool)
            .await
            .map_err(api_err)?;

        client.wait_for_completion(&pending).await.map_err(api_err)?;

        let read = client
            .get(&resource_group, &server_name, &name)
            .await
            .map_err(api_err)?;

        let Some(id) = read.id.filter(|id| !id.is_empty()) else {
            return Err(ResourceError::MissingId {
                name,
                resource_group,
            });
        };

        tracing::info!("SQL elastic pool {} is {}", name, id);
        d.set_id(id);

        self.read(d, client).await
    }

    /// Refresh `d` from the server. A pool that no longer exists clears the id.
    pub async fn read(&self, d: &mut ResourceData, client: &dyn ElasticPoolsApi) -> ResourceResult<()> {
        let id = parse_id(d.id(), Operation::Read)?;

        let pool = match client.get(&id.resource_group, &id.server_name, &id.name).await {
            Ok(pool) => pool,
            Err(e) if e.is_not_found() => {
                tracing::warn!(
                    "SQL elastic pool {} not found, removing from state",
                    d.id()
                );
                d.clear_id();
                return Ok(());
            }
            Err(source) => {
                return Err(ResourceError::Api {
                    operation: Operation::Read,
                    name: id.name,
                    source,
                })
            }
        };

        flatten_pool(d, &id, pool);
        Ok(())
    }

    /// Issue a delete and forget the id. Completion is not awaited.
    pub async fn delete(&self, d: &mut ResourceData, client: &dyn ElasticPoolsApi) -> ResourceResult<()> {
        let id = parse_id(d.id(), Operation::Delete)?;

        tracing::info!("Deleting SQL elastic pool {}", d.id());

        client
            .delete(&id.resource_group, &id.server_name, &id.name)
            .await
            .map_err(|source| ResourceError::Api {
                operation: Operation::Delete,
                name: id.name.clone(),
                source,
            })?;

        d.clear_id();
        Ok(())
    }

    /// Adopt an existing pool by id
    pub async fn import(&self, id: &str, client: &dyn ElasticPoolsApi) -> ResourceResult<ResourceData> {
        parse_id(id, Operation::Import)?;

        let mut d = ResourceData::new();
        d.set_id(id);
        self.read(&mut d, client).await?;

        if !d.has_id() {
            return Err(ResourceError::NotFound { id: id.to_string() });
        }

        Ok(d)
    }
}

fn parse_id(id: &str, operation: Operation) -> ResourceResult<ElasticPoolId> {
    ElasticPoolId::parse(id).map_err(|source| ResourceError::InvalidId {
        id: id.to_string(),
        operation,
        source,
    })
}

/// Fill the addressing attributes from `id`. These are force-new, so a value
/// that names a different pool is rejected.
fn merge_id_fields(d: &mut ResourceData, id: &ElasticPoolId) -> ResourceResult<()> {
    let mut errors = Vec::new();

    for (key, from_id) in [
        ("name", &id.name),
        ("server_name", &id.server_name),
        ("resource_group_name", &id.resource_group),
    ] {
        match d.get_str(key).map(str::to_string) {
            None => d.set(key, from_id.as_str()),
            Some(value) if value.eq_ignore_ascii_case(from_id) => {}
            Some(value) => errors.push(ValidationError::new(
                key,
                format!("{:?} does not match {:?} from id {}", value, from_id, id),
            )),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ResourceError::Validation(errors))
    }
}

fn required_str(d: &ResourceData, key: &str) -> ResourceResult<String> {
    d.get_str(key).map(str::to_string).ok_or_else(|| {
        ResourceError::Validation(vec![ValidationError::new(key, "required attribute is missing")])
    })
}

/// Request properties; optional sizing is sent only when set
fn expand_properties(d: &ResourceData) -> ResourceResult<ElasticPoolProperties> {
    let edition: Edition = required_str(d, "edition")?
        .parse()
        .map_err(|msg: String| ResourceError::Validation(vec![ValidationError::new("edition", msg)]))?;

    let dtu = d.get_i32("dtu").ok_or_else(|| {
        ResourceError::Validation(vec![ValidationError::new("dtu", "required attribute is missing")])
    })?;

    Ok(ElasticPoolProperties {
        edition: Some(edition.to_string()),
        dtu: Some(dtu),
        database_dtu_min: d.get_i32("db_dtu_min"),
        database_dtu_max: d.get_i32("db_dtu_max"),
        storage_mb: d.get_i32("pool_size"),
        ..Default::default()
    })
}

/// Write the server's view into `d`. Absent fields are skipped.
fn flatten_pool(d: &mut ResourceData, id: &ElasticPoolId, pool: ElasticPool) {
    d.set("name", pool.name.unwrap_or_else(|| id.name.clone()));
    d.set("resource_group_name", id.resource_group.clone());
    d.set_opt("location", pool.location.as_deref().map(normalize_location));
    d.set("server_name", id.server_name.clone());

    if let Some(props) = pool.properties {
        d.set_opt("edition", props.edition);
        d.set_opt("dtu", props.dtu);
        d.set_opt("db_dtu_min", props.database_dtu_min);
        d.set_opt("db_dtu_max", props.database_dtu_max);
        d.set_opt("pool_size", props.storage_mb);
        d.set_opt(
            "creation_date",
            props
                .creation_date
                .and_then(|raw| format_creation_date(&raw)),
        );
    }

    d.set_string_map("tags", &pool.tags.unwrap_or_default());
}

/// RFC 3339 at seconds precision; unparseable dates are dropped
fn format_creation_date(raw: &str) -> Option<String> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(date) => Some(date.to_rfc3339_opts(SecondsFormat::Secs, true)),
        Err(e) => {
            tracing::warn!("Ignoring creationDate {:?}: {}", raw, e);
            None
        }
    }
}
