//! Resource schemas
//!
//! A [`Schema`] lists the attributes a resource accepts, their types, whether
//! they are required, computed or force replacement, and the validators that
//! run before any API call is made.

use super::data::ResourceData;
use serde_json::Value;
use std::fmt;

/// Azure allows at most this many tags per resource
pub const MAX_TAG_COUNT: usize = 15;
pub const MAX_TAG_KEY_LENGTH: usize = 512;
pub const MAX_TAG_VALUE_LENGTH: usize = 256;
pub const MAX_RESOURCE_GROUP_NAME_LENGTH: usize = 90;

/// Attribute type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Int,
    /// Map of string to string
    Map,
}

impl FieldKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Int => value
                .as_i64()
                .map(|v| i32::try_from(v).is_ok())
                .unwrap_or(false),
            FieldKind::Map => value
                .as_object()
                .map(|obj| obj.values().all(Value::is_string))
                .unwrap_or(false),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            FieldKind::String => "a string",
            FieldKind::Int => "a 32-bit integer",
            FieldKind::Map => "a map of strings",
        }
    }
}

/// Check run against a present attribute value
#[derive(Debug, Clone, Copy)]
pub enum Validator {
    /// Value must be one of the listed strings
    StringInSlice {
        valid: &'static [&'static str],
        ignore_case: bool,
    },
    Func(fn(&Value) -> Result<(), String>),
}

impl Validator {
    fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Validator::StringInSlice { valid, ignore_case } => {
                let Some(s) = value.as_str() else {
                    return Err("expected a string".to_string());
                };
                let found = valid.iter().any(|v| {
                    if *ignore_case {
                        v.eq_ignore_ascii_case(s)
                    } else {
                        *v == s
                    }
                });
                if found {
                    Ok(())
                } else {
                    Err(format!("expected one of {:?}, got {:?}", valid, s))
                }
            }
            Validator::Func(f) => f(value),
        }
    }
}

/// One attribute definition
#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    /// Changing the value replaces the resource
    pub force_new: bool,
    pub validator: Option<Validator>,
}

impl FieldSchema {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            validator: None,
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn int(name: &'static str) -> Self {
        Self::new(name, FieldKind::Int)
    }

    pub fn map(name: &'static str) -> Self {
        Self::new(name, FieldKind::Map)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn validate_with(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }
}

/// A single failed check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Attribute definitions of one resource type
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldSchema>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSchema>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Attributes whose change forces a new resource
    pub fn force_new_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter(|f| f.force_new).map(|f| f.name)
    }

    /// Check every attribute of `data`, collecting all failures
    pub fn validate(&self, data: &ResourceData) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for key in data.attributes().keys() {
            if self.field(key).is_none() {
                errors.push(ValidationError::new(key, "unknown attribute"));
            }
        }

        for field in &self.fields {
            let Some(value) = data.get(field.name) else {
                if field.required {
                    errors.push(ValidationError::new(field.name, "required attribute is missing"));
                }
                continue;
            };

            if !field.kind.matches(value) {
                errors.push(ValidationError::new(
                    field.name,
                    format!("expected {}", field.kind.describe()),
                ));
                continue;
            }

            if let Some(validator) = &field.validator {
                if let Err(message) = validator.check(value) {
                    errors.push(ValidationError::new(field.name, message));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// =============================================================================
// Shared field definitions
// =============================================================================

pub fn location_schema() -> FieldSchema {
    FieldSchema::string("location")
        .required()
        .force_new()
        .validate_with(Validator::Func(validate_location))
}

pub fn resource_group_name_schema() -> FieldSchema {
    FieldSchema::string("resource_group_name")
        .required()
        .force_new()
        .validate_with(Validator::Func(validate_resource_group_name))
}

pub fn tags_schema() -> FieldSchema {
    FieldSchema::map("tags")
        .optional()
        .computed()
        .validate_with(Validator::Func(validate_tags))
}

/// Canonical form of an Azure location: lower case, no spaces
/// ("West US" -> "westus")
pub fn normalize_location(location: &str) -> String {
    location
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn validate_location(value: &Value) -> Result<(), String> {
    match value.as_str() {
        Some(s) if !normalize_location(s).is_empty() => Ok(()),
        _ => Err("location must not be empty".to_string()),
    }
}

/// Resource group names: 1-90 chars of letters, digits, `-`, `_`, `.`, `(`, `)`,
/// not ending with a period
pub fn validate_resource_group_name(value: &Value) -> Result<(), String> {
    let Some(name) = value.as_str() else {
        return Err("expected a string".to_string());
    };

    if name.is_empty() {
        return Err("resource group name must not be empty".to_string());
    }

    if name.chars().count() > MAX_RESOURCE_GROUP_NAME_LENGTH {
        return Err(format!(
            "resource group name may not exceed {} characters",
            MAX_RESOURCE_GROUP_NAME_LENGTH
        ));
    }

    if name.ends_with('.') {
        return Err("resource group name cannot end with a period".to_string());
    }

    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '(' | ')'))
    {
        return Err(
            "resource group name may only contain alphanumeric characters, dash, underscores, parentheses and periods"
                .to_string(),
        );
    }

    Ok(())
}

pub fn validate_tags(value: &Value) -> Result<(), String> {
    let Some(tags) = value.as_object() else {
        return Err("expected a map of strings".to_string());
    };

    if tags.len() > MAX_TAG_COUNT {
        return Err(format!(
            "a maximum of {} tags can be applied to each ARM resource",
            MAX_TAG_COUNT
        ));
    }

    for (key, value) in tags {
        if key.chars().count() > MAX_TAG_KEY_LENGTH {
            return Err(format!(
                "the maximum length for a tag key is {} characters: {:?}",
                MAX_TAG_KEY_LENGTH, key
            ));
        }
        let value_len = value.as_str().map(|s| s.chars().count()).unwrap_or(0);
        if value_len > MAX_TAG_VALUE_LENGTH {
            return Err(format!(
                "the maximum length for a tag value is {} characters: value for {:?}",
                MAX_TAG_VALUE_LENGTH, key
            ));
        }
    }

    Ok(())
}
