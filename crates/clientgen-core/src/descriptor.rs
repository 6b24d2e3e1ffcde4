//! Operation descriptors consumed by the generator.
//!
//! Descriptors are produced upstream (typically by an OpenAPI loader) and are
//! only read here. Every field a loader may leave out is an explicit
//! `Option` or defaults to empty; defaulting rules are applied when the
//! intermediate representation is built, never at render time.
//!
//! # Examples
//!
//! ```
//! use clientgen_core::descriptor::OperationSet;
//!
//! let set = OperationSet::parse_content(r#"
//! operations:
//!   - method: get
//!     path: /users/{id}
//!     path_parameters:
//!       - { name: id, type: string, required: true }
//!     responses:
//!       "200": UserResponse
//! "#).unwrap();
//! assert_eq!(set.operations.len(), 1);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tokio::fs;

use crate::Error;

/// HTTP verbs a generated function can call on the transport client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
}

impl HttpMethod {
    /// Lowercase token, which is also the transport client's method name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Patch => "patch",
            Self::Head => "head",
            Self::Options => "options",
            Self::Trace => "trace",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "put" => Ok(Self::Put),
            "post" => Ok(Self::Post),
            "delete" => Ok(Self::Delete),
            "patch" => Ok(Self::Patch),
            "head" => Ok(Self::Head),
            "options" => Ok(Self::Options),
            "trace" => Ok(Self::Trace),
            _ => Err(format!("Unknown HTTP method: {}", s)),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One parameter of an operation, as given by the upstream loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Raw identifier from the API description
    pub name: String,
    /// Primitive name (`string`, `integer`, ...) or a model type name
    #[serde(rename = "type", default = "default_parameter_type")]
    pub type_name: String,
    #[serde(default)]
    pub required: bool,
    /// Literal used for optional non-string parameters
    #[serde(default)]
    pub default: Option<JsonValue>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            required,
            default: None,
            description: None,
        }
    }

    pub fn with_default(mut self, default: JsonValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

fn default_parameter_type() -> String {
    "string".to_string()
}

/// One API operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    #[serde(default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
    /// Named payload type; absent means the operation has no body
    #[serde(default)]
    pub request_body: Option<String>,
    /// Status code to named response type
    #[serde(default)]
    pub responses: BTreeMap<String, String>,
    #[serde(default)]
    pub path_parameters: Vec<ParameterDescriptor>,
    #[serde(default)]
    pub query_parameters: Vec<ParameterDescriptor>,
    #[serde(default)]
    pub headers: Vec<ParameterDescriptor>,
}

impl OperationDescriptor {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: Some(method.into()),
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Human-readable identity used in reports
    pub fn identity(&self, index: usize) -> String {
        if let Some(id) = &self.operation_id {
            return id.clone();
        }
        match (&self.method, &self.path) {
            (Some(method), Some(path)) => format!("{} {}", method.to_uppercase(), path),
            (Some(method), None) => format!("#{} {}", index, method.to_uppercase()),
            (None, Some(path)) => format!("#{} {}", index, path),
            (None, None) => format!("#{}", index),
        }
    }

    /// Success response type: `"200"` wins over `"201"`
    pub fn success_response(&self) -> Option<&str> {
        self.responses
            .get("200")
            .or_else(|| self.responses.get("201"))
            .map(String::as_str)
    }

    /// The tag that decides which API group the operation belongs to
    pub fn primary_tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }
}

/// A batch of descriptors loaded from a JSON or YAML document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationSet {
    pub operations: Vec<OperationDescriptor>,
}

impl OperationSet {
    /// Load descriptors from a file (supports both YAML and JSON)
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        Self::parse_content(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse operations at {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Parse content as either JSON or YAML
    pub fn parse_content(content: &str) -> crate::Result<Self> {
        if let Ok(set) = serde_json::from_str(content) {
            return Ok(set);
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_method_parsing() {
        assert_eq!("GET".parse::<HttpMethod>(), Ok(HttpMethod::Get));
        assert_eq!(" patch ".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
        assert!("fetch".parse::<HttpMethod>().is_err());
        assert_eq!(HttpMethod::Delete.to_string(), "delete");
    }

    #[test]
    fn test_success_response_prefers_200() {
        let mut op = OperationDescriptor::new("post", "/users");
        assert_eq!(op.success_response(), None);
        op.responses.insert("201".into(), "Created".into());
        assert_eq!(op.success_response(), Some("Created"));
        op.responses.insert("200".into(), "Ok".into());
        assert_eq!(op.success_response(), Some("Ok"));
    }

    #[test]
    fn test_identity() {
        let mut op = OperationDescriptor::new("get", "/users");
        assert_eq!(op.identity(3), "GET /users");
        op.operation_id = Some("listUsers".into());
        assert_eq!(op.identity(3), "listUsers");
        assert_eq!(OperationDescriptor::default().identity(7), "#7");
    }

    #[test]
    fn test_parse_defaults_missing_fields() -> crate::Result<()> {
        let set = OperationSet::parse_content(
            r#"{"operations": [{"path": "/ping", "query_parameters": [{"name": "q"}]}]}"#,
        )?;
        let op = &set.operations[0];
        assert_eq!(op.method, None);
        assert!(op.responses.is_empty());
        assert_eq!(op.query_parameters[0].type_name, "string");
        assert!(!op.query_parameters[0].required);
        Ok(())
    }

    #[tokio::test]
    async fn test_from_file_yaml() -> crate::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("operations.yaml");
        tokio::fs::write(
            &path,
            "operations:\n  - method: post\n    path: /users\n    request_body: CreateUserRequest\n    responses:\n      \"201\": UserResponse\n",
        )
        .await?;

        let set = OperationSet::from_file(&path).await?;
        assert_eq!(set.operations.len(), 1);
        assert_eq!(
            set.operations[0].request_body.as_deref(),
            Some("CreateUserRequest")
        );
        assert_eq!(set.operations[0].success_response(), Some("UserResponse"));
        Ok(())
    }
}
