//! Value types exchanged with upstream MCP servers.

use super::UpstreamError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::{collections::BTreeMap, fmt};
use tracing::warn;

/// Outbound HTTP headers for one upstream request, keyed by header name.
pub type UpstreamHeaders = BTreeMap<String, String>;

/// Connection target for one upstream server.
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamEndpoint {
    /// Streamable-HTTP endpoint URL.
    pub url: String,
    /// Headers sent with every request, usually credentials.
    pub headers: UpstreamHeaders,
}

impl UpstreamEndpoint {
    /// Creates an endpoint with credential headers.
    #[must_use]
    pub fn new(url: impl Into<String>, headers: UpstreamHeaders) -> Self {
        Self {
            url: url.into(),
            headers,
        }
    }

    /// Creates an endpoint that sends no extra headers.
    #[must_use]
    pub fn anonymous(url: impl Into<String>) -> Self {
        Self::new(url, UpstreamHeaders::new())
    }
}

impl fmt::Debug for UpstreamEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Header values carry credentials.
        f.debug_struct("UpstreamEndpoint")
            .field("url", &self.url)
            .field("header_names", &self.headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Tool descriptor as advertised by an upstream `tools/list` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamTool {
    /// Name understood by the upstream.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool arguments.
    pub input_schema: Value,
    /// Optional behavioural hints.
    pub annotations: Option<Value>,
}

impl UpstreamTool {
    /// Creates a descriptor with an empty object schema and no annotations.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: empty_object_schema(),
            annotations: None,
        }
    }

    /// Decodes one entry of a `tools/list` result.
    ///
    /// A missing or non-object schema becomes an empty object schema and
    /// non-object annotations are dropped; both cases are logged.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Protocol`] when the entry has no string name.
    pub fn from_wire(entry: &Value) -> Result<Self, UpstreamError> {
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| UpstreamError::Protocol("tool entry has no name".to_owned()))?;
        let description = entry
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let input_schema = match entry.get("inputSchema") {
            Some(schema @ Value::Object(_)) => schema.clone(),
            None | Some(Value::Null) => empty_object_schema(),
            Some(_) => {
                warn!(tool = name, "tool input schema is not an object; using empty schema");
                empty_object_schema()
            }
        };
        let annotations = match entry.get("annotations") {
            Some(value @ Value::Object(_)) => Some(value.clone()),
            None | Some(Value::Null) => None,
            Some(_) => {
                warn!(tool = name, "tool annotations are not an object; dropping them");
                None
            }
        };
        Ok(Self {
            name: name.to_owned(),
            description: description.to_owned(),
            input_schema,
            annotations,
        })
    }
}

/// Raw result of a `tools/call`, passed through verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallResult(pub Value);

impl ToolCallResult {
    /// Returns `true` when the upstream flagged the result as an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.0
            .get("isError")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Returns the underlying JSON document.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the result and returns the JSON document.
    #[must_use]
    pub fn into_inner(self) -> Value {
        self.0
    }
}

/// Capabilities and tools learned over one upstream connection.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredServer {
    /// Server capabilities from the handshake.
    pub capabilities: Value,
    /// Tools in upstream enumeration order.
    pub tools: Vec<UpstreamTool>,
}

/// Returns the schema used when a tool declares none.
#[must_use]
pub fn empty_object_schema() -> Value {
    json!({"type": "object"})
}
