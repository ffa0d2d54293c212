//! Typed access to tool call arguments.

use crate::error::SwiftAgentError;

/// Wrapper around tool call arguments providing typed extraction.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Get the raw JSON value.
    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, SwiftAgentError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                SwiftAgentError::InvalidArgument(format!("Missing string argument: {key}"))
            })
    }

    /// Get an integer argument.
    pub fn get_i64(&self, key: &str) -> Result<i64, SwiftAgentError> {
        self.value
            .get(key)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| {
                SwiftAgentError::InvalidArgument(format!("Missing integer argument: {key}"))
            })
    }

    /// Get a float argument.
    pub fn get_f64(&self, key: &str) -> Result<f64, SwiftAgentError> {
        self.value
            .get(key)
            .and_then(|v| v.as_f64())
            .ok_or_else(|| {
                SwiftAgentError::InvalidArgument(format!("Missing float argument: {key}"))
            })
    }

    /// Get a boolean argument.
    pub fn get_bool(&self, key: &str) -> Result<bool, SwiftAgentError> {
        self.value
            .get(key)
            .and_then(|v| v.as_bool())
            .ok_or_else(|| {
                SwiftAgentError::InvalidArgument(format!("Missing boolean argument: {key}"))
            })
    }

    /// Deserialize the entire arguments into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, SwiftAgentError> {
        let value = match &self.value {
            serde_json::Value::String(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    serde_json::json!({})
                } else {
                    serde_json::from_str::<serde_json::Value>(trimmed).map_err(|e| {
                        SwiftAgentError::InvalidArgument(format!(
                            "Failed to deserialize arguments: {e}"
                        ))
                    })?
                }
            }
            other => other.clone(),
        };
        serde_json::from_value(value).map_err(|e| {
            SwiftAgentError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }
}
