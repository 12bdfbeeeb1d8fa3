//! Terraform output values

use crate::error::{Result, TerraformError};
use async_trait::async_trait;
use bbl_core::State;
use serde_json::Value;
use std::collections::BTreeMap;

/// Output variables of the last apply, keyed by output name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outputs {
    values: BTreeMap<String, Value>,
}

impl Outputs {
    pub fn new(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }

    /// Parse `terraform output -json`
    ///
    /// Each entry looks like `{"sensitive": false, "type": "string", "value": ...}`.
    pub fn from_terraform_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }

        let raw: BTreeMap<String, Value> =
            serde_json::from_str(json).map_err(|e| TerraformError::OutputParse(e.to_string()))?;

        let values = raw
            .into_iter()
            .map(|(key, entry)| {
                let value = match entry {
                    Value::Object(mut map) => map.remove("value").unwrap_or(Value::Null),
                    other => other,
                };
                (key, value)
            })
            .collect();

        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// String value of `key`, or `""` when absent or not a string
    pub fn get_string(&self, key: &str) -> String {
        self.values
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// List-of-strings value of `key`, empty when absent
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        self.values
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }
}

/// Anything that can resolve the terraform outputs for a state
#[async_trait]
pub trait OutputsProvider: Send + Sync {
    async fn get_outputs(&self, state: &State) -> Result<Outputs>;
}
