//! Infrastructure provider selection

use crate::error::StateError;
use serde::{Deserialize, Deserializer, Serializer};
use std::str::FromStr;

/// The infrastructure an environment lives on
///
/// Resolved once when the CLI starts; every IaaS-specific component is
/// picked by matching on this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Iaas {
    Aws,
    Gcp,
    Azure,
}

impl Iaas {
    pub fn as_str(&self) -> &'static str {
        match self {
            Iaas::Aws => "aws",
            Iaas::Gcp => "gcp",
            Iaas::Azure => "azure",
        }
    }
}

impl std::fmt::Display for Iaas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Iaas {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aws" => Ok(Iaas::Aws),
            "gcp" => Ok(Iaas::Gcp),
            "azure" => Ok(Iaas::Azure),
            other => Err(StateError::UnknownIaas(other.to_string())),
        }
    }
}

/// Serde adapter keeping the historical `"iaas": ""` encoding for an unset
/// provider.
pub(crate) mod optional {
    use super::*;

    pub fn serialize<S>(value: &Option<Iaas>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.map(|i| i.as_str()).unwrap_or(""))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Iaas>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(serde::de::Error::custom)
    }
}
