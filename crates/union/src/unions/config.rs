//! Union declaration options

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Options accepted when declaring a union relation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnionOptions {
    /// Member whose related type is reported through reflection.
    /// Ignored when it is not one of the union's members.
    pub default: Option<String>,

    /// Fail single-record reads with `AmbiguousSingle` when more than one
    /// member holds a value, instead of returning the first one.
    pub strict_single: bool,
}

impl UnionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the representative member
    pub fn with_default(mut self, member: &str) -> Self {
        self.default = Some(member.to_string());
        self
    }

    pub fn with_strict_single(mut self, strict: bool) -> Self {
        self.strict_single = strict;
        self
    }

    /// Parse options from a JSON document
    pub fn from_json(json: &str) -> ModelResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            ModelError::Configuration(format!("invalid union options: {}", e))
        })
    }
}
