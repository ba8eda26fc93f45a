//! Per-product version record and its JSON shape.

use crate::error::LedgerError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key holding the build number
pub const BUILD_NUMBER_KEY: &str = "buildNumber";
/// Key holding the last synchronized upstream commit
pub const COMMIT_KEY: &str = "commit";
/// Key holding the last recorded tracked branch
pub const BRANCH_KEY: &str = "branch";

/// Mapping from product name to its record, in file order
pub type Ledger = IndexMap<String, VersionRecord>;

/// Build provenance of one product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    /// Last issued build number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_number: Option<u64>,
    /// Upstream commit hash last synchronized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    /// Tracked branch last recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Keys this tool does not interpret, kept verbatim
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl VersionRecord {
    /// True when no attribute has been recorded
    pub fn is_empty(&self) -> bool {
        self.build_number.is_none()
            && self.commit.is_none()
            && self.branch.is_none()
            && self.extra.is_empty()
    }

    /// Current value stored under `key`
    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            BUILD_NUMBER_KEY => self.build_number.map(Value::from),
            COMMIT_KEY => self.commit.clone().map(Value::String),
            BRANCH_KEY => self.branch.clone().map(Value::String),
            other => self.extra.get(other).cloned(),
        }
    }

    /// Store `value` under `key`, checking the shape of known keys
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), LedgerError> {
        match key {
            BUILD_NUMBER_KEY => {
                let number = value
                    .as_u64()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| invalid(key, &value, "expected a positive integer"))?;
                self.build_number = Some(number);
            }
            COMMIT_KEY | BRANCH_KEY => {
                let text = value
                    .as_str()
                    .ok_or_else(|| invalid(key, &value, "expected a string"))?
                    .to_string();
                if key == COMMIT_KEY {
                    self.commit = Some(text);
                } else {
                    self.branch = Some(text);
                }
            }
            other => {
                if other.is_empty() {
                    return Err(invalid(other, &value, "attribute key must not be empty"));
                }
                self.extra.insert(other.to_string(), value);
            }
        }
        Ok(())
    }
}

fn invalid(key: &str, value: &Value, reason: &str) -> LedgerError {
    LedgerError::InvalidAttribute {
        key: key.to_string(),
        reason: format!("{} (got {})", reason, value),
    }
}
