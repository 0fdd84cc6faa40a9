use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

/// Selector string as handed to handlers. Clones share the same allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Selector(Arc<str>);

impl Selector {
    pub fn new(selector: impl AsRef<str>) -> Self {
        Self(Arc::from(selector.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Selector {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Selector {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Selector {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Selector {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl PartialEq<str> for Selector {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Selector {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl PartialEq<String> for Selector {
    fn eq(&self, other: &String) -> bool {
        &*self.0 == other.as_str()
    }
}

// Fallback conversions used by the default exception handler.
impl From<Selector> for String {
    fn from(value: Selector) -> Self {
        value.0.to_string()
    }
}

impl From<Selector> for serde_json::Value {
    fn from(value: Selector) -> Self {
        serde_json::Value::String(value.0.to_string())
    }
}

/// Traversal strategy selectable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Sequential,
    Concurrent,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Sequential
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Sequential => f.write_str("sequential"),
            Strategy::Concurrent => f.write_str("concurrent"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Strategy::Sequential),
            "concurrent" => Ok(Strategy::Concurrent),
            other => Err(format!(
                "unknown strategy '{}', expected 'sequential' or 'concurrent'",
                other
            )),
        }
    }
}
