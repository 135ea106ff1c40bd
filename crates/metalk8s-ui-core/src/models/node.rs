use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A node object exactly as the orchestration API returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Node(pub Value);

impl Node {
    /// `metadata.name`, or a top-level `name` for flattened objects.
    pub fn name(&self) -> Option<&str> {
        self.0
            .pointer("/metadata/name")
            .or_else(|| self.0.get("name"))
            .and_then(Value::as_str)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_json(self) -> Value {
        self.0
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// `v1.NodeList` envelope. Only `items` is read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeList {
    // Go servers encode an empty slice as `null`
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<Node>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Node>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Node>>::deserialize(deserializer)?.unwrap_or_default())
}
