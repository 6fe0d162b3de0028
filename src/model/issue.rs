use serde::Deserialize;
use serde_json::Value;

/// One issue exactly as the remote API returned it. Only read, never modified.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RawIssue(Value);

impl RawIssue {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn key(&self) -> &str {
        self.0["key"].as_str().unwrap_or("")
    }

    /// Looks up `fields[name]`. A JSON `null` is reported as absent.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0
            .get("fields")
            .and_then(|fields| fields.get(name))
            .filter(|value| !value.is_null())
    }

    /// Looks up `fields[name][nested]`, absent if any level is missing or null.
    pub fn nested(&self, name: &str, nested: &str) -> Option<&Value> {
        self.field(name)
            .and_then(|value| value.get(nested))
            .filter(|value| !value.is_null())
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// Every `(key, value)` pair of the field bag.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0
            .get("fields")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|fields| fields.iter())
    }
}

impl From<Value> for RawIssue {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
