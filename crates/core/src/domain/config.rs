// Gateway configuration flags

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

pub const COMP_WIFI_ENABLED: &str = "comp_wifi_enabled";
pub const COMP_DNS_ENABLED: &str = "comp_dns_enabled";
pub const COMP_PROXY_ENABLED: &str = "comp_proxy_enabled";
pub const TCP_SCRAMBLER_ENABLED: &str = "tcp_scrambler_enabled";
pub const CHINA_SHORTCUT_ENABLED: &str = "china_shortcut_enabled";
pub const DIRECT_ACCESS_ENABLED: &str = "direct_access_enabled";

/// Snapshot of the persisted flag map.
///
/// Never cached: callers ask their `ConfigSource` for a fresh snapshot at
/// every decision point.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct GatewayConfig {
    values: HashMap<String, Value>,
}

impl GatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Absent keys are enabled; present keys follow value truthiness
    pub fn is_enabled(&self, key: &str) -> bool {
        self.values.get(key).map(is_truthy).unwrap_or(true)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
