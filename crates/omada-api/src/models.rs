// Omada API response types
//
// The controller returns far more fields than we model, and which ones are
// present varies by firmware and device type. Commonly needed fields are
// typed; everything else lands in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A client (station) from `/sites/{site}/clients`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub mac: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub host_name: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub wireless: Option<bool>,
    #[serde(default)]
    pub ssid: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub blocked: Option<bool>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A managed device (gateway, switch, or access point).
///
/// Returned by both the device list and the per-type detail endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub mac: String,
    /// `"gateway"`, `"switch"` or `"ap"`.
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub firmware_version: Option<String>,
    #[serde(default)]
    pub status: Option<i32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Device {
    pub fn is_switch(&self) -> bool {
        self.device_type == "switch"
    }

    pub fn is_ap(&self) -> bool {
        self.device_type == "ap"
    }
}

/// One port from `/sites/{site}/switches/{mac}/ports`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchPort {
    pub port: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub disable: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An alert or event log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(default)]
    pub id: Option<String>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The user behind the current session (`/users/current`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub name: String,
    #[serde(default)]
    pub role_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn client_keeps_unknown_fields() {
        let client: Client = serde_json::from_value(json!({
            "mac": "AA-BB-CC-DD-EE-FF",
            "name": "laptop",
            "ip": "10.0.0.23",
            "wireless": true,
            "signalLevel": 78
        }))
        .unwrap();
        assert_eq!(client.name.as_deref(), Some("laptop"));
        assert_eq!(client.wireless, Some(true));
        assert_eq!(client.extra["signalLevel"], json!(78));
    }

    #[test]
    fn device_type_helpers() {
        let device: Device = serde_json::from_value(json!({
            "mac": "00-11-22-33-44-55",
            "type": "switch",
            "model": "TL-SG2008P"
        }))
        .unwrap();
        assert!(device.is_switch());
        assert!(!device.is_ap());
    }
}
