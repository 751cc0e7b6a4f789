//! Wire types of the panel's inbound API.

use serde::Deserialize;

/// Envelope shared by every panel endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(default)]
    pub msg: String,

    pub obj: Option<T>,
}

/// One inbound (listener) as returned by `/xui/inbound/list`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawInbound {
    pub port: u16,

    #[serde(default)]
    pub remark: String,

    #[serde(default)]
    pub protocol: String,

    /// JSON document embedded as a string, carrying the client definitions.
    #[serde(default)]
    pub settings: String,

    /// Live traffic counters, correlated with the definitions by email.
    #[serde(default, rename = "clientStats")]
    pub client_stats: Option<Vec<ClientStat>>,
}

impl RawInbound {
    /// Returns the traffic counters, treating a `null` list as empty.
    #[must_use]
    pub fn stats(&self) -> &[ClientStat] {
        self.client_stats.as_deref().unwrap_or_default()
    }
}

/// Decoded form of [`RawInbound::settings`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundSettings {
    #[serde(default)]
    pub clients: Vec<RawClient>,
}

/// A client definition inside an inbound's settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RawClient {
    /// UUID for vless/vmess clients.
    #[serde(default)]
    pub id: Option<String>,

    /// Secret for trojan/shadowsocks clients, which carry no `id`.
    #[serde(default)]
    pub password: Option<String>,

    pub email: String,

    #[serde(default, rename = "limitIp")]
    pub limit_ip: Option<u32>,

    #[serde(default, rename = "totalGB")]
    pub total_gb: Option<u64>,

    #[serde(default, rename = "expiryTime")]
    pub expiry_time: Option<i64>,

    #[serde(default)]
    pub enable: Option<bool>,
}

impl RawClient {
    /// The identifier embedded in this client's connection links.
    #[must_use]
    pub fn uid(&self) -> &str {
        self.id
            .as_deref()
            .or(self.password.as_deref())
            .unwrap_or_default()
    }
}

/// Per-client traffic statistics attached to an inbound.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientStat {
    pub email: String,

    #[serde(default)]
    pub up: Option<u64>,

    #[serde(default)]
    pub down: Option<u64>,

    #[serde(default)]
    pub enable: Option<bool>,

    #[serde(default, rename = "expiryTime")]
    pub expiry_time: Option<i64>,

    #[serde(default, rename = "totalGB")]
    pub total_gb: Option<u64>,

    #[serde(default, rename = "limitIp")]
    pub limit_ip: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_response_deserializes() {
        let json = r#"{
            "success": true,
            "msg": "",
            "obj": [{
                "id": 1,
                "port": 443,
                "remark": "main",
                "protocol": "vless",
                "settings": "{\"clients\":[{\"id\":\"u1\",\"email\":\"a@x\",\"totalGB\":0}]}",
                "clientStats": [{"id": 1, "inboundId": 1, "email": "a@x", "up": 100, "down": 200, "enable": true, "expiryTime": 0, "total": 0}]
            }]
        }"#;

        let response: ApiResponse<Vec<RawInbound>> = serde_json::from_str(json).unwrap();
        assert!(response.success);

        let inbounds = response.obj.unwrap();
        assert_eq!(inbounds.len(), 1);
        assert_eq!(inbounds[0].port, 443);
        assert_eq!(inbounds[0].remark, "main");
        assert_eq!(inbounds[0].protocol, "vless");
        assert_eq!(inbounds[0].stats()[0].up, Some(100));
    }

    #[test]
    fn test_null_client_stats_is_empty() {
        let json = r#"{"port": 8080, "settings": "{}", "clientStats": null}"#;
        let inbound: RawInbound = serde_json::from_str(json).unwrap();
        assert!(inbound.stats().is_empty());
    }

    #[test]
    fn test_settings_without_clients() {
        let settings: InboundSettings = serde_json::from_str(r#"{"address":"1.1.1.1"}"#).unwrap();
        assert!(settings.clients.is_empty());
    }

    #[test]
    fn test_trojan_client_uses_password_as_uid() {
        let client: RawClient =
            serde_json::from_str(r#"{"password":"secret","email":"t@x"}"#).unwrap();
        assert_eq!(client.uid(), "secret");
    }

    #[test]
    fn test_failed_response_without_obj() {
        let response: ApiResponse<Vec<RawInbound>> =
            serde_json::from_str(r#"{"success": false, "msg": "login expired"}"#).unwrap();
        assert!(!response.success);
        assert!(response.obj.is_none());
    }
}
