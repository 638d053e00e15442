// Form configuration record: every field a user can fill in, with the form's defaults.
// Values are taken as typed; nothing here cross-checks fields.

use crate::error::Error;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map as JsonMap, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub name: String,
    pub namespace: String,
    pub image: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub replicas: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub port: u32,
    pub service_type: String,
    pub labels: String,
    pub env: String,
    pub cpu: String,
    pub memory: String,
    pub cpu_limit: String,
    pub memory_limit: String,
    pub secret_data: String,
    pub secret_type: String,
    pub configmap_type: String,
    pub ingress_host: String,
    pub ingress_path: String,
    pub ingress_service: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub ingress_service_port: u32,
    pub pvc_storage: String,
    pub pvc_access_modes: String,
    pub pvc_storage_class: String,
    pub annotations: String,
    pub strategy: String,
    pub min_ready_seconds: String,
    #[serde(rename = "externalIPs")]
    pub external_ips: String,
    pub session_affinity: String,
    pub ingress_class_name: String,
    pub volume_mode: String,
    /// Where a linked ConfigMap/Secret is mounted in the Deployment; empty disables the mount.
    pub volume_mount_path: String,
    pub storage_class_provisioner: String,
    pub storage_class_parameters: String,

    pub secondary_pvc_name: String,
    pub secondary_storage_class_name: String,
    pub secondary_config_map_name: String,
    pub secondary_config_map_labels: String,
    pub secondary_config_map_annotations: String,
    pub secondary_config_map_immutable: String,
    pub secondary_config_map_data: String,
    pub secondary_secret_name: String,
    pub secondary_secret_labels: String,
    pub secondary_secret_annotations: String,
    pub secondary_secret_immutable: String,
    /// Empty means "same as `secretType`". The default is empty rather than the form's
    /// `Opaque`, so a secondary Secret follows a TLS or docker `secretType` unless this is set.
    pub secondary_secret_type: String,
    pub secondary_secret_data: String,
    pub secondary_service_name: String,
    #[serde(deserialize_with = "lenient_opt_u32")]
    pub secondary_service_port: Option<u32>,
    pub secondary_service_type: String,
    pub secondary_service_labels: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            name: "my-app".to_string(),
            namespace: "default".to_string(),
            image: "nginx:latest".to_string(),
            replicas: 3,
            port: 80,
            service_type: "ClusterIP".to_string(),
            labels: "app=my-app,version=v1".to_string(),
            env: "NODE_ENV=production,PORT=3000".to_string(),
            cpu: "100m".to_string(),
            memory: "128Mi".to_string(),
            cpu_limit: "500m".to_string(),
            memory_limit: "256Mi".to_string(),
            secret_data: "username=admin,password=123456".to_string(),
            secret_type: "Opaque".to_string(),
            configmap_type: String::new(),
            ingress_host: "example.com".to_string(),
            ingress_path: "/".to_string(),
            ingress_service: "my-app-service".to_string(),
            ingress_service_port: 80,
            pvc_storage: "1Gi".to_string(),
            pvc_access_modes: "ReadWriteOnce".to_string(),
            pvc_storage_class: String::new(),
            annotations: String::new(),
            strategy: String::new(),
            min_ready_seconds: String::new(),
            external_ips: String::new(),
            session_affinity: String::new(),
            ingress_class_name: String::new(),
            volume_mode: String::new(),
            volume_mount_path: String::new(),
            storage_class_provisioner: String::new(),
            storage_class_parameters: String::new(),
            secondary_pvc_name: String::new(),
            secondary_storage_class_name: String::new(),
            secondary_config_map_name: String::new(),
            secondary_config_map_labels: String::new(),
            secondary_config_map_annotations: String::new(),
            secondary_config_map_immutable: "false".to_string(),
            secondary_config_map_data: String::new(),
            secondary_secret_name: String::new(),
            secondary_secret_labels: String::new(),
            secondary_secret_annotations: String::new(),
            secondary_secret_immutable: "false".to_string(),
            secondary_secret_type: String::new(),
            secondary_secret_data: String::new(),
            secondary_service_name: String::new(),
            secondary_service_port: None,
            secondary_service_type: "ClusterIP".to_string(),
            secondary_service_labels: String::new(),
        }
    }
}

impl Config {
    /// Parses a JSON object string; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns a copy with the given JSON object's fields laid over this config.
    pub fn with_fields(&self, fields: &str) -> Result<Self, Error> {
        let patch: JsonMap<String, Value> = serde_json::from_str(fields)?;
        let mut merged = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => JsonMap::new(),
        };
        for (key, value) in patch {
            merged.insert(key, value);
        }
        Ok(serde_json::from_value(Value::Object(merged))?)
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Accepts a JSON number or a numeric string, as typed into a number input.
fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    number_from_value(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("expected a non-negative number, got {}", value)))
}

/// Like `lenient_u32`, but null, an empty string and zero mean "not set".
fn lenient_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        _ => number_from_value(&value)
            .map(|n| if n == 0 { None } else { Some(n) })
            .ok_or_else(|| serde::de::Error::custom(format!("expected a non-negative number, got {}", value))),
    }
}

fn number_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}
