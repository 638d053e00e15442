// Reference data for resource types, frameworks and form fields (list_resource_types, default_config).

use crate::config::Config;
use crate::types::{OutputSyntax, ResourceKind};
use serde_json::{json, Map as JsonMap, Value};

pub fn list_resource_types_json() -> String {
    let resource_types: Vec<Value> = ResourceKind::ALL
        .iter()
        .map(|kind| {
            json!({
                "type": kind,
                "kind": kind.kind_name(),
                "apiVersion": kind.api_version(),
                "secondaryResources": kind.secondary_options(),
            })
        })
        .collect();
    let frameworks: Vec<Value> = OutputSyntax::ALL
        .iter()
        .map(|syntax| json!({ "name": syntax, "description": syntax.description() }))
        .collect();
    let out = json!({
        "resourceTypes": resource_types,
        "frameworks": frameworks,
        "fields": field_groups(),
    });
    serde_json::to_string_pretty(&out).unwrap_or_default()
}

pub fn default_config_json() -> String {
    Config::default().to_json_pretty()
}

fn field_groups() -> JsonMap<String, Value> {
    serde_json::from_str(field_groups_raw()).unwrap_or_default()
}

fn field_groups_raw() -> &'static str {
    r#"{
  "common": {
    "description": "Shared by every resource type",
    "fields": ["name", "namespace", "labels", "annotations"]
  },
  "deployment": {
    "description": "Container, scaling and rollout settings",
    "fields": ["image", "replicas", "port", "env", "cpu", "memory", "cpuLimit", "memoryLimit", "strategy", "minReadySeconds", "volumeMountPath"]
  },
  "service": {
    "description": "Exposes port 80 and forwards to `port`",
    "fields": ["serviceType", "port", "externalIPs", "sessionAffinity"]
  },
  "configmap": {
    "description": "Data entries come from `env` (KEY=VALUE,...)",
    "fields": ["env", "configmapType"]
  },
  "secret": {
    "description": "Data from `secretData` (key=value,...), base64-encoded",
    "fields": ["secretData", "secretType"]
  },
  "ingress": {
    "description": "Single prefix rule to one backend service",
    "fields": ["ingressHost", "ingressPath", "ingressService", "ingressServicePort", "ingressClassName"]
  },
  "pvc": {
    "description": "Storage request; storageClassName is forced when paired with a StorageClass",
    "fields": ["pvcStorage", "pvcAccessModes", "pvcStorageClass", "volumeMode"]
  },
  "storageclass": {
    "description": "Cluster-scoped storage class",
    "fields": ["storageClassProvisioner", "storageClassParameters"]
  },
  "secondary": {
    "description": "Used by the linked secondary resource; empty values fall back to the primary fields",
    "fields": [
      "secondaryPvcName", "secondaryStorageClassName",
      "secondaryConfigMapName", "secondaryConfigMapLabels", "secondaryConfigMapAnnotations", "secondaryConfigMapImmutable", "secondaryConfigMapData",
      "secondarySecretName", "secondarySecretLabels", "secondarySecretAnnotations", "secondarySecretImmutable", "secondarySecretType", "secondarySecretData",
      "secondaryServiceName", "secondaryServicePort", "secondaryServiceType", "secondaryServiceLabels"
    ]
  }
}"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_types_include_compatibility() {
        let out: Value = serde_json::from_str(&list_resource_types_json()).unwrap();
        let types = out["resourceTypes"].as_array().unwrap();
        assert_eq!(types.len(), 7);
        assert_eq!(types[0]["type"], "deployment");
        assert_eq!(types[0]["secondaryResources"], json!(["pvc", "secret", "configmap"]));
        assert_eq!(types[5]["kind"], "PersistentVolumeClaim");
        assert_eq!(out["frameworks"][2]["name"], "kubernetes-client");
        assert!(out["fields"]["secondary"]["fields"].as_array().unwrap().len() > 10);
    }

    #[test]
    fn test_default_config_round_trips() {
        let config = Config::from_json(&default_config_json()).unwrap();
        assert_eq!(config, Config::default());
    }
}
