// Build Kubernetes manifests for a generation plan and serialize them to YAML.

use crate::config::Config;
use crate::error::Error;
use crate::tools::linkage::{secret_type, Block, EnvSource, Plan, VolumeSource};
use crate::tools::parse::{
    parse_env_vars, parse_key_value_lines, parse_labels, parse_list, parse_pairs, value_after_key,
};
use crate::types::{
    ResourceKind, Role, DOCKER_CONFIG_SECRET_TYPE, SSH_AUTH_SECRET_TYPE, TLS_SECRET_TYPE,
    YAML_DOCUMENT_SEPARATOR,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Map as JsonMap, Value};
use tracing::debug;

/// Generates the YAML view: one document per block, joined by a bare `---` line.
pub fn generate_k8s_yaml(
    config: &Config,
    primary: ResourceKind,
    secondary: Option<ResourceKind>,
) -> Result<String, Error> {
    render_yaml(&Plan::new(config, primary, secondary))
}

pub fn render_yaml(plan: &Plan) -> Result<String, Error> {
    let documents = plan
        .blocks()
        .into_iter()
        .map(|block| serde_yaml::to_string(&build_manifest(plan, block)))
        .collect::<Result<Vec<String>, _>>()?;
    Ok(documents.join(YAML_DOCUMENT_SEPARATOR))
}

/// Structured manifest for one block, keyed `apiVersion`, `kind`, `metadata`, then the body.
pub fn build_manifest(plan: &Plan, block: Block) -> Value {
    debug!("Building {} manifest ({:?})", block.kind, block.role);
    let body = match block.kind {
        ResourceKind::Deployment => deployment(plan, block),
        ResourceKind::Service => service(plan, block),
        ResourceKind::ConfigMap => config_map(plan, block),
        ResourceKind::Secret => secret(plan, block),
        ResourceKind::Ingress => ingress(plan, block),
        ResourceKind::PersistentVolumeClaim => persistent_volume_claim(plan, block),
        ResourceKind::StorageClass => storage_class(plan, block),
    };
    let mut top: JsonMap<String, Value> = JsonMap::new();
    top.insert("apiVersion".to_string(), Value::String(block.kind.api_version().to_string()));
    top.insert("kind".to_string(), Value::String(block.kind.kind_name().to_string()));
    top.extend(body);
    Value::Object(top)
}

/// Annotations parsed from a non-empty field, or nothing.
fn annotations_from(field: &str) -> Option<Value> {
    if field.is_empty() {
        None
    } else {
        Some(Value::Object(parse_labels(field)))
    }
}

fn labels_or_primary(field: &str, config: &Config) -> JsonMap<String, Value> {
    if field.is_empty() {
        parse_labels(&config.labels)
    } else {
        parse_labels(field)
    }
}

fn metadata(
    name: String,
    namespace: &str,
    labels: Option<JsonMap<String, Value>>,
    annotations: Option<Value>,
) -> Value {
    let mut meta: JsonMap<String, Value> = JsonMap::new();
    meta.insert("name".to_string(), Value::String(name));
    meta.insert("namespace".to_string(), Value::String(namespace.to_string()));
    if let Some(labels) = labels {
        meta.insert("labels".to_string(), Value::Object(labels));
    }
    if let Some(annotations) = annotations {
        meta.insert("annotations".to_string(), annotations);
    }
    Value::Object(meta)
}

/// Primary resources carry the shared `annotations` field; secondaries do not.
fn primary_annotations(block: Block, config: &Config) -> Option<Value> {
    match block.role {
        Role::Primary => annotations_from(&config.annotations),
        Role::Secondary => None,
    }
}

fn base64_values(entries: JsonMap<String, Value>) -> JsonMap<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| {
            let plain = value.as_str().unwrap_or_default();
            (key, Value::String(STANDARD.encode(plain)))
        })
        .collect()
}

fn deployment(plan: &Plan, block: Block) -> JsonMap<String, Value> {
    let config = plan.config;
    let labels = parse_labels(&config.labels);
    let env: Vec<Value> = parse_env_vars(&config.env)
        .into_iter()
        .map(|var| json!({ "name": var.name, "value": var.value }))
        .collect();

    let mut container: JsonMap<String, Value> = JsonMap::new();
    container.insert("name".to_string(), Value::String(config.name.clone()));
    container.insert("image".to_string(), Value::String(config.image.clone()));
    container.insert("ports".to_string(), json!([{ "containerPort": config.port }]));
    container.insert("env".to_string(), Value::Array(env));
    container.insert(
        "resources".to_string(),
        json!({
            "requests": { "cpu": config.cpu, "memory": config.memory },
            "limits": { "cpu": config.cpu_limit, "memory": config.memory_limit }
        }),
    );
    match &plan.linkage.env_from {
        Some(EnvSource::ConfigMap(name)) => {
            container.insert("envFrom".to_string(), json!([{ "configMapRef": { "name": name } }]));
        }
        Some(EnvSource::Secret(name)) => {
            container.insert("envFrom".to_string(), json!([{ "secretRef": { "name": name } }]));
        }
        None => {}
    }

    let mut pod_spec: JsonMap<String, Value> = JsonMap::new();
    if let Some(volume) = &plan.linkage.volume {
        let mut mount: JsonMap<String, Value> = JsonMap::new();
        mount.insert("name".to_string(), Value::String(volume.name.clone()));
        mount.insert("mountPath".to_string(), Value::String(volume.mount_path.clone()));
        if volume.read_only {
            mount.insert("readOnly".to_string(), Value::Bool(true));
        }
        container.insert("volumeMounts".to_string(), Value::Array(vec![Value::Object(mount)]));

        let source = match &volume.source {
            VolumeSource::ConfigMap(name) => json!({ "name": volume.name, "configMap": { "name": name } }),
            VolumeSource::Secret(name) => json!({ "name": volume.name, "secret": { "secretName": name } }),
            VolumeSource::Claim(name) => {
                json!({ "name": volume.name, "persistentVolumeClaim": { "claimName": name } })
            }
        };
        pod_spec.insert("containers".to_string(), Value::Array(vec![Value::Object(container)]));
        pod_spec.insert("volumes".to_string(), Value::Array(vec![source]));
    } else {
        pod_spec.insert("containers".to_string(), Value::Array(vec![Value::Object(container)]));
    }

    let mut spec: JsonMap<String, Value> = JsonMap::new();
    spec.insert("replicas".to_string(), json!(config.replicas));
    spec.insert("selector".to_string(), json!({ "matchLabels": labels }));
    if !config.strategy.is_empty() {
        spec.insert("strategy".to_string(), json!({ "type": config.strategy }));
    }
    if let Ok(seconds) = config.min_ready_seconds.trim().parse::<u32>() {
        spec.insert("minReadySeconds".to_string(), json!(seconds));
    }
    spec.insert(
        "template".to_string(),
        json!({
            "metadata": { "labels": labels },
            "spec": Value::Object(pod_spec)
        }),
    );

    let mut body: JsonMap<String, Value> = JsonMap::new();
    body.insert(
        "metadata".to_string(),
        metadata(
            plan.name_of(block),
            &config.namespace,
            Some(labels.clone()),
            primary_annotations(block, config),
        ),
    );
    body.insert("spec".to_string(), Value::Object(spec));
    body
}

fn service(plan: &Plan, block: Block) -> JsonMap<String, Value> {
    let config = plan.config;
    let mut body: JsonMap<String, Value> = JsonMap::new();
    let mut spec: JsonMap<String, Value> = JsonMap::new();

    match block.role {
        Role::Primary => {
            let labels = parse_labels(&config.labels);
            body.insert(
                "metadata".to_string(),
                metadata(
                    plan.name_of(block),
                    &config.namespace,
                    Some(labels.clone()),
                    primary_annotations(block, config),
                ),
            );
            spec.insert("type".to_string(), Value::String(config.service_type.clone()));
            spec.insert(
                "ports".to_string(),
                json!([{ "port": 80, "targetPort": config.port, "protocol": "TCP" }]),
            );
            spec.insert("selector".to_string(), Value::Object(labels));
            if !config.external_ips.is_empty() {
                spec.insert("externalIPs".to_string(), json!(parse_list(&config.external_ips)));
            }
            if !config.session_affinity.is_empty() {
                spec.insert(
                    "sessionAffinity".to_string(),
                    Value::String(config.session_affinity.clone()),
                );
            }
        }
        Role::Secondary => {
            let labels = labels_or_primary(&config.secondary_service_labels, config);
            let port = secondary_service_port(plan);
            body.insert(
                "metadata".to_string(),
                metadata(plan.name_of(block), &config.namespace, Some(labels.clone()), None),
            );
            let service_type = if config.secondary_service_type.is_empty() {
                "ClusterIP"
            } else {
                config.secondary_service_type.as_str()
            };
            spec.insert("type".to_string(), Value::String(service_type.to_string()));
            spec.insert(
                "ports".to_string(),
                json!([{ "port": port, "targetPort": port, "protocol": "TCP" }]),
            );
            spec.insert("selector".to_string(), Value::Object(labels));
        }
    }
    body.insert("spec".to_string(), Value::Object(spec));
    body
}

/// A secondary Service listens where the Ingress backend points, unless set explicitly.
fn secondary_service_port(plan: &Plan) -> u32 {
    plan.config.secondary_service_port.unwrap_or(if plan.primary == ResourceKind::Ingress {
        plan.config.ingress_service_port
    } else {
        80
    })
}

fn immutable_flag(field: &str) -> Value {
    Value::Bool(field == "true")
}

fn config_map(plan: &Plan, block: Block) -> JsonMap<String, Value> {
    let config = plan.config;
    let mut body: JsonMap<String, Value> = JsonMap::new();
    match block.role {
        Role::Primary => {
            // Each env entry becomes a config entry; later keys overwrite earlier ones.
            let mut data: JsonMap<String, Value> = JsonMap::new();
            for var in parse_env_vars(&config.env) {
                data.insert(var.name, Value::String(var.value));
            }
            body.insert(
                "metadata".to_string(),
                metadata(
                    plan.name_of(block),
                    &config.namespace,
                    None,
                    primary_annotations(block, config),
                ),
            );
            if !config.configmap_type.is_empty() {
                body.insert("type".to_string(), Value::String(config.configmap_type.clone()));
            }
            body.insert("data".to_string(), Value::Object(data));
        }
        Role::Secondary => {
            body.insert(
                "metadata".to_string(),
                metadata(
                    plan.name_of(block),
                    &config.namespace,
                    Some(labels_or_primary(&config.secondary_config_map_labels, config)),
                    annotations_from(&config.secondary_config_map_annotations),
                ),
            );
            body.insert(
                "immutable".to_string(),
                immutable_flag(&config.secondary_config_map_immutable),
            );
            body.insert(
                "data".to_string(),
                Value::Object(parse_key_value_lines(&config.secondary_config_map_data)),
            );
        }
    }
    body
}

/// Data lines for a secondary Secret: its own multi-line field, else the primary comma pairs.
fn secondary_secret_lines(config: &Config) -> Vec<String> {
    if config.secondary_secret_data.is_empty() {
        config.secret_data.split(',').map(|pair| pair.trim().to_string()).collect()
    } else {
        config.secondary_secret_data.split('\n').map(|line| line.to_string()).collect()
    }
}

/// Secret data keyed as its type expects, values still plain.
fn typed_secret_data(secret_type: &str, lines: &[String]) -> JsonMap<String, Value> {
    let mut data: JsonMap<String, Value> = JsonMap::new();
    let mut single = |key: &str, prefix: Option<&str>| {
        let line = lines.iter().find(|line| match prefix {
            Some(prefix) => line.trim().starts_with(prefix),
            None => !line.trim().is_empty(),
        });
        if let Some(value) = line.map(|line| value_after_key(line)).filter(|v| !v.is_empty()) {
            data.insert(key.to_string(), Value::String(value.to_string()));
        }
    };
    match secret_type {
        TLS_SECRET_TYPE => {
            single("tls.crt", Some("tls.crt="));
            single("tls.key", Some("tls.key="));
        }
        DOCKER_CONFIG_SECRET_TYPE => single(".dockerconfigjson", None),
        SSH_AUTH_SECRET_TYPE => single("ssh-privatekey", None),
        _ => return parse_key_value_lines(&lines.join("\n")),
    }
    data
}

fn secret(plan: &Plan, block: Block) -> JsonMap<String, Value> {
    let config = plan.config;
    let secret_type = secret_type(config, block.role);
    let mut body: JsonMap<String, Value> = JsonMap::new();
    match block.role {
        Role::Primary => {
            body.insert(
                "metadata".to_string(),
                metadata(
                    plan.name_of(block),
                    &config.namespace,
                    Some(parse_labels(&config.labels)),
                    primary_annotations(block, config),
                ),
            );
            body.insert("type".to_string(), Value::String(secret_type));
            body.insert(
                "data".to_string(),
                Value::Object(base64_values(parse_pairs(&config.secret_data))),
            );
        }
        Role::Secondary => {
            let data = typed_secret_data(&secret_type, &secondary_secret_lines(config));
            body.insert(
                "metadata".to_string(),
                metadata(
                    plan.name_of(block),
                    &config.namespace,
                    Some(labels_or_primary(&config.secondary_secret_labels, config)),
                    annotations_from(&config.secondary_secret_annotations),
                ),
            );
            body.insert("immutable".to_string(), immutable_flag(&config.secondary_secret_immutable));
            body.insert("type".to_string(), Value::String(secret_type));
            body.insert("data".to_string(), Value::Object(base64_values(data)));
        }
    }
    body
}

fn ingress(plan: &Plan, block: Block) -> JsonMap<String, Value> {
    let config = plan.config;
    let mut spec: JsonMap<String, Value> = JsonMap::new();
    if !config.ingress_class_name.is_empty() {
        spec.insert(
            "ingressClassName".to_string(),
            Value::String(config.ingress_class_name.clone()),
        );
    }
    spec.insert(
        "rules".to_string(),
        json!([{
            "host": config.ingress_host,
            "http": {
                "paths": [{
                    "path": config.ingress_path,
                    "pathType": "Prefix",
                    "backend": {
                        "service": {
                            "name": config.ingress_service,
                            "port": { "number": config.ingress_service_port }
                        }
                    }
                }]
            }
        }]),
    );
    if let Some(tls) = &plan.linkage.tls {
        spec.insert(
            "tls".to_string(),
            json!([{ "hosts": [tls.host], "secretName": tls.secret_name }]),
        );
    }

    let mut body: JsonMap<String, Value> = JsonMap::new();
    body.insert(
        "metadata".to_string(),
        metadata(
            plan.name_of(block),
            &config.namespace,
            Some(parse_labels(&config.labels)),
            primary_annotations(block, config),
        ),
    );
    body.insert("spec".to_string(), Value::Object(spec));
    body
}

/// `storageClassName` resolution: linked StorageClass, else the typed name, else omitted.
fn pvc_storage_class(plan: &Plan, block: Block) -> Option<String> {
    if let Some(name) = &plan.linkage.storage_class {
        return Some(name.clone());
    }
    let config = plan.config;
    let typed = match block.role {
        Role::Primary => config.pvc_storage_class.as_str(),
        Role::Secondary if !config.secondary_storage_class_name.is_empty() => {
            config.secondary_storage_class_name.as_str()
        }
        Role::Secondary => config.pvc_storage_class.as_str(),
    };
    if typed.is_empty() {
        None
    } else {
        Some(typed.to_string())
    }
}

fn persistent_volume_claim(plan: &Plan, block: Block) -> JsonMap<String, Value> {
    let config = plan.config;
    let mut spec: JsonMap<String, Value> = JsonMap::new();
    spec.insert("accessModes".to_string(), json!([config.pvc_access_modes]));
    spec.insert(
        "resources".to_string(),
        json!({ "requests": { "storage": config.pvc_storage } }),
    );
    if let Some(storage_class) = pvc_storage_class(plan, block) {
        spec.insert("storageClassName".to_string(), Value::String(storage_class));
    }
    if !config.volume_mode.is_empty() {
        spec.insert("volumeMode".to_string(), Value::String(config.volume_mode.clone()));
    }

    let mut body: JsonMap<String, Value> = JsonMap::new();
    body.insert(
        "metadata".to_string(),
        metadata(
            plan.name_of(block),
            &config.namespace,
            Some(parse_labels(&config.labels)),
            annotations_from(&config.annotations),
        ),
    );
    body.insert("spec".to_string(), Value::Object(spec));
    body
}

fn storage_class(plan: &Plan, block: Block) -> JsonMap<String, Value> {
    let config = plan.config;
    // Cluster-scoped: no namespace, no annotations.
    let mut body: JsonMap<String, Value> = JsonMap::new();
    body.insert("metadata".to_string(), json!({ "name": plan.name_of(block) }));
    body.insert(
        "provisioner".to_string(),
        Value::String(config.storage_class_provisioner.clone()),
    );
    let parameters = parse_pairs(&config.storage_class_parameters);
    if !parameters.is_empty() {
        body.insert("parameters".to_string(), Value::Object(parameters));
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use serde::Deserialize;

    fn config(json: &str) -> Config {
        Config::from_json(json).unwrap()
    }

    fn documents(yaml: &str) -> Vec<serde_yaml::Value> {
        serde_yaml::Deserializer::from_str(yaml)
            .map(|doc| serde_yaml::Value::deserialize(doc).unwrap())
            .collect()
    }

    fn single(yaml: &str) -> serde_yaml::Value {
        let mut docs = documents(yaml);
        assert_eq!(docs.len(), 1, "expected one document:\n{yaml}");
        docs.remove(0)
    }

    #[test]
    fn test_generate_deployment_defaults() {
        let yaml = generate_k8s_yaml(&Config::default(), ResourceKind::Deployment, None).unwrap();
        assert!(yaml.starts_with("apiVersion: apps/v1\nkind: Deployment\nmetadata:\n"));
        let doc = single(&yaml);
        assert_eq!(doc["metadata"]["name"], "my-app");
        assert_eq!(doc["spec"]["replicas"], 3);
        assert_eq!(doc["spec"]["selector"]["matchLabels"]["app"], "my-app");
        let container = &doc["spec"]["template"]["spec"]["containers"][0];
        assert_eq!(container["image"], "nginx:latest");
        assert_eq!(container["env"][0]["name"], "NODE_ENV");
        assert_eq!(container["env"][1]["value"], "3000");
        assert_eq!(container["resources"]["limits"]["memory"], "256Mi");
        assert!(container.get("envFrom").is_none());
        assert!(doc["metadata"].get("annotations").is_none());
    }

    #[test]
    fn test_deployment_optional_fields() {
        let c = config(r#"{"strategy":"Recreate","minReadySeconds":"10","annotations":"team=core"}"#);
        let doc = single(&generate_k8s_yaml(&c, ResourceKind::Deployment, None).unwrap());
        assert_eq!(doc["spec"]["strategy"]["type"], "Recreate");
        assert_eq!(doc["spec"]["minReadySeconds"], 10);
        assert_eq!(doc["metadata"]["annotations"]["team"], "core");
    }

    #[test]
    fn test_secret_data_is_base64() {
        let c = config(r#"{"secretData":"username=admin,password=123456"}"#);
        let doc = single(&generate_k8s_yaml(&c, ResourceKind::Secret, None).unwrap());
        assert_eq!(doc["kind"], "Secret");
        assert_eq!(doc["metadata"]["name"], "my-app-secret");
        assert_eq!(doc["type"], "Opaque");
        assert_eq!(doc["data"]["username"], STANDARD.encode("admin").as_str());
        assert_eq!(doc["data"]["password"], STANDARD.encode("123456").as_str());
        assert_eq!(doc["data"]["username"], "YWRtaW4=");
    }

    #[test]
    fn test_configmap_plain_data_and_type() {
        let c = config(r#"{"env":"A=1,B=2,A=3","configmapType":"custom"}"#);
        let doc = single(&generate_k8s_yaml(&c, ResourceKind::ConfigMap, None).unwrap());
        assert_eq!(doc["metadata"]["name"], "my-app-config");
        assert_eq!(doc["type"], "custom");
        assert_eq!(doc["data"]["A"], "3");
        assert_eq!(doc["data"]["B"], "2");
        assert!(doc["metadata"].get("labels").is_none());
    }

    #[test]
    fn test_service_spec() {
        let c = config(r#"{"port":8080,"serviceType":"NodePort","externalIPs":"1.2.3.4, 5.6.7.8","sessionAffinity":"ClientIP"}"#);
        let doc = single(&generate_k8s_yaml(&c, ResourceKind::Service, None).unwrap());
        assert_eq!(doc["metadata"]["name"], "my-app-service");
        assert_eq!(doc["spec"]["type"], "NodePort");
        assert_eq!(doc["spec"]["ports"][0]["port"], 80);
        assert_eq!(doc["spec"]["ports"][0]["targetPort"], 8080);
        assert_eq!(doc["spec"]["selector"]["version"], "v1");
        assert_eq!(doc["spec"]["externalIPs"][1], "5.6.7.8");
        assert_eq!(doc["spec"]["sessionAffinity"], "ClientIP");
    }

    #[test]
    fn test_deployment_configmap_mount() {
        let c = config(r#"{"volumeMountPath":"/etc/config"}"#);
        let yaml = generate_k8s_yaml(&c, ResourceKind::Deployment, Some(ResourceKind::ConfigMap)).unwrap();
        let docs = documents(&yaml);
        assert_eq!(docs.len(), 2);
        let pod = &docs[0]["spec"]["template"]["spec"];
        let mounts = pod["containers"][0]["volumeMounts"].as_sequence().unwrap();
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0]["name"], "my-app-configmap");
        assert_eq!(mounts[0]["mountPath"], "/etc/config");
        assert_eq!(mounts[0]["readOnly"], true);
        assert_eq!(pod["volumes"][0]["name"], "my-app-configmap");
        assert_eq!(pod["volumes"][0]["configMap"]["name"], "my-app-config");
        assert_eq!(pod["containers"][0]["envFrom"][0]["configMapRef"]["name"], "my-app-config");
        assert_eq!(docs[1]["kind"], "ConfigMap");
        assert_eq!(docs[1]["metadata"]["name"], "my-app-config");
    }

    #[test]
    fn test_deployment_pvc_mount() {
        let yaml = generate_k8s_yaml(
            &Config::default(),
            ResourceKind::Deployment,
            Some(ResourceKind::PersistentVolumeClaim),
        )
        .unwrap();
        let docs = documents(&yaml);
        let pod = &docs[0]["spec"]["template"]["spec"];
        assert_eq!(pod["containers"][0]["volumeMounts"][0]["mountPath"], "/mnt/data");
        assert!(pod["containers"][0]["volumeMounts"][0].get("readOnly").is_none());
        assert_eq!(pod["volumes"][0]["persistentVolumeClaim"]["claimName"], "my-app-pvc");
        assert_eq!(docs[1]["metadata"]["name"], "my-app-pvc");
        assert!(docs[1]["spec"].get("storageClassName").is_none());
    }

    #[test]
    fn test_ingress_tls_from_secondary_secret() {
        let c = config(r#"{"secretType":"kubernetes.io/tls","ingressHost":"example.com","secretData":"tls.crt=CERT,tls.key=KEY"}"#);
        let yaml = generate_k8s_yaml(&c, ResourceKind::Ingress, Some(ResourceKind::Secret)).unwrap();
        let docs = documents(&yaml);
        let tls = docs[0]["spec"]["tls"].as_sequence().unwrap();
        assert_eq!(tls.len(), 1);
        assert_eq!(tls[0]["hosts"][0], "example.com");
        assert_eq!(tls[0]["secretName"], "my-app-secret");
        assert_eq!(docs[1]["metadata"]["name"], "my-app-secret");
        assert_eq!(docs[1]["type"], "kubernetes.io/tls");
        assert_eq!(docs[1]["data"]["tls.crt"], STANDARD.encode("CERT").as_str());
        assert_eq!(docs[1]["data"]["tls.key"], STANDARD.encode("KEY").as_str());
    }

    #[test]
    fn test_ingress_rule_and_class() {
        let c = config(r#"{"ingressClassName":"nginx","ingressPath":"/api","ingressServicePort":"8080"}"#);
        let doc = single(&generate_k8s_yaml(&c, ResourceKind::Ingress, None).unwrap());
        assert_eq!(doc["spec"]["ingressClassName"], "nginx");
        let path = &doc["spec"]["rules"][0]["http"]["paths"][0];
        assert_eq!(path["path"], "/api");
        assert_eq!(path["pathType"], "Prefix");
        assert_eq!(path["backend"]["service"]["name"], "my-app-service");
        assert_eq!(path["backend"]["service"]["port"]["number"], 8080);
        assert!(doc["spec"].get("tls").is_none());
    }

    #[test]
    fn test_secret_non_tls_does_not_emit_ingress() {
        let yaml = generate_k8s_yaml(&Config::default(), ResourceKind::Secret, Some(ResourceKind::Ingress)).unwrap();
        assert!(!yaml.contains("---"));
        assert_eq!(documents(&yaml).len(), 1);
        assert!(!yaml.contains("Ingress"));
    }

    #[test]
    fn test_secret_tls_emits_ingress_with_tls() {
        let c = config(r#"{"secretType":"kubernetes.io/tls","ingressHost":"tls.example.com"}"#);
        let yaml = generate_k8s_yaml(&c, ResourceKind::Secret, Some(ResourceKind::Ingress)).unwrap();
        let docs = documents(&yaml);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1]["kind"], "Ingress");
        assert_eq!(docs[1]["spec"]["tls"][0]["hosts"][0], "tls.example.com");
        assert_eq!(docs[1]["spec"]["tls"][0]["secretName"], "my-app-secret");
    }

    #[test]
    fn test_pvc_storage_class_forced_over_manual() {
        let c = config(r#"{"pvcStorageClass":"manual"}"#);
        let yaml = generate_k8s_yaml(&c, ResourceKind::PersistentVolumeClaim, Some(ResourceKind::StorageClass)).unwrap();
        let docs = documents(&yaml);
        assert_eq!(docs[0]["spec"]["storageClassName"], "my-app-storageclass");
        assert!(!yaml.contains("manual"));
        assert_eq!(docs[1]["metadata"]["name"], "my-app-storageclass");

        let reverse = generate_k8s_yaml(&c, ResourceKind::StorageClass, Some(ResourceKind::PersistentVolumeClaim)).unwrap();
        let docs = documents(&reverse);
        assert_eq!(docs[1]["spec"]["storageClassName"], "my-app-storageclass");
    }

    #[test]
    fn test_pvc_storage_class_manual_or_omitted() {
        let manual = config(r#"{"pvcStorageClass":"gp3","volumeMode":"Block"}"#);
        let doc = single(&generate_k8s_yaml(&manual, ResourceKind::PersistentVolumeClaim, None).unwrap());
        assert_eq!(doc["spec"]["storageClassName"], "gp3");
        assert_eq!(doc["spec"]["volumeMode"], "Block");
        assert_eq!(doc["spec"]["accessModes"][0], "ReadWriteOnce");
        assert_eq!(doc["spec"]["resources"]["requests"]["storage"], "1Gi");

        let yaml = generate_k8s_yaml(&Config::default(), ResourceKind::PersistentVolumeClaim, None).unwrap();
        assert!(!yaml.contains("storageClassName"));
    }

    #[test]
    fn test_storage_class_parameters() {
        let c = config(r#"{"storageClassProvisioner":"ebs.csi.aws.com","storageClassParameters":"type=gp3,fsType=ext4","annotations":"a=b"}"#);
        let doc = single(&generate_k8s_yaml(&c, ResourceKind::StorageClass, None).unwrap());
        assert_eq!(doc["provisioner"], "ebs.csi.aws.com");
        assert_eq!(doc["parameters"]["type"], "gp3");
        assert!(doc["metadata"].get("annotations").is_none());
        assert!(doc["metadata"].get("namespace").is_none());

        let bare = single(&generate_k8s_yaml(&Config::default(), ResourceKind::StorageClass, None).unwrap());
        assert!(bare.get("parameters").is_none());
    }

    #[test]
    fn test_secondary_configmap_fields() {
        let c = config(
            r#"{"secondaryConfigMapName":"settings","secondaryConfigMapLabels":"tier=cfg","secondaryConfigMapImmutable":"true","secondaryConfigMapData":"LOG=debug\nEMPTY="}"#,
        );
        let yaml = generate_k8s_yaml(&c, ResourceKind::Deployment, Some(ResourceKind::ConfigMap)).unwrap();
        let docs = documents(&yaml);
        assert_eq!(docs[0]["spec"]["template"]["spec"]["containers"][0]["envFrom"][0]["configMapRef"]["name"], "settings");
        let cm = &docs[1];
        assert_eq!(cm["metadata"]["name"], "settings");
        assert_eq!(cm["metadata"]["labels"]["tier"], "cfg");
        assert_eq!(cm["immutable"], true);
        assert_eq!(cm["data"]["LOG"], "debug");
        assert!(cm["data"].get("EMPTY").is_none());
    }

    #[test]
    fn test_secondary_secret_typed_data() {
        let docker = config(r#"{"secondarySecretType":"kubernetes.io/dockerconfigjson","secondarySecretData":".dockerconfigjson={\"auths\":{}}"}"#);
        let docs = documents(&generate_k8s_yaml(&docker, ResourceKind::Deployment, Some(ResourceKind::Secret)).unwrap());
        assert_eq!(docs[1]["data"][".dockerconfigjson"], STANDARD.encode("{\"auths\":{}}").as_str());

        let basic = config(r#"{"secondarySecretType":"kubernetes.io/basic-auth","secondarySecretData":"username=u\npassword=p"}"#);
        let docs = documents(&generate_k8s_yaml(&basic, ResourceKind::Deployment, Some(ResourceKind::Secret)).unwrap());
        assert_eq!(docs[1]["type"], "kubernetes.io/basic-auth");
        assert_eq!(docs[1]["data"]["username"], STANDARD.encode("u").as_str());
        assert_eq!(docs[1]["immutable"], false);
    }

    #[test]
    fn test_ingress_secondary_service_follows_backend() {
        let c = config(r#"{"ingressService":"api","ingressServicePort":8080}"#);
        let docs = documents(&generate_k8s_yaml(&c, ResourceKind::Ingress, Some(ResourceKind::Service)).unwrap());
        assert_eq!(docs[1]["metadata"]["name"], "api");
        assert_eq!(docs[1]["spec"]["ports"][0]["port"], 8080);
        assert_eq!(docs[1]["spec"]["ports"][0]["targetPort"], 8080);
        assert_eq!(docs[1]["spec"]["type"], "ClusterIP");
    }

    #[test]
    fn test_reverse_secret_deployment_links_env() {
        let c = config(r#"{"volumeMountPath":"/secrets"}"#);
        let docs = documents(&generate_k8s_yaml(&c, ResourceKind::Secret, Some(ResourceKind::Deployment)).unwrap());
        let pod = &docs[1]["spec"]["template"]["spec"];
        assert_eq!(pod["containers"][0]["envFrom"][0]["secretRef"]["name"], "my-app-secret");
        assert_eq!(pod["volumes"][0]["secret"]["secretName"], "my-app-secret");
        assert!(docs[1]["metadata"].get("annotations").is_none());
    }

    #[test]
    fn test_multi_document_separator() {
        let yaml = generate_k8s_yaml(&Config::default(), ResourceKind::Service, Some(ResourceKind::Ingress)).unwrap();
        let separators = yaml.lines().filter(|line| *line == "---").count();
        assert_eq!(separators, 1);
        assert!(yaml.contains("\n---\napiVersion: networking.k8s.io/v1\n"));
        assert!(!yaml.contains("\n\n---"));
        assert_eq!(documents(&yaml).len(), 2);
    }

    #[test]
    fn test_yaml_is_idempotent() {
        let c = config(r#"{"volumeMountPath":"/etc/config","annotations":"x=y"}"#);
        let first = generate_k8s_yaml(&c, ResourceKind::Deployment, Some(ResourceKind::Secret)).unwrap();
        let second = generate_k8s_yaml(&c, ResourceKind::Deployment, Some(ResourceKind::Secret)).unwrap();
        assert_eq!(first, second);
    }

    /// `render_yaml` for every primary kind alone and with each secondary it admits. Each
    /// document is read back and printed as JSON so the snapshot pins the emitted values.
    fn yaml_matrix() -> String {
        let c = config(r#"{"volumeMountPath":"/etc/app"}"#);
        let mut out = String::new();
        for kind in ResourceKind::ALL {
            let secondaries = std::iter::once(None).chain(kind.secondary_options().iter().copied().map(Some));
            for secondary in secondaries {
                let yaml = render_yaml(&Plan::new(&c, kind, secondary)).unwrap();
                let docs: Vec<String> = serde_yaml::Deserializer::from_str(&yaml)
                    .map(|doc| serde_json::to_string_pretty(&Value::deserialize(doc).unwrap()).unwrap())
                    .collect();
                out.push_str(&format!(
                    "===== {} + {} =====\n",
                    kind,
                    secondary.map_or("none", |s| s.as_str())
                ));
                out.push_str(&docs.join("\n---\n"));
                out.push('\n');
            }
        }
        out
    }

    #[test]
    fn test_yaml_matrix() {
        assert_snapshot!("yaml_matrix", yaml_matrix());
    }

    #[test]
    fn test_empty_labels_keep_empty_key() {
        let c = config(r#"{"labels":""}"#);
        let doc = single(&generate_k8s_yaml(&c, ResourceKind::Service, None).unwrap());
        assert_eq!(doc["metadata"]["labels"][""], "");
    }
}
