// Cross-resource linking shared by the code and YAML paths.
//
// A generation pass is described by a `Plan`: the primary kind, an optional compatible
// secondary kind and the `Linkage` directives connecting them. Both synthesizers consume
// the same plan, so a Deployment mounts exactly the ConfigMap the secondary block defines.

use crate::config::Config;
use crate::types::{ResourceKind, Role, OPAQUE_SECRET_TYPE, PVC_MOUNT_PATH, TLS_SECRET_TYPE};
use tracing::warn;

fn or_default(value: &str, fallback: impl FnOnce() -> String) -> String {
    if value.is_empty() {
        fallback()
    } else {
        value.to_string()
    }
}

/// `metadata.name` of a resource of `kind` generated in `role`.
pub fn resource_name(config: &Config, kind: ResourceKind, role: Role, primary: ResourceKind) -> String {
    let name = &config.name;
    match (kind, role) {
        (ResourceKind::Deployment, _) => name.clone(),
        (ResourceKind::Ingress, _) => format!("{}-ingress", name),
        (ResourceKind::Service, Role::Primary) => format!("{}-service", name),
        (ResourceKind::Service, Role::Secondary) => or_default(&config.secondary_service_name, || {
            if primary == ResourceKind::Ingress && !config.ingress_service.is_empty() {
                config.ingress_service.clone()
            } else {
                format!("{}-service", name)
            }
        }),
        (ResourceKind::ConfigMap, Role::Primary) => format!("{}-config", name),
        (ResourceKind::ConfigMap, Role::Secondary) => {
            or_default(&config.secondary_config_map_name, || format!("{}-config", name))
        }
        (ResourceKind::Secret, Role::Primary) => format!("{}-secret", name),
        (ResourceKind::Secret, Role::Secondary) => {
            or_default(&config.secondary_secret_name, || format!("{}-secret", name))
        }
        (ResourceKind::PersistentVolumeClaim, Role::Primary) => format!("{}-pvc", name),
        (ResourceKind::PersistentVolumeClaim, Role::Secondary) => {
            or_default(&config.secondary_pvc_name, || format!("{}-pvc", name))
        }
        (ResourceKind::StorageClass, _) => {
            or_default(&config.secondary_storage_class_name, || format!("{}-storageclass", name))
        }
    }
}

/// Effective `type` of the Secret generated in `role`.
pub fn secret_type(config: &Config, role: Role) -> String {
    match role {
        Role::Primary => or_default(&config.secret_type, || OPAQUE_SECRET_TYPE.to_string()),
        Role::Secondary => or_default(&config.secondary_secret_type, || {
            or_default(&config.secret_type, || OPAQUE_SECRET_TYPE.to_string())
        }),
    }
}

/// Where the Deployment pulls environment variables from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvSource {
    ConfigMap(String),
    Secret(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeSource {
    ConfigMap(String),
    Secret(String),
    Claim(String),
}

/// A volume plus the matching container mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeLink {
    pub name: String,
    pub mount_path: String,
    pub read_only: bool,
    pub source: VolumeSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsLink {
    pub host: String,
    pub secret_name: String,
}

/// Cross-references injected into whichever side of the pair they belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Linkage {
    /// Applied to the Deployment.
    pub env_from: Option<EnvSource>,
    /// Applied to the Deployment.
    pub volume: Option<VolumeLink>,
    /// Applied to the Ingress.
    pub tls: Option<TlsLink>,
    /// Forced `storageClassName` of the PersistentVolumeClaim.
    pub storage_class: Option<String>,
    /// Whether the secondary block is generated at all.
    pub emit_secondary: bool,
}

fn role_of(kind: ResourceKind, primary: ResourceKind) -> Role {
    if kind == primary {
        Role::Primary
    } else {
        Role::Secondary
    }
}

/// Derives the linkage directives for a primary kind and an already-checked secondary kind.
pub fn compute_linkage(primary: ResourceKind, secondary: Option<ResourceKind>, config: &Config) -> Linkage {
    let Some(secondary) = secondary else {
        return Linkage::default();
    };
    let mut linkage = Linkage {
        emit_secondary: true,
        ..Linkage::default()
    };
    let name_of = |kind: ResourceKind| resource_name(config, kind, role_of(kind, primary), primary);
    let pair = [primary, secondary];
    let has = |kind: ResourceKind| pair.contains(&kind);

    if has(ResourceKind::Deployment) && has(ResourceKind::ConfigMap) {
        let config_map = name_of(ResourceKind::ConfigMap);
        linkage.env_from = Some(EnvSource::ConfigMap(config_map.clone()));
        if !config.volume_mount_path.is_empty() {
            linkage.volume = Some(VolumeLink {
                name: format!("{}-configmap", config.name),
                mount_path: config.volume_mount_path.clone(),
                read_only: true,
                source: VolumeSource::ConfigMap(config_map),
            });
        }
    } else if has(ResourceKind::Deployment) && has(ResourceKind::Secret) {
        let secret = name_of(ResourceKind::Secret);
        linkage.env_from = Some(EnvSource::Secret(secret.clone()));
        if !config.volume_mount_path.is_empty() {
            linkage.volume = Some(VolumeLink {
                name: format!("{}-secret", config.name),
                mount_path: config.volume_mount_path.clone(),
                read_only: true,
                source: VolumeSource::Secret(secret),
            });
        }
    } else if has(ResourceKind::Deployment) && has(ResourceKind::PersistentVolumeClaim) {
        linkage.volume = Some(VolumeLink {
            name: format!("{}-pvc", config.name),
            mount_path: PVC_MOUNT_PATH.to_string(),
            read_only: false,
            source: VolumeSource::Claim(name_of(ResourceKind::PersistentVolumeClaim)),
        });
    } else if has(ResourceKind::Ingress) && has(ResourceKind::Secret) {
        let secret_role = role_of(ResourceKind::Secret, primary);
        let is_tls = secret_type(config, secret_role) == TLS_SECRET_TYPE;
        if is_tls {
            linkage.tls = Some(TlsLink {
                host: config.ingress_host.clone(),
                secret_name: name_of(ResourceKind::Secret),
            });
        }
        // A primary Secret only brings its Ingress along when it is a TLS secret.
        if primary == ResourceKind::Secret {
            linkage.emit_secondary = is_tls;
        }
    } else if has(ResourceKind::PersistentVolumeClaim) && has(ResourceKind::StorageClass) {
        linkage.storage_class = Some(name_of(ResourceKind::StorageClass));
    }
    linkage
}

/// One resource to render: its kind and whether it is the primary or the secondary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub kind: ResourceKind,
    pub role: Role,
}

/// Everything one generation pass needs: the config snapshot, the selection and its linkage.
#[derive(Debug, Clone)]
pub struct Plan<'a> {
    pub config: &'a Config,
    pub primary: ResourceKind,
    pub secondary: Option<ResourceKind>,
    pub linkage: Linkage,
}

impl<'a> Plan<'a> {
    /// Builds the plan, dropping a secondary kind the primary does not admit.
    pub fn new(config: &'a Config, primary: ResourceKind, secondary: Option<ResourceKind>) -> Self {
        let secondary = secondary.filter(|kind| {
            let admitted = primary.admits(*kind);
            if !admitted {
                warn!(
                    "Ignoring secondary resource '{}': not compatible with primary '{}'",
                    kind, primary
                );
            }
            admitted
        });
        let linkage = compute_linkage(primary, secondary, config);
        Plan {
            config,
            primary,
            secondary,
            linkage,
        }
    }

    /// Blocks to render, primary first.
    pub fn blocks(&self) -> Vec<Block> {
        let mut blocks = vec![Block {
            kind: self.primary,
            role: Role::Primary,
        }];
        if let Some(kind) = self.secondary {
            if self.linkage.emit_secondary {
                blocks.push(Block {
                    kind,
                    role: Role::Secondary,
                });
            }
        }
        blocks
    }

    pub fn name_of(&self, block: Block) -> String {
        resource_name(self.config, block.kind, block.role, self.primary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(json: &str) -> Config {
        Config::from_json(json).unwrap()
    }

    #[test]
    fn test_no_secondary_means_no_linkage() {
        let c = Config::default();
        let plan = Plan::new(&c, ResourceKind::Deployment, None);
        assert_eq!(plan.linkage, Linkage::default());
        assert_eq!(plan.blocks().len(), 1);
    }

    #[test]
    fn test_incompatible_secondary_is_dropped() {
        let c = Config::default();
        let plan = Plan::new(&c, ResourceKind::Deployment, Some(ResourceKind::Ingress));
        assert_eq!(plan.secondary, None);
        assert_eq!(plan.blocks().len(), 1);
    }

    #[test]
    fn test_deployment_configmap_with_mount() {
        let c = config(r#"{"volumeMountPath":"/etc/config"}"#);
        let linkage = compute_linkage(ResourceKind::Deployment, Some(ResourceKind::ConfigMap), &c);
        assert_eq!(linkage.env_from, Some(EnvSource::ConfigMap("my-app-config".to_string())));
        let volume = linkage.volume.unwrap();
        assert_eq!(volume.name, "my-app-configmap");
        assert_eq!(volume.mount_path, "/etc/config");
        assert!(volume.read_only);
        assert_eq!(volume.source, VolumeSource::ConfigMap("my-app-config".to_string()));
    }

    #[test]
    fn test_deployment_secret_without_mount_only_env_from() {
        let c = Config::default();
        let linkage = compute_linkage(ResourceKind::Deployment, Some(ResourceKind::Secret), &c);
        assert_eq!(linkage.env_from, Some(EnvSource::Secret("my-app-secret".to_string())));
        assert_eq!(linkage.volume, None);
    }

    #[test]
    fn test_secondary_names_follow_overrides() {
        let c = config(r#"{"secondarySecretName":"creds"}"#);
        let linkage = compute_linkage(ResourceKind::Deployment, Some(ResourceKind::Secret), &c);
        assert_eq!(linkage.env_from, Some(EnvSource::Secret("creds".to_string())));
    }

    #[test]
    fn test_deployment_pvc_fixed_mount() {
        let c = Config::default();
        let volume = compute_linkage(ResourceKind::Deployment, Some(ResourceKind::PersistentVolumeClaim), &c)
            .volume
            .unwrap();
        assert_eq!(volume.mount_path, "/mnt/data");
        assert!(!volume.read_only);
        assert_eq!(volume.source, VolumeSource::Claim("my-app-pvc".to_string()));
    }

    #[test]
    fn test_reverse_configmap_deployment() {
        let c = config(r#"{"volumeMountPath":"/cfg","secondaryConfigMapName":"ignored"}"#);
        let linkage = compute_linkage(ResourceKind::ConfigMap, Some(ResourceKind::Deployment), &c);
        assert_eq!(linkage.env_from, Some(EnvSource::ConfigMap("my-app-config".to_string())));
        assert!(linkage.volume.is_some());
    }

    #[test]
    fn test_ingress_tls_secret() {
        let c = config(r#"{"secretType":"kubernetes.io/tls","ingressHost":"example.com"}"#);
        let linkage = compute_linkage(ResourceKind::Ingress, Some(ResourceKind::Secret), &c);
        assert_eq!(
            linkage.tls,
            Some(TlsLink {
                host: "example.com".to_string(),
                secret_name: "my-app-secret".to_string(),
            })
        );
        assert!(linkage.emit_secondary);
    }

    #[test]
    fn test_ingress_opaque_secret_still_emits() {
        let c = Config::default();
        let linkage = compute_linkage(ResourceKind::Ingress, Some(ResourceKind::Secret), &c);
        assert_eq!(linkage.tls, None);
        assert!(linkage.emit_secondary);
    }

    #[test]
    fn test_secret_ingress_gated_on_tls() {
        let c = Config::default();
        let plan = Plan::new(&c, ResourceKind::Secret, Some(ResourceKind::Ingress));
        assert!(!plan.linkage.emit_secondary);
        assert_eq!(plan.blocks().len(), 1);

        let tls = config(r#"{"secretType":"kubernetes.io/tls"}"#);
        let plan = Plan::new(&tls, ResourceKind::Secret, Some(ResourceKind::Ingress));
        assert_eq!(plan.blocks().len(), 2);
        assert_eq!(plan.linkage.tls.unwrap().secret_name, "my-app-secret");
    }

    #[test]
    fn test_storage_class_link_both_directions() {
        let c = config(r#"{"pvcStorageClass":"manual"}"#);
        let forward = compute_linkage(ResourceKind::PersistentVolumeClaim, Some(ResourceKind::StorageClass), &c);
        assert_eq!(forward.storage_class.as_deref(), Some("my-app-storageclass"));
        let reverse = compute_linkage(ResourceKind::StorageClass, Some(ResourceKind::PersistentVolumeClaim), &c);
        assert_eq!(reverse.storage_class.as_deref(), Some("my-app-storageclass"));

        let named = config(r#"{"secondaryStorageClassName":"fast"}"#);
        let linkage = compute_linkage(ResourceKind::PersistentVolumeClaim, Some(ResourceKind::StorageClass), &named);
        assert_eq!(linkage.storage_class.as_deref(), Some("fast"));
    }

    #[test]
    fn test_secondary_service_name_from_ingress() {
        let c = config(r#"{"ingressService":"backend"}"#);
        assert_eq!(
            resource_name(&c, ResourceKind::Service, Role::Secondary, ResourceKind::Ingress),
            "backend"
        );
        assert_eq!(
            resource_name(&c, ResourceKind::Service, Role::Primary, ResourceKind::Service),
            "my-app-service"
        );
    }

    #[test]
    fn test_secondary_secret_type_falls_back() {
        let c = config(r#"{"secretType":"kubernetes.io/tls"}"#);
        assert_eq!(secret_type(&c, Role::Secondary), "kubernetes.io/tls");
        let c = config(r#"{"secretType":"","secondarySecretType":"kubernetes.io/ssh-auth"}"#);
        assert_eq!(secret_type(&c, Role::Secondary), "kubernetes.io/ssh-auth");
        assert_eq!(secret_type(&c, Role::Primary), "Opaque");
    }
}
