// Resource kinds, output syntaxes and the fixed tables shared by every synthesizer.

use crate::error::Error;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const TLS_SECRET_TYPE: &str = "kubernetes.io/tls";
pub const DOCKER_CONFIG_SECRET_TYPE: &str = "kubernetes.io/dockerconfigjson";
pub const SSH_AUTH_SECRET_TYPE: &str = "kubernetes.io/ssh-auth";
pub const OPAQUE_SECRET_TYPE: &str = "Opaque";

/// Mount point of a linked PersistentVolumeClaim inside the Deployment container.
pub const PVC_MOUNT_PATH: &str = "/mnt/data";

/// Separator placed between the primary and secondary code blocks.
pub const SECONDARY_SEPARATOR: &str = "\n\n// --- Secondary Resource ---\n\n";

/// Separator line between YAML documents.
pub const YAML_DOCUMENT_SEPARATOR: &str = "---\n";

/// Extension of exported code, whatever the output syntax.
pub const DOWNLOAD_EXTENSION: &str = "ts";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Deployment,
    Service,
    #[serde(rename = "configmap")]
    ConfigMap,
    Secret,
    Ingress,
    #[serde(rename = "pvc")]
    PersistentVolumeClaim,
    #[serde(rename = "storageclass")]
    StorageClass,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Deployment,
        ResourceKind::Service,
        ResourceKind::ConfigMap,
        ResourceKind::Secret,
        ResourceKind::Ingress,
        ResourceKind::PersistentVolumeClaim,
        ResourceKind::StorageClass,
    ];

    /// Selector value used by the form and in exported file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Deployment => "deployment",
            ResourceKind::Service => "service",
            ResourceKind::ConfigMap => "configmap",
            ResourceKind::Secret => "secret",
            ResourceKind::Ingress => "ingress",
            ResourceKind::PersistentVolumeClaim => "pvc",
            ResourceKind::StorageClass => "storageclass",
        }
    }

    /// Kubernetes `kind` field.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ResourceKind::Deployment => "Deployment",
            ResourceKind::Service => "Service",
            ResourceKind::ConfigMap => "ConfigMap",
            ResourceKind::Secret => "Secret",
            ResourceKind::Ingress => "Ingress",
            ResourceKind::PersistentVolumeClaim => "PersistentVolumeClaim",
            ResourceKind::StorageClass => "StorageClass",
        }
    }

    pub fn api_version(&self) -> &'static str {
        match self {
            ResourceKind::Deployment => "apps/v1",
            ResourceKind::Ingress => "networking.k8s.io/v1",
            ResourceKind::StorageClass => "storage.k8s.io/v1",
            ResourceKind::Service
            | ResourceKind::ConfigMap
            | ResourceKind::Secret
            | ResourceKind::PersistentVolumeClaim => "v1",
        }
    }

    /// Secondary kinds that may accompany this kind when it is primary.
    pub fn secondary_options(&self) -> &'static [ResourceKind] {
        match self {
            ResourceKind::Deployment => &[
                ResourceKind::PersistentVolumeClaim,
                ResourceKind::Secret,
                ResourceKind::ConfigMap,
            ],
            ResourceKind::Service => &[ResourceKind::Ingress],
            ResourceKind::Ingress => &[ResourceKind::Secret, ResourceKind::Service],
            ResourceKind::Secret => &[ResourceKind::Deployment, ResourceKind::Ingress],
            ResourceKind::ConfigMap => &[ResourceKind::Deployment],
            ResourceKind::PersistentVolumeClaim => &[ResourceKind::StorageClass],
            ResourceKind::StorageClass => &[ResourceKind::PersistentVolumeClaim],
        }
    }

    pub fn admits(&self, secondary: ResourceKind) -> bool {
        self.secondary_options().contains(&secondary)
    }

    /// Parses an optional secondary selector; empty and `none` mean no secondary resource.
    pub fn parse_secondary(value: &str) -> Result<Option<ResourceKind>, Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        trimmed.parse().map(Some)
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deployment" => Ok(ResourceKind::Deployment),
            "service" => Ok(ResourceKind::Service),
            "configmap" => Ok(ResourceKind::ConfigMap),
            "secret" => Ok(ResourceKind::Secret),
            "ingress" => Ok(ResourceKind::Ingress),
            "pvc" | "persistentvolumeclaim" => Ok(ResourceKind::PersistentVolumeClaim),
            "storageclass" => Ok(ResourceKind::StorageClass),
            _ => Err(Error::UnknownResourceKind(s.to_string())),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Code style rendered in the code view. Does not affect the YAML view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OutputSyntax {
    #[serde(rename = "cdk8s")]
    Cdk8s,
    #[serde(rename = "pulumi")]
    Pulumi,
    #[serde(rename = "kubernetes-client")]
    KubernetesClient,
}

impl OutputSyntax {
    pub const ALL: [OutputSyntax; 3] = [
        OutputSyntax::Cdk8s,
        OutputSyntax::Pulumi,
        OutputSyntax::KubernetesClient,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSyntax::Cdk8s => "cdk8s",
            OutputSyntax::Pulumi => "pulumi",
            OutputSyntax::KubernetesClient => "kubernetes-client",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            OutputSyntax::Cdk8s => "AWS CDK for Kubernetes: constructs inside a Chart",
            OutputSyntax::Pulumi => "Pulumi declarative resources (@pulumi/kubernetes)",
            OutputSyntax::KubernetesClient => "Official Kubernetes JavaScript client API calls",
        }
    }
}

impl FromStr for OutputSyntax {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cdk8s" => Ok(OutputSyntax::Cdk8s),
            "pulumi" => Ok(OutputSyntax::Pulumi),
            "kubernetes-client" | "k8s-client" => Ok(OutputSyntax::KubernetesClient),
            _ => Err(Error::UnknownOutputSyntax(s.to_string())),
        }
    }
}

impl fmt::Display for OutputSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which panel of the session is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveView {
    Form,
    Code,
    Yaml,
}

impl FromStr for ActiveView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "form" => Ok(ActiveView::Form),
            "code" => Ok(ActiveView::Code),
            "yaml" => Ok(ActiveView::Yaml),
            other => Err(format!("view must be one of: form, code, yaml (got '{}')", other)),
        }
    }
}

/// Position of a resource within one generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Primary,
    Secondary,
}
