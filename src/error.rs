// Crate error type. Tool handlers turn it into error content for the client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown resource type '{0}'; expected one of: deployment, service, configmap, secret, ingress, pvc, storageclass")]
    UnknownResourceKind(String),

    #[error("unknown framework '{0}'; expected one of: cdk8s, pulumi, kubernetes-client")]
    UnknownOutputSyntax(String),

    #[error("secondary resource '{secondary}' cannot accompany '{primary}'; allowed: {allowed}")]
    IncompatibleSecondary {
        primary: String,
        secondary: String,
        allowed: String,
    },

    #[error("config invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to load settings from environment: {0}")]
    Settings(#[from] envy::Error),
}
