// Process settings read from `IAC_*` environment variables.

use crate::error::Error;
use crate::types::{OutputSyntax, ResourceKind};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Settings {
    /// Primary resource selected when a session starts.
    #[serde(default = "default_resource")]
    pub default_resource: String,
    /// Output syntax selected when a session starts.
    #[serde(default = "default_framework")]
    pub default_framework: String,
}

fn default_resource() -> String {
    "deployment".to_string()
}

fn default_framework() -> String {
    "cdk8s".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            default_resource: default_resource(),
            default_framework: default_framework(),
        }
    }
}

impl Settings {
    /// Loads and validates the settings; an unknown resource type or framework is a
    /// startup error.
    pub fn from_env() -> Result<Self, Error> {
        envy::prefixed("IAC_").from_env::<Settings>()?.validated()
    }

    #[cfg(test)]
    fn from_iter<I>(vars: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed("IAC_").from_iter::<_, Settings>(vars)?.validated()
    }

    /// Replaces both values with their canonical selector names (`k8s-client` becomes
    /// `kubernetes-client`, `PVC` becomes `pvc`).
    fn validated(self) -> Result<Self, Error> {
        let resource: ResourceKind = self.default_resource.parse()?;
        let framework: OutputSyntax = self.default_framework.parse()?;
        Ok(Settings {
            default_resource: resource.as_str().to_string(),
            default_framework: framework.as_str().to_string(),
        })
    }
}
