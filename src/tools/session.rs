// Interactive generation session: the form state, the selected kinds and the last outputs.
//
// `generate` runs one synthesis pass over a snapshot of the config. A failed pass clears
// the YAML output and shows the code view with whatever code was already produced.

use crate::config::Config;
use crate::error::Error;
use crate::settings::Settings;
use crate::tools::code::render_code;
use crate::tools::linkage::Plan;
use crate::tools::manifest::render_yaml;
use crate::types::{ActiveView, OutputSyntax, ResourceKind, DOWNLOAD_EXTENSION};
use serde_json::{json, Value};
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct Session {
    pub resource_type: String,
    /// Empty when no secondary resource is selected.
    pub secondary_type: String,
    pub framework: String,
    pub config: Config,
    pub view: ActiveView,
    pub generated_code: String,
    pub generated_yaml: String,
}

impl Session {
    pub fn new(settings: &Settings) -> Self {
        Session {
            resource_type: settings.default_resource.clone(),
            secondary_type: String::new(),
            framework: settings.default_framework.clone(),
            config: Config::default(),
            view: ActiveView::Form,
            generated_code: String::new(),
            generated_yaml: String::new(),
        }
    }

    /// Lays the given JSON object's fields over the current config.
    pub fn update_config(&mut self, fields: &str) -> Result<&Config, Error> {
        self.config = self.config.with_fields(fields)?;
        Ok(&self.config)
    }

    /// Switches the primary kind and returns to the form. A selected secondary kind the new
    /// primary does not admit is cleared.
    pub fn select_resource(&mut self, resource_type: &str) -> Result<(), Error> {
        let kind: ResourceKind = resource_type.parse()?;
        self.resource_type = kind.as_str().to_string();
        self.view = ActiveView::Form;
        if let Ok(Some(secondary)) = ResourceKind::parse_secondary(&self.secondary_type) {
            if !kind.admits(secondary) {
                info!("Clearing secondary resource '{}' for primary '{}'", secondary, kind);
                self.secondary_type.clear();
            }
        }
        Ok(())
    }

    /// Empty or `none` clears the secondary selection.
    pub fn select_secondary(&mut self, secondary_type: &str) -> Result<(), Error> {
        let Some(secondary) = ResourceKind::parse_secondary(secondary_type)? else {
            self.secondary_type.clear();
            return Ok(());
        };
        let primary: ResourceKind = self.resource_type.parse()?;
        if !primary.admits(secondary) {
            let allowed: Vec<&str> = primary.secondary_options().iter().map(|k| k.as_str()).collect();
            return Err(Error::IncompatibleSecondary {
                primary: primary.to_string(),
                secondary: secondary.to_string(),
                allowed: allowed.join(", "),
            });
        }
        self.secondary_type = secondary.as_str().to_string();
        Ok(())
    }

    /// Changes the code style. While the code view is shown the code is re-rendered right
    /// away from the current config; otherwise nothing is recomputed until `generate`.
    pub fn select_framework(&mut self, framework: &str) -> Result<(), Error> {
        let syntax: OutputSyntax = framework.parse()?;
        self.framework = syntax.as_str().to_string();
        if self.view == ActiveView::Code {
            match self.plan_kinds() {
                Ok((primary, secondary)) => {
                    let plan = Plan::new(&self.config, primary, secondary);
                    self.generated_code = render_code(&plan, syntax);
                }
                Err(e) => error!("Code regeneration failed: {}", e),
            }
        }
        Ok(())
    }

    /// Code style in effect; an unrecognized framework name falls back to cdk8s.
    pub fn syntax(&self) -> OutputSyntax {
        self.framework.parse().unwrap_or_else(|e| {
            warn!("{}; using cdk8s", e);
            OutputSyntax::Cdk8s
        })
    }

    fn plan_kinds(&self) -> Result<(ResourceKind, Option<ResourceKind>), Error> {
        let primary: ResourceKind = self.resource_type.parse()?;
        let secondary = ResourceKind::parse_secondary(&self.secondary_type)?;
        Ok((primary, secondary))
    }

    /// Runs one generation pass and stores both outputs.
    pub fn generate(&mut self) -> Result<(), Error> {
        let syntax = self.syntax();
        let config = self.config.clone();
        let result = self.plan_kinds().and_then(|(primary, secondary)| {
            let plan = Plan::new(&config, primary, secondary);
            self.generated_code = render_code(&plan, syntax);
            render_yaml(&plan)
        });
        match result {
            Ok(yaml) => {
                self.generated_yaml = yaml;
                if self.view != ActiveView::Yaml {
                    self.view = ActiveView::Code;
                }
                info!(
                    "Generated {} ({}) for '{}'",
                    self.resource_type, syntax, self.config.name
                );
                Ok(())
            }
            Err(e) => {
                error!("Generation failed: {}", e);
                self.generated_yaml.clear();
                self.view = ActiveView::Code;
                Err(e)
            }
        }
    }

    pub fn show_view(&mut self, view: ActiveView) -> String {
        self.view = view;
        self.view_content()
    }

    /// Text of the active view: the config as JSON for the form, else the generated output.
    pub fn view_content(&self) -> String {
        match self.view {
            ActiveView::Form => self.config.to_json_pretty(),
            ActiveView::Code => self.generated_code.clone(),
            ActiveView::Yaml => self.generated_yaml.clone(),
        }
    }

    /// `{name}-{resourceType}-{framework}.ts`, whatever the framework.
    pub fn download_file_name(&self) -> String {
        format!(
            "{}-{}-{}.{}",
            self.config.name, self.resource_type, self.framework, DOWNLOAD_EXTENSION
        )
    }

    /// File name and contents for saving the generated code.
    pub fn export_code(&self) -> (String, String) {
        (self.download_file_name(), self.generated_code.clone())
    }

    pub fn state_json(&self) -> Value {
        json!({
            "resourceType": self.resource_type,
            "secondaryResourceType": self.secondary_type,
            "framework": self.framework,
            "activeView": self.view,
            "name": self.config.name,
            "hasCode": !self.generated_code.is_empty(),
            "hasYaml": !self.generated_yaml.is_empty(),
        })
    }
}
