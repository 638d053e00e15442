//! Kubernetes IaC MCP server: turn a form-style resource config into cdk8s, Pulumi or
//! kubernetes-client code plus the matching YAML manifests.

mod config;
mod error;
mod settings;
mod tools;
mod types;

use std::sync::Arc;

use rmcp::{
    handler::server::ServerHandler,
    model::{CallToolResult, Content},
    tool, tool_handler, tool_router,
    transport::stdio,
    ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;
use crate::error::Error;
use crate::settings::Settings;
use crate::tools::session::Session;
use crate::types::{ActiveView, OutputSyntax, ResourceKind};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct GenerateParams {
    /// Primary resource type: deployment, service, configmap, secret, ingress, pvc, storageclass
    resource_type: String,
    /// Linked secondary resource type (optional; must be allowed for the primary type)
    #[serde(default)]
    secondary_type: Option<String>,
    /// Code style: cdk8s, pulumi, kubernetes-client (optional, default cdk8s)
    #[serde(default)]
    framework: Option<String>,
    /// Form config as JSON object string; missing fields use the defaults (optional)
    #[serde(default)]
    config: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct UpdateConfigParams {
    /// Fields to set, as JSON object string (e.g. {"name":"api","replicas":2})
    fields: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct ResourceParams {
    /// Resource type: deployment, service, configmap, secret, ingress, pvc, storageclass
    resource_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct SecondaryParams {
    /// Secondary resource type; empty or "none" clears it
    secondary_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct FrameworkParams {
    /// Code style: cdk8s, pulumi, kubernetes-client
    framework: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct ViewParams {
    /// View to show: form, code, yaml
    view: String,
}

/// Stateless generation: code and YAML for the given selection and config.
fn generate_k8s_iac(p: &GenerateParams) -> Result<String, Error> {
    let primary: ResourceKind = p.resource_type.parse()?;
    let secondary = match p.secondary_type.as_deref() {
        Some(s) => ResourceKind::parse_secondary(s)?,
        None => None,
    };
    let syntax: OutputSyntax = match p.framework.as_deref() {
        Some(f) if !f.trim().is_empty() => f.parse()?,
        _ => OutputSyntax::Cdk8s,
    };
    let config = match p.config.as_deref() {
        Some(json) if !json.trim().is_empty() => Config::from_json(json)?,
        _ => Config::default(),
    };
    let code = tools::code::generate_code(&config, primary, secondary, syntax);
    let yaml = tools::manifest::generate_k8s_yaml(&config, primary, secondary)?;
    Ok(format!("// {} code\n{}\n\n# YAML\n{}", syntax, code, yaml))
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn ok(text: String) -> Result<CallToolResult, rmcp::ErrorData> {
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn failed(text: String) -> Result<CallToolResult, rmcp::ErrorData> {
    Ok(CallToolResult::error(vec![Content::text(text)]))
}

#[derive(Clone)]
struct K8sIacMcpService {
    tool_router: rmcp::handler::server::tool::ToolRouter<Self>,
    session: Arc<Mutex<Session>>,
}

#[tool_router]
impl K8sIacMcpService {
    fn new(settings: &Settings) -> Self {
        Self {
            tool_router: Self::tool_router(),
            session: Arc::new(Mutex::new(Session::new(settings))),
        }
    }

    #[tool(description = "Generate IaC code (cdk8s, pulumi or kubernetes-client) and YAML for a Kubernetes resource and an optional linked secondary resource")]
    async fn generate_k8s_iac(
        &self,
        params: rmcp::handler::server::wrapper::Parameters<GenerateParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        match generate_k8s_iac(&params.0) {
            Ok(out) => ok(out),
            Err(e) => failed(e.to_string()),
        }
    }

    #[tool(description = "Set fields of the session's form config (JSON object); returns the merged config")]
    async fn update_config(
        &self,
        params: rmcp::handler::server::wrapper::Parameters<UpdateConfigParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let mut session = self.session.lock().await;
        match session.update_config(&params.0.fields) {
            Ok(config) => ok(config.to_json_pretty()),
            Err(e) => failed(e.to_string()),
        }
    }

    #[tool(description = "Select the session's primary resource type; switches to the form view")]
    async fn select_resource_type(
        &self,
        params: rmcp::handler::server::wrapper::Parameters<ResourceParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let mut session = self.session.lock().await;
        match session.select_resource(&params.0.resource_type) {
            Ok(()) => ok(pretty(&session.state_json())),
            Err(e) => failed(e.to_string()),
        }
    }

    #[tool(description = "Select the session's linked secondary resource type (empty or none clears it)")]
    async fn select_secondary_resource(
        &self,
        params: rmcp::handler::server::wrapper::Parameters<SecondaryParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let mut session = self.session.lock().await;
        match session.select_secondary(&params.0.secondary_type) {
            Ok(()) => ok(pretty(&session.state_json())),
            Err(e) => failed(e.to_string()),
        }
    }

    #[tool(description = "Select the code style; regenerates the code immediately when the code view is active")]
    async fn select_framework(
        &self,
        params: rmcp::handler::server::wrapper::Parameters<FrameworkParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let mut session = self.session.lock().await;
        match session.select_framework(&params.0.framework) {
            Ok(()) if session.view == ActiveView::Code => ok(session.generated_code.clone()),
            Ok(()) => ok(pretty(&session.state_json())),
            Err(e) => failed(e.to_string()),
        }
    }

    #[tool(description = "Generate code and YAML from the session's config and selections")]
    async fn generate(&self) -> Result<CallToolResult, rmcp::ErrorData> {
        let mut session = self.session.lock().await;
        match session.generate() {
            Ok(()) => ok(format!(
                "{}\n\n// --- code ---\n{}\n\n# --- yaml ---\n{}",
                pretty(&session.state_json()),
                session.generated_code,
                session.generated_yaml
            )),
            Err(e) => failed(format!(
                "Generation failed: {}\n\n// --- code ---\n{}",
                e, session.generated_code
            )),
        }
    }

    #[tool(description = "Show a session view (form, code or yaml) and return its content")]
    async fn show_view(
        &self,
        params: rmcp::handler::server::wrapper::Parameters<ViewParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let view: ActiveView = match params.0.view.parse() {
            Ok(view) => view,
            Err(e) => return failed(e),
        };
        let mut session = self.session.lock().await;
        ok(session.show_view(view))
    }

    #[tool(description = "Export the generated code with its download file name ({name}-{resourceType}-{framework}.ts)")]
    async fn export_code(&self) -> Result<CallToolResult, rmcp::ErrorData> {
        let session = self.session.lock().await;
        let (file_name, code) = session.export_code();
        if code.is_empty() {
            return failed("Nothing generated yet; call generate first.".to_string());
        }
        ok(format!("// {}\n{}", file_name, code))
    }

    #[tool(description = "List resource types with their allowed secondary resources, code styles and form fields")]
    async fn list_resource_types(&self) -> Result<CallToolResult, rmcp::ErrorData> {
        ok(tools::reference::list_resource_types_json())
    }

    #[tool(description = "Show the default form config")]
    async fn default_config(&self) -> Result<CallToolResult, rmcp::ErrorData> {
        ok(tools::reference::default_config_json())
    }
}

#[tool_handler]
impl ServerHandler for K8sIacMcpService {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo::new(
            rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
        )
        .with_instructions(
            "MCP for Kubernetes IaC: generate cdk8s, Pulumi or kubernetes-client code and YAML manifests from a resource config.",
        )
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // stdout carries the MCP transport; logs go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env()?;
    info!(
        "Starting k8s-iac-mcp (resource: {}, framework: {})",
        settings.default_resource, settings.default_framework
    );
    let service = K8sIacMcpService::new(&settings);
    let transport = stdio();
    let server = service.serve(transport).await?;
    server.waiting().await?;
    Ok(())
}
