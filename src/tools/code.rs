// Resource code synthesis for the three TypeScript styles.
//
// Every style renders the same structured manifests the YAML view is built from, so
// linkage (envFrom, volumes, TLS, storage class) is identical across outputs. A primary
// Deployment also gets its companion Service.

use crate::config::Config;
use crate::tools::linkage::{Block, Plan};
use crate::tools::manifest::build_manifest;
use crate::tools::typescript::{to_camel_case, to_pascal_case, LiteralStyle, Quote};
use crate::types::{OutputSyntax, ResourceKind, Role, SECONDARY_SEPARATOR};
use serde_json::{Map as JsonMap, Value};
use tracing::debug;

pub fn generate_code(
    config: &Config,
    primary: ResourceKind,
    secondary: Option<ResourceKind>,
    syntax: OutputSyntax,
) -> String {
    render_code(&Plan::new(config, primary, secondary), syntax)
}

/// Primary block (with the file preamble) and, when emitted, the secondary block.
pub fn render_code(plan: &Plan, syntax: OutputSyntax) -> String {
    debug!("Rendering {} code for {}", syntax, plan.primary);
    let blocks = plan.blocks();
    let mut sections = Vec::with_capacity(blocks.len());
    for (i, block) in blocks.into_iter().enumerate() {
        let body = match syntax {
            OutputSyntax::Cdk8s => cdk8s::block(plan, block),
            OutputSyntax::Pulumi => pulumi::block(plan, block),
            OutputSyntax::KubernetesClient => client::block(plan, block),
        };
        if i == 0 {
            let preamble = match syntax {
                OutputSyntax::Cdk8s => cdk8s::preamble(plan),
                OutputSyntax::Pulumi => pulumi::preamble(),
                OutputSyntax::KubernetesClient => client::preamble(plan),
            };
            sections.push(format!("{}\n{}", preamble, body));
        } else {
            sections.push(body);
        }
    }
    sections.join(SECONDARY_SEPARATOR)
}

/// Every kind the rendered code instantiates, in order of appearance.
fn rendered_kinds(plan: &Plan) -> Vec<ResourceKind> {
    let mut kinds = Vec::new();
    for block in plan.blocks() {
        kinds.push(block.kind);
        if needs_companion_service(block) {
            kinds.push(ResourceKind::Service);
        }
    }
    kinds.dedup();
    kinds
}

fn needs_companion_service(block: Block) -> bool {
    block.kind == ResourceKind::Deployment && block.role == Role::Primary
}

fn companion_service() -> Block {
    Block {
        kind: ResourceKind::Service,
        role: Role::Primary,
    }
}

/// The manifest without `apiVersion`/`kind`, which the libraries fill in themselves.
fn props(manifest: Value) -> Value {
    match manifest {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| key != "apiVersion" && key != "kind")
                .collect::<JsonMap<String, Value>>(),
        ),
        other => other,
    }
}

/// Identifier fragment for a kind: `ConfigMap`, `PVC`, ...
fn kind_ident(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::PersistentVolumeClaim => "PVC",
        other => other.kind_name(),
    }
}

/// Lower camel form of `kind_ident`: `configMap`, `pvc`, ...
fn kind_camel(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Deployment => "deployment",
        ResourceKind::Service => "service",
        ResourceKind::ConfigMap => "configMap",
        ResourceKind::Secret => "secret",
        ResourceKind::Ingress => "ingress",
        ResourceKind::PersistentVolumeClaim => "pvc",
        ResourceKind::StorageClass => "storageClass",
    }
}

fn role_prefix(role: Role) -> &'static str {
    match role {
        Role::Primary => "",
        Role::Secondary => "Secondary",
    }
}

/// Name a resource is registered under: the Deployment gets a `-deployment` suffix,
/// everything else uses its metadata name.
fn resource_id(plan: &Plan, block: Block) -> String {
    match block.kind {
        ResourceKind::Deployment => format!("{}-deployment", plan.config.name),
        _ => plan.name_of(block),
    }
}

mod cdk8s {
    use super::*;

    const STYLE: LiteralStyle = LiteralStyle::new(Quote::Single, 2);

    fn construct(kind: ResourceKind) -> String {
        format!("Kube{}", kind.kind_name())
    }

    pub(super) fn preamble(plan: &Plan) -> String {
        let constructs: Vec<String> = rendered_kinds(plan).into_iter().map(construct).collect();
        format!(
            "import {{ Construct }} from 'constructs';\n\
             import {{ Chart, ChartProps }} from 'cdk8s';\n\
             import {{ {} }} from './imports/k8s';\n",
            constructs.join(", ")
        )
    }

    fn chart_name(plan: &Plan, block: Block) -> String {
        let suffix = match (block.kind, block.role) {
            (ResourceKind::Deployment, Role::Primary) => String::new(),
            (kind, _) => kind_ident(kind).to_string(),
        };
        format!(
            "{}{}{}Chart",
            to_pascal_case(&plan.config.name),
            role_prefix(block.role),
            suffix
        )
    }

    fn instantiate(plan: &Plan, block: Block) -> String {
        let manifest = props(build_manifest(plan, block));
        format!(
            "    new {}(this, {}, {});\n",
            construct(block.kind),
            STYLE.string(&resource_id(plan, block)),
            STYLE.literal(&manifest, 2)
        )
    }

    pub(super) fn block(plan: &Plan, block: Block) -> String {
        let mut body = instantiate(plan, block);
        if needs_companion_service(block) {
            body.push('\n');
            body.push_str(&instantiate(plan, companion_service()));
        }
        format!(
            "export class {} extends Chart {{\n  \
             constructor(scope: Construct, id: string, props: ChartProps = {{}}) {{\n    \
             super(scope, id, props);\n\n{}  }}\n}}\n",
            chart_name(plan, block),
            body
        )
    }
}

mod pulumi {
    use super::*;

    const STYLE: LiteralStyle = LiteralStyle::new(Quote::Double, 4);

    fn resource_type(kind: ResourceKind) -> String {
        let group = match kind {
            ResourceKind::Deployment => "apps",
            ResourceKind::Ingress => "networking",
            ResourceKind::StorageClass => "storage",
            ResourceKind::Service
            | ResourceKind::ConfigMap
            | ResourceKind::Secret
            | ResourceKind::PersistentVolumeClaim => "core",
        };
        format!("k8s.{}.v1.{}", group, kind.kind_name())
    }

    pub(super) fn preamble() -> String {
        "import * as k8s from \"@pulumi/kubernetes\";\n".to_string()
    }

    /// `deploymentName`, `secondaryConfigMapName`, ...
    fn export_name(block: Block) -> String {
        match block.role {
            Role::Primary => format!("{}Name", kind_camel(block.kind)),
            Role::Secondary => format!("secondary{}Name", kind_ident(block.kind)),
        }
    }

    /// `myAppService`; secondary blocks get a `secondary` prefix so a secondary
    /// registered under the primary's name still declares its own constant.
    fn variable_name(id: &str, role: Role) -> String {
        match role {
            Role::Primary => to_camel_case(id),
            Role::Secondary => format!("secondary{}", to_pascal_case(id)),
        }
    }

    fn declare(plan: &Plan, block: Block) -> String {
        let id = resource_id(plan, block);
        let variable = variable_name(&id, block.role);
        format!(
            "// Create a {}\nconst {} = new {}({}, {});\n\nexport const {} = {}.metadata.name;\n",
            block.kind.kind_name(),
            variable,
            resource_type(block.kind),
            STYLE.string(&id),
            STYLE.literal(&props(build_manifest(plan, block)), 0),
            export_name(block),
            variable
        )
    }

    pub(super) fn block(plan: &Plan, block: Block) -> String {
        let mut out = declare(plan, block);
        if needs_companion_service(block) {
            out.push('\n');
            out.push_str(&declare(plan, companion_service()));
        }
        out
    }
}

mod client {
    use super::*;

    const STYLE: LiteralStyle = LiteralStyle::new(Quote::Single, 4);

    /// `(api class, client variable)` serving a kind.
    fn api(kind: ResourceKind) -> (&'static str, &'static str) {
        match kind {
            ResourceKind::Deployment => ("AppsV1Api", "k8sAppsApi"),
            ResourceKind::Ingress => ("NetworkingV1Api", "k8sNetworkingApi"),
            ResourceKind::StorageClass => ("StorageV1Api", "k8sStorageApi"),
            ResourceKind::Service
            | ResourceKind::ConfigMap
            | ResourceKind::Secret
            | ResourceKind::PersistentVolumeClaim => ("CoreV1Api", "k8sCoreApi"),
        }
    }

    pub(super) fn preamble(plan: &Plan) -> String {
        let mut out = String::from(
            "import * as k8s from '@kubernetes/client-node';\n\n\
             const kc = new k8s.KubeConfig();\n\
             kc.loadFromDefault();\n\n",
        );
        let mut seen: Vec<&str> = Vec::new();
        for kind in rendered_kinds(plan) {
            let (class, variable) = api(kind);
            if !seen.contains(&class) {
                seen.push(class);
                out.push_str(&format!("const {} = kc.makeApiClient(k8s.{});\n", variable, class));
            }
        }
        out
    }

    /// `deploymentManifest`, `secondarySecretManifest`, ...
    fn manifest_variable(block: Block) -> String {
        match block.role {
            Role::Primary => format!("{}Manifest", kind_camel(block.kind)),
            Role::Secondary => format!("secondary{}Manifest", kind_ident(block.kind)),
        }
    }

    fn declare(plan: &Plan, block: Block) -> String {
        format!(
            "// {} configuration\nconst {}: k8s.V1{} = {};\n",
            block.kind.kind_name(),
            manifest_variable(block),
            block.kind.kind_name(),
            STYLE.literal(&build_manifest(plan, block), 0)
        )
    }

    /// The awaited API call creating the resource held in `variable`.
    fn create_call(plan: &Plan, kind: ResourceKind, variable: &str) -> String {
        let (_, client) = api(kind);
        match kind {
            ResourceKind::StorageClass => format!("{}.createStorageClass({})", client, variable),
            _ => format!(
                "{}.createNamespaced{}(\n            {},\n            {}\n        )",
                client,
                kind.kind_name(),
                STYLE.string(&plan.config.namespace),
                variable
            ),
        }
    }

    fn deploy_function(plan: &Plan, block: Block) -> String {
        let deployment = manifest_variable(block);
        let service = manifest_variable(companion_service());
        format!(
            "// Deploy resources\n\
             export async function deploy{name}() {{\n    \
             try {{\n        \
             const deploymentResponse = await {deploy};\n        \
             console.log('Deployment created:', deploymentResponse.body.metadata?.name);\n\n        \
             const serviceResponse = await {svc};\n        \
             console.log('Service created:', serviceResponse.body.metadata?.name);\n\n        \
             return {{\n            deployment: deploymentResponse.body,\n            service: serviceResponse.body\n        }};\n    \
             }} catch (error) {{\n        \
             console.error('Error deploying resources:', error);\n        \
             throw error;\n    \
             }}\n\
             }}\n",
            name = to_pascal_case(&plan.config.name),
            deploy = create_call(plan, ResourceKind::Deployment, &deployment),
            svc = create_call(plan, ResourceKind::Service, &service),
        )
    }

    fn create_function(plan: &Plan, block: Block) -> String {
        let kind_name = block.kind.kind_name();
        format!(
            "export async function create{prefix}{ident}() {{\n    \
             try {{\n        \
             const response = await {call};\n        \
             console.log('{kind} created:', response.body.metadata?.name);\n        \
             return response.body;\n    \
             }} catch (error) {{\n        \
             console.error('Error creating {kind}:', error);\n        \
             throw error;\n    \
             }}\n\
             }}\n",
            prefix = role_prefix(block.role),
            ident = kind_ident(block.kind),
            call = create_call(plan, block.kind, &manifest_variable(block)),
            kind = kind_name,
        )
    }

    pub(super) fn block(plan: &Plan, block: Block) -> String {
        if needs_companion_service(block) {
            return format!(
                "{}\n{}\n{}",
                declare(plan, block),
                declare(plan, companion_service()),
                deploy_function(plan, block)
            );
        }
        format!("{}\n{}", declare(plan, block), create_function(plan, block))
    }
}
