//! Static template flows shipped with the editor.
//!
//! Used when a template has no stored YAML, or when the stored YAML does not
//! decode. Keyed by template id.

use crate::graph::builder::GraphBuilder;
use crate::graph::{Graph, NodeKind, PipelineMetadata, DEPLOYMENT_EXTENSION, DEPLOYMENT_INTEGRATION};

pub const JAVA_SERVICE: &str = "java-service";
pub const WEB_FRONTEND: &str = "web-frontend";
pub const GATED_RELEASE: &str = "gated-release";

pub fn builtin_ids() -> &'static [&'static str] {
    &[JAVA_SERVICE, WEB_FRONTEND, GATED_RELEASE]
}

pub fn builtin_flow(template_id: &str) -> Option<(Graph, PipelineMetadata)> {
    let builder = match template_id {
        JAVA_SERVICE => GraphBuilder::new("Java Service")
            .description("Jira planning, GitHub source, Maven build, SonarQube scan, Kubernetes deploy")
            .deployment_type(DEPLOYMENT_INTEGRATION)
            .step("plan", NodeKind::PlanJira)
            .step("code", NodeKind::CodeGithub)
            .step("build", NodeKind::BuildMaven)
            .step("scan", NodeKind::TestSonarqube)
            .step("deploy", NodeKind::DeployKubernetes)
            .chain(&["plan", "code", "build", "scan", "deploy"]),

        WEB_FRONTEND => GraphBuilder::new("Web Frontend")
            .description("GitLab source, GitHub Actions build, Jest and Cypress in parallel, AWS deploy")
            .deployment_type(DEPLOYMENT_INTEGRATION)
            .step("code", NodeKind::CodeGitlab)
            .step("build", NodeKind::BuildGithubActions)
            .step("unit", NodeKind::TestJest)
            .step("e2e", NodeKind::TestCypress)
            .step("deploy", NodeKind::DeployAws)
            .connect("code", "build")
            .connect("build", "unit")
            .connect("build", "e2e")
            .connect("unit", "deploy")
            .connect("e2e", "deploy"),

        GATED_RELEASE => GraphBuilder::new("Gated Release")
            .description("Staging deploy with manual approval before the production release")
            .deployment_type(DEPLOYMENT_EXTENSION)
            .step("build", NodeKind::BuildJenkins)
            .step("staging", NodeKind::NodeStaging)
            .step("approve", NodeKind::ApprovalManual)
            .step("release", NodeKind::ReleaseArgocd)
            .step("prod", NodeKind::NodeProd)
            .chain(&["build", "staging", "approve", "release", "prod"]),

        _ => return None,
    };
    Some(builder.build())
}
