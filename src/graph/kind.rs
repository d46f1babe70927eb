use serde::{Serialize, Deserialize};
use std::fmt;

/// Pipeline stage a palette tool belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Node,
    Plan,
    Code,
    Build,
    Test,
    Deploy,
    Approval,
    Release,
    Generic,
}

/// How the canvas should draw a node of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appearance {
    pub category: Category,
    /// Key into the view layer's icon set
    pub icon: &'static str,
    /// Accent color (hex)
    pub color: &'static str,
}

/// 节点类型 (palette tools)
///
/// Serialized as its string tag (`build_jenkins`, `plan_jira`, ...). Tags the
/// palette does not know are kept verbatim in `Other` so that documents
/// written by newer editors survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    NodeDev,
    NodeQa,
    NodeStaging,
    NodeProd,

    PlanJira,
    PlanTrello,
    PlanAsana,

    CodeGithub,
    CodeGitlab,
    CodeBitbucket,

    BuildJenkins,
    BuildGithubActions,
    BuildCircleci,
    BuildMaven,

    TestCypress,
    TestSelenium,
    TestJest,
    TestSonarqube,

    DeployKubernetes,
    DeployAws,
    DeployAzure,
    DeployHelm,

    ApprovalManual,
    ApprovalSlack,

    ReleaseArgocd,
    ReleaseOctopus,

    Other(String),
}

impl NodeKind {
    /// Every kind the palette offers, in palette order.
    pub const ALL: [NodeKind; 26] = [
        NodeKind::NodeDev,
        NodeKind::NodeQa,
        NodeKind::NodeStaging,
        NodeKind::NodeProd,
        NodeKind::PlanJira,
        NodeKind::PlanTrello,
        NodeKind::PlanAsana,
        NodeKind::CodeGithub,
        NodeKind::CodeGitlab,
        NodeKind::CodeBitbucket,
        NodeKind::BuildJenkins,
        NodeKind::BuildGithubActions,
        NodeKind::BuildCircleci,
        NodeKind::BuildMaven,
        NodeKind::TestCypress,
        NodeKind::TestSelenium,
        NodeKind::TestJest,
        NodeKind::TestSonarqube,
        NodeKind::DeployKubernetes,
        NodeKind::DeployAws,
        NodeKind::DeployAzure,
        NodeKind::DeployHelm,
        NodeKind::ApprovalManual,
        NodeKind::ApprovalSlack,
        NodeKind::ReleaseArgocd,
        NodeKind::ReleaseOctopus,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::NodeDev => "node_dev",
            NodeKind::NodeQa => "node_qa",
            NodeKind::NodeStaging => "node_staging",
            NodeKind::NodeProd => "node_prod",
            NodeKind::PlanJira => "plan_jira",
            NodeKind::PlanTrello => "plan_trello",
            NodeKind::PlanAsana => "plan_asana",
            NodeKind::CodeGithub => "code_github",
            NodeKind::CodeGitlab => "code_gitlab",
            NodeKind::CodeBitbucket => "code_bitbucket",
            NodeKind::BuildJenkins => "build_jenkins",
            NodeKind::BuildGithubActions => "build_github_actions",
            NodeKind::BuildCircleci => "build_circleci",
            NodeKind::BuildMaven => "build_maven",
            NodeKind::TestCypress => "test_cypress",
            NodeKind::TestSelenium => "test_selenium",
            NodeKind::TestJest => "test_jest",
            NodeKind::TestSonarqube => "test_sonarqube",
            NodeKind::DeployKubernetes => "deploy_kubernetes",
            NodeKind::DeployAws => "deploy_aws",
            NodeKind::DeployAzure => "deploy_azure",
            NodeKind::DeployHelm => "deploy_helm",
            NodeKind::ApprovalManual => "approval_manual",
            NodeKind::ApprovalSlack => "approval_slack",
            NodeKind::ReleaseArgocd => "release_argocd",
            NodeKind::ReleaseOctopus => "release_octopus",
            NodeKind::Other(tag) => tag,
        }
    }

    pub fn parse(tag: &str) -> NodeKind {
        NodeKind::ALL
            .iter()
            .find(|k| k.as_str() == tag)
            .cloned()
            .unwrap_or_else(|| NodeKind::Other(tag.to_string()))
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, NodeKind::Other(_))
    }

    /// Label used when a node is dropped without an explicit tool name.
    pub fn default_label(&self) -> String {
        let name = match self {
            NodeKind::NodeDev => "Development",
            NodeKind::NodeQa => "QA",
            NodeKind::NodeStaging => "Staging",
            NodeKind::NodeProd => "Production",
            NodeKind::PlanJira => "Jira",
            NodeKind::PlanTrello => "Trello",
            NodeKind::PlanAsana => "Asana",
            NodeKind::CodeGithub => "GitHub",
            NodeKind::CodeGitlab => "GitLab",
            NodeKind::CodeBitbucket => "Bitbucket",
            NodeKind::BuildJenkins => "Jenkins",
            NodeKind::BuildGithubActions => "GitHub Actions",
            NodeKind::BuildCircleci => "CircleCI",
            NodeKind::BuildMaven => "Maven",
            NodeKind::TestCypress => "Cypress",
            NodeKind::TestSelenium => "Selenium",
            NodeKind::TestJest => "Jest",
            NodeKind::TestSonarqube => "SonarQube",
            NodeKind::DeployKubernetes => "Kubernetes",
            NodeKind::DeployAws => "AWS",
            NodeKind::DeployAzure => "Azure",
            NodeKind::DeployHelm => "Helm",
            NodeKind::ApprovalManual => "Manual Approval",
            NodeKind::ApprovalSlack => "Slack Approval",
            NodeKind::ReleaseArgocd => "Argo CD",
            NodeKind::ReleaseOctopus => "Octopus Deploy",
            NodeKind::Other(tag) => return title_case(tag),
        };
        name.to_string()
    }

    pub fn appearance(&self) -> Appearance {
        use Category::*;
        let (category, icon, color) = match self {
            NodeKind::NodeDev => (Node, "server", "#4f46e5"),
            NodeKind::NodeQa => (Node, "flask", "#4f46e5"),
            NodeKind::NodeStaging => (Node, "layers", "#4f46e5"),
            NodeKind::NodeProd => (Node, "globe", "#4f46e5"),
            NodeKind::PlanJira => (Plan, "jira", "#0052cc"),
            NodeKind::PlanTrello => (Plan, "trello", "#0079bf"),
            NodeKind::PlanAsana => (Plan, "asana", "#f06a6a"),
            NodeKind::CodeGithub => (Code, "github", "#24292e"),
            NodeKind::CodeGitlab => (Code, "gitlab", "#fc6d26"),
            NodeKind::CodeBitbucket => (Code, "bitbucket", "#0052cc"),
            NodeKind::BuildJenkins => (Build, "jenkins", "#d33833"),
            NodeKind::BuildGithubActions => (Build, "github-actions", "#2088ff"),
            NodeKind::BuildCircleci => (Build, "circleci", "#343434"),
            NodeKind::BuildMaven => (Build, "maven", "#c71a36"),
            NodeKind::TestCypress => (Test, "cypress", "#17202c"),
            NodeKind::TestSelenium => (Test, "selenium", "#43b02a"),
            NodeKind::TestJest => (Test, "jest", "#c21325"),
            NodeKind::TestSonarqube => (Test, "sonarqube", "#4e9bcd"),
            NodeKind::DeployKubernetes => (Deploy, "kubernetes", "#326ce5"),
            NodeKind::DeployAws => (Deploy, "aws", "#ff9900"),
            NodeKind::DeployAzure => (Deploy, "azure", "#0078d4"),
            NodeKind::DeployHelm => (Deploy, "helm", "#0f1689"),
            NodeKind::ApprovalManual => (Approval, "user-check", "#f59e0b"),
            NodeKind::ApprovalSlack => (Approval, "slack", "#4a154b"),
            NodeKind::ReleaseArgocd => (Release, "argo", "#ef7b4d"),
            NodeKind::ReleaseOctopus => (Release, "octopus", "#2f93e0"),
            NodeKind::Other(_) => (Generic, "box", "#6b7280"),
        };
        Appearance { category, icon, color }
    }

    pub fn category(&self) -> Category {
        self.appearance().category
    }
}

fn title_case(tag: &str) -> String {
    tag.split(|c| c == '_' || c == '-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl From<String> for NodeKind {
    fn from(tag: String) -> Self {
        NodeKind::parse(&tag)
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
