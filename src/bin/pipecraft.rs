use clap::{Parser, Subcommand};
use pipecraft::api::ApiClient;
use pipecraft::codec;
use pipecraft::config::CanvasConfig;
use pipecraft::controller::{CanvasController, RunOutcome};
use pipecraft::events::{next_event, CanvasEvent};
use pipecraft::resolver;
use pipecraft::store::{InMemoryTemplateStore, TemplateStore};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{Context, Result, bail};
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Optional YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides the config file)
    #[arg(long, global = true, env = "PIPECRAFT_API_URL")]
    api: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a pipeline file and report structural problems
    Validate {
        #[arg(long, short)]
        file: PathBuf,
    },

    /// Print the order a simulated run would visit nodes in
    Order {
        #[arg(long, short)]
        file: PathBuf,
    },

    /// Apply the grid auto-layout
    Format {
        #[arg(long, short)]
        file: PathBuf,

        /// Rewrite the file instead of printing
        #[arg(long)]
        write: bool,
    },

    /// Play the simulated run and log status changes
    Run {
        #[arg(long, short)]
        file: PathBuf,

        /// Per-node delay (overrides config)
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// List templates on the backend
    Templates,

    /// Fetch a template (with built-in fallbacks) and write its YAML
    Pull {
        #[arg(long)]
        template_id: String,

        /// Output file; stdout when omitted
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Upload a pipeline file; creates a new template unless an id is given
    Push {
        #[arg(long, short)]
        file: PathBuf,

        #[arg(long)]
        template_id: Option<String>,
    },
}

fn load_config(cli: &Cli) -> Result<CanvasConfig> {
    let mut config = match &cli.config {
        Some(path) => CanvasConfig::load(path)?,
        None => CanvasConfig::default(),
    };
    if let Some(api) = &cli.api {
        config.api_base_url = api.clone();
    }
    Ok(config)
}

fn remote_controller(config: &CanvasConfig) -> Result<CanvasController> {
    let client = ApiClient::from_config(config).context("Failed to build HTTP client")?;
    let store: Arc<dyn TemplateStore> = Arc::new(client);
    Ok(CanvasController::new(store, config))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Validate { file } => {
            let (graph, metadata) = codec::load_from_file(&file)
                .with_context(|| format!("Failed to load pipeline from {}", file.display()))?;
            let issues = graph.validate();
            println!("{}: {} nodes, {} edges", metadata.name, graph.nodes.len(), graph.edges.len());
            for node in graph.nodes.iter().filter(|n| !n.kind.is_known()) {
                warn!(node_id = %node.id, kind = %node.kind, "Unknown node type, rendered generically");
            }
            if !issues.is_empty() {
                for issue in &issues {
                    println!("  - {}", issue);
                }
                bail!("{} validation issue(s)", issues.len());
            }
            println!("OK");
        }
        Commands::Order { file } => {
            let (graph, _) = codec::load_from_file(&file)
                .with_context(|| format!("Failed to load pipeline from {}", file.display()))?;
            for (step, node_id) in resolver::execution_order(&graph).iter().enumerate() {
                let label = graph.node(node_id).map(|n| n.label.as_str()).unwrap_or("");
                println!("{:>3}. {} ({})", step + 1, node_id, label);
            }
            let missed = resolver::unreachable(&graph);
            if !missed.is_empty() {
                println!("unreachable: {}", missed.join(", "));
            }
        }
        Commands::Format { file, write } => {
            let (mut graph, metadata) = codec::load_from_file(&file)
                .with_context(|| format!("Failed to load pipeline from {}", file.display()))?;
            let layout = config.layout;
            graph.reposition_all(|node, idx| layout.place(node, idx));
            if write {
                codec::save_to_file(&file, &graph, &metadata)?;
                info!(file = %file.display(), "Layout written");
            } else {
                print!("{}", codec::encode(&graph, &metadata)?);
            }
        }
        Commands::Run { file, delay_ms } => {
            let (graph, metadata) = codec::load_from_file(&file)
                .with_context(|| format!("Failed to load pipeline from {}", file.display()))?;

            let mut run_config = config.clone();
            if let Some(ms) = delay_ms {
                run_config.run_step_delay_ms = ms;
            }

            let store = Arc::new(InMemoryTemplateStore::new());
            let controller = CanvasController::new(store, &run_config);
            controller.open(graph, metadata, None).await;

            let mut events = controller.events().subscribe();
            let printer = tokio::spawn(async move {
                while let Some(event) = next_event(&mut events).await {
                    match event {
                        CanvasEvent::NodeStatusChanged { node_id, status } => println!("{} -> {:?}", node_id, status),
                        CanvasEvent::RunFinished => break,
                        _ => {}
                    }
                }
            });

            if let RunOutcome::Completed { visited } = controller.run().await {
                info!(steps = visited.len(), "Run complete");
            }
            let _ = printer.await;
        }
        Commands::Templates => {
            let controller = remote_controller(&config)?;
            for record in controller.list_templates().await {
                println!("{}\t{}\t{}\t{}", record.id, record.name, record.status, record.creation_date.to_rfc3339());
            }
        }
        Commands::Pull { template_id, out } => {
            let controller = remote_controller(&config)?;
            let source = controller.load(&template_id).await;
            info!(template_id = %template_id, source = ?source, "Pulled template");
            let yaml = codec::encode(&controller.graph().await, &controller.metadata().await)?;
            match out {
                Some(path) => fs::write(&path, yaml)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => print!("{}", yaml),
            }
        }
        Commands::Push { file, template_id } => {
            let (graph, metadata) = codec::load_from_file(&file)
                .with_context(|| format!("Failed to load pipeline from {}", file.display()))?;

            let controller = remote_controller(&config)?;
            controller.open(graph, metadata, template_id).await;
            let id = controller.save().await?;
            println!("{}", id);
        }
    }

    Ok(())
}
