// Command-line entry point for ldgraph.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ldgraph::application::AnalyzeUsecase;
use ldgraph::domain::graph::DependencyGraph;
use ldgraph::infrastructure::concurrency::lookup_pool;
use ldgraph::infrastructure::{detect_finder, Config, ElfInspector, LdCache};
use ldgraph::ports::dot_exporter::DotExporter;
use ldgraph::ports::json_exporter::JsonExporter;
use ldgraph::ports::tree_renderer::TreeRenderer;
use ldgraph::ports::GraphExporter;
use log::warn;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Tree,
    Json,
    Dot,
    List,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Binary to analyze
    binary: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "tree")]
    format: Format,

    /// Output file path (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Look up the OS package owning each library
    #[arg(long)]
    packages: bool,

    /// Print the unique dynamic loaders instead of the graph
    #[arg(long)]
    loaders: bool,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Expand dependencies on a single thread
    #[arg(long)]
    sequential: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

/// Unique dependencies, one per line.
struct ListExporter;

impl GraphExporter for ListExporter {
    fn render(&self, graph: &DependencyGraph) -> String {
        let mut out = String::new();
        for path in graph.unique_dependencies() {
            out.push_str(&path.display().to_string());
            out.push('\n');
        }
        out
    }
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = Config::load(cli.config.as_deref())?;
    let cache = LdCache::load(&config);
    let inspector = ElfInspector;

    let finder = if cli.packages {
        let finder = detect_finder(&config);
        if finder.is_none() {
            warn!("Unrecognized distribution, package attribution disabled");
        }
        finder
    } else {
        None
    };
    let pool = match &finder {
        Some(_) => Some(lookup_pool(config.workers)?),
        None => None,
    };

    let usecase = AnalyzeUsecase {
        resolver: &cache,
        inspector: &inspector,
        finder: finder.as_deref(),
        lookup_pool: pool.as_ref(),
        parallel: config.parallel && !cli.sequential,
    };

    let (graph, _) = usecase.analyze(&cli.binary)?;

    let mut rendered = if cli.loaders {
        let mut out = String::new();
        for loader in graph.dynamic_loaders() {
            out.push_str(&loader.display().to_string());
            out.push('\n');
        }
        out
    } else {
        let exporter: Box<dyn GraphExporter> = match cli.format {
            Format::Tree => Box::new(TreeRenderer::new(cli.packages)),
            Format::Json => Box::new(JsonExporter::default()),
            Format::Dot => Box::new(DotExporter),
            Format::List => Box::new(ListExporter),
        };
        exporter.render(&graph)
    };
    if !rendered.is_empty() && !rendered.ends_with('\n') {
        rendered.push('\n');
    }

    match &cli.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", rendered),
    }
    Ok(())
}
