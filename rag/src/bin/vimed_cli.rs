//! ViMedBot CLI - ask questions or inspect retrieval from the terminal.

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

use vimed_rag::AskRequest;
use vimed_rag::RagConfig;
use vimed_rag::RagService;
use vimed_rag::SearchRequest;

#[derive(Parser)]
#[command(name = "vimed")]
#[command(about = "Medical question answering over the ViMedBot knowledge base")]
struct Cli {
    /// Working directory used to locate `.vimed/config.toml`
    #[arg(long, default_value = ".")]
    workdir: PathBuf,

    /// Path to config file (default: {workdir}/.vimed/config.toml or ~/.vimed/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a question with the full pipeline
    Ask {
        /// Question to answer
        query: String,
        /// Hits requested per query
        #[arg(short, long)]
        top_k: Option<usize>,
        /// Search with the original question only
        #[arg(long)]
        no_expansion: bool,
        /// Documents kept after reranking
        #[arg(short, long)]
        rerank_top_n: Option<usize>,
    },

    /// Retrieve documents without generating an answer
    Search {
        /// Search query
        query: String,
        /// Maximum results
        #[arg(short, long)]
        top_k: Option<usize>,
        /// Keep similarity order
        #[arg(long)]
        no_rerank: bool,
        /// Documents kept after reranking
        #[arg(short, long)]
        rerank_top_n: Option<usize>,
    },

    /// Show current configuration (keys redacted)
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vimed_rag=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let workdir = cli.workdir.canonicalize().unwrap_or_else(|_| cli.workdir.clone());

    let config = if let Some(config_path) = &cli.config {
        if !config_path.exists() {
            anyhow::bail!("Config file not found: {}", config_path.display());
        }
        let mut config = RagConfig::from_file(config_path)?;
        config.apply_env(|name| std::env::var(name).ok());
        config
    } else {
        RagConfig::load(&workdir)?
    };

    match cli.command {
        Command::Ask {
            query,
            top_k,
            no_expansion,
            rerank_top_n,
        } => {
            let mut request = AskRequest::new(query).with_query_expansion(!no_expansion);
            request.top_k = top_k;
            request.rerank_top_n = rerank_top_n;
            cmd_ask(&config, &request).await?
        }
        Command::Search {
            query,
            top_k,
            no_rerank,
            rerank_top_n,
        } => {
            let mut request = SearchRequest::new(query).with_rerank(!no_rerank);
            request.top_k = top_k;
            request.rerank_top_n = rerank_top_n;
            cmd_search(&config, &request).await?
        }
        Command::Config => cmd_config(&config)?,
    }

    Ok(())
}

async fn cmd_ask(config: &RagConfig, request: &AskRequest) -> anyhow::Result<()> {
    let service = RagService::from_config(config)?;
    let outcome = service.ask(request).await?;

    println!("Queries:");
    for (i, query) in outcome.queries_used.iter().enumerate() {
        println!("  {}. {query}", i + 1);
    }
    println!(
        "\nDocuments: {} found, {} used\n",
        outcome.num_documents, outcome.num_reranked
    );
    for (i, doc) in outcome.documents.iter().enumerate() {
        println!(
            "{}. {} (rerank: {}, score: {:.3})",
            i + 1,
            doc.title,
            doc.rerank_score
                .map_or_else(|| "-".to_string(), |s| format!("{s:.3}")),
            doc.original_score_or_score()
        );
    }
    println!("\n{}", outcome.answer);

    Ok(())
}

async fn cmd_search(config: &RagConfig, request: &SearchRequest) -> anyhow::Result<()> {
    let service = RagService::from_config(config)?;
    let documents = service.search_only(request).await?;

    println!("Found {} results:\n", documents.len());

    for (i, doc) in documents.iter().enumerate() {
        match doc.rerank_score {
            Some(rerank) => println!(
                "{}. {} [{}] (rerank: {rerank:.3}, score: {:.3})",
                i + 1,
                doc.title,
                doc.category,
                doc.original_score_or_score()
            ),
            None => println!(
                "{}. {} [{}] (score: {:.3})",
                i + 1,
                doc.title,
                doc.category,
                doc.score
            ),
        }
        // Show first 2 lines of content
        for line in doc.text.lines().take(2) {
            println!("   {}", line.trim());
        }
        println!();
    }

    Ok(())
}

fn cmd_config(config: &RagConfig) -> anyhow::Result<()> {
    if let Err(err) = config.validate() {
        eprintln!("Warning: {err}");
    }
    println!("{}", config.to_redacted_toml()?);
    Ok(())
}
