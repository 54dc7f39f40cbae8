//! vitae CLI: ingest the corpus, ask questions, inspect the index.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use vitae::config::PipelineConfig;
use vitae::paths::CorpusPaths;
use vitae::pipeline::{Pipeline, ingest};
use vitae::remote::OllamaEmbeddings;

#[derive(Parser)]
#[command(name = "vitae", version, about = "CV question answering over a document corpus")]
struct Cli {
    /// Data root holding cv/, skills_md/ and vectorstore/.
    #[arg(long, global = true)]
    data_root: Option<PathBuf>,

    /// Config file path.
    #[arg(long, global = true, default_value = "vitae.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, chunk, and embed the corpus, then persist the vector index.
    Ingest,

    /// Answer a question against the ingested corpus.
    Ask {
        /// The question to answer.
        question: String,
    },

    /// Show index statistics.
    Info,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig::load(&cli.config).into_diagnostic()?;
    let paths = CorpusPaths::resolve(cli.data_root.as_deref());

    match cli.command {
        Commands::Ingest => {
            paths.ensure_dirs().into_diagnostic()?;
            let embedder = OllamaEmbeddings::new(&config.embedding);
            let report = ingest(&config, &paths, &embedder).into_diagnostic()?;
            println!(
                "Ingested {} documents into {} chunks (dim {}).",
                report.documents, report.chunks, report.dim
            );
            println!("Vector index saved to {}", paths.index_dir.display());
        }

        Commands::Ask { question } => {
            let pipeline = Pipeline::open(&config, &paths).into_diagnostic()?;
            let result = pipeline.answer_question(&question);
            println!("{}", result.answer);
            if let Some(details) = result.error_details {
                tracing::warn!(details = %details, "question was not answered cleanly");
            }
        }

        Commands::Info => {
            let pipeline = Pipeline::open(&config, &paths).into_diagnostic()?;
            println!(
                "Index: {} chunks, dimension {}, at {}",
                pipeline.index_len(),
                pipeline.index_dim(),
                paths.index_dir.display()
            );
        }
    }

    Ok(())
}
