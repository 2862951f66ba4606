mod batch;
mod document;
mod error;
mod parser;
mod record;
mod settings;
mod store;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "historic_extract",
    about = "Extract historic property survey forms from HTML into JSON"
)]
struct Cli {
    /// Settings file (default: ./historic.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every form in the input directory and publish the JSON artifacts
    Extract {
        /// Directory of saved HTML forms
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Directory the artifacts are written to
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Only write the combined file
        #[arg(long)]
        no_individual: bool,
    },
    /// Extract a single form and print its record
    Parse { path: PathBuf },
    /// Validate a combined artifact (default: the configured one)
    Check { path: Option<PathBuf> },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = settings::load(cli.config.as_deref())?;
    info!(?settings, "settings loaded");

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            no_individual,
        } => {
            if let Some(dir) = input {
                settings.input_dir = dir;
            }
            if let Some(dir) = output {
                settings.output_dir = dir;
            }
            if no_individual {
                settings.write_individual = false;
            }

            let (summary, written) = extract(&settings)?;
            summary.print();
            println!(
                "Wrote {} files to {}",
                written.len(),
                settings.output_dir.display()
            );
            Ok(())
        }
        Commands::Parse { path } => {
            let record = parser::process_document(&path)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Commands::Check { path } => {
            let path = path.unwrap_or_else(|| settings.combined_path());
            let collection = store::load_collection(&path)?;
            let violations: Vec<String> =
                collection.iter().flat_map(|r| r.violations()).collect();
            for v in &violations {
                println!("  {}", v);
            }
            println!(
                "{} records, {} violations in {}",
                collection.len(),
                violations.len(),
                path.display()
            );
            if !violations.is_empty() {
                bail!("{} has {} violations", path.display(), violations.len());
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Discover, extract and publish. The collection is rebuilt from scratch, so
/// an input directory with no documents publishes an empty one.
fn extract(
    settings: &settings::Settings,
) -> anyhow::Result<(batch::BatchSummary, Vec<PathBuf>)> {
    let paths = batch::discover(&settings.input_dir, settings)
        .with_context(|| format!("failed to list {}", settings.input_dir.display()))?;
    if paths.is_empty() {
        println!(
            "No source documents in {}. Publishing an empty collection.",
            settings.input_dir.display()
        );
    } else {
        println!("Extracting {} documents...", paths.len());
    }

    let (collection, summary) = batch::run(&paths, settings.chunk_size);
    let written = store::publish(
        &collection,
        &settings.output_dir,
        &settings.combined_file,
        settings.write_individual,
    )?;
    Ok((summary, written))
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    match (secs / 3600, secs % 3600 / 60, secs % 60) {
        (0, 0, _) => format!("{:.1}s", d.as_secs_f64()),
        (0, m, s) => format!("{m}m {s}s"),
        (h, m, s) => format!("{h}h {m}m {s}s"),
    }
}
