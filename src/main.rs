use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trendscope::config::{Config, LoggingConfig, ScoringMode};
use trendscope::embedding::{
    BertEncoder, DeepScorer, EncoderSettings, FastScorer, ScoreStrategy, SemanticScorer,
};
use trendscope::export::{ArtifactUploader, R2Uploader};
use trendscope::pipeline::Pipeline;
use trendscope::server::TriggerServer;
use trendscope::trends::TrendsClient;

#[derive(Parser)]
#[command(
    name = "trendscope",
    version,
    about = "AI trend detector: ranks regional trending searches by semantic relevance",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file (environment variables otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one pipeline run and print the ranked top list
    Run {
        /// Override the artifact output path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip the object-storage upload even when configured
        #[arg(long, default_value = "false")]
        skip_upload: bool,
    },

    /// Serve the HTTP trigger endpoints
    Serve {
        /// Override the listen port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    setup_tracing(&config.logging, cli.verbose, cli.log_format.as_deref())?;

    match cli.command {
        Commands::Run {
            output,
            skip_upload,
        } => {
            if let Some(output) = output {
                config.export.output_path = output;
            }
            if skip_upload {
                config.export.upload = None;
            }
            config.validate()?;
            run(Arc::new(config)).await?;
        }

        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;
            serve(Arc::new(config)).await?;
        }
    }

    Ok(())
}

/// Build the filter directives for a configured level
///
/// Crate spans follow the requested level; everything else stays
/// quieter unless the level itself is a debugging one.
fn log_directives(level: &str) -> String {
    let global = match level {
        "trace" | "debug" => "info",
        _ => "warn",
    };
    format!("trendscope={level},{global}")
}

/// Resolve the output format, a CLI override winning over config
fn effective_format<'a>(cli_override: Option<&'a str>, configured: &'a str) -> &'a str {
    cli_override.unwrap_or(configured)
}

/// Configure the global subscriber from config, CLI flags winning
fn setup_tracing(logging: &LoggingConfig, verbose: bool, format_override: Option<&str>) -> Result<()> {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let env_filter = tracing_subscriber::EnvFilter::new(log_directives(level));

    match effective_format(format_override, &logging.format) {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

/// Wire the pipeline components from configuration
///
/// The embedding model loads once here; its topic reference vector is
/// reused for the whole process lifetime.
fn build_pipeline(config: Arc<Config>) -> Result<Pipeline> {
    let client = Arc::new(TrendsClient::new(&config.trends)?);

    let encoder = Arc::new(BertEncoder::from_pretrained(EncoderSettings::default())?);
    let scorer = SemanticScorer::new(encoder)?;

    let strategy: Arc<dyn ScoreStrategy> = match config.scoring.mode {
        ScoringMode::Fast => Arc::new(FastScorer::new(scorer)),
        ScoringMode::Deep => Arc::new(DeepScorer::new(scorer, client.clone())),
    };

    let uploader: Option<Arc<dyn ArtifactUploader>> = match &config.export.upload {
        Some(r2) => Some(Arc::new(R2Uploader::new(r2)?)),
        None => None,
    };

    Ok(Pipeline::new(config, client, strategy, uploader))
}

async fn run(config: Arc<Config>) -> Result<()> {
    let window_hours = config.trends.window_hours;
    let pipeline = build_pipeline(config)?;
    let report = pipeline.run().await?;

    println!(
        "\nTOP {} Global AI Buzz (last {} hours)",
        report.ranked_count, window_hours
    );
    let top_list = trendscope::export::read_artifact(&report.artifact_path)?;
    for (position, trend) in top_list.iter().enumerate() {
        println!("{}. {}", position + 1, trend.query);
        println!(
            "   {} | Vol: {} | AI score: {:.2} | Final: {:.2}",
            trend.geo, trend.search_volume, trend.semantic_score, trend.final_score
        );
    }
    println!("\nArtifact: {}", report.artifact_path.display());
    if let Some(url) = &report.public_url {
        println!("Public URL: {url}");
    }

    Ok(())
}


async fn serve(config: Arc<Config>) -> Result<()> {
    let pipeline = Arc::new(build_pipeline(config.clone())?);
    let server = TriggerServer::new(config, pipeline);

    server
        .start_with_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}
