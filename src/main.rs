//! # pagecompare CLI
//!
//! Command-line entry point for the page structure comparison.
//!
//! ## Key Components
//!
//! - CLI argument parsing with clap
//! - `analyze`: run one keyword and print or save the report
//! - `serve`: start the local web interface
//!
//! The SerpAPI key is read once at startup from `SERPAPI_KEY`, after loading
//! a `.env` file if one exists. `SERPAPI_BASE_URL` points the client at a
//! different API host.

mod telemetry;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pagecompare::config::{
    API_KEY_ENV, AnalyzerConfig, ApiKey, BASE_URL_ENV, default_exclude_selectors,
    default_technology_keywords,
};
use pagecompare::pipeline::{DefaultPipeline, PageProgress};
use pagecompare::report::{ReportFormat, render};
use pagecompare::web::{self, AppState};
use telemetry::OtelGuard;
use tokio::sync::mpsc;
use tracing::{info, instrument};

#[derive(Parser)]
#[command(author, version, about = "Compare the structure of the pages ranking for a keyword", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze the pages ranking for a keyword
    Analyze(AnalyzeArgs),

    /// Start the local web interface
    Serve(ServeArgs),
}

/// Settings shared by every run
#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Number of ranked results to compare
    #[arg(short = 'n', long, default_value = "10")]
    num_results: usize,

    /// Search location, e.g. "Dallas, Texas, United States"
    #[arg(short, long)]
    location: Option<String>,

    /// Timeout per page in seconds
    #[arg(short, long, default_value = "10")]
    timeout: u64,

    /// Number of pages downloaded at once
    #[arg(short, long, default_value = "1")]
    concurrency: usize,

    /// Delay between page downloads in milliseconds
    #[arg(short, long, default_value = "0")]
    rate: u64,

    /// CSS selectors left out of the word count (comma-separated)
    #[arg(short, long)]
    exclude: Option<String>,

    /// Technology names to look for on each page (comma-separated)
    #[arg(long)]
    technologies: Option<String>,
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl RunArgs {
    fn to_config(&self) -> AnalyzerConfig {
        let mut builder = AnalyzerConfig::builder()
            .num_results(self.num_results)
            .location(self.location.clone())
            .page_timeout_secs(self.timeout)
            .concurrency(self.concurrency)
            .rate_limit_ms(self.rate)
            .exclude_selectors(
                self.exclude
                    .as_deref()
                    .map(split_list)
                    .unwrap_or_else(default_exclude_selectors),
            )
            .technology_keywords(
                self.technologies
                    .as_deref()
                    .map(split_list)
                    .unwrap_or_else(default_technology_keywords),
            );

        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            builder = builder.serp_base_url(base_url);
        }

        builder.build()
    }
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Keyword to search for
    #[arg(required = true)]
    keyword: String,

    /// Output format
    #[arg(short, long, value_enum, ignore_case = true, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    #[command(flatten)]
    run: RunArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _otel: OtelGuard = telemetry::init_tracing_subscriber();

    let api_key = std::env::var(API_KEY_ENV).ok();

    match cli.command {
        Commands::Analyze(args) => analyze_command(args, api_key).await?,
        Commands::Serve(args) => serve_command(args, api_key).await?,
    }

    Ok(())
}

#[instrument(skip(api_key))]
async fn analyze_command(args: AnalyzeArgs, api_key: Option<String>) -> anyhow::Result<()> {
    let api_key = ApiKey::from_option(api_key)?;
    let format = args.format;
    let config = args.run.to_config();

    let pipeline = DefaultPipeline::from_config(api_key, &config)?;

    // Create a channel for progress updates
    let (progress_sender, mut progress_receiver) = mpsc::channel::<PageProgress>(100);

    let progress_bar = ProgressBar::new(config.num_results as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );
    progress_bar.set_message(format!("Searching for \"{}\"...", args.keyword));

    let progress_handle = tokio::spawn({
        let progress_bar = progress_bar.clone();
        async move {
            while let Some(progress) = progress_receiver.recv().await {
                // The search may return fewer pages than were asked for
                progress_bar.set_length(progress.total as u64);
                progress_bar.inc(1);
                let status = match &progress.error {
                    Some(error) => format!("failed: {error}"),
                    None => "loaded".to_string(),
                };
                progress_bar.set_message(format!("#{} {} {}", progress.rank, progress.url, status));
            }
            progress_bar.finish_and_clear();
        }
    });

    let start_time = std::time::Instant::now();
    let report = pipeline
        .with_progress(progress_sender)
        .run(&args.keyword)
        .await;

    // The progress task ends once the pipeline and its sender are dropped
    let _ = progress_handle.await;
    let report = report?;

    info!(
        "Analyzed {} pages in {:.2?}",
        report.rows.len(),
        start_time.elapsed()
    );

    let rendered = render(&report, format)?;
    match args.output {
        Some(path) => {
            tokio::fs::write(&path, rendered)
                .await
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("Saved {} report to {}", format, path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

#[instrument(skip(api_key))]
async fn serve_command(args: ServeArgs, api_key: Option<String>) -> anyhow::Result<()> {
    if ApiKey::from_option(api_key.clone()).is_err() {
        eprintln!("Warning: {API_KEY_ENV} is not set; every analysis will fail until it is.");
    }

    let state = AppState {
        config: args.run.to_config(),
        api_key,
    };

    let addr = format!("{}:{}", args.host, args.port);
    web::serve(&addr, state).await?;

    Ok(())
}
