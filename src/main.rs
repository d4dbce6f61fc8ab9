//! lfiprobe - endpoint discovery and LFI probing CLI

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing_subscriber::EnvFilter;
use url::Url;

use lfiprobe::config::{self, CliOverrides};
use lfiprobe::crawler::EndpointCrawler;
use lfiprobe::http::HttpClient;
use lfiprobe::models::{Detection, EndpointInfo, ScanConfig, ScanSummary};
use lfiprobe::report;
use lfiprobe::scanner::payloads;
use lfiprobe::scanner::progress::ScanProgress;
use lfiprobe::scanner::wordlist::{WordlistCache, WordlistSource};
use lfiprobe::scanner::{ScanEngine, ScanOptions};

/// lfiprobe - endpoint discovery and heuristic LFI probing
#[derive(Parser)]
#[command(name = "lfiprobe", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe a URL's query parameters for Local File Inclusion
    Scan {
        /// Target URL (absolute http/https)
        #[arg(short, long)]
        target: String,

        /// Parameter(s) to test; defaults to the query keys on the target
        #[arg(short, long, value_delimiter = ',')]
        param: Option<Vec<String>>,

        /// Payload categories (comma-separated, default: all)
        #[arg(long, value_delimiter = ',')]
        categories: Option<Vec<String>>,

        /// Maximum payloads per parameter (50-5000)
        #[arg(long)]
        max_payloads: Option<usize>,

        /// Extra wordlist: file path or http(s) URL
        #[arg(short, long)]
        wordlist: Option<String>,

        /// Baseline request timeout in milliseconds
        #[arg(long)]
        baseline_timeout: Option<u64>,

        /// Per-probe timeout in milliseconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Relative body length change flagged as POSSIBLE_LFI
        #[arg(long)]
        threshold: Option<f64>,

        /// Probes in flight at once
        #[arg(long)]
        concurrency: Option<usize>,

        /// Output file path
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (text, csv, or json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Exit with code 1 if any probe is flagged
        #[arg(long)]
        fail_on_findings: bool,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// HTTP/HTTPS proxy URL
        #[arg(long)]
        proxy: Option<String>,

        /// Max requests per second
        #[arg(long)]
        rate_limit: Option<u32>,

        /// Custom headers (format: "Key: Value")
        #[arg(short = 'H', long)]
        header: Option<Vec<String>>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Extract candidate endpoints from a page and its scripts
    Endpoints {
        /// Page URL to crawl
        #[arg(short, long)]
        url: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (text, csv, or json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Request timeout in milliseconds
        #[arg(long, default_value_t = 8000)]
        timeout: u64,

        /// Custom headers (format: "Key: Value")
        #[arg(short = 'H', long)]
        header: Option<Vec<String>>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the built-in payload categories
    Payloads {
        /// Print every payload of every category
        #[arg(long)]
        all: bool,
    },

    /// Render a report from a previous scan's JSON output
    Report {
        /// Path to the JSON results file
        #[arg(short, long)]
        input: PathBuf,

        /// Output format (text or csv)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: String,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "lfiprobe=debug" } else { "lfiprobe=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();
}

fn output_name_from_target(target: &str, ext: &str) -> String {
    if let Ok(url) = Url::parse(target) {
        let host = url.host_str().unwrap_or("unknown");
        let sanitized: String = host
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect();
        format!("lfiprobe_{sanitized}.{ext}")
    } else {
        format!("lfiprobe_report.{ext}")
    }
}

fn extension_for(format: &str) -> &'static str {
    match format {
        "csv" => "csv",
        "json" => "json",
        _ => "txt",
    }
}

fn print_banner() {
    let banner = r#"
    +---------------------------------------+
    |  lfiprobe v0.1.0                      |
    |  Endpoint discovery & LFI probing     |
    +---------------------------------------+
    "#;
    println!("{}", banner.cyan());
}

fn print_summary(summary: &ScanSummary) {
    println!("\n{}", "  Scan Summary".bold());
    println!("  {}", "─".repeat(35));

    let mut builder = Builder::default();
    builder.push_record(["Parameter", "Original", "Tests", "Vulnerable"]);
    for p in &summary.parameters {
        builder.push_record([
            p.name.clone(),
            p.original_value.clone().unwrap_or_else(|| "-".to_string()),
            p.total_tests.to_string(),
            p.vulnerable_count.to_string(),
        ]);
    }
    builder.push_record([
        "Total".to_string(),
        String::new(),
        summary.total_tests.to_string(),
        summary.vulnerable_count.to_string(),
    ]);

    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{table}");

    println!(
        "\n  {} {} {} {}",
        format!("{} Confirmed", summary.count_by_detection(Detection::ConfirmedLfi))
            .red()
            .bold(),
        format!("{} Possible", summary.count_by_detection(Detection::PossibleLfi)).yellow(),
        format!("{} Suspicious", summary.count_by_detection(Detection::Suspicious)).blue(),
        format!("{} failed probes", summary.failed_count()).white(),
    );

    for r in summary.findings().filter(|r| r.detection == Detection::ConfirmedLfi) {
        println!(
            "  {} {} = {} [{}]",
            "!".red().bold(),
            r.parameter.bold(),
            r.payload,
            r.indicators.join(", ")
        );
    }
}

fn write_scan_report(summary: &ScanSummary, format: &str, path: &Path) -> lfiprobe::error::Result<()> {
    match format {
        "csv" => report::csv::export(summary, path),
        "json" => report::json::export(summary, path),
        _ => report::text::export(summary, path),
    }
}

fn write_endpoint_report(endpoints: &[EndpointInfo], format: &str, path: &Path) -> lfiprobe::error::Result<()> {
    match format {
        "csv" => report::csv::export_endpoints(endpoints, path),
        "json" => report::json::export_endpoints(endpoints, path),
        _ => report::text::export_endpoints(endpoints, path),
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            target,
            param,
            categories,
            max_payloads,
            wordlist,
            baseline_timeout,
            timeout,
            threshold,
            concurrency,
            output,
            format,
            fail_on_findings,
            config: config_path,
            proxy,
            rate_limit,
            header,
            verbose,
        } => {
            init_tracing(verbose);
            print_banner();

            let mut scan_config = if let Some(ref path) = config_path {
                config::load_config(path)?
            } else {
                let default_path = Path::new("config/default.toml");
                if default_path.exists() {
                    config::load_config(default_path)?
                } else {
                    ScanConfig::default()
                }
            };

            config::merge_cli_args(
                &mut scan_config,
                target,
                CliOverrides {
                    parameters: param,
                    categories,
                    max_payloads,
                    wordlist,
                    baseline_timeout_ms: baseline_timeout,
                    request_timeout_ms: timeout,
                    length_delta_threshold: threshold,
                    concurrency,
                    proxy,
                    rate_limit,
                    headers: header,
                },
            )?;

            println!("  {} {}", "Target:".bold(), scan_config.target.green());
            if !scan_config.parameters.is_empty() {
                println!(
                    "  {} {}",
                    "Parameters:".bold(),
                    scan_config.parameters.join(", ").cyan()
                );
            }

            let client = HttpClient::from_config(&scan_config)?;

            let pb = ProgressBar::new(0);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  {spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            );
            let progress = Arc::new(ScanProgress::with_bar(pb));

            let engine =
                ScanEngine::new(client, ScanOptions::from(&scan_config)).with_progress(progress);

            let cache = WordlistCache::new();
            let source = scan_config.wordlist.as_deref().map(WordlistSource::parse);
            let payload_list = engine
                .prepare_payloads(
                    &scan_config.categories,
                    source.as_ref().map(|s| (s, &cache)),
                    scan_config.max_payloads,
                )
                .await;
            println!(
                "  {} {}\n",
                "Payloads:".bold(),
                payload_list.len().to_string().cyan()
            );

            let summary = engine
                .run(&scan_config.target, &scan_config.parameters, &payload_list)
                .await?;

            print_summary(&summary);

            let output_file = output
                .unwrap_or_else(|| output_name_from_target(&scan_config.target, extension_for(&format)));
            write_scan_report(&summary, &format, Path::new(&output_file))?;
            println!("\n  {} {}", "Report saved to:".bold(), output_file.green());
            println!(
                "  {} {}",
                "Requests sent:".bold(),
                engine.fetcher().request_count().to_string().cyan()
            );

            if fail_on_findings && summary.vulnerable_count > 0 {
                println!(
                    "\n  {} {} probe(s) flagged.",
                    "FAIL:".red().bold(),
                    summary.vulnerable_count
                );
                std::process::exit(1);
            }
        }

        Commands::Endpoints {
            url,
            output,
            format,
            timeout,
            header,
            verbose,
        } => {
            init_tracing(verbose);
            print_banner();

            let mut scan_config = ScanConfig::default();
            config::merge_cli_args(
                &mut scan_config,
                url.clone(),
                CliOverrides {
                    request_timeout_ms: Some(timeout),
                    baseline_timeout_ms: Some(timeout),
                    headers: header,
                    ..CliOverrides::default()
                },
            )?;

            let client = HttpClient::from_config(&scan_config)?;
            let crawler = EndpointCrawler::new(
                &client,
                Duration::from_millis(timeout),
                scan_config.concurrency,
            );
            let endpoints = crawler.crawl(&url).await?;

            match output {
                Some(ref path) => {
                    write_endpoint_report(&endpoints, &format, Path::new(path))?;
                    println!("\n  {} {}", "Endpoints saved to:".bold(), path.green());
                }
                None => {
                    let mut builder = Builder::default();
                    builder.push_record(["Method", "Type", "URL", "Source"]);
                    for e in &endpoints {
                        builder.push_record([
                            e.method.clone().unwrap_or_else(|| "-".to_string()),
                            e.kind.to_string(),
                            e.url.clone(),
                            e.source.clone(),
                        ]);
                    }
                    let mut table = builder.build();
                    table.with(Style::rounded());
                    println!("{table}");
                    println!("\n  {} {}", "Endpoints:".bold(), endpoints.len().to_string().cyan());
                }
            }
        }

        Commands::Payloads { all } => {
            print_banner();

            let mut builder = Builder::default();
            builder.push_record(["Id", "Label", "Payloads", "Description"]);
            for category in payloads::categories() {
                builder.push_record([
                    category.id.to_string(),
                    category.label.to_string(),
                    category.payloads.len().to_string(),
                    category.description.to_string(),
                ]);
            }
            let mut table = builder.build();
            table.with(Style::rounded());
            println!("{table}");

            if all {
                for category in payloads::categories() {
                    println!("\n  {}", category.label.bold().cyan());
                    for p in category.payloads {
                        println!("    {p}");
                    }
                }
            }
        }

        Commands::Report {
            input,
            format,
            output,
        } => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("lfiprobe=info"))
                .with_target(false)
                .init();

            print_banner();

            let summary = report::json::load(&input)?;
            write_scan_report(&summary, &format, Path::new(&output))?;

            print_summary(&summary);
            println!("\n  {} {}", "Report saved to:".bold(), output.green());
        }
    }

    Ok(())
}
