//! CrowdTally - crowd-test result statistics
//!
//! A CLI tool that reads the ballots voters submitted for AI-generated
//! model photo variants and writes text, CSV and JSON statistics reports.
//!
//! Exit codes:
//!   0 - Success (including runs that found no submission files)
//!   1 - Runtime error (bad config, unwritable output directory, etc.)

mod analysis;
mod app;
mod cli;
mod config;
mod loader;
mod models;
mod report;

use anyhow::{Context, Result};
use app::RunOutcome;
use chrono::Local;
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use loader::{LoadError, SubmissionLoader};
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // The config file can turn on verbose logging, so it is read first
    let config = match load_config(&args) {
        Ok(mut config) => {
            config.merge_with_args(&args);
            config
        }
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(args.log_level(config.general.verbose));

    info!("CrowdTally v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!(
        "Input directories: {:?}, output directory: {}",
        config.input_directories(),
        config.output_directory().display()
    );

    match run(&args, &config) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Statistics run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .crowdtally.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to point at your results and statistics directories.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load, aggregate and report.
fn run(args: &Args, config: &Config) -> Result<()> {
    if args.dry_run {
        handle_dry_run(&SubmissionLoader::new(config.input.sources.clone()));
        return Ok(());
    }

    println!("{}", "=".repeat(50));
    println!("  众测结果统计工具");
    println!("{}", "=".repeat(50));
    println!();

    println!("正在加载结果文件...");
    match app::run(config, Local::now())? {
        RunOutcome::NoSubmissions { skipped } => {
            print_skipped(&skipped);
            print_guidance(config);
        }
        RunOutcome::Completed {
            loaded,
            skipped,
            aggregate,
            written,
        } => {
            println!("  找到 {} 个结果文件", loaded);
            print_skipped(&skipped);
            println!(
                "  参与用户 {} 人, 有效评测 {} 条",
                aggregate.total_voters, aggregate.total_evaluations
            );

            if config.general.print_report {
                println!();
                println!("{}", written.text_report);
            }

            println!("\n✓ 报告已保存: {}", written.report_path.display());
            println!("✓ CSV 详细记录已保存: {}", written.csv_path.display());
            println!("✓ JSON 汇总已保存: {}", written.json_path.display());
        }
    }

    Ok(())
}

fn print_skipped(skipped: &[LoadError]) {
    if skipped.is_empty() {
        return;
    }
    println!("  跳过 {} 个无法解析的文件:", skipped.len());
    for e in skipped {
        println!("    {}", e.path().display());
    }
}

/// Handle --dry-run: list matching files, load nothing.
fn handle_dry_run(loader: &SubmissionLoader) {
    println!("\n🔍 Dry run: scanning submission sources...\n");

    for source in loader.sources() {
        println!("   {} ({})", source.path.display(), source.pattern());
    }

    let files = loader.scan();
    if files.is_empty() {
        println!("\n   No submission files found.");
    } else {
        println!("\n   Found {} files that would be loaded:\n", files.len());
        for file in &files {
            println!("     📄 {}", file.display());
        }
    }

    println!("\n✅ Dry run complete. No reports were written.");
}

/// Tell the user where submission files are expected.
fn print_guidance(config: &Config) {
    println!("\n没有找到任何结果文件！");
    for source in &config.input.sources {
        println!(
            "请将结果文件 ({}) 放入: {}",
            source.pattern(),
            source.path.display()
        );
    }
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems go straight to stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Ignoring {}: {:#}", DEFAULT_CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}
