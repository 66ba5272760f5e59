//! Split Leakage Check Tool
//!
//! Checks the label tables written by split / k-fold tools before a model is
//! trained on them.
//!
//! # Usage
//!
//! ```bash
//! # Train + validation vs test split
//! check_leakage data/labels_lists
//!
//! # Train vs validation, 5 folds
//! check_leakage data/labels_lists/train --n-splits 5
//!
//! # Tables described by a manifest, JSON report for CI
//! check_leakage --manifest splits.toml --json-report leakage.json
//!
//! # Generate sample config
//! check_leakage --generate-config leakage.toml
//! ```
//!
//! # Exit Codes
//!
//! - `0`: every check passed
//! - `1`: at least one check failed
//! - `2`: the run could not start (bad root, config or manifest)

use clap::Parser;
use leakage_checker::{
    CheckerConfig, ConsoleReporter, LeakageSuite, Manifest, SuiteMode, SuiteReport, SuiteResult,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "check_leakage")]
#[command(about = "Check train/validation/test label tables for data leakage")]
#[command(version)]
struct Cli {
    /// Directory holding the split tables
    #[arg(required_unless_present_any = ["manifest", "generate_config"])]
    root: Option<PathBuf>,

    /// Number of cross-validation folds (0 = single train/test split)
    #[arg(short = 'n', long, default_value = "0")]
    n_splits: usize,

    /// Evaluation partition paired with train ("test" or "validation")
    #[arg(short, long)]
    subset_name: Option<String>,

    /// Checker configuration (TOML, or JSON with a .json extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Table manifest (TOML) listing each table's role
    #[arg(short, long, conflicts_with = "root")]
    manifest: Option<PathBuf>,

    /// Write a JSON report to this path
    #[arg(long)]
    json_report: Option<PathBuf>,

    /// Fail when the number of folds found differs from --n-splits
    #[arg(long)]
    strict_fold_count: bool,

    /// Only print checks that did not pass
    #[arg(short, long)]
    quiet: bool,

    /// Write a sample configuration file and exit
    #[arg(long, value_name = "PATH")]
    generate_config: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    if let Some(path) = &cli.generate_config {
        return generate_sample_config(path);
    }

    match run(&cli) {
        Ok(result) if result.is_clean() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            eprintln!("❌ {e}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<SuiteResult, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) if path.extension().is_some_and(|e| e == "json") => {
            CheckerConfig::load_json(path)?
        }
        Some(path) => CheckerConfig::load_toml(path)?,
        None => CheckerConfig::default(),
    };
    if let Some(subset) = &cli.subset_name {
        config = config.with_subset_name(subset);
    }
    if cli.strict_fold_count {
        config = config.with_strict_fold_count(true);
    }

    let reporter = if cli.quiet {
        ConsoleReporter::new().quiet()
    } else {
        ConsoleReporter::new()
    };
    let suite = LeakageSuite::new(config).with_observer(Box::new(reporter));

    if let Some(manifest_path) = &cli.manifest {
        let mut manifest = Manifest::load_toml(manifest_path)?;
        if cli.n_splits > 0 {
            manifest = manifest.with_fold_count(cli.n_splits);
        }
        println!("Checking tables listed in {}", manifest_path.display());
        println!();

        let result = suite.run_manifest(&manifest)?;
        if let Some(report_path) = &cli.json_report {
            SuiteReport::for_manifest(manifest_path, manifest.fold_count, &result)
                .save_json(report_path)?;
        }
        return Ok(result);
    }

    let root = cli.root.as_ref().ok_or("a root directory or --manifest is required")?;
    let mode = SuiteMode::from_fold_count(cli.n_splits);
    println!("Checking {} ({mode})", root.display());
    println!();

    let result = suite.run(root, mode)?;
    if let Some(report_path) = &cli.json_report {
        SuiteReport::new(root, mode, &result).save_json(report_path)?;
        println!("Report written to {}", report_path.display());
    }
    Ok(result)
}

/// Write a configuration file with every field at its default.
fn generate_sample_config(path: &Path) -> ExitCode {
    match CheckerConfig::default().save_toml(path) {
        Ok(()) => {
            println!("✅ Generated sample config: {}", path.display());
            println!("\nEdit the following fields if needed:");
            println!("  - schema.subject_column / schema.session_column: identifier columns");
            println!("  - subset_name: evaluation partition (test or validation)");
            println!("  - subcategories: parent labels and their sub-labels");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error generating config: {e}");
            ExitCode::from(2)
        }
    }
}
