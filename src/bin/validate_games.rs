//! Validate game definition files
//!
//! Accepts files or directories (every `*.json` inside is checked). Exits with
//! status 1 when any file has errors; warnings alone do not fail the run.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use proposal_cards::game::definition_validation::{validate_game_file, ValidationReport};

#[derive(Parser, Debug)]
#[command(name = "validate-games", about = "Check game definition JSON files")]
struct Args {
    /// Game files or directories
    #[arg(default_value = "data/games")]
    paths: Vec<PathBuf>,

    /// Print warnings as well as errors
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let pattern = path.join("*.json");
            match glob::glob(&pattern.to_string_lossy()) {
                Ok(entries) => files.extend(entries.filter_map(Result::ok)),
                Err(e) => eprintln!("❌ Bad path pattern {}: {}", pattern.display(), e),
            }
        } else {
            files.push(path.clone());
        }
    }
    files.sort();
    files
}

fn print_report(path: &Path, report: &ValidationReport, verbose: bool) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📁 {}", path.display());

    for error in &report.errors {
        println!("   ❌ {}", error);
    }
    if verbose || report.errors.is_empty() {
        for warning in &report.warnings {
            println!("   ⚠️  {}", warning);
        }
    }

    if report.is_valid() {
        println!("   ✅ valid ({} warnings)", report.warnings.len());
    } else {
        println!(
            "   ❌ {} errors, {} warnings",
            report.errors.len(),
            report.warnings.len()
        );
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let files = collect_files(&args.paths);

    if files.is_empty() {
        eprintln!("No game files found");
        return ExitCode::FAILURE;
    }

    let mut failed = 0;
    for file in &files {
        let report = validate_game_file(file);
        print_report(file, &report, args.verbose);
        if !report.is_valid() {
            failed += 1;
        }
    }

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Checked {} files: {} passed, {} failed", files.len(), files.len() - failed, failed);

    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
