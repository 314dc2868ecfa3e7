use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use smali_patcher::config::{find_settings, Overrides, Settings};
use smali_patcher::experimental::ExperimentalSet;
use smali_patcher::report::{Level, ReportLine, RunReport};
use smali_patcher::{load_pairs, run, status, ApplyOptions, PairStatus, RunError};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "smali-patcher")]
#[command(about = "Apply literal snippet patches to a decompiled smali tree", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (defaults to ./smali-patcher.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Root of the decompiled tree [env: SMALI_PATCHER_TARGET_DIR]
    #[arg(short, long, global = true)]
    target_dir: Option<PathBuf>,

    /// Directory holding original/ and patched/ snippets [env: SMALI_PATCHER_PATCHES_DIR]
    #[arg(short, long, global = true)]
    patches_dir: Option<PathBuf>,

    /// Include experimental patches: 1, true, yes, y or on [env: ENABLE_EXPERIMENTAL_PATCHES]
    #[arg(short, long, global = true, value_name = "BOOL")]
    experimental: Option<String>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply snippet pairs to the target tree (default)
    Apply {
        /// Dry run - compute changes without writing files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which pairs are pending, applied or missing without writing
    Status {
        /// Print the status report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List loaded snippet pairs
    List {
        /// Print the pair list as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => log::LevelFilter::Error,
        (false, 0) => log::LevelFilter::Warn,
        (false, 1) => log::LevelFilter::Info,
        (false, 2) => log::LevelFilter::Debug,
        (false, _) => log::LevelFilter::Trace,
    };
    // RUST_LOG, when set, overrides the flags
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env(env_logger::Env::default())
        .init();

    let settings = resolve_settings(&cli)?;
    let experimental = ExperimentalSet::builtin();

    match cli.command.unwrap_or(Commands::Apply {
        dry_run: false,
        diff: false,
        json: false,
    }) {
        Commands::Apply {
            dry_run,
            diff,
            json,
        } => cmd_apply(&settings, &experimental, dry_run, diff, json),

        Commands::Status { json } => cmd_status(&settings, &experimental, json),

        Commands::List { json } => cmd_list(&settings, &experimental, json),
    }
}

/// Settings file, then environment, then command line.
fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let file = find_settings(cli.config.as_deref(), Path::new("."))?;

    let overrides = Overrides {
        target_dir: cli.target_dir.clone(),
        patches_dir: cli.patches_dir.clone(),
        experimental: cli.experimental.clone(),
    };

    Ok(Settings::resolve(file.as_ref(), &overrides, |key| {
        env::var(key).ok()
    }))
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn print_line(line: &ReportLine) {
    match line.level {
        Level::Info => println!("{}", line),
        Level::Warning => eprintln!("{}", line.to_string().yellow()),
        Level::Error => eprintln!("{}", line.to_string().red()),
    }
}

fn print_summary(report: &RunReport) {
    let outcome = &report.outcome;
    let v = &report.validation;

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} files scanned", outcome.files_scanned);
    println!(
        "  {} files {}",
        format!("{}", outcome.files_modified).green(),
        if report.dry_run { "would change" } else { "modified" }
    );
    println!(
        "  {} patches applied",
        format!("{}", outcome.total_applications).green()
    );
    println!(
        "  {} unused pairs",
        format!("{}", report.unused_pairs.len()).yellow()
    );
    println!(
        "  {} orphan / {} missing / {} empty snippets",
        format!("{}", v.orphan_patched.len()).yellow(),
        format!("{}", v.missing_patched.len()).yellow(),
        format!("{}", v.empty_original.len()).yellow()
    );
    println!(
        "  {} errors",
        format!(
            "{}",
            v.read_errors.len() + outcome.read_failures.len()
        )
        .red()
    );
}

fn cmd_apply(
    settings: &Settings,
    experimental: &ExperimentalSet,
    dry_run: bool,
    show_diff: bool,
    json: bool,
) -> Result<()> {
    if !json {
        println!("Target: {}", settings.target_dir.display());
        println!("Snippets: {}", settings.patches_dir.display());
        if dry_run {
            println!("{}", "[DRY RUN - no files will be written]".cyan());
        }
        println!();
    }

    let options = ApplyOptions {
        dry_run,
        keep_changes: show_diff,
    };

    let report = match run(settings, experimental, &options) {
        Ok(report) => report,
        Err(RunError::Apply(err)) => {
            eprintln!("{} {}", "✗".red(), err);
            eprintln!(
                "  {}",
                "Aborted: the target tree may now be partially patched".red()
            );
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in report.lines() {
            print_line(&line);
        }
        if show_diff {
            for change in &report.outcome.changes {
                display_diff(&change.path, &change.before, &change.after);
            }
        }
        print_summary(&report);
    }

    if !report.is_success() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_status(settings: &Settings, experimental: &ExperimentalSet, json: bool) -> Result<()> {
    let report = status(settings, experimental)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Patch Status Report".bold());
    println!("Target: {}", settings.target_dir.display());
    println!();

    let mut pending = Vec::new();
    let mut applied = Vec::new();
    let mut missing = Vec::new();

    for (name, state) in &report.pairs {
        match state {
            PairStatus::Pending { files } => pending.push((name, *files)),
            PairStatus::Applied { files } => applied.push((name, *files)),
            PairStatus::Missing => missing.push(name),
        }
    }

    if !applied.is_empty() {
        println!(
            "{} {} ({} pairs)",
            "✓".green(),
            "APPLIED".green().bold(),
            applied.len()
        );
        for (name, files) in &applied {
            println!("  - {} ({})", name, format!("{files} file(s)").dimmed());
        }
        println!();
    }

    if !pending.is_empty() {
        println!(
            "{} {} ({} pairs)",
            "⊙".yellow(),
            "PENDING".yellow().bold(),
            pending.len()
        );
        for (name, files) in &pending {
            println!("  - {} ({})", name, format!("{files} file(s)").dimmed());
        }
        println!();
    }

    if !missing.is_empty() {
        println!(
            "{} {} ({} pairs)",
            "✗".red(),
            "MISSING".red().bold(),
            missing.len()
        );
        for name in &missing {
            println!("  - {}", name);
        }
        println!();
    }

    for failure in &report.read_failures {
        eprintln!(
            "{}",
            format!(
                "Warning: could not read {}: {}",
                failure.path.display(),
                failure.message
            )
            .yellow()
        );
    }

    Ok(())
}

#[derive(Serialize)]
struct ListEntry<'a> {
    name: &'a str,
    experimental: bool,
    deletion: bool,
    fingerprint: String,
}

fn cmd_list(settings: &Settings, experimental: &ExperimentalSet, json: bool) -> Result<()> {
    let loaded = load_pairs(
        &settings.original_dir(),
        &settings.patched_dir(),
        &settings.snippet_extension,
    )?;

    let entries: Vec<ListEntry<'_>> = loaded
        .pairs
        .iter()
        .map(|pair| ListEntry {
            name: pair.name(),
            experimental: experimental.contains(pair.name()),
            deletion: pair.is_deletion(),
            fingerprint: pair.fingerprint().to_string(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{} ({} pairs)", "Snippet pairs".bold(), entries.len());
    for entry in &entries {
        let mut tags = Vec::new();
        if entry.experimental {
            tags.push("experimental".cyan().to_string());
        }
        if entry.deletion {
            tags.push("deletion".yellow().to_string());
        }
        let tags = if tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", tags.join(", "))
        };
        println!(
            "  {}{} {}",
            entry.name,
            tags,
            entry.fingerprint.dimmed()
        );
    }

    if !loaded.report.is_clean() {
        println!();
        println!(
            "{}",
            "Some snippets were skipped; run `apply --dry-run` for details".yellow()
        );
    }

    Ok(())
}
