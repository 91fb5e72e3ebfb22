use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::json;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};
use udiff_patcher::config::{self, DefaultLineEnding};
use udiff_patcher::{
    run_patches, ApplyError, FileOutcome, FilePatch, FileReport, PatchParser, RunError,
    RunOptions, RunSummary,
};
use walkdir::WalkDir;

mod logging;

#[derive(Parser)]
#[command(name = "udiff-patcher")]
#[command(about = "Apply unified diffs to numbered copies of the originals", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply patch files, writing each result beside its original
    Apply {
        /// Patch files, or directories holding *.patch / *.diff files
        #[arg(required = true)]
        patches: Vec<PathBuf>,

        /// Directory the paths inside the patches are relative to
        #[arg(short, long, default_value = ".")]
        base_dir: PathBuf,

        /// Dry run - show what would be written without creating files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Trace every hunk and list context lines that did not match
        #[arg(short, long)]
        verbose: bool,

        /// Show a diff of original vs patched content
        #[arg(short, long)]
        diff: bool,

        /// Print per-file results and the summary as JSON
        #[arg(long)]
        json: bool,

        /// Fail on unprefixed lines, context mismatches and bad hunk counts
        #[arg(long)]
        strict: bool,

        /// Line ending for originals that contain no line terminator
        #[arg(long, value_enum)]
        line_ending: Option<DefaultLineEnding>,

        /// Config file (otherwise UDIFF_PATCHER_CONFIG or <base-dir>/.udiff-patcher.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also write logs to this file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// List the file patches and hunks in patch files
    List {
        /// Patch files, or directories holding *.patch / *.diff files
        #[arg(required = true)]
        patches: Vec<PathBuf>,
    },
}

struct ApplyArgs {
    patches: Vec<PathBuf>,
    base_dir: PathBuf,
    dry_run: bool,
    verbose: bool,
    diff: bool,
    json: bool,
    strict: bool,
    line_ending: Option<DefaultLineEnding>,
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            patches,
            base_dir,
            dry_run,
            verbose,
            diff,
            json,
            strict,
            line_ending,
            config,
            log_file,
        } => {
            logging::init_logging(verbose, log_file.as_deref())?;
            cmd_apply(ApplyArgs {
                patches,
                base_dir,
                dry_run,
                verbose,
                diff,
                json,
                strict,
                line_ending,
                config,
            })
        }

        Commands::List { patches } => {
            logging::init_logging(false, None)?;
            cmd_list(&patches)
        }
    }
}

/// Expand patch arguments: files are taken as given, directories are
/// scanned one level deep for `.patch` and `.diff` files.
fn discover_patch_files(args: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for arg in args {
        if !arg.is_dir() {
            files.push(arg.clone());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(arg).max_depth(1) {
            let entry = entry?;
            let ext = entry.path().extension().and_then(|s| s.to_str());
            if entry.file_type().is_file() && matches!(ext, Some("patch" | "diff")) {
                found.push(entry.path().to_path_buf());
            }
        }
        found.sort();
        files.extend(found);
    }

    if files.is_empty() {
        anyhow::bail!("No .patch or .diff files found in the given paths");
    }

    Ok(files)
}

fn parse_patch_file(path: &Path, parser: &PatchParser) -> Result<Vec<FilePatch>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read patch {}", path.display()))?;
    parser
        .parse(&text)
        .with_context(|| format!("failed to parse patch {}", path.display()))
}

/// Helper: Show unified diff between original and patched content
fn display_diff(file: &Path, original: &str, patched: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, patched);

    for change in diff.iter_all_changes() {
        let line = change.value().trim_end_matches(['\r', '\n']);
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{line}").red(),
            ChangeTag::Insert => format!("+{line}").green(),
            ChangeTag::Equal => format!(" {line}").normal(),
        };
        println!("{sign}");
    }
}

fn report_file(report: &FileReport, verbose: bool, show_diff: bool) {
    let original = report.original.display();

    match &report.outcome {
        Ok(outcome) => {
            let file = outcome.file();
            let verb = match outcome {
                FileOutcome::Patched(_) => "Wrote",
                FileOutcome::Previewed(_) => "Would create",
            };
            println!(
                "{} {}: {} {} [line ending: {}]",
                "✓".green(),
                original,
                verb,
                file.output.display(),
                file.line_ending.name()
            );
            if file.line_ending != file.patch_line_ending {
                println!(
                    "  {}",
                    format!(
                        "Patch uses {}, output follows the original",
                        file.patch_line_ending.name()
                    )
                    .dimmed()
                );
            }
            // Mismatches were tolerated; they are diagnostics only.
            if verbose && !file.mismatches.is_empty() {
                println!(
                    "  {}",
                    format!("{} context line(s) did not match", file.mismatches.len()).yellow()
                );
                for mismatch in &file.mismatches {
                    println!(
                        "    line {}: expected {:?}, found {:?}",
                        mismatch.line, mismatch.expected, mismatch.found
                    );
                }
            }
            if show_diff {
                display_diff(&report.original, &file.before, &file.after);
            }
        }
        Err(e) if e.is_skip() => {
            println!("{} {}: Skipped (original file not found)", "⊘".cyan(), original);
        }
        Err(e) => {
            eprintln!("{} {}: Error - {}", "✗".red(), original, e);

            if let RunError::Apply {
                source: ApplyError::OutOfRange { old_count, file_len, .. },
                ..
            } = e
            {
                eprintln!("  {}", "CONFLICT: Hunk lies outside the file".red());
                eprintln!("  File has {file_len} lines, hunk replaces {old_count}");
                eprintln!("  Possible causes:");
                eprintln!("    - Patch was made against a different version of the file");
                eprintln!("    - An earlier hunk in the patch has wrong line counts");
            }
        }
    }
}

fn cmd_apply(args: ApplyArgs) -> Result<()> {
    // 1. Resolve base directory and configuration
    let base_dir = args
        .base_dir
        .canonicalize()
        .with_context(|| format!("base directory {} not found", args.base_dir.display()))?;

    let (mut config, config_source) = config::resolve(args.config.as_deref(), &base_dir)?;
    if args.strict {
        config.make_strict();
    }
    if let Some(line_ending) = args.line_ending {
        config.apply.default_line_ending = line_ending;
    }

    let patch_files = discover_patch_files(&args.patches)?;
    let parser = config.parser();
    let options = RunOptions {
        dry_run: args.dry_run,
        apply: config.apply_options(),
        fallback_line_ending: config.apply.default_line_ending.resolve(),
        sequence_width: config.output.sequence_width,
        ..RunOptions::new(&base_dir)
    };

    if !args.json {
        println!("Base directory: {}", base_dir.display());
        if let Some(source) = &config_source {
            println!("Config: {}", source.display());
        }
        println!();
    }

    // 2. Parse and apply each patch file
    let mut summary = RunSummary::default();
    let mut json_files = Vec::new();

    for patch_file in &patch_files {
        let file_patches = parse_patch_file(patch_file, &parser)?;

        if !args.json {
            println!("Applying {}...", patch_file.display());
            if args.dry_run {
                println!("{}", "  [DRY RUN - no files will be written]".cyan());
            }
        }

        if file_patches.is_empty() {
            if !args.json {
                println!("{}", "  No patches found in file".yellow());
                println!();
            }
            continue;
        }

        let reports = run_patches(&file_patches, &options);
        summary.merge(&RunSummary::from_reports(&reports));

        if args.json {
            json_files.extend(reports.iter().map(FileReport::to_json));
        } else {
            for report in &reports {
                report_file(report, args.verbose, args.diff);
            }
            println!();
        }
    }

    // 3. Summary
    if args.json {
        let output = json!({
            "patch_files": patch_files,
            "files": json_files,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", "Summary:".bold());
        println!("  {} processed", summary.processed);
        if args.dry_run {
            println!("  {} previewed", format!("{}", summary.previewed).green());
        } else {
            println!("  {} patched", format!("{}", summary.patched).green());
        }
        println!("  {} skipped", format!("{}", summary.skipped).cyan());
        println!("  {} errors", format!("{}", summary.errors).red());
    }

    if summary.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_list(args: &[PathBuf]) -> Result<()> {
    let parser = PatchParser::new();

    for patch_file in discover_patch_files(args)? {
        let file_patches = parse_patch_file(&patch_file, &parser)?;
        println!("{}", patch_file.display().to_string().bold());

        if file_patches.is_empty() {
            println!("{}", "  No patches found in file".yellow());
            continue;
        }

        for patch in &file_patches {
            let note = if patch.is_creation() {
                " (new file)"
            } else if patch.is_deletion() {
                " (deleted)"
            } else {
                ""
            };
            println!(
                "  {}{} [{} patch]",
                patch.target_path().display(),
                note,
                patch.patch_line_ending.name()
            );
            for hunk in &patch.hunks {
                println!(
                    "    {} {} {}",
                    hunk.header.to_string().cyan(),
                    format!("+{}", hunk.additions()).green(),
                    format!("-{}", hunk.deletions()).red()
                );
            }
        }
        println!();
    }

    Ok(())
}
