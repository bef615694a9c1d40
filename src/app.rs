//! Command dispatch for the `dupesweep` binary.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::actions::{delete_selected, validate_selection, BatchDeleteResult, DeleteConfig};
use crate::cli::{Cli, Commands, DeleteArgs, OutputFormat, ScanArgs};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::logging::init_logging;
use crate::output::{render_delete, JsonDeleteOutput, JsonOutput, TextOutput};
use crate::progress::Progress;
use crate::scanner::{relative_path, FsAccessGate, ROOT_PREFIX};
use crate::signal::install_handler;

/// Run the parsed command line and return the process exit code.
///
/// # Errors
///
/// Returns an error for invalid configuration, an unusable root, strict
/// mode failures, or interruption.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    if cli.no_color {
        yansi::disable();
    }
    init_logging(cli.verbose, cli.quiet);

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Scan(args) => {
            apply_scan_args(&mut config, &args);
            run_scan(&args, &config, cli.quiet)
        }
        Commands::Delete(args) => {
            config.trash |= args.trash;
            run_delete(&args, &config, cli.quiet)
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(ExitCode::Success)
        }
    }
}

/// Fold scan flags into the loaded configuration. Flags only ever widen.
pub fn apply_scan_args(config: &mut Config, args: &ScanArgs) {
    config.recursive |= args.recursive;
    config.strict |= args.strict;
    if let Some(threads) = args.io_threads {
        config.io_threads = threads;
    }
    if let Some(policy) = args.merge_policy {
        config.merge_policy = policy;
    }
    config
        .ignore_patterns
        .extend(args.ignore_patterns.iter().cloned());
}

fn finder_for(config: &Config, show_progress: bool) -> Result<DuplicateFinder> {
    let handler = install_handler()?;

    let mut finder_config = FinderConfig::default()
        .with_io_threads(config.io_threads)
        .with_strict(config.strict)
        .with_merge_policy(config.merge_policy)
        .with_scan_options(config.scan_options())
        .with_access_gate(Arc::new(FsAccessGate))
        .with_shutdown_flag(handler.get_flag());

    if show_progress {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    Ok(DuplicateFinder::new(finder_config))
}

fn run_scan(args: &ScanArgs, config: &Config, quiet: bool) -> Result<ExitCode> {
    let show_progress = !quiet && args.output == OutputFormat::Text;
    let finder = finder_for(config, show_progress)?;

    let (sets, summary) = finder
        .find_duplicates(&args.path)
        .with_context(|| format!("Failed to scan {}", args.path.display()))?;

    let exit_code = ExitCode::for_scan(sets.len(), summary.has_errors());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Text => TextOutput::new(&sets, &summary).write_to(&mut out)?,
        OutputFormat::Json => JsonOutput::new(&sets, &summary, exit_code).write_to(&mut out, true)?,
    }
    out.flush()?;

    Ok(exit_code)
}

fn run_delete(args: &DeleteArgs, config: &Config, quiet: bool) -> Result<ExitCode> {
    let mut raw = args.select.clone();
    if let Some(ref file) = args.select_file {
        let content = fs::read_to_string(file)
            .with_context(|| format!("Failed to read selection file {}", file.display()))?;
        raw.extend(parse_selection(&content)?);
    }

    let selection: HashSet<String> = raw
        .iter()
        .map(|entry| normalize_selection(&args.path, entry))
        .collect();
    if selection.is_empty() {
        bail!("Nothing selected: pass --select or --select-file");
    }

    if args.force {
        log::warn!("Skipping duplicate set validation (--force)");
    } else {
        // The deleter reaches every subtree, so validation must see them all.
        let mut scan_config = config.clone();
        scan_config.recursive = true;
        scan_config.require_write_access = true;
        let show_progress = !quiet && args.output == OutputFormat::Text;
        let finder = finder_for(&scan_config, show_progress)?;

        let (sets, _) = finder
            .find_duplicates(&args.path)
            .with_context(|| format!("Failed to scan {}", args.path.display()))?;

        validate_selection(&sets, &selection)?;

        for path in &selection {
            if !sets.iter().any(|set| set.contains(path)) {
                log::warn!("{} is not part of any duplicate set", path);
            }
        }
    }

    let delete_config = DeleteConfig {
        trash: config.trash,
        continue_on_error: !config.strict,
    };
    let result = delete_selected(&args.path, &selection, &delete_config, &FsAccessGate, None)?;
    let exit_code = delete_exit_code(&result);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Text => out.write_all(render_delete(&result).as_bytes())?,
        OutputFormat::Json => JsonDeleteOutput::new(&result, exit_code).write_to(&mut out, true)?,
    }
    out.flush()?;

    Ok(exit_code)
}

fn delete_exit_code(result: &BatchDeleteResult) -> ExitCode {
    if result.all_succeeded() {
        ExitCode::Success
    } else {
        ExitCode::PartialSuccess
    }
}

/// Parse a selection file: a JSON array of strings, or one path per line.
///
/// # Errors
///
/// Returns an error if the content looks like JSON but is not an array of
/// strings.
pub fn parse_selection(content: &str) -> Result<Vec<String>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        let paths: Vec<String> =
            serde_json::from_str(trimmed).context("Selection file is not a JSON string array")?;
        return Ok(paths);
    }

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Turn user input into a root-relative selection key.
///
/// Accepts `./a/b`, `a/b`, `a\b`, or an absolute path under `root`.
#[must_use]
pub fn normalize_selection(root: &Path, entry: &str) -> String {
    let path = Path::new(entry);
    if path.is_absolute() {
        if path.starts_with(root) {
            return relative_path(root, path);
        }
        log::warn!("{} is outside {}", entry, root.display());
        return entry.to_string();
    }

    let unified = entry.replace('\\', "/");
    let stripped = unified.trim_start_matches(ROOT_PREFIX).trim_start_matches('/');
    format!("{ROOT_PREFIX}{stripped}")
}
