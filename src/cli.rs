//! Command-line interface for assistcheck.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::check::{FullReport, Runner};
use crate::config::{self, Config, DEFAULT_CONFIG_NAMES};
use crate::plugin::{Discoverer, ManifestLoader};
use crate::report;
use crate::syntax;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Output formats accepted by `run --format`.
const FORMATS: &[&str] = &["pretty", "json", "quiet"];

/// Embedded default configuration written by `init`.
const DEFAULT_CONFIG: &str = include_str!("templates/default.yaml");

/// Validation harness for assistant plugins.
///
/// Discovers plugin manifests, checks each plugin's factory descriptor,
/// companion class and public surface, syntax-checks embedded code
/// examples, and writes JSON and HTML reports.
#[derive(Parser)]
#[command(name = "assistcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate every discovered plugin and write reports
    #[command(visible_alias = "check")]
    Run(RunArgs),
    /// Create a default assistcheck config file
    Init(InitArgs),
}

/// Arguments for the run command.
#[derive(Parser, Default)]
pub struct RunArgs {
    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory containing plugin manifests (overrides config)
    #[arg(short, long)]
    pub plugin_dir: Option<PathBuf>,

    /// Directory the reports are written to (overrides config)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Terminal output: pretty, json, or quiet
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Validate plugins concurrently
    #[arg(long)]
    pub parallel: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "assistcheck.yaml")]
    pub output: PathBuf,
}

/// Load the config named on the command line, else a discovered one, else
/// the defaults, and apply command-line overrides.
fn load_config(args: &RunArgs) -> anyhow::Result<Config> {
    let path = match &args.config {
        Some(p) => Some(p.clone()),
        None => Config::discover(Path::new(".")),
    };

    let mut config = match &path {
        Some(p) => {
            tracing::debug!(path = %p.display(), "loading config");
            Config::parse_file(p)?
        }
        None => {
            tracing::debug!(
                "no config file found (looked for {}), using defaults",
                DEFAULT_CONFIG_NAMES.join(", ")
            );
            Config::default()
        }
    };

    if let Some(dir) = &args.plugin_dir {
        config.plugin_dir = dir.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if args.parallel {
        config.parallel = true;
    }

    config::validate(&config)?;
    Ok(config)
}

/// Map a finished report to the process exit code.
pub fn exit_code(report: &FullReport) -> i32 {
    if report.has_problems() {
        EXIT_FAILED
    } else {
        EXIT_SUCCESS
    }
}

/// Run the validation command.
pub fn run_check(args: &RunArgs) -> anyhow::Result<i32> {
    // Register syntax checkers (no-op if feature disabled)
    syntax::init();

    if !FORMATS.contains(&args.format.as_str()) {
        eprintln!(
            "Error: invalid format {:?}, must be one of: {}",
            args.format,
            FORMATS.join(", ")
        );
        return Ok(EXIT_ERROR);
    }

    let config = match load_config(args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            eprintln!("Run 'assistcheck init' to create a config file");
            return Ok(EXIT_ERROR);
        }
    };

    let discoverer = Discoverer::new(&config.file_pattern, &config.excluded_files)?;
    let ids = match discoverer.discover(&config.plugin_dir) {
        Ok(ids) => ids,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    if ids.is_empty() {
        tracing::warn!(dir = %config.plugin_dir.display(), "no plugins found");
    }

    let loader = ManifestLoader::new(&config.plugin_dir);
    let report = Runner::new(&loader, &config).run(&ids);

    let paths = match report::write_reports(&report, &config.output_dir) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    match args.format.as_str() {
        "json" => println!("{}", report::render_json(&report)?),
        "quiet" => {}
        _ => {
            report::write_pretty(&report);
            println!();
            println!("  Reports: {}", paths.json.display());
            println!("           {}", paths.html.display());
            println!();
        }
    }

    Ok(exit_code(&report))
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, DEFAULT_CONFIG) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to match your plugin layout", args.output.display());
    println!("  2. Run: assistcheck run --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{SuiteBuilder, TestResult};
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_exit_code() {
        let mut ok = SuiteBuilder::new("a");
        ok.push(TestResult::passed("x", "ok"));
        ok.push(TestResult::skipped("y", "n/a"));
        let report = FullReport::new(vec![ok.finish()], Duration::ZERO);
        assert_eq!(exit_code(&report), EXIT_SUCCESS);

        let mut bad = SuiteBuilder::new("b");
        bad.push(TestResult::error("module import", "boom"));
        let report = FullReport::new(vec![bad.finish()], Duration::ZERO);
        assert_eq!(exit_code(&report), EXIT_FAILED);

        assert_eq!(exit_code(&FullReport::new(Vec::new(), Duration::ZERO)), EXIT_SUCCESS);
    }

    #[test]
    fn test_default_template_parses_to_defaults() {
        let parsed: Config = serde_yaml::from_str(DEFAULT_CONFIG).unwrap();
        let defaults = Config::default();

        assert_eq!(parsed.plugin_dir, defaults.plugin_dir);
        assert_eq!(parsed.file_pattern, defaults.file_pattern);
        assert_eq!(parsed.excluded_files, defaults.excluded_files);
        assert_eq!(parsed.min_prompt_length, defaults.min_prompt_length);
        assert_eq!(parsed.language, defaults.language);
        assert!(!parsed.parallel);
    }

    #[test]
    fn test_overrides_applied() {
        syntax::init();
        let temp = TempDir::new().unwrap();
        let cfg = temp.path().join("custom.yaml");
        std::fs::write(&cfg, "plugin_dir: plugins\nmin_prompt_length: 20\n").unwrap();

        let args = RunArgs {
            config: Some(cfg),
            output_dir: Some(temp.path().join("out")),
            parallel: true,
            ..Default::default()
        };
        let config = load_config(&args).unwrap();

        assert_eq!(config.plugin_dir, PathBuf::from("plugins"));
        assert_eq!(config.output_dir, temp.path().join("out"));
        assert_eq!(config.min_prompt_length, 20);
        assert!(config.parallel);
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("conf").join("assistcheck.yaml");
        let args = InitArgs {
            output: output.clone(),
        };

        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        assert!(output.is_file());
        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);
    }
}
