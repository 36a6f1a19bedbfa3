use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use codesketch::config::{AnalysisConfig, DEFAULT_PATTERN_BUDGET};
use codesketch::core::{CodebaseAnalyzer, Language};
use codesketch::error::SketchError;
use codesketch::formatters::{CodeFormatter, DirectoryFormatter, RelationFormatter};

#[derive(Debug, Parser)]
#[command(
    name = "codesketch",
    version,
    about = "Generate ASCII diagrams from source trees and directories"
)]
struct Cli {
    /// Wall-clock budget for the pattern rules applied to one file
    #[arg(
        long,
        global = true,
        value_name = "MS",
        env = "CODESKETCH_TIMEOUT_MS",
        default_value_t = DEFAULT_PATTERN_BUDGET.as_millis() as u64
    )]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a directory structure diagram
    Directory {
        /// Path to the directory to visualize
        #[arg(long)]
        path: PathBuf,

        #[arg(long, default_value = "directory_diagram.txt")]
        output: PathBuf,

        #[arg(long, value_enum, default_value_t = DiagramFormat::Ascii)]
        format: DiagramFormat,

        /// Maximum directory depth to visualize
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Generate a source code structure diagram
    Code {
        /// Path to the source file or directory to visualize
        #[arg(long)]
        path: PathBuf,

        #[arg(long, default_value = "code_diagram.txt")]
        output: PathBuf,

        #[arg(long, value_enum, default_value_t = DiagramFormat::Ascii)]
        format: DiagramFormat,

        /// Programming language (auto-detected when omitted)
        #[arg(long)]
        language: Option<String>,
    },
    /// Generate a code relation diagram showing dependencies
    Relation {
        /// Path to the source file or directory to analyze
        #[arg(long)]
        path: PathBuf,

        #[arg(long, default_value = "relation_diagram.txt")]
        output: PathBuf,

        #[arg(long, value_enum, default_value_t = DiagramFormat::Ascii)]
        format: DiagramFormat,

        /// Depth of relation analysis, higher values show more relationships
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=3))]
        depth: u8,
    },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum DiagramFormat {
    Ascii,
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(message) => {
            println!("{message}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String> {
    let config = AnalysisConfig::new().with_pattern_budget(Duration::from_millis(cli.timeout_ms));
    let start_time = Instant::now();

    let message = match cli.command {
        Command::Directory {
            path,
            output,
            format: DiagramFormat::Ascii,
            max_depth,
        } => {
            info!("Generating directory diagram for {}", path.display());
            ensure_exists(&path)?;
            DirectoryFormatter::new()
                .with_max_depth(max_depth)
                .format_to_file(&path, &output)?;
            format!("Success: Diagram saved to {}", output.display())
        }
        Command::Code {
            path,
            output,
            format: DiagramFormat::Ascii,
            language,
        } => {
            info!("Generating code diagram for {}", path.display());
            ensure_exists(&path)?;
            let language = language.as_deref().map(Language::from_tag);
            let structure = CodebaseAnalyzer::with_config(config).analyze_structure(&path, language)?;
            CodeFormatter::new().format_to_file(&structure, &output)?;
            format!("Success: Diagram saved to {}", output.display())
        }
        Command::Relation {
            path,
            output,
            format: DiagramFormat::Ascii,
            depth,
        } => {
            info!("Generating code relation diagram for {}", path.display());
            ensure_exists(&path)?;
            let relations = CodebaseAnalyzer::with_config(config).analyze_relations(&path, depth)?;
            RelationFormatter::new(depth).format_to_file(&relations, &output)?;
            format!("Success: Relation diagram saved to {}", output.display())
        }
    };

    info!("Completed in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(message)
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(SketchError::PathNotFound(path.to_path_buf()).into());
    }
    Ok(())
}
