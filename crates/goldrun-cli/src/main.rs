//! goldrun - golden-reference verification harness CLI
//!
//! Exposes the framework's filesystem-level engines as standalone tools:
//!
//! - `compare`: recursive format-aware comparison of a candidate tree
//!   against a golden reference (or a reference refresh with `--set-ref`)
//! - `exec`: supervised external-command run over a file or a tree, with
//!   marker-based success detection and a hard timeout
//!
//! Both subcommands run through the full harness pipeline, so live
//! markers, tallies, and persisted run artifacts behave exactly as they do
//! for registered suites in an embedding binary.

use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use goldrun_core::{
    compare_trees, init_tracing, refresh_reference, run_command, run_command_tree, CommandConfig,
    Harness, RunOptions, Suite, SuiteContext, SuiteRegistry, TreeSweep,
};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "goldrun")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Golden-reference verification harness", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Directory where run artifacts are written (must exist)
    #[arg(long, global = true, default_value = "results")]
    report_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a candidate tree against a golden reference tree
    Compare {
        /// Reference tree root
        reference: PathBuf,

        /// Candidate tree root
        candidate: PathBuf,

        /// Suite identifier used in the report
        #[arg(long, default_value = "cli.compare")]
        package: String,

        /// Overwrite the reference tree with the candidate instead of
        /// comparing
        #[arg(long)]
        set_ref: bool,
    },

    /// Run a supervised command on a file, or on every matching file in a
    /// tree
    Exec {
        /// Executable to run; receives each target file as its argument
        command: String,

        /// Target file or directory
        path: PathBuf,

        /// Literal output substring that signals success
        #[arg(long)]
        marker: String,

        /// Hard timeout per invocation, in seconds
        #[arg(long, default_value = "3600")]
        timeout_secs: u64,

        /// File extension (without dot) selected when PATH is a directory
        #[arg(long, default_value = "fds")]
        extension: String,

        /// Directory name excluded from the walk (repeatable)
        #[arg(long = "exclude-dir")]
        exclude_dirs: Vec<String>,

        /// File name excluded from the walk (repeatable)
        #[arg(long = "exclude-file")]
        exclude_files: Vec<String>,
    },
}

struct CompareSuite {
    package: String,
    reference: PathBuf,
    candidate: PathBuf,
}

#[async_trait]
impl Suite for CompareSuite {
    fn name(&self) -> &str {
        &self.package
    }

    async fn run(&self, cx: &mut SuiteContext) -> Result<()> {
        if cx.options().set_reference {
            refresh_reference(&self.reference, &self.candidate)?;
            cx.ok(format!("set reference <{}>", self.reference.display()));
            return Ok(());
        }
        let results = compare_trees(cx.package(), &self.reference, &self.candidate)?;
        cx.record_all(results);
        Ok(())
    }
}

struct ExecSuite {
    config: CommandConfig,
    path: PathBuf,
    sweep: TreeSweep,
}

#[async_trait]
impl Suite for ExecSuite {
    fn name(&self) -> &str {
        "cli.exec"
    }

    async fn run(&self, cx: &mut SuiteContext) -> Result<()> {
        let package = cx.package().to_string();
        if self.path.is_dir() {
            for (target, outcome) in run_command_tree(&self.config, &self.path, &self.sweep).await?
            {
                let name = format!("{} <{}>", self.config.command, target.display());
                cx.record(outcome.into_check(&package, name));
            }
        } else {
            let outcome = run_command(&self.config, &self.path).await?;
            let name = format!("{} <{}>", self.config.command, self.path.display());
            cx.record(outcome.into_check(&package, name));
        }
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let mut registry = SuiteRegistry::new();
    let mut options = RunOptions::default();

    match cli.command {
        Commands::Compare {
            reference,
            candidate,
            package,
            set_ref,
        } => {
            options.set_reference = set_ref;
            registry.register(CompareSuite {
                package,
                reference,
                candidate,
            });
        }
        Commands::Exec {
            command,
            path,
            marker,
            timeout_secs,
            extension,
            exclude_dirs,
            exclude_files,
        } => {
            registry.register(ExecSuite {
                config: CommandConfig::new(command, marker, timeout_secs),
                path,
                sweep: TreeSweep {
                    extension,
                    exclude_dirs,
                    exclude_files,
                },
            });
        }
    }

    let harness = Harness::new(registry, options, cli.report_dir);
    let report = harness.run(&[]).await?;
    if !report.all_passed() {
        std::process::exit(1);
    }
    Ok(())
}
