//! Command-line interface for generating rule tables

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::algorithm::executor::{Generator, GeneratorConfig, Strategy};
use crate::algorithm::rules::spot_check;
use crate::io::configuration::{DEFAULT_SEED, DEFAULT_SPOT_CHECK_STEPS, OUTPUT_SUFFIX};
use crate::io::error::{GeneratorError, Result};
use crate::io::persist::write_table;
use crate::io::progress::ProgressManager;
use crate::tessellation::catalog;

#[derive(Parser)]
#[command(name = "treegen")]
#[command(
    author,
    version,
    about = "Generate strict tree rules for 2D tessellations"
)]
/// Command-line arguments for the rule generation tool
// CLI tools commonly need multiple boolean flags for various features
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Tessellations to process, by catalog name (e.g. heptagonal,
    /// regular-5-4, alternating-4-6)
    #[arg(value_name = "TESSELLATION", required = true)]
    pub tessellations: Vec<String>,

    /// Output directory for rule files (defaults to the working directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Random seed for the spot-check walk
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Run a seeded spot-check walk over each finished table
    #[arg(short, long)]
    pub check: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Maximum iteration restarts before surrendering
    #[arg(long)]
    pub max_retries: Option<usize>,

    /// Maximum tiles in the arena
    #[arg(long)]
    pub max_tiles: Option<usize>,

    /// Wall-clock timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Compute distances by breadth-first expansion
    #[arg(long)]
    pub bfs: bool,

    /// Generate no shortcuts
    #[arg(long)]
    pub no_shortcuts: bool,

    /// Seed a single origin instead of one per shape
    #[arg(long)]
    pub single_origin: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    fn config(&self) -> GeneratorConfig {
        let mut config = GeneratorConfig::default();
        if let Some(v) = self.max_retries {
            config.max_retries = v;
        }
        if let Some(v) = self.max_tiles {
            config.max_tcellcount = v;
        }
        if let Some(v) = self.timeout {
            config.timeout = Duration::from_secs(v);
        }
        config
    }

    fn strategy(&self) -> Strategy {
        Strategy {
            bfs: self.bfs,
            no_shortcuts: self.no_shortcuts,
            single_origin: self.single_origin,
            ..Strategy::default()
        }
    }
}

/// Orchestrates batch processing of tessellations with progress tracking
pub struct JobProcessor {
    cli: Cli,
    progress: Option<ProgressManager>,
}

impl JobProcessor {
    /// Create a new processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress = cli.should_show_progress().then(ProgressManager::new);
        Self { cli, progress }
    }

    /// Process every requested tessellation
    ///
    /// # Errors
    ///
    /// Returns the first fatal error; surrendered tessellations are
    /// reported but do not abort the batch.
    pub fn process(&mut self) -> Result<()> {
        if let Some(ref mut pm) = self.progress {
            pm.initialize(self.cli.tessellations.len());
        }

        let names = self.cli.tessellations.clone();
        for name in &names {
            self.process_one(name)?;
        }

        if let Some(ref pm) = self.progress {
            pm.finish();
        }
        Ok(())
    }

    // Allow print for user-facing status lines
    #[allow(clippy::print_stderr)]
    fn process_one(&mut self, name: &str) -> Result<()> {
        let tess = catalog::by_name(name).ok_or_else(|| GeneratorError::Descriptor {
            reason: format!("unknown tessellation '{name}'"),
        })?;

        let mut gen = Generator::with_config(tess.clone(), self.cli.config(), self.cli.strategy())?;

        if let Some(ref mut pm) = self.progress {
            pm.start_job(name, gen.config.max_retries);
        }

        let progress = self.progress.as_ref();
        let outcome = gen.generate_with(|g| {
            if let Some(pm) = progress {
                pm.update_attempt(g.try_count, g.arena.tile_count(), g.treestates.len());
            }
        });

        let status = gen.describe_outcome(&outcome);
        if let Some(ref mut pm) = self.progress {
            pm.complete_job(&status);
        }
        if !self.cli.quiet {
            eprintln!("{name}: {status}");
        }

        let table = match outcome {
            Ok(table) => table,
            // budget and difficulty outcomes are per-tessellation results
            Err(e) if !matches!(e.kind(), crate::io::error::FailureKind::Bug) => return Ok(()),
            Err(e) => return Err(e),
        };

        let output_path = self.output_path(name);
        write_table(&output_path, &table, &tess)?;

        if self.cli.check {
            let report = spot_check(&table, self.cli.seed, DEFAULT_SPOT_CHECK_STEPS)?;
            if !self.cli.quiet {
                eprintln!(
                    "{name}: spot check visited {} states, max depth {}",
                    report.states_visited, report.max_dist
                );
            }
        }
        Ok(())
    }

    fn output_path(&self, name: &str) -> PathBuf {
        let file = format!("{name}{OUTPUT_SUFFIX}.txt");
        match &self.cli.output {
            Some(dir) => dir.join(file),
            None => PathBuf::from(file),
        }
    }
}
