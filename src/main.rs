//! CLI entry point for the strict tree-rule generator

use clap::Parser;
use treegen::io::cli::{Cli, JobProcessor};

fn main() -> treegen::Result<()> {
    let cli = Cli::parse();
    let mut processor = JobProcessor::new(cli);
    processor.process()
}
