//! Tests for CLI argument mapping

#[cfg(test)]
mod tests {
    use clap::Parser;
    use treegen::io::cli::Cli;

    #[test]
    fn test_requires_a_tessellation() {
        assert!(Cli::try_parse_from(["treegen"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["treegen", "heptagonal"]);
        assert!(!cli.check);
        assert!(!cli.quiet);
        assert!(cli.output.is_none());
        assert!(cli.should_show_progress());
    }

    #[test]
    fn test_quiet_disables_progress() {
        let cli = Cli::parse_from(["treegen", "heptagonal", "--quiet"]);
        assert!(!cli.should_show_progress());
    }

    #[test]
    fn test_multiple_targets_and_flags() {
        let cli = Cli::parse_from([
            "treegen",
            "heptagonal",
            "alternating-4-6",
            "--bfs",
            "--single-origin",
            "--seed",
            "7",
        ]);
        assert_eq!(cli.tessellations.len(), 2);
        assert!(cli.bfs);
        assert!(cli.single_origin);
        assert_eq!(cli.seed, 7);
    }
}
