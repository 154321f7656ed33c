//! Tests for branch verification budgets

#[cfg(test)]
mod tests {
    use treegen::algorithm::{Generator, GeneratorConfig, Strategy};
    use treegen::io::error::FailureKind;
    use treegen::tessellation::catalog;

    // A branch budget too small to ever verify a boundary can never
    // converge: the run ends in failure, not in a partial table
    #[test]
    fn test_tiny_branch_budget_never_converges() {
        let config = GeneratorConfig {
            max_examine_branch: 1,
            max_retries: 8,
            ..GeneratorConfig::default()
        };
        let mut gen =
            Generator::with_config(catalog::regular(7, 3), config, Strategy::default()).unwrap();
        let err = gen.generate().unwrap_err();
        assert_ne!(err.kind(), FailureKind::Surrender);
    }

    // The default budget verifies every branch of the heptagonal tiling
    #[test]
    fn test_default_budget_suffices() {
        let mut gen = Generator::new(catalog::regular(7, 3)).unwrap();
        assert!(gen.generate().is_ok());
    }
}
