//! Tests for generator construction, budgets and surrender behavior

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use treegen::algorithm::{Generator, GeneratorConfig, Strategy};
    use treegen::io::error::FailureKind;
    use treegen::tessellation::catalog;

    #[test]
    fn test_invalid_descriptor_rejected_at_construction() {
        let mut tess = catalog::regular(7, 3);
        tess.shapes[0].connections[4].eid = 0;
        assert!(Generator::new(tess).is_err());
    }

    // Exhausting the tile budget surrenders without publishing a table
    #[test]
    fn test_tile_budget_surrenders() {
        let config = GeneratorConfig {
            max_tcellcount: 30,
            ..GeneratorConfig::default()
        };
        let mut gen =
            Generator::with_config(catalog::regular(7, 3), config, Strategy::default()).unwrap();
        let err = gen.generate().unwrap_err();
        assert_eq!(err.kind(), FailureKind::Surrender);
        assert!(err.to_string().contains("tile-count exceeded"));
    }

    // A zero timeout expires before the first iteration
    #[test]
    fn test_timeout_surrenders() {
        let config = GeneratorConfig {
            timeout: Duration::ZERO,
            ..GeneratorConfig::default()
        };
        let mut gen =
            Generator::with_config(catalog::regular(5, 4), config, Strategy::default()).unwrap();
        let err = gen.generate().unwrap_err();
        assert_eq!(err.kind(), FailureKind::Surrender);
        assert!(err.to_string().contains("timeout"));
    }

    // The observer sees every attempt and the diagnostics grow
    #[test]
    fn test_generate_reports_diagnostics() {
        let mut gen = Generator::new(catalog::regular(7, 3)).unwrap();
        let mut attempts = 0;
        let table = gen.generate_with(|_| attempts += 1).unwrap();
        assert!(attempts >= 1);
        assert!(!table.states.is_empty());
        let diag = gen.diagnostics();
        assert!(diag.tile_count > 0);
        assert!(diag.move_count > 0);
        assert_eq!(diag.try_count, attempts);
        let status = gen.describe_outcome(&Ok(table));
        assert!(status.starts_with("rules generated successfully"));
    }
}
