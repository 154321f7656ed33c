//! Tests for shortcut strategies

#[cfg(test)]
mod tests {
    use treegen::algorithm::{Generator, GeneratorConfig, Strategy};
    use treegen::tessellation::catalog;

    // The heptagonal tiling converges without any shortcut learning, so
    // disabling the store must not change the result
    #[test]
    fn test_no_shortcut_strategy_still_converges() {
        let tess = catalog::regular(7, 3);
        let strategy = Strategy {
            no_shortcuts: true,
            ..Strategy::default()
        };
        let mut gen =
            Generator::with_config(tess.clone(), GeneratorConfig::default(), strategy).unwrap();
        let with_flag = gen.generate().unwrap();
        let mut plain = Generator::new(tess).unwrap();
        let without_flag = plain.generate().unwrap();
        assert_eq!(with_flag.states.len(), without_flag.states.len());
    }

    // The plain (non-smart) replay is a drop-in replacement
    #[test]
    fn test_plain_replay_strategy_converges() {
        let strategy = Strategy {
            no_smart_shortcuts: true,
            ..Strategy::default()
        };
        let mut gen = Generator::with_config(
            catalog::regular(5, 4),
            GeneratorConfig::default(),
            strategy,
        )
        .unwrap();
        assert!(gen.generate().is_ok());
    }
}
