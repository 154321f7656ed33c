//! Tests for parent placement in finished rule tables

#[cfg(test)]
mod tests {
    use treegen::algorithm::{Generator, Rule};
    use treegen::tessellation::catalog;

    // Internally, the parent rule of every non-root state sits at the
    // canonical position 0; roots have none
    #[test]
    fn test_parent_rule_placement() {
        let mut gen = Generator::new(catalog::regular(7, 3)).unwrap();
        let table = gen.generate().unwrap();
        for ts in &table.states {
            let parents = ts.rules.iter().filter(|r| **r == Rule::Parent).count();
            if ts.is_root {
                assert_eq!(parents, 0, "root state {} has a parent rule", ts.id);
            } else {
                assert_eq!(parents, 1, "state {} should have one parent rule", ts.id);
                assert_eq!(ts.rules[0], Rule::Parent);
            }
        }
    }

    // The pentagonal tiling needs the exhaustive tie-break somewhere:
    // with cycle length 1 every multi-candidate cell is a hard parent
    #[test]
    fn test_hard_parents_are_counted() {
        let mut gen = Generator::new(catalog::regular(5, 4)).unwrap();
        gen.generate().unwrap();
        assert!(gen.diagnostics().hard_parents > 0);
    }
}
