//! Tests for rule-table structure and the spot-check walk

#[cfg(test)]
mod tests {
    use treegen::algorithm::rules::spot_check;
    use treegen::algorithm::{Generator, Rule};
    use treegen::tessellation::catalog;

    // Every rule vector has exactly as many entries as the shape has
    // edges, and every child reference is in range
    #[test]
    fn test_rule_vectors_are_complete_and_closed() {
        let mut gen = Generator::new(catalog::regular(7, 3)).unwrap();
        let table = gen.generate().unwrap();
        let tess = catalog::regular(7, 3);
        for ts in &table.states {
            assert_eq!(ts.rules.len(), tess.shapes[ts.sid].size());
            for r in &ts.rules {
                if let Rule::Child(c) = r {
                    assert!(*c < table.states.len());
                }
            }
        }
        assert!(table.root < table.states.len());
    }

    // Seeded walks over the finished automaton never dangle, whatever the
    // seed
    #[test]
    fn test_walks_stay_closed_for_any_seed() {
        let mut gen = Generator::new(catalog::regular(5, 4)).unwrap();
        let table = gen.generate().unwrap();
        for seed in 0..16 {
            let report = spot_check(&table, seed, 400).unwrap();
            assert_eq!(report.steps, 400);
            assert!(report.max_dist > 0);
        }
    }

    // Following only child rules, the distance equals the path length by
    // construction; the deepest walk bounds it from below
    #[test]
    fn test_child_walks_grow_distance() {
        let mut gen = Generator::new(catalog::regular(7, 3)).unwrap();
        let table = gen.generate().unwrap();
        // walk straight down the first child rule of each state
        let mut state = table.root;
        for depth in 0..32 {
            let child = table.states[state]
                .rules
                .iter()
                .find_map(Rule::child)
                .unwrap_or_else(|| panic!("no child at depth {depth}"));
            state = child;
        }
    }
}
