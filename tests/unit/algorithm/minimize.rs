//! Tests for minimization and possible parents on finished tables

#[cfg(test)]
mod tests {
    use treegen::algorithm::minimize::compute_possible_parents;
    use treegen::algorithm::{Generator, Rule};
    use treegen::tessellation::catalog;

    // Every state with a parent rule survives with a nonempty
    // possible-parents listing
    #[test]
    fn test_parent_rules_have_possible_parents() {
        let mut gen = Generator::new(catalog::regular(7, 3)).unwrap();
        let table = gen.generate().unwrap();
        for ts in &table.states {
            if ts.rules.contains(&Rule::Parent) {
                assert!(
                    !ts.possible_parents.is_empty(),
                    "state {} has a parent rule but no possible parents",
                    ts.id
                );
                assert!(ts.is_possible_parent);
            }
        }
    }

    // Recomputing possible parents from scratch reproduces the published
    // listing
    #[test]
    fn test_possible_parents_are_reproducible() {
        let mut gen = Generator::new(catalog::regular(5, 4)).unwrap();
        let table = gen.generate().unwrap();
        let mut states = table.states.clone();
        for ts in &mut states {
            ts.possible_parents.clear();
            ts.is_possible_parent = false;
        }
        compute_possible_parents(&mut states);
        for (a, b) in table.states.iter().zip(&states) {
            assert_eq!(a.possible_parents, b.possible_parents);
            assert_eq!(a.is_possible_parent, b.is_possible_parent);
        }
    }

    // The published table is already minimal: every pair of states
    // differs in behavior somewhere
    #[test]
    fn test_no_two_states_behave_identically() {
        let mut gen = Generator::new(catalog::regular(7, 3)).unwrap();
        let table = gen.generate().unwrap();
        for (i, a) in table.states.iter().enumerate() {
            for b in table.states.iter().skip(i + 1) {
                assert!(
                    a.rules != b.rules || a.sid != b.sid,
                    "states {} and {} are indistinguishable",
                    a.id,
                    b.id
                );
            }
        }
    }
}
