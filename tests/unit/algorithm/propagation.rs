//! Tests for edge symmetry of the materialized graph

#[cfg(test)]
mod tests {
    use treegen::algorithm::Generator;
    use treegen::graph::Walker;
    use treegen::tessellation::catalog;

    // Every materialized edge is installed in both directions
    #[test]
    fn test_edges_are_reciprocal() {
        let mut gen = Generator::new(catalog::regular(7, 3)).unwrap();
        gen.generate().unwrap();
        let mut edges = 0;
        for t in 0..gen.arena.tile_count() {
            for i in 0..gen.arena.size_of(t) {
                let w = Walker::new(t, i);
                if let Some(n) = gen.arena.peek(w) {
                    assert_eq!(
                        gen.arena.peek(n),
                        Some(w),
                        "edge {t}:{i} is not reciprocal"
                    );
                    edges += 1;
                }
            }
        }
        assert!(edges > 0);
    }

    // Both shapes of a two-shape tessellation appear in the graph, and
    // every edge joins tiles of different shapes
    #[test]
    fn test_two_shape_graph_alternates() {
        let mut gen = Generator::new(catalog::alternating(4, 6)).unwrap();
        gen.generate().unwrap();
        let mut shapes_seen = [false, false];
        for t in 0..gen.arena.tile_count() {
            let sa = gen.arena.tile(t).shape;
            shapes_seen[sa] = true;
            for i in 0..gen.arena.size_of(t) {
                if let Some(n) = gen.arena.peek(Walker::new(t, i)) {
                    assert_ne!(sa, gen.arena.tile(n.tile).shape);
                }
            }
        }
        assert!(shapes_seen[0] && shapes_seen[1]);
    }
}
