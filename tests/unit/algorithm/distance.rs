//! Tests for the distance invariants on finished tile graphs

#[cfg(test)]
mod tests {
    use treegen::algorithm::Generator;
    use treegen::graph::{DIST_UNKNOWN, Walker};
    use treegen::tessellation::catalog;

    // After a successful run, distances satisfy the triangle inequality on
    // every materialized edge
    #[test]
    fn test_edge_distances_differ_by_at_most_one() {
        let mut gen = Generator::new(catalog::regular(7, 3)).unwrap();
        gen.generate().unwrap();
        for t in 0..gen.arena.tile_count() {
            if !gen.arena.is_representative(t) {
                continue;
            }
            let da = gen.arena.tile(t).dist;
            if da == DIST_UNKNOWN {
                continue;
            }
            for i in 0..gen.arena.size_of(t) {
                if let Some(n) = gen.arena.peek(Walker::new(t, i)) {
                    let r = gen.arena.repr(n.tile);
                    let db = gen.arena.tile(r).dist;
                    if db == DIST_UNKNOWN {
                        continue;
                    }
                    assert!(
                        da.abs_diff(db) <= 1,
                        "edge {t}:{i} joins distances {da} and {db}"
                    );
                }
            }
        }
    }

    // Solid tiles at positive distance point at a strictly nearer neighbor
    #[test]
    fn test_any_nearer_points_downhill() {
        let mut gen = Generator::new(catalog::regular(5, 4)).unwrap();
        gen.generate().unwrap();
        let mut checked = 0;
        for t in 0..gen.arena.tile_count() {
            if !gen.arena.is_representative(t) {
                continue;
            }
            let tile = gen.arena.tile(t);
            if !tile.is_solid || tile.dist == 0 || tile.dist == DIST_UNKNOWN {
                continue;
            }
            let Some(a) = tile.any_nearer else { continue };
            let da = tile.dist;
            if let Some(n) = gen.arena.peek(Walker::new(t, a)) {
                let r = gen.arena.repr(n.tile);
                let dn = gen.arena.tile(r).dist;
                if dn != DIST_UNKNOWN {
                    assert!(dn < da, "tile {t}: nearer neighbor at {dn} vs {da}");
                    checked += 1;
                }
            }
        }
        assert!(checked > 0);
    }
}
