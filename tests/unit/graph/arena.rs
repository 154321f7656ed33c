//! Tests for the tile arena and union-find identity

#[cfg(test)]
mod tests {
    use treegen::graph::{DIST_UNKNOWN, TileArena, Walker};
    use treegen::tessellation::catalog;

    fn arena() -> TileArena {
        TileArena::new(catalog::regular(5, 4))
    }

    #[test]
    fn test_fresh_tiles_are_their_own_representatives() {
        let mut a = arena();
        let t = a.alloc(0);
        assert!(a.is_representative(t));
        assert_eq!(a.tile(t).dist, DIST_UNKNOWN);
        assert_eq!(a.repr(t), t);
    }

    // Union-find forwarding composes spins along the chain
    // Verified by setting distinct spins on each link
    #[test]
    fn test_ufind_accumulates_rotation() {
        let mut a = arena();
        let (t0, t1, t2) = (a.alloc(0), a.alloc(0), a.alloc(0));
        a.tile_mut(t1).unified_to = Walker::new(t0, 1);
        a.tile_mut(t2).unified_to = Walker::new(t1, 2);
        let mut w = Walker::new(t2, 1);
        a.ufind(&mut w);
        assert_eq!(w, Walker::new(t0, 4));
        // compression rewrote the middle link to point at the root
        assert_eq!(a.tile(t2).unified_to.tile, t0);
    }

    #[test]
    fn test_connect_is_symmetric() {
        let mut a = arena();
        let (t0, t1) = (a.alloc(0), a.alloc(0));
        a.connect(Walker::new(t0, 4), Walker::new(t1, 1));
        assert_eq!(a.peek(Walker::new(t0, 4)), Some(Walker::new(t1, 1)));
        assert_eq!(a.peek(Walker::new(t1, 1)), Some(Walker::new(t0, 4)));
    }

    #[test]
    fn test_rotate_wraps_and_to_spin_inverts() {
        let mut a = arena();
        let t = a.alloc(0);
        let w = Walker::new(t, 3);
        assert_eq!(a.rotate(w, 4).spin, 2);
        assert_eq!(a.rotate(w, -4).spin, 4);
        let target = 1;
        assert_eq!(a.to_spin(w, target), 3);
        assert_eq!(a.rotate(w, a.to_spin(w, target) as i64).spin, 1);
    }

    #[test]
    fn test_aid_uses_cycle_residue() {
        let mut a = arena();
        let t = a.alloc(0);
        // cycle length 1 collapses every spin to residue 0
        assert_eq!(a.aid(Walker::new(t, 3)), (0, 0));
        assert_eq!(a.aid(Walker::new(t, 0)), (0, 0));
    }
}
