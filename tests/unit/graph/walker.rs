//! Tests for walker spin arithmetic

#[cfg(test)]
mod tests {
    use treegen::graph::{Walker, gmod};

    #[test]
    fn test_gmod_covers_negative_offsets() {
        assert_eq!(gmod(-1, 7), 6);
        assert_eq!(gmod(-8, 7), 6);
        assert_eq!(gmod(13, 7), 6);
        assert_eq!(gmod(0, 3), 0);
    }

    #[test]
    fn test_walkers_compare_by_tile_then_spin() {
        let a = Walker::new(1, 2);
        let b = Walker::new(1, 3);
        let c = Walker::new(2, 0);
        assert!(a < b && b < c);
        assert_eq!(Walker::at(4), Walker::new(4, 0));
    }
}
