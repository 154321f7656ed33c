//! Tests for descriptor validation

#[cfg(test)]
mod tests {
    use treegen::tessellation::catalog;

    // A descriptor whose gluing is not mutual must be rejected
    // Verified by breaking one side of a connection pair
    #[test]
    fn test_reciprocity_is_enforced() {
        let mut tess = catalog::regular(7, 3);
        tess.shapes[0].connections[0].eid = 1;
        let err = tess.validate().unwrap_err();
        assert!(err.to_string().contains("reciprocal"));
    }

    // Cycle length must divide the edge count
    #[test]
    fn test_cycle_length_must_divide() {
        let mut tess = catalog::regular(6, 4);
        tess.shapes[0].cycle_length = 4;
        assert!(tess.validate().is_err());
        tess.shapes[0].cycle_length = 3;
        assert!(tess.validate().is_ok());
    }

    // Vertex valences below 2 make no sense for a tessellation
    #[test]
    fn test_valence_floor() {
        let mut tess = catalog::regular(5, 4);
        tess.shapes[0].vertex_valence[2] = 1;
        assert!(tess.validate().is_err());
    }

    // Connections may not point outside the shape table
    #[test]
    fn test_connection_target_in_range() {
        let mut tess = catalog::alternating(4, 6);
        tess.shapes[1].connections[3].sid = 5;
        assert!(tess.validate().is_err());
    }

    #[test]
    fn test_degenerate_polygons_rejected() {
        let mut tess = catalog::regular(3, 7);
        tess.shapes[0].connections.truncate(2);
        tess.shapes[0].vertex_valence.truncate(2);
        assert!(tess.validate().is_err());
    }
}
