//! Tests for the built-in tessellation catalog

#[cfg(test)]
mod tests {
    use treegen::tessellation::catalog;

    #[test]
    fn test_named_presets_exist_and_validate() {
        for name in [
            "heptagonal",
            "pentagonal",
            "triangular",
            "alternating-squares",
        ] {
            let tess = catalog::by_name(name).unwrap_or_else(|| panic!("missing preset {name}"));
            assert!(tess.validate().is_ok(), "{name} does not validate");
        }
    }

    #[test]
    fn test_regular_spelling_parses_parameters() {
        let tess = catalog::by_name("regular-8-3").unwrap();
        assert_eq!(tess.shapes[0].size(), 8);
        assert_eq!(tess.shapes[0].vertex_valence[5], 3);
        assert_eq!(tess.shapes[0].cycle_length, 1);
    }

    #[test]
    fn test_alternating_uses_two_mutually_glued_shapes() {
        let tess = catalog::by_name("alternating-4-6").unwrap();
        assert_eq!(tess.shapes.len(), 2);
        assert!(tess.shapes[0].connections.iter().all(|c| c.sid == 1));
        assert!(tess.shapes[1].connections.iter().all(|c| c.sid == 0));
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        assert!(catalog::by_name("penrose").is_none());
        assert!(catalog::by_name("regular-7").is_none());
        assert!(catalog::by_name("regular-a-b").is_none());
    }
}
