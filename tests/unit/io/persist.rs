//! Tests for rule-table persistence through real files

#[cfg(test)]
mod tests {
    use treegen::algorithm::Generator;
    use treegen::io::persist::{parse_table, read_table, serialize_table, write_table};
    use treegen::tessellation::catalog;

    #[test]
    fn test_generated_table_round_trips_through_disk() {
        let tess = catalog::regular(7, 3);
        let mut gen = Generator::new(tess.clone()).unwrap();
        let table = gen.generate().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heptagonal_rules.txt");
        write_table(&path, &table, &tess).unwrap();
        let parsed = read_table(&path, &tess).unwrap();

        assert_eq!(parsed.root, table.root);
        assert_eq!(parsed.states.len(), table.states.len());
        for (a, b) in table.states.iter().zip(&parsed.states) {
            assert_eq!(a.rules, b.rules);
            assert_eq!(a.parent_dir, b.parent_dir);
            assert_eq!(a.is_root, b.is_root);
            assert_eq!(a.possible_parents, b.possible_parents);
        }
    }

    #[test]
    fn test_serialization_is_stable_text() {
        let tess = catalog::regular(5, 4);
        let mut gen = Generator::new(tess.clone()).unwrap();
        let table = gen.generate().unwrap();
        let once = serialize_table(&table, &tess);
        let again = serialize_table(&parse_table(&once, &tess).unwrap(), &tess);
        assert_eq!(once, again);
    }

    #[test]
    fn test_missing_file_is_a_file_error() {
        let tess = catalog::regular(5, 4);
        let dir = tempfile::tempdir().unwrap();
        let err = read_table(&dir.path().join("absent.txt"), &tess).unwrap_err();
        assert!(err.to_string().contains("file error"));
    }

    #[test]
    fn test_garbage_lines_are_rejected() {
        let tess = catalog::regular(5, 4);
        assert!(parse_table("states(0, 1, 2)", &tess).is_err());
        assert!(parse_table("state(9, PARENT, 0, 0, 0, 0)", &tess).is_err());
        assert!(parse_table("", &tess).is_err());
    }
}
