//! Tests for configuration defaults

#[cfg(test)]
mod tests {
    use treegen::io::configuration::{
        MAX_BDATA, MAX_EXAMINE_BRANCH, MAX_GETSIDE, MAX_RETRIES, MAX_SHORTCUT_LENGTH,
        MAX_TCELLCOUNT, TIMEOUT_SECONDS,
    };

    // The documented defaults give the algorithm enough room for the
    // common tessellations while staying bounded
    #[test]
    fn test_budgets_are_positive_and_ordered() {
        assert!(MAX_RETRIES > 0);
        assert!(MAX_TCELLCOUNT >= 100_000);
        assert!(MAX_EXAMINE_BRANCH > 0);
        assert!(MAX_GETSIDE > 0);
        assert!(MAX_BDATA >= MAX_SHORTCUT_LENGTH);
        assert!(TIMEOUT_SECONDS > 0);
    }
}
