//! Tests for failure classification

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use treegen::io::error::{FailureKind, GeneratorError, internal, retry};

    #[test]
    fn test_retry_class() {
        assert_eq!(retry("mismatch error").kind(), FailureKind::Retry);
        assert!(retry("mismatch error").is_retryable());
        assert!(GeneratorError::SolidDistance { errors: 1 }.is_retryable());
    }

    #[test]
    fn test_surrender_class() {
        for err in [
            GeneratorError::TileBudget {
                count: 10,
                limit: 5,
            },
            GeneratorError::Timeout {
                limit: Duration::from_secs(60),
            },
            GeneratorError::Descriptor {
                reason: "no shapes".to_string(),
            },
        ] {
            assert_eq!(err.kind(), FailureKind::Surrender);
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn test_bug_class_keeps_operation_context() {
        let err = internal("unify", "not unified to itself");
        assert_eq!(err.kind(), FailureKind::Bug);
        let text = err.to_string();
        assert!(text.contains("unify"));
        assert!(text.contains("not unified to itself"));
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = GeneratorError::Parse {
            line: Some(7),
            reason: "multiple parent rules".to_string(),
        };
        assert!(err.to_string().contains("line 7"));
    }
}
