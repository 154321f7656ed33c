//! Error types and failure classification for the rule generator

use std::fmt;
use std::time::Duration;

/// How the driver reacts to a failure
///
/// Retryable failures restart the rules iteration, surrender failures abort
/// the whole job, and bugs indicate a broken invariant that should be
/// unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Expected, non-fatal; the driver restarts the iteration
    Retry,
    /// External budget exhausted; fatal
    Surrender,
    /// Invariant failure; fatal, reported with context
    Bug,
}

/// Main error type for all generator operations
#[derive(Debug)]
pub enum GeneratorError {
    /// A supposedly final distance decreased
    ///
    /// Buffered solid errors are converted into a single instance of this
    /// at the next checkpoint, so every code path has a clean unwind point.
    SolidDistance {
        /// Number of solid errors buffered since the last checkpoint
        errors: usize,
    },

    /// The iteration must be restarted for a non-distance reason
    ///
    /// Covers rule mismatches needing analyzer extension, codes observed
    /// before their rules exist, and branch budgets exceeded after a known
    /// conflict.
    NeedsRetry {
        /// What triggered the restart
        reason: &'static str,
    },

    /// Tile arena grew past the configured budget
    TileBudget {
        /// Tiles allocated when the budget check fired
        count: usize,
        /// Configured maximum
        limit: usize,
    },

    /// Wall-clock timeout expired
    Timeout {
        /// Configured limit
        limit: Duration,
    },

    /// Tessellation descriptor failed validation
    Descriptor {
        /// Description of what is wrong with the descriptor
        reason: String,
    },

    /// Persisted rule table could not be read or parsed
    Parse {
        /// Line number the parser stopped at, if known
        line: Option<usize>,
        /// Description of the problem
        reason: String,
    },

    /// File system operation failure
    File {
        /// Path involved in the operation
        path: std::path::PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Internal invariant failure that should be unreachable
    Internal {
        /// Name of the operation that detected the breakage
        operation: &'static str,
        /// Context for diagnosis
        detail: String,
    },
}

impl GeneratorError {
    /// Classify the error for the driver's recovery policy
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::SolidDistance { .. } | Self::NeedsRetry { .. } => FailureKind::Retry,
            Self::TileBudget { .. }
            | Self::Timeout { .. }
            | Self::Descriptor { .. }
            | Self::Parse { .. }
            | Self::File { .. } => FailureKind::Surrender,
            Self::Internal { .. } => FailureKind::Bug,
        }
    }

    /// Whether the driver may restart the iteration after this error
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), FailureKind::Retry)
    }
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SolidDistance { errors } => {
                write!(f, "solid distance error ({errors} buffered)")
            }
            Self::NeedsRetry { reason } => {
                write!(f, "{reason}")
            }
            Self::TileBudget { count, limit } => {
                write!(f, "tile-count exceeded ({count} tiles, limit {limit})")
            }
            Self::Timeout { limit } => {
                write!(f, "timeout after {}s", limit.as_secs())
            }
            Self::Descriptor { reason } => {
                write!(f, "conversion failure: {reason}")
            }
            Self::Parse { line: Some(n), reason } => {
                write!(f, "parse error at line {n}: {reason}")
            }
            Self::Parse { line: None, reason } => {
                write!(f, "parse error: {reason}")
            }
            Self::File {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "file error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::Internal { operation, detail } => {
                write!(f, "internal error in {operation}: {detail}")
            }
        }
    }
}

impl std::error::Error for GeneratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::File { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for generator results
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Create a retryable error with a static reason
pub const fn retry(reason: &'static str) -> GeneratorError {
    GeneratorError::NeedsRetry { reason }
}

/// Create an internal-bug error with operation context
pub fn internal(operation: &'static str, detail: impl ToString) -> GeneratorError {
    GeneratorError::Internal {
        operation,
        detail: detail.to_string(),
    }
}
