//! Budget defaults and runtime configuration constants

// Retry and arena budgets
/// Maximum iteration restarts before surrendering
pub const MAX_RETRIES: usize = 999;
/// Maximum tiles in the arena
pub const MAX_TCELLCOUNT: usize = 1_000_000;

// Per-operation step budgets
/// Steps allowed in the exhaustive parent tie-break
pub const MAX_ADV_STEPS: usize = 100;
/// Steps allowed per branch in the verifier
pub const MAX_EXAMINE_BRANCH: usize = 5040;
/// Entries allowed on a verifier deadstack
pub const MAX_BDATA: usize = 10_000;
/// Steps allowed in a side computation
pub const MAX_GETSIDE: usize = 10_000;

/// Wall-clock timeout in seconds
pub const TIMEOUT_SECONDS: u64 = 60;

// A shortcut longer than this indicates a runaway search rather than a
// learnable identity
/// Maximum length of a learned shortcut's retraced path
pub const MAX_SHORTCUT_LENGTH: usize = 500;

// Default values for the CLI
/// Fixed seed for reproducible spot-check walks
pub const DEFAULT_SEED: u64 = 42;
/// Steps in a spot-check walk over the finished table
pub const DEFAULT_SPOT_CHECK_STEPS: usize = 1000;
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_rules";
