/// Spread patterns and canonical code computation
pub mod analyzer;
/// Branch verification along child boundaries
pub mod branch;
/// Distance relaxation, solidity and solid-error detection
pub mod distance;
/// Generator context, configuration and the retry driver
pub mod executor;
/// Rule-table minimization and possible-parent computation
pub mod minimize;
/// Parent-direction oracle
pub mod parent;
/// Lazy materialization, vertex closure and unification
pub mod propagation;
/// Tree-state table and per-edge rule derivation
pub mod rules;
/// Learned shortcuts between edge-walks
pub mod shortcut;
/// Side classification relative to the spanning tree
pub mod side;

pub use executor::{Diagnostics, Generator, GeneratorConfig, Strategy};
pub use rules::{Rule, RuleTable, TreeState};
