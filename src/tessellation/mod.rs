/// Built-in tessellation descriptors for the CLI and tests
pub mod catalog;
/// Shape table, edge connections and descriptor validation
pub mod shape;

pub use shape::{Connection, ConcreteOracle, Shape, Tessellation};
