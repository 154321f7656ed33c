//! Unit test harness mirroring the src tree

mod algorithm;
mod graph;
mod io;
mod tessellation;
