//! Tessellation descriptors: shapes, edge connections and vertex valences
//!
//! A descriptor is the read-only input of the generator. Each shape lists,
//! per edge, which shape and edge it glues to and how many tiles meet at the
//! vertex to the right of that edge. The `cycle_length` records the shape's
//! rotational symmetry: connection data repeats with that period.

use crate::io::error::{GeneratorError, Result};

/// Edge-to-edge gluing record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Connection {
    /// Target shape index
    pub sid: usize,
    /// Target edge index on the target shape
    pub eid: usize,
    /// Whether the gluing reverses orientation
    ///
    /// Carried for completeness; the combinatorial generator treats all
    /// gluings as orientation-preserving, as the tessellations it accepts
    /// are pre-normalized.
    pub mirror: bool,
}

/// One polygonal shape of the tessellation
#[derive(Clone, Debug)]
pub struct Shape {
    /// Index of this shape in the tessellation
    pub id: usize,
    /// Rotational symmetry period; divides the edge count
    pub cycle_length: usize,
    /// Gluing record per edge
    pub connections: Vec<Connection>,
    /// Number of tiles around the vertex to the right of each edge
    pub vertex_valence: Vec<usize>,
}

impl Shape {
    /// Number of edges
    pub fn size(&self) -> usize {
        self.connections.len()
    }
}

/// A complete tessellation descriptor
#[derive(Clone, Debug)]
pub struct Tessellation {
    /// Human-readable name, used in status reports and output files
    pub name: String,
    /// Shape table indexed by shape id
    pub shapes: Vec<Shape>,
}

impl Tessellation {
    /// Validate the descriptor before generation
    ///
    /// Checks that shape ids match their table positions, cycle lengths
    /// divide edge counts, valences are meaningful, and every connection is
    /// reciprocal (if shape `a` edge `d` glues to `(b, e)`, then shape `b`
    /// edge `e` glues back to `(a, d)`).
    ///
    /// # Errors
    ///
    /// Returns a `Descriptor` error naming the first inconsistency found.
    pub fn validate(&self) -> Result<()> {
        if self.shapes.is_empty() {
            return Err(descriptor_error("no shapes"));
        }
        for (i, sh) in self.shapes.iter().enumerate() {
            if sh.id != i {
                return Err(descriptor_error(format!(
                    "shape at position {i} has id {}",
                    sh.id
                )));
            }
            let n = sh.size();
            if n < 3 {
                return Err(descriptor_error(format!("shape {i} has {n} edges")));
            }
            if sh.vertex_valence.len() != n {
                return Err(descriptor_error(format!(
                    "shape {i} has {n} edges but {} valences",
                    sh.vertex_valence.len()
                )));
            }
            if sh.cycle_length == 0 || n % sh.cycle_length != 0 {
                return Err(descriptor_error(format!(
                    "shape {i} cycle length {} does not divide {n}",
                    sh.cycle_length
                )));
            }
            for (d, val) in sh.vertex_valence.iter().enumerate() {
                if *val < 2 {
                    return Err(descriptor_error(format!(
                        "shape {i} edge {d} has vertex valence {val}"
                    )));
                }
            }
            for (d, co) in sh.connections.iter().enumerate() {
                let target = self.shapes.get(co.sid).ok_or_else(|| {
                    descriptor_error(format!(
                        "shape {i} edge {d} connects to unknown shape {}",
                        co.sid
                    ))
                })?;
                let back = target.connections.get(co.eid).ok_or_else(|| {
                    descriptor_error(format!(
                        "shape {i} edge {d} connects to unknown edge {} of shape {}",
                        co.eid, co.sid
                    ))
                })?;
                if back.sid != i || back.eid != d {
                    return Err(descriptor_error(format!(
                        "connection of shape {i} edge {d} is not reciprocal"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn descriptor_error(reason: impl ToString) -> GeneratorError {
    GeneratorError::Descriptor {
        reason: reason.to_string(),
    }
}

/// Numerical fallback for tessellations with a concrete cell model
///
/// When the numerical generation mode is enabled, edge materialization
/// delegates to this oracle instead of consulting the combinatorial
/// connection table. The oracle reports both the target cell and the index
/// of the reverse edge.
pub trait ConcreteOracle {
    /// Identifier of the origin cell
    fn origin(&self) -> u64;

    /// Shape id of a cell
    fn shape_of(&self, cell: u64) -> usize;

    /// Cross edge `dir` of `cell`, returning the target cell and the index
    /// of the edge leading back
    fn step(&mut self, cell: u64, dir: usize) -> (u64, usize);

    /// Known distance of a cell from the origin, if a prior run supplied one
    fn distance(&self, _cell: u64) -> Option<u32> {
        None
    }
}
