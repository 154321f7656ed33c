//! Built-in tessellation descriptors
//!
//! Provides the regular and two-shape tessellations used by the CLI and the
//! test suite. Regular tilings glue edge `i` of each tile to edge `i` of its
//! neighbor; with full rotational symmetry (`cycle_length = 1`) any
//! consistent labeling is equivalent.

use crate::tessellation::shape::{Connection, Shape, Tessellation};

/// Regular tessellation with `p`-gons, `q` meeting at each vertex
///
/// Hyperbolic when `(p - 2) * (q - 2) > 4`; the generator also accepts the
/// Euclidean cases, although those typically need more shortcut learning.
pub fn regular(p: usize, q: usize) -> Tessellation {
    let connections = (0..p)
        .map(|eid| Connection {
            sid: 0,
            eid,
            mirror: false,
        })
        .collect();
    Tessellation {
        name: format!("regular-{p}-{q}"),
        shapes: vec![Shape {
            id: 0,
            cycle_length: 1,
            connections,
            vertex_valence: vec![q; p],
        }],
    }
}

/// Two-shape tessellation: a regular `{p, q}` tiling with alternating tile
/// colors
///
/// Requires even `q` so that colors alternate consistently around every
/// vertex. Every edge of shape 0 glues to the same edge of shape 1 and vice
/// versa.
pub fn alternating(p: usize, q: usize) -> Tessellation {
    let connect_to = |sid: usize| -> Vec<Connection> {
        (0..p)
            .map(|eid| Connection {
                sid,
                eid,
                mirror: false,
            })
            .collect()
    };
    Tessellation {
        name: format!("alternating-{p}-{q}"),
        shapes: vec![
            Shape {
                id: 0,
                cycle_length: 1,
                connections: connect_to(1),
                vertex_valence: vec![q; p],
            },
            Shape {
                id: 1,
                cycle_length: 1,
                connections: connect_to(0),
                vertex_valence: vec![q; p],
            },
        ],
    }
}

/// Look up a tessellation by name
///
/// Accepts the named presets (`heptagonal`, `pentagonal`, `triangular`,
/// `alternating-squares`) as well as `regular-P-Q` and `alternating-P-Q`
/// spellings.
pub fn by_name(name: &str) -> Option<Tessellation> {
    match name {
        "heptagonal" => return Some(regular(7, 3)),
        "pentagonal" => return Some(regular(5, 4)),
        "triangular" => return Some(regular(3, 7)),
        "alternating-squares" => return Some(alternating(4, 6)),
        _ => {}
    }
    let parse_pair = |rest: &str| -> Option<(usize, usize)> {
        let (p, q) = rest.split_once('-')?;
        Some((p.parse().ok()?, q.parse().ok()?))
    };
    if let Some(rest) = name.strip_prefix("regular-") {
        let (p, q) = parse_pair(rest)?;
        return Some(regular(p, q));
    }
    if let Some(rest) = name.strip_prefix("alternating-") {
        let (p, q) = parse_pair(rest)?;
        return Some(alternating(p, q));
    }
    None
}
