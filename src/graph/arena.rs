//! Append-only tile arena with union-find identity
//!
//! Tiles are nodes of the lazily constructed universal cover. They are
//! created on demand, never deleted during a run, and identified through a
//! union-find structure whose links carry a spin: two walkers in the same
//! class represent the same cell of the cover up to that rotation. Raw
//! references between tiles are always arena indices, so nothing needs to
//! move when classes merge.

use crate::graph::walker::{Walker, gmod};
use crate::tessellation::shape::{Shape, Tessellation};

/// Sentinel for a distance that has not been computed yet
pub const DIST_UNKNOWN: u32 = u32::MAX;

/// Tree-parent assignment of a tile
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParentDir {
    /// Not computed yet
    Unset,
    /// The tile is an origin; its canonical direction is 0
    Root,
    /// Direction of the spanning-tree parent
    Dir(usize),
}

impl ParentDir {
    /// Whether a parent decision has been made
    pub const fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// The concrete direction, if this is a non-root assignment
    pub const fn dir(&self) -> Option<usize> {
        match self {
            Self::Dir(d) => Some(*d),
            _ => None,
        }
    }

    /// The canonical spin: 0 for roots, the parent direction otherwise
    pub const fn canonical_spin(&self) -> usize {
        match self {
            Self::Dir(d) => *d,
            _ => 0,
        }
    }
}

/// A node of the lazily materialized universal cover
#[derive(Clone, Debug)]
pub struct Tile {
    /// Index into the shape table
    pub shape: usize,
    /// Edge table; `edges[d]` is the walker on the far side of edge `d`
    pub edges: Vec<Option<Walker>>,
    /// Distance from the nearest origin, or `DIST_UNKNOWN`
    pub dist: u32,
    /// Direction of some neighbor one unit closer
    pub any_nearer: Option<usize>,
    /// Direction chosen by the parent oracle
    pub parent_dir: ParentDir,
    /// Previous parent direction, kept for shortcut detection
    pub old_parent_dir: ParentDir,
    /// Cached tree-state id
    pub code: Option<usize>,
    /// Once set, `dist` is asserted final; a later decrease is a solid error
    pub is_solid: bool,
    /// Whether `dist` has been propagated to neighbors at least once
    pub distance_fixed: bool,
    /// Union-find link; self-loop at a class representative
    pub unified_to: Walker,
}

/// Arena of tiles plus the tessellation they instantiate
#[derive(Clone, Debug)]
pub struct TileArena {
    /// The tessellation being generated
    pub tess: Tessellation,
    tiles: Vec<Tile>,
    /// Number of tiles united into other tiles
    pub tunified: usize,
    /// Number of edge traversals performed
    pub movecount: u64,
}

impl TileArena {
    /// Create an empty arena for a tessellation
    pub fn new(tess: Tessellation) -> Self {
        Self {
            tess,
            tiles: Vec::new(),
            tunified: 0,
            movecount: 0,
        }
    }

    /// Number of tiles created so far
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Allocate a new tile of the given shape
    pub fn alloc(&mut self, shape: usize) -> usize {
        let size = self.tess.shapes[shape].size();
        let id = self.tiles.len();
        self.tiles.push(Tile {
            shape,
            edges: vec![None; size],
            dist: DIST_UNKNOWN,
            any_nearer: None,
            parent_dir: ParentDir::Unset,
            old_parent_dir: ParentDir::Unset,
            code: None,
            is_solid: false,
            distance_fixed: false,
            unified_to: Walker::at(id),
        });
        id
    }

    /// Shared access to a tile
    pub fn tile(&self, t: usize) -> &Tile {
        &self.tiles[t]
    }

    /// Mutable access to a tile
    pub fn tile_mut(&mut self, t: usize) -> &mut Tile {
        &mut self.tiles[t]
    }

    /// Shape of a tile
    pub fn shape_of(&self, t: usize) -> &Shape {
        &self.tess.shapes[self.tiles[t].shape]
    }

    /// Edge count of a tile
    pub fn size_of(&self, t: usize) -> usize {
        self.tiles[t].edges.len()
    }

    /// Cycle length of a tile's shape
    pub fn cycle_of(&self, t: usize) -> usize {
        self.shape_of(t).cycle_length
    }

    /// Vertex valence to the right of a walker
    pub fn valence(&self, w: Walker) -> usize {
        self.shape_of(w.tile).vertex_valence[w.spin]
    }

    /// Rotate a walker's spin
    pub fn rotate(&self, w: Walker, delta: i64) -> Walker {
        let size = self.size_of(w.tile);
        Walker::new(w.tile, gmod(w.spin as i64 + delta, size))
    }

    /// Spin offset from the walker to the given spin, mod edge count
    pub fn to_spin(&self, w: Walker, s: i64) -> usize {
        let size = self.size_of(w.tile);
        gmod(s - w.spin as i64, size)
    }

    /// The walker on the far side of the current edge, if materialized
    pub fn peek(&self, w: Walker) -> Option<Walker> {
        self.tiles[w.tile].edges[w.spin]
    }

    /// Install an edge in both directions
    pub fn connect(&mut self, a: Walker, b: Walker) {
        self.tiles[a.tile].edges[a.spin] = Some(b);
        self.tiles[b.tile].edges[b.spin] = Some(a);
    }

    /// Whether a tile is its own union-find representative
    pub fn is_representative(&self, t: usize) -> bool {
        self.tiles[t].unified_to.tile == t
    }

    /// Resolve a walker to its class representative, path-compressing
    ///
    /// The walker's spin is adjusted by the accumulated rotation of the
    /// links followed, so the result denotes the same directed edge of the
    /// universal cover.
    pub fn ufind(&mut self, w: &mut Walker) {
        if self.is_representative(w.tile) {
            return;
        }
        let mut chain = Vec::new();
        let mut t = w.tile;
        while !self.is_representative(t) {
            chain.push(t);
            t = self.tiles[t].unified_to.tile;
        }
        let root = t;
        let root_size = self.size_of(root);
        // walk the chain backwards so each node's link target is already
        // resolved to the root
        let mut off_prev = 0i64;
        for &node in chain.iter().rev() {
            let link = self.tiles[node].unified_to;
            let off = off_prev + link.spin as i64;
            self.tiles[node].unified_to = Walker::new(root, gmod(off, root_size));
            off_prev = off;
        }
        *w = Walker::new(root, gmod(off_prev + w.spin as i64, root_size));
    }

    /// Resolve a tile id to its class representative
    pub fn repr(&mut self, t: usize) -> usize {
        let mut w = Walker::at(t);
        self.ufind(&mut w);
        w.tile
    }

    /// Analyzer key of a walker: shape id plus the canonical-spin residue
    /// modulo the shape's cycle length
    pub fn aid(&mut self, mut w: Walker) -> (usize, usize) {
        self.ufind(&mut w);
        let shape = self.tiles[w.tile].shape;
        let cycle = self.tess.shapes[shape].cycle_length;
        (shape, gmod(self.to_spin(w, 0) as i64, cycle))
    }
}
