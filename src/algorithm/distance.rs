//! Distance relaxation, solidity and solid-error detection
//!
//! Distances only ever decrease, so relaxation terminates. A tile marked
//! solid asserts its distance is final; any later decrease is a solid error,
//! which is buffered and converted into a single retryable failure at the
//! next checkpoint, after teaching the shortcut store what went wrong.

use crate::algorithm::executor::Generator;
use crate::graph::arena::{DIST_UNKNOWN, ParentDir};
use crate::graph::walker::Walker;
use crate::io::error::{GeneratorError, Result, internal};

impl Generator {
    /// Relax distances outward from a tile
    ///
    /// For every materialized edge, a neighbor further than `dist + 1` is
    /// lowered, its caches invalidated, and queued for further relaxation.
    /// Lowering a solid tile first runs shortcut discovery.
    ///
    /// # Errors
    ///
    /// Propagates failures from shortcut discovery and, in BFS mode, the
    /// tile budget.
    pub(crate) fn fix_distances(&mut self, c: usize) -> Result<()> {
        if self.strategy.bfs {
            return self.bfs_distances(c);
        }
        self.arena.tile_mut(c).distance_fixed = true;
        if self.strategy.known_distances {
            return Ok(());
        }
        let mut q = vec![c];
        let mut qi = 0;
        while qi < q.len() {
            let mut cur = q[qi];
            'restart: loop {
                let size = self.arena.size_of(cur);
                for i in 0..size {
                    if self.arena.peek(Walker::new(cur, i)).is_none() {
                        continue;
                    }
                    cur = self.arena.repr(cur);
                    let ci = Walker::new(cur, i);
                    let ci1 = self.wstep(ci)?;
                    if self.lower_distance(ci, ci1)? {
                        continue 'restart;
                    }
                    if self.lower_distance(ci1, ci)? {
                        q.push(ci1.tile);
                    }
                }
                break;
            }
            qi += 1;
        }
        Ok(())
    }

    /// Lower the target side of an edge from the source side, if closer
    fn lower_distance(&mut self, mut tgtw: Walker, srcw: Walker) -> Result<bool> {
        let new_d = self.arena.tile(srcw.tile).dist.saturating_add(1);
        if self.arena.tile(tgtw.tile).dist <= new_d {
            return Ok(false);
        }
        if self.arena.tile(tgtw.tile).is_solid {
            self.find_new_shortcuts(tgtw.tile, new_d, tgtw.tile, tgtw.spin as i64, 0)?;
        }
        self.arena.ufind(&mut tgtw);
        let t = self.arena.tile_mut(tgtw.tile);
        t.dist = new_d;
        t.any_nearer = Some(tgtw.spin);
        self.sidecache.clear();
        self.remove_parentdir(tgtw.tile);
        Ok(true)
    }

    fn bfs_distances(&mut self, c: usize) -> Result<()> {
        loop {
            if self.in_fixing {
                return Ok(());
            }
            let c = self.arena.repr(c);
            if self.arena.tile(c).dist != DIST_UNKNOWN {
                return Ok(());
            }
            if self.arena.tile_count() >= self.config.max_tcellcount {
                return Err(GeneratorError::TileBudget {
                    count: self.arena.tile_count(),
                    limit: self.config.max_tcellcount,
                });
            }
            let Some(front) = self.bfs_queue.pop_front() else {
                return Err(internal("fix_distances", "empty bfs queue"));
            };
            let c1 = self.arena.repr(front);
            for i in 0..self.arena.size_of(c1) {
                let c2 = self.wstep(Walker::new(c1, i))?.tile;
                if self.arena.tile(c2).dist == DIST_UNKNOWN {
                    let d = self.arena.tile(c1).dist.saturating_add(1);
                    self.arena.tile_mut(c2).dist = d;
                    self.bfs_queue.push_back(c2);
                }
            }
        }
    }

    /// Compute a tile's distance if it is still unknown
    ///
    /// # Errors
    ///
    /// Propagates failures from relaxation.
    pub(crate) fn calc_distances(&mut self, c: usize) -> Result<()> {
        if self.arena.tile(c).dist != DIST_UNKNOWN {
            return Ok(());
        }
        self.fix_distances(c)
    }

    /// Merge distances of two tiles being unified
    ///
    /// Takes the minimum; the side that loses a solid distance triggers
    /// shortcut discovery. Solidity and fixedness are merged as well.
    ///
    /// # Errors
    ///
    /// Propagates failures from shortcut discovery and relaxation.
    pub(crate) fn unify_distances(&mut self, c1: usize, c2: usize, delta: i64) -> Result<()> {
        let d1 = self.arena.tile(c1).dist;
        let d2 = self.arena.tile(c2).dist;
        let d = d1.min(d2);
        if self.arena.tile(c1).is_solid && d != d1 {
            self.solid_errors += 1;
            let newdir = self.any_nearer_i64(c2) - delta;
            self.find_new_shortcuts(c1, d, c2, newdir, delta)?;
            self.remove_parentdir(c1);
        }
        if d != d1 {
            self.fix_distances(c1)?;
        }
        self.arena.tile_mut(c1).dist = d;
        if self.arena.tile(c2).is_solid && d != d2 {
            self.solid_errors += 1;
            let newdir = self.any_nearer_i64(c1) + delta;
            self.find_new_shortcuts(c2, d, c1, newdir, -delta)?;
            self.remove_parentdir(c2);
        }
        if d != d2 {
            self.fix_distances(c2)?;
        }
        self.arena.tile_mut(c2).dist = d;
        let fixed = self.arena.tile(c1).distance_fixed || self.arena.tile(c2).distance_fixed;
        let solid = self.arena.tile(c1).is_solid || self.arena.tile(c2).is_solid;
        self.arena.tile_mut(c1).distance_fixed = fixed;
        self.arena.tile_mut(c2).distance_fixed = fixed;
        self.arena.tile_mut(c1).is_solid = solid;
        self.arena.tile_mut(c2).is_solid = solid;
        Ok(())
    }

    fn any_nearer_i64(&self, c: usize) -> i64 {
        self.arena.tile(c).any_nearer.map_or(0, |a| a as i64)
    }

    /// Convert buffered solid errors into a single retryable failure
    ///
    /// # Errors
    ///
    /// Returns `SolidDistance` when any solid error was buffered since the
    /// previous checkpoint.
    pub(crate) fn handle_distance_errors(&mut self) -> Result<()> {
        let buffered = self.solid_errors;
        self.solid_errors = 0;
        if buffered > 0 {
            self.sidecache.clear();
            if self.strategy.always_clean {
                self.clean_data();
            }
            self.solid_errors_list.clear();
            return Err(GeneratorError::SolidDistance { errors: buffered });
        }
        Ok(())
    }

    /// Assert a tile's distance final
    ///
    /// Computes the distance if unknown, replays applicable shortcuts, sets
    /// the solid flag, and walks the nearer chain making it solid as well
    /// (unless the near-solid strategy disables that).
    ///
    /// # Errors
    ///
    /// Returns the tile budget surrender, or an internal error if no
    /// distance can be established.
    pub(crate) fn be_solid(&mut self, c: usize) -> Result<()> {
        let mut next = Some(c);
        while let Some(c0) = next {
            let mut c0 = c0;
            if self.arena.tile(c0).is_solid {
                break;
            }
            if self.arena.tile_count() >= self.config.max_tcellcount {
                return Err(GeneratorError::TileBudget {
                    count: self.arena.tile_count(),
                    limit: self.config.max_tcellcount,
                });
            }
            c0 = self.arena.repr(c0);
            self.calc_distances(c0)?;
            c0 = self.arena.repr(c0);
            self.look_for_shortcuts(c0)?;
            c0 = self.arena.repr(c0);
            if self.arena.tile(c0).dist == DIST_UNKNOWN {
                return Err(internal("be_solid", "set solid but no dist"));
            }
            self.arena.tile_mut(c0).is_solid = true;
            next = if self.arena.tile(c0).dist > 0 && !self.strategy.near_solid {
                self.arena.tile(c0).any_nearer.and_then(|a| {
                    self.arena
                        .peek(Walker::new(c0, a))
                        .map(|n| n.tile)
                })
            } else {
                None
            };
        }
        Ok(())
    }

    /// Invalidate the parent decision of a tile and its neighbors
    ///
    /// The previous direction is kept in `old_parent_dir` so the parent
    /// oracle can recognize a changed decision and learn from it.
    pub(crate) fn remove_parentdir(&mut self, c: usize) {
        self.sidecache.clear();
        let clear_one = |gen: &mut Self, t: usize| {
            let tile = gen.arena.tile_mut(t);
            if let ParentDir::Dir(d) = tile.parent_dir {
                tile.old_parent_dir = ParentDir::Dir(d);
            }
            tile.parent_dir = ParentDir::Unset;
            tile.code = None;
        };
        clear_one(self, c);
        for i in 0..self.arena.size_of(c) {
            if let Some(n) = self.arena.peek(Walker::new(c, i)) {
                clear_one(self, n.tile);
            }
        }
    }
}
