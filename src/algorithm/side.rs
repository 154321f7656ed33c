//! Side classification relative to the spanning tree
//!
//! Answers whether a neighbor lies on the left side, the right side, or on
//! the root path of a cell. The fast path climbs both cells toward the
//! root and compares the turns at the meeting point; when that is
//! inconclusive the boundary of the tree is walked around in both
//! directions until one walk reaches the neighbor. Results are cached per
//! walker; the cache is invalidated wholesale by distance or parent
//! changes.

use crate::algorithm::executor::Generator;
use crate::graph::walker::Walker;
use crate::io::error::{Result, internal, retry};

impl Generator {
    /// One step of the boundary walk
    ///
    /// A walker pointing at its parent steps through; otherwise it steps
    /// across and stays only if the far side points back (descending into
    /// a child). The spin is then rotated by `delta`.
    pub(crate) fn treewalk(&mut self, cw: &mut Walker, delta: i64) -> Result<()> {
        self.arena.ufind(cw);
        let at_root = self.arena.tile(cw.tile).dist == 0;
        let points_at_parent = if at_root {
            false
        } else {
            self.get_parent_dir(cw)? == Some(*cw)
        };
        if points_at_parent {
            *cw = self.wstep(*cw)?;
        } else {
            let mut cw1 = self.wstep(*cw)?;
            let far_root = self.arena.tile(cw1.tile).dist == 0;
            if !far_root && self.get_parent_dir(&mut cw1)? == Some(cw1) {
                *cw = cw1;
            }
        }
        *cw = self.arena.rotate(*cw, delta);
        Ok(())
    }

    /// Which side of the tree the far side of `what` lies on
    ///
    /// Returns a positive value for right, negative for left, zero for the
    /// root path.
    ///
    /// # Errors
    ///
    /// Step-budget overruns are retryable once any parent was updated this
    /// iteration and internal errors otherwise.
    pub(crate) fn get_side(&mut self, what: Walker) -> Result<i64> {
        let cache = !self.strategy.no_sidecache;
        let fast = !self.strategy.slow_side;

        if cache {
            if let Some(&v) = self.sidecache.get(&what) {
                return Ok(v);
            }
        }

        let mut res: Option<i64> = None;
        let mut steps = 0;

        if fast {
            let mut w = what;
            let mut tw = self.wstep(what)?;
            while w.tile != tw.tile {
                steps += 1;
                if steps > self.config.max_getside {
                    return Err(internal("get_side", "side climb froze"));
                }
                self.arena.ufind(&mut w);
                self.arena.ufind(&mut tw);
                let dw = self.arena.tile(w.tile).dist;
                let dt = self.arena.tile(tw.tile).dist;
                if dw > dt {
                    self.climb(&mut w)?;
                } else if dw < dt {
                    self.climb(&mut tw)?;
                } else {
                    self.climb(&mut w)?;
                    self.climb(&mut tw)?;
                }
            }
            if self.arena.tile(w.tile).dist > 0
                && !self.single_live_branch_close_to_root.contains(&w.tile)
            {
                let wd = self
                    .get_parent_dir(&mut w)?
                    .ok_or_else(|| internal("get_side", "parent lost at meeting point"))?;
                self.arena.ufind(&mut tw);
                let a = self.arena.to_spin(wd, w.spin as i64) as i64;
                let b = self.arena.to_spin(wd, tw.spin as i64) as i64;
                res = Some(a - b);
            }
        }

        // boundary walk; also detects the trivial on-path case directly
        let to_what = self.wstep(what)?;
        let mut ws = what;
        self.treewalk(&mut ws, 0)?;
        if ws == to_what {
            res = Some(0);
        }

        let mut wl = what;
        let mut wr = what;
        while res.is_none() {
            self.handle_distance_errors()?;
            steps += 1;
            if steps > self.config.max_getside {
                if self.parent_updates > 0 {
                    return Err(retry("side walk frozen"));
                }
                return Err(internal("get_side", "side walk froze"));
            }
            let dl = self.arena.tile(wl.tile).dist;
            let dr = self.arena.tile(wr.tile).dist;
            if dl <= dr {
                self.treewalk(&mut wl, -1)?;
                if wl == to_what {
                    res = Some(1);
                }
            }
            if dl >= dr {
                self.treewalk(&mut wr, 1)?;
                if wr == to_what {
                    res = Some(-1);
                }
            }
        }

        let res = res.expect("side resolved above");
        if cache {
            self.sidecache.insert(what, res);
        }
        Ok(res)
    }

    /// Advance a climbing walker to its parent tile
    fn climb(&mut self, cw: &mut Walker) -> Result<()> {
        let wd = self
            .get_parent_dir(cw)?
            .ok_or_else(|| internal("get_side", "climb reached a root"))?;
        *cw = wd;
        let n = self
            .arena
            .peek(*cw)
            .ok_or_else(|| internal("get_side", "parent edge missing"))?;
        if self.arena.tile(n.tile).dist >= self.arena.tile(cw.tile).dist {
            self.handle_distance_errors()?;
            return Err(internal("get_side", "parent direction error"));
        }
        *cw = self.wstep(*cw)?;
        Ok(())
    }
}
