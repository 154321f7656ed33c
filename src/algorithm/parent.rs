//! Parent-direction oracle
//!
//! Every non-root cell deterministically picks the edge leading to its
//! spanning-tree parent. Candidates are the neighbors one unit closer to
//! the root; the cheap priority prefers the smallest spin residue modulo
//! the shape's cycle length, and ties between candidates sharing a residue
//! are resolved by walking both toward the root in lockstep.

use crate::algorithm::executor::Generator;
use crate::graph::arena::ParentDir;
use crate::graph::walker::Walker;
use crate::io::error::{Result, internal};

impl Generator {
    /// The walker pointing at a cell's tree parent, or `None` for a root
    ///
    /// The queried walker is resolved through unification; if the cell
    /// moves or its distance changes while neighbors are being
    /// materialized, the computation restarts on the surviving cell. The
    /// decision is cached on the tile; a changed decision schedules
    /// shortcut discovery, because the old direction is now known to be
    /// worse and that is signal.
    ///
    /// # Errors
    ///
    /// Propagates solidity and tie-break failures; a cell with no nearer
    /// neighbor at positive distance is an internal error.
    pub(crate) fn get_parent_dir(&mut self, cw: &mut Walker) -> Result<Option<Walker>> {
        'restart: loop {
            self.arena.ufind(cw);
            let c = cw.tile;
            match self.arena.tile(c).parent_dir {
                ParentDir::Dir(d) => return Ok(Some(Walker::new(c, d))),
                ParentDir::Root => return Ok(None),
                ParentDir::Unset => {}
            }

            self.be_solid(c)?;
            self.arena.ufind(cw);
            let c = cw.tile;
            if self.arena.tile(c).parent_dir.is_set() {
                continue 'restart;
            }

            let mut best: Option<usize> = None;

            if self.arena.tile(c).dist > 0 {
                let n = self.arena.size_of(c);
                let k = self.arena.cycle_of(c);
                let d = self.arena.tile(c).dist;

                let mut nearer = Vec::new();
                for i in 0..n {
                    self.ensure_shorter(self.arena.rotate(*cw, i as i64))?;
                    let c1 = self.wstep(Walker::new(c, i))?;
                    self.be_solid(c1.tile)?;
                    let r1 = self.arena.repr(c1.tile);
                    if self.arena.tile(r1).dist < d {
                        nearer.push(i);
                    }
                    self.arena.ufind(cw);
                    if d != self.arena.tile(cw.tile).dist || c != cw.tile {
                        continue 'restart;
                    }
                }

                // celebrity identification: a candidate only has to beat
                // the current best
                let beats = |i: usize, old: Option<usize>| -> bool {
                    let Some(o) = old else { return true };
                    if i % k != o % k {
                        return i % k < o % k;
                    }
                    true
                };

                let mut failed = self.strategy.parent_always;
                if !failed {
                    for &ne in &nearer {
                        if beats(ne, best) {
                            best = Some(ne);
                        }
                    }
                    for &ne in &nearer {
                        if Some(ne) != best && beats(ne, best) {
                            failed = true;
                        }
                    }
                }

                if failed {
                    if self.strategy.parent_never && !self.strategy.parent_always {
                        return Err(internal("get_parent_dir", "still confused"));
                    }
                    self.hard_parents += 1;
                    let Some(&first) = nearer.first() else {
                        return Err(internal("get_parent_dir", "no nearer neighbor"));
                    };
                    let mut bestd = first;
                    for &ne1 in &nearer {
                        if ne1 != bestd
                            && self.beats_exhaustive(Walker::new(c, ne1), Walker::new(c, bestd))?
                        {
                            bestd = ne1;
                        }
                    }
                    best = Some(bestd);
                }

                if best.is_none() {
                    return Err(internal("get_parent_dir", "no parent candidate"));
                }
            }

            let decided = match best {
                Some(b) => ParentDir::Dir(b),
                None => ParentDir::Root,
            };
            self.arena.tile_mut(c).parent_dir = decided;

            if let (ParentDir::Dir(old), Some(b)) = (self.arena.tile(c).old_parent_dir, best) {
                if old != b {
                    self.arena.tile_mut(c).any_nearer = Some(old);
                    let dist = self.arena.tile(c).dist;
                    self.find_new_shortcuts(c, dist, c, b as i64, 0)?;
                }
            }

            self.parent_updates += 1;
            return Ok(best.map(|b| Walker::new(c, b)));
        }
    }

    /// Lockstep tie-break between two parent candidates
    ///
    /// Both walkers climb toward the root; the first position where their
    /// turns toward their own parents differ decides, smaller winning. At
    /// the root the larger spin wins.
    ///
    /// # Errors
    ///
    /// Exceeding the advance-step budget is an internal error; distance
    /// errors discovered along the climb surface as retries.
    pub(crate) fn beats_exhaustive(&mut self, w1: Walker, w2: Walker) -> Result<bool> {
        let mut w1 = w1;
        let mut w2 = w2;
        let mut iter = 0;
        loop {
            iter += 1;
            if iter > self.config.max_adv_steps {
                return Err(internal(
                    "beats_exhaustive",
                    "advance budget exceeded in parent tie-break",
                ));
            }
            w1 = self.wstep(w1)?;
            w2 = self.wstep(w2)?;

            if self.arena.tile(w1.tile).dist == 0 {
                return Ok(w1.spin > w2.spin);
            }

            self.be_solid(w1.tile)?;
            self.be_solid(w2.tile)?;
            self.handle_distance_errors()?;

            let sw1 = self
                .get_parent_dir(&mut w1)?
                .ok_or_else(|| internal("beats_exhaustive", "unexpected root"))?;
            let sw2 = self
                .get_parent_dir(&mut w2)?
                .ok_or_else(|| internal("beats_exhaustive", "unexpected root"))?;

            let d1 = self.arena.to_spin(w1, sw1.spin as i64);
            let d2 = self.arena.to_spin(w2, sw2.spin as i64);
            if d1 != d2 {
                return Ok(d1 < d2);
            }
            w1 = sw1;
            w2 = sw2;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::executor::Generator;
    use crate::tessellation::catalog;

    // A freshly materialized neighbor of the origin must pick the edge
    // back to the origin as its parent
    #[test]
    fn test_neighbor_of_origin_points_home() {
        let mut gen = Generator::new(catalog::regular(7, 3)).unwrap();
        let o = gen.arena.alloc(0);
        gen.arena.tile_mut(o).dist = 0;
        let n = gen.wstep(Walker::new(o, 2)).unwrap();
        let mut w = Walker::at(n.tile);
        let parent = gen.get_parent_dir(&mut w).unwrap().expect("not a root");
        let back = gen.wstep(parent).unwrap();
        assert_eq!(gen.arena.repr(back.tile), gen.arena.repr(o));
        // cached now
        assert!(gen.arena.tile(w.tile).parent_dir.is_set());
    }

    #[test]
    fn test_origin_reports_root() {
        let mut gen = Generator::new(catalog::regular(7, 3)).unwrap();
        let o = gen.arena.alloc(0);
        gen.arena.tile_mut(o).dist = 0;
        let mut w = Walker::at(o);
        assert_eq!(gen.get_parent_dir(&mut w).unwrap(), None);
        assert_eq!(gen.arena.tile(o).parent_dir, ParentDir::Root);
    }
}
