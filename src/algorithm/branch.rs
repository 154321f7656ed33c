//! Branch verification along child boundaries
//!
//! For every pair of adjacent live children of a state, two walkers march
//! down the facing sides of the two subtrees. Whenever both sides read
//! their unwinding rules with empty stacks, the boundary's state sequence
//! is hashed into a deadstack; seeing the same deadstack twice proves the
//! branch periodic and consistent. A code observed on the far side that
//! does not match the expected child state is a branch conflict: it is
//! recorded once, the cell is queued for refinement, and the branch is
//! abandoned.

use crate::algorithm::executor::Generator;
use crate::algorithm::rules::Rule;
use crate::graph::walker::{Walker, gmod};
use crate::io::error::{Result, internal, retry};

/// State id plus relative spin, as pushed on deadstacks
type TsInfo = (usize, usize);

impl Generator {
    /// Tree-state and spin of a walker relative to its canonical direction
    pub(crate) fn get_tsinfo(&mut self, tw: &mut Walker) -> Result<TsInfo> {
        let (first, second) = self.get_code(tw)?;
        let size = self.arena.size_of(tw.tile);
        Ok((second, gmod(tw.spin as i64 - first as i64, size)))
    }

    /// Rule at a walker's position, requesting a retry for unknown states
    pub(crate) fn get_rule(&mut self, tw: Walker, tsi: TsInfo) -> Result<Rule> {
        if self.treestates[tsi.0].rules.is_empty() {
            self.important.push(Walker::at(tw.tile));
            return Err(retry("unknown rule in get_rule"));
        }
        Ok(self.treestates[tsi.0].rules[tsi.1])
    }

    /// Record the boundary states from here to the nearest live branch
    fn push_deadstack(
        &mut self,
        hash: &mut Vec<(i64, i64)>,
        mut w: Walker,
        tsi: TsInfo,
        dir: i64,
    ) -> Result<()> {
        hash.push((tsi.0 as i64, tsi.1 as i64));
        let mut state = tsi.0;
        let mut spin = tsi.1 as i64;
        loop {
            self.arena.ufind(&mut w);
            if hash.len() > self.config.max_bdata {
                return Err(internal("push_deadstack", "deadstack overflow"));
            }
            spin += dir;
            w = self.arena.rotate(w, dir);
            if self.treestates[state].is_root {
                return Ok(());
            }
            let len = self.treestates[state].rules.len() as i64;
            if spin == 0 || spin == len {
                w = self.wstep(w)?;
                let t = self.get_tsinfo(&mut w)?;
                state = t.0;
                spin = t.1 as i64;
                hash.push((t.0 as i64, t.1 as i64));
            } else {
                if self.treestates[state].rules.is_empty() {
                    return Err(retry("empty rule"));
                }
                if spin < 0 || spin > len {
                    return Err(internal("push_deadstack", "spin out of range"));
                }
                if let Rule::Child(c) = self.treestates[state].rules[spin as usize] {
                    if c > 0 && self.treestates[c].is_live {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Advance one side of a branch walk, verifying codes across children
    ///
    /// Returns `false` when a branch conflict was found and the branch
    /// must be abandoned.
    fn verified_treewalk(&mut self, tw: &mut Walker, expected: Option<usize>, dir: i64) -> Result<bool> {
        if let Some(id) = expected {
            let mut tw1 = self.wstep(*tw)?;
            let co = self.get_code(&mut tw1)?;
            if co.1 != id || co.0 != tw1.spin {
                self.handle_distance_errors()?;
                let tw2 = self.wstep(*tw)?;
                let conflict_id = ((tw2.spin, id), co);
                if self.strategy.examine_all || !self.branch_conflicts_seen.contains(&conflict_id)
                {
                    self.branch_conflicts_seen.insert(conflict_id);
                    self.important.push(Walker::at(tw.tile));
                }
                return Ok(false);
            }
        }
        self.treewalk(tw, dir)?;
        Ok(true)
    }

    /// Walk the two facing sides of adjacent live children until their
    /// deadstack repeats
    ///
    /// # Errors
    ///
    /// Exceeding the per-branch step budget is retryable only when a
    /// conflict is already known in this run; otherwise it is an internal
    /// failure. Under the examine-once strategy a conflict aborts the
    /// whole iteration.
    pub(crate) fn examine_branch(&mut self, id: usize, left: i64, _right: i64) -> Result<()> {
        let Some(rg) = self.treestates[id].giver else {
            return Err(retry("no giver in examine_branch"));
        };

        let mut wl = self.arena.rotate(rg, left);
        let mut wr = self.arena.rotate(rg, left + 1);

        let mut lstack: Vec<Walker> = Vec::new();
        let mut rstack: Vec<Walker> = Vec::new();

        let mut steps = 0;
        loop {
            self.handle_distance_errors()?;
            steps += 1;
            if steps > self.config.max_examine_branch {
                if self.branch_conflicts_seen.is_empty() {
                    return Err(internal("examine_branch", "branch budget exceeded"));
                }
                // possibly caused by incorrect liveness detection
                return Err(retry("branch budget exceeded after a conflict"));
            }

            let tsl = self.get_tsinfo(&mut wl)?;
            let tsr = self.get_tsinfo(&mut wr)?;

            let rl = self.get_rule(wl, tsl)?;
            let rr = self.get_rule(wr, tsr)?;

            let advanced = if rl == Rule::Right
                && rr == Rule::Left
                && lstack.is_empty()
                && rstack.is_empty()
            {
                let mut hash: Vec<(i64, i64)> = Vec::new();
                self.push_deadstack(&mut hash, wl, tsl, -1)?;
                let delta = i64::from(self.arena.tile(wl.tile).dist)
                    - i64::from(self.arena.tile(wr.tile).dist);
                hash.push((-1, delta));
                self.push_deadstack(&mut hash, wr, tsr, 1)?;
                if self.verified_branches.contains(&hash) {
                    return Ok(());
                }
                self.verified_branches.insert(hash);
                self.verified_treewalk(&mut wl, rl.child(), -1)?
                    && self.verified_treewalk(&mut wr, rr.child(), 1)?
            } else if rl == Rule::Right && lstack.last() == Some(&self.wstep(wl)?) {
                lstack.pop();
                self.verified_treewalk(&mut wl, rl.child(), -1)?
            } else if rr == Rule::Left && rstack.last() == Some(&self.wstep(wr)?) {
                rstack.pop();
                self.verified_treewalk(&mut wr, rr.child(), 1)?
            } else if rl == Rule::Left {
                lstack.push(wl);
                self.verified_treewalk(&mut wl, rl.child(), -1)?
            } else if rr == Rule::Right {
                rstack.push(wr);
                self.verified_treewalk(&mut wr, rr.child(), 1)?
            } else if rl != Rule::Right {
                self.verified_treewalk(&mut wl, rl.child(), -1)?
            } else if rr != Rule::Right {
                self.verified_treewalk(&mut wr, rr.child(), 1)?
            } else {
                return Err(internal("examine_branch", "cannot advance while examining"));
            };

            if !advanced {
                if self.strategy.examine_once {
                    return Err(retry("advance failed"));
                }
                return Ok(());
            }
        }
    }

    /// Mark the descent of a dead root's single live branch
    ///
    /// Cells close to such a root get wrong side classifications from the
    /// fast climb, so they are collected here and excluded from it.
    pub(crate) fn find_single_live_branch(&mut self, at: &mut Walker) -> Result<()> {
        self.handle_distance_errors()?;
        self.rules_iteration_for(at)?;
        let id = self.get_code(at)?.1;
        let t = self.arena.size_of(at.tile);
        let r = self.treestates[id].rules.clone();
        if r.is_empty() {
            self.important.push(Walker::at(at.tile));
            return Err(retry("no giver in find_single_live_branch"));
        }
        let mut live_children = 0;
        for rule in r.iter().take(t) {
            if let Rule::Child(c) = rule {
                if self.treestates[*c].is_live {
                    live_children += 1;
                }
            }
        }
        for (i, rule) in r.iter().take(t).enumerate() {
            if let Rule::Child(c) = rule {
                self.single_live_branch_close_to_root.insert(at.tile);
                if !self.treestates[*c].is_live || live_children == 1 {
                    let mut at1 = self.wstep(self.arena.rotate(*at, i as i64))?;
                    self.find_single_live_branch(&mut at1)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::executor::Generator;
    use crate::tessellation::catalog;

    #[test]
    fn test_get_rule_requests_retry_for_unknown_state() {
        let mut gen = Generator::new(catalog::regular(7, 3)).unwrap();
        let o = gen.arena.alloc(0);
        gen.arena.tile_mut(o).dist = 0;
        gen.t_origin.push(Walker::at(o));
        let mut w = Walker::at(o);
        let tsi = gen.get_tsinfo(&mut w).unwrap();
        // the state exists but its rules were never derived
        let err = gen.get_rule(w, tsi).unwrap_err();
        assert!(err.is_retryable());
        assert!(!gen.important.is_empty());
    }

    #[test]
    fn test_examine_branch_needs_a_giver() {
        let mut gen = Generator::new(catalog::regular(7, 3)).unwrap();
        let o = gen.arena.alloc(0);
        gen.arena.tile_mut(o).dist = 0;
        gen.t_origin.push(Walker::at(o));
        let mut w = Walker::at(o);
        let _ = gen.get_code(&mut w).unwrap();
        let err = gen.examine_branch(0, 0, 0).unwrap_err();
        assert!(err.is_retryable());
    }
}
