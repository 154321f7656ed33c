//! Lazy materialization, vertex closure and unification
//!
//! Edges are materialized on demand. Every new connection schedules a
//! vertex-closure check on both sides: walking around the vertex to the
//! right of the edge either finds the cycle already closed, closes it by
//! connecting the two open ends, or discovers that two lazily generated
//! tiles are the same cell and queues their unification. Closure checks and
//! unifications can trigger more of each other, so they run through a FIFO
//! of deferred tasks; a single in-fixing flag turns reentrant drains into
//! tail-style sequencing.

use crate::algorithm::executor::Generator;
use crate::graph::walker::Walker;
use crate::io::error::{Result, internal, retry};

/// Deferred graph maintenance task
#[derive(Clone, Copy, Debug)]
pub enum FixTask {
    /// Declare two walkers to be the same cell
    Unify(Walker, Walker),
    /// Re-examine the vertex to the right of a walker
    CheckLoops(Walker),
}

impl Generator {
    /// Queue a unification of two walkers
    ///
    /// # Errors
    ///
    /// Returns an internal error if the walkers have different shapes.
    pub(crate) fn push_unify(&mut self, a: Walker, b: Walker) -> Result<()> {
        if self.arena.tile(a.tile).shape != self.arena.tile(b.tile).shape {
            return Err(internal("push_unify", "queued unify of different shapes"));
        }
        self.fix_queue.push_back(FixTask::Unify(a, b));
        Ok(())
    }

    /// Drain the deferred-task queue
    ///
    /// Reentrant calls return immediately; the outermost call owns the
    /// drain loop to completion.
    ///
    /// # Errors
    ///
    /// Propagates failures from the deferred unifications and closure
    /// checks.
    pub(crate) fn process_fix_queue(&mut self) -> Result<()> {
        if self.in_fixing {
            return Ok(());
        }
        self.in_fixing = true;
        while let Some(task) = self.fix_queue.pop_front() {
            let step = match task {
                FixTask::Unify(a, b) => self.unify(a, b),
                FixTask::CheckLoops(w) => self.check_loops(w),
            };
            if let Err(e) = step {
                self.in_fixing = false;
                return Err(e);
            }
        }
        self.in_fixing = false;
        Ok(())
    }

    /// Cross the current edge of a walker, materializing it if needed
    ///
    /// The walker is resolved to its class representative first, so this
    /// never observes an edge invalidated by unification.
    ///
    /// # Errors
    ///
    /// Propagates failures from materialization and the closure checks it
    /// schedules.
    pub(crate) fn wstep(&mut self, mut w: Walker) -> Result<Walker> {
        self.arena.ufind(&mut w);
        self.arena.movecount += 1;
        if let Some(n) = self.arena.peek(w) {
            return Ok(n);
        }
        if self.strategy.numerical || self.strategy.known_structure {
            self.materialize_numerical(w)?;
        } else {
            self.materialize_combinatorial(w)?;
        }
        self.arena.ufind(&mut w);
        self.arena
            .peek(w)
            .ok_or_else(|| internal("wstep", "edge still absent after materialization"))
    }

    fn materialize_combinatorial(&mut self, w: Walker) -> Result<()> {
        let shape = self.arena.tile(w.tile).shape;
        let co = self.arena.tess.shapes[shape].connections[w.spin];
        let c1 = self.arena.alloc(co.sid);
        self.connect_and_check(w, Walker::new(c1, co.eid))
    }

    fn materialize_numerical(&mut self, w: Walker) -> Result<()> {
        let cell = *self
            .tile_to_cell
            .get(&w.tile)
            .ok_or_else(|| internal("materialize", "tile has no concrete cell"))?;
        let (cell2, rev) = {
            let oracle = self
                .oracle
                .as_mut()
                .ok_or_else(|| internal("materialize", "numerical strategy without oracle"))?;
            oracle.step(cell, w.spin)
        };
        let target = match self.cell_to_tile.get(&cell2) {
            Some(&t) => t,
            None => {
                let (shape, dist) = {
                    let oracle = self.oracle.as_ref().expect("oracle checked above");
                    (oracle.shape_of(cell2), oracle.distance(cell2))
                };
                let t = self.arena.alloc(shape);
                self.cell_to_tile.insert(cell2, t);
                self.tile_to_cell.insert(t, cell2);
                if self.strategy.known_distances {
                    if let Some(d) = dist {
                        self.arena.tile_mut(t).dist = d;
                    }
                }
                t
            }
        };
        self.arena.connect(w, Walker::new(target, rev));
        if !self.strategy.known_distances {
            self.fix_distances(w.tile)?;
        }
        self.ensure_shorter(Walker::at(target))?;
        if self.strategy.numerical_fix {
            self.numerical_fix(w)?;
            self.numerical_fix(Walker::new(target, rev))?;
        }
        Ok(())
    }

    /// Materialize a neighbor early when the oracle knows it is closer
    ///
    /// Only meaningful under the known-distances strategy; a no-op
    /// otherwise.
    pub(crate) fn ensure_shorter(&mut self, cw: Walker) -> Result<()> {
        if !self.strategy.known_distances {
            return Ok(());
        }
        let Some(&cell) = self.tile_to_cell.get(&cw.tile) else {
            return Ok(());
        };
        let shorter = {
            let Some(oracle) = self.oracle.as_mut() else {
                return Ok(());
            };
            let (cell2, _) = oracle.step(cell, cw.spin);
            match oracle.distance(cell2) {
                Some(d) => d < self.arena.tile(cw.tile).dist,
                None => false,
            }
        };
        if shorter {
            self.wstep(cw)?;
        }
        Ok(())
    }

    /// Vertex completion in oracle mode
    ///
    /// Unlike the combinatorial closure check, the oracle already knows the
    /// true identity of every cell, so a completed cycle needs no
    /// unification; an almost-complete one is closed by a direct connect.
    pub(crate) fn numerical_fix(&mut self, pw: Walker) -> Result<()> {
        let valence = self.arena.valence(pw);
        let mut steps = 0;
        let pwf = pw;
        let mut pwb = pw;
        loop {
            let Some(n) = self.arena.peek(pwb) else { break };
            pwb = self.arena.rotate(n, -1);
            steps += 1;
            if pwb == pwf {
                if steps == valence {
                    return Ok(());
                }
                return Err(internal("numerical_fix", "vertex valence too small"));
            }
            if steps == valence {
                return Err(internal("numerical_fix", "incorrect looping"));
            }
        }
        let mut pwf = pwf;
        loop {
            pwf = self.arena.rotate(pwf, 1);
            let Some(n) = self.arena.peek(pwf) else { break };
            pwf = n;
            steps += 1;
            if pwb == pwf {
                if steps == valence {
                    return Ok(());
                }
                return Err(internal("numerical_fix", "vertex valence too small"));
            }
            if steps == valence {
                return Err(internal("numerical_fix", "incorrect looping"));
            }
        }
        if steps == valence - 1 {
            self.arena.connect(pwb, pwf);
            let t = pwb.tile;
            self.fix_distances(t)?;
        }
        Ok(())
    }

    /// Install an edge in both directions and schedule closure checks
    ///
    /// # Errors
    ///
    /// Propagates failures from draining the fix queue.
    pub(crate) fn connect_and_check(&mut self, mut p1: Walker, mut p2: Walker) -> Result<()> {
        self.arena.ufind(&mut p1);
        self.arena.ufind(&mut p2);
        self.arena.connect(p1, p2);
        self.fix_queue.push_back(FixTask::CheckLoops(p1));
        self.fix_queue.push_back(FixTask::CheckLoops(p2));
        self.process_fix_queue()
    }

    /// Check whether the vertex to the right of a walker is complete
    ///
    /// Walks around the vertex in both directions, alternating rotation and
    /// edge crossing. Returning to the start after exactly `valence` steps
    /// means the vertex is closed; completing `valence` steps elsewhere
    /// queues a unification of the two ends; stopping at open edges after
    /// `valence - 1` steps connects them.
    ///
    /// # Errors
    ///
    /// An early return or an overshoot indicates a vertex valence smaller
    /// than the walk, which is an internal error.
    pub(crate) fn check_loops(&mut self, mut pw: Walker) -> Result<()> {
        self.arena.ufind(&mut pw);
        let valence = self.arena.valence(pw);
        let mut steps = 0;
        let mut pwf = pw;
        let mut pwb = pw;
        loop {
            let Some(n) = self.arena.peek(pwb) else { break };
            pwb = self.arena.rotate(n, -1);
            steps += 1;
            if pwb == pwf {
                if steps == valence {
                    return Ok(());
                }
                return Err(internal("check_loops", "vertex valence too small"));
            }
            if steps == valence {
                return self.push_unify(pwf, pwb);
            }
        }
        loop {
            pwf = self.arena.rotate(pwf, 1);
            let Some(n) = self.arena.peek(pwf) else { break };
            pwf = n;
            steps += 1;
            if pwb == pwf {
                if steps == valence {
                    return Ok(());
                }
                return Err(internal("check_loops", "vertex valence too small"));
            }
            if steps == valence {
                return self.push_unify(pwf, pwb);
            }
        }
        if steps == valence - 1 {
            self.connect_and_check(pwb, pwf)?;
            let t = pwb.tile;
            self.fix_distances(t)?;
        }
        Ok(())
    }

    /// Merge the union-find classes of two walkers
    ///
    /// Requires matching shapes and a spin difference divisible by the
    /// shape's cycle length. Distances are merged first (triggering the
    /// solid-error logic on whichever side loses), then every edge of the
    /// absorbed tile is rewired onto the survivor, queueing further
    /// unifications where both sides already had neighbors.
    ///
    /// # Errors
    ///
    /// Shape or spin disagreements are internal errors; distance merging
    /// may surface any failure of the distance engine.
    pub(crate) fn unify(&mut self, mut pw1: Walker, mut pw2: Walker) -> Result<()> {
        self.arena.ufind(&mut pw1);
        self.arena.ufind(&mut pw2);
        if pw1 == pw2 {
            return Ok(());
        }
        if !self.arena.is_representative(pw1.tile) || !self.arena.is_representative(pw2.tile) {
            return Err(internal("unify", "not unified to itself"));
        }
        if pw1.tile == pw2.tile {
            return Err(internal("unify", "same tile with different spin"));
        }
        if self.arena.tile(pw1.tile).shape != self.arena.tile(pw2.tile).shape {
            return Err(internal("unify", "unifying two cells of different shapes"));
        }
        let cycle = self.arena.cycle_of(pw1.tile);
        if (pw1.spin as i64 - pw2.spin as i64).rem_euclid(cycle as i64) != 0 {
            return Err(internal("unify", "unification spin disagrees with cycle length"));
        }

        let delta = pw2.spin as i64 - pw1.spin as i64;
        self.unify_distances(pw1.tile, pw2.tile, delta)?;

        let (orig1, orig2) = (pw1, pw2);
        let size = self.arena.size_of(pw1.tile);
        for _ in 0..size {
            match (self.arena.peek(pw2), self.arena.peek(pw1)) {
                (None, _) => {}
                (Some(n2), None) => {
                    self.connect_and_check(pw1, n2)?;
                }
                (Some(n2), Some(n1)) => {
                    self.push_unify(n1, n2)?;
                    self.connect_and_check(pw1, n2)?;
                    self.connect_and_check(pw1, n1)?;
                }
            }
            pw1 = self.arena.rotate(pw1, 1);
            pw2 = self.arena.rotate(pw2, 1);
        }
        self.arena.tile_mut(orig2.tile).unified_to =
            self.arena.rotate(orig1, -(orig2.spin as i64));
        self.arena.tunified += 1;
        let survivor = orig1.tile;
        self.fix_distances(survivor)
    }

    /// Restart the iteration if any vertex cycle is still pending
    ///
    /// # Errors
    ///
    /// Returns a retryable error when deferred work remains queued outside
    /// a drain.
    pub(crate) fn ensure_fix_queue_empty(&mut self) -> Result<()> {
        if !self.in_fixing && !self.fix_queue.is_empty() {
            self.process_fix_queue()?;
            return Err(retry("vertex cycle unification pending"));
        }
        Ok(())
    }
}
