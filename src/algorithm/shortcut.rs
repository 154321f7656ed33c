//! Learned shortcuts between edge-walks
//!
//! When a supposedly final distance decreases, the two witness paths toward
//! the root are retraced until they meet; the resulting pair of spin
//! sequences is an identity of the tessellation. Replaying it on every tile
//! of the same shape collapses future ambiguity before it turns into more
//! solid errors.

use std::collections::{HashMap, HashSet};

use crate::algorithm::executor::Generator;
use crate::graph::arena::DIST_UNKNOWN;
use crate::graph::walker::{Walker, gmod};
use crate::io::configuration::MAX_SHORTCUT_LENGTH;
use crate::io::error::{Result, internal};

/// Equivalence between two edge-walks that end at the same cell
#[derive(Clone, Debug)]
pub struct Shortcut {
    /// Spins walked from the sample outward along old parent pointers
    pub pre: Vec<usize>,
    /// Spins of the alternate walk ending at the same cell
    pub post: Vec<usize>,
    /// Exemplar tile the shortcut was learned at
    pub sample: usize,
    /// Spin offset relating the two endpoints
    pub delta: i64,
    /// Nearer direction of the sample when the shortcut was learned
    pub last_dir: usize,
}

impl Generator {
    /// Record a solid error and learn the shortcut it witnesses
    ///
    /// `c` is the tile whose distance dropped to `d`; `alt` carries the
    /// alternate claim, reached at spin offset `delta`, and `newdir` is the
    /// direction of the new nearer neighbor. Both paths are retraced
    /// backward along `any_nearer` until they meet; the two walks from the
    /// meeting point become the shortcut.
    ///
    /// # Errors
    ///
    /// Propagates the timeout check and internal failures of the retrace.
    pub(crate) fn find_new_shortcuts(
        &mut self,
        c: usize,
        d: u32,
        alt: usize,
        newdir: i64,
        delta: i64,
    ) -> Result<()> {
        self.solid_errors_list.push(c);
        self.solid_errors += 1;
        self.all_solid_errors += 1;
        self.check_timeout()?;
        if self.strategy.no_shortcuts || self.strategy.known_distances {
            return Ok(());
        }

        let c = self.arena.repr(c);

        // the same direction means the distance merely tightened along the
        // path we already knew
        if self
            .arena
            .tile(c)
            .any_nearer
            .is_some_and(|a| a as i64 == newdir)
        {
            return Ok(());
        }
        if self.arena.tile(c).dist == DIST_UNKNOWN {
            return Err(internal(
                "find_new_shortcuts",
                "solid error with unknown distance",
            ));
        }

        // breadth-first retrace from the old claim
        let mut seen: HashMap<usize, usize> = HashMap::new();
        let mut walkers: Vec<Walker> = vec![Walker::at(c)];
        let mut walkerdir: Vec<usize> = vec![0];
        seen.insert(c, 0);
        let mut j = 0;
        while j < walkers.len() {
            let w = walkers[j];
            if self.arena.tile(w.tile).dist == 0 {
                break;
            }
            for s in 0..self.arena.size_of(w.tile) {
                let w1 = self.arena.rotate(w, s as i64);
                let Some(n) = self.arena.peek(w1) else { continue };
                if Some(w1.spin) != self.arena.tile(w1.tile).any_nearer {
                    continue;
                }
                if seen.contains_key(&n.tile) {
                    continue;
                }
                seen.insert(n.tile, walkers.len());
                walkers.push(n);
                walkerdir.push(s);
            }
            j += 1;
        }

        // adopt the new claim, then retrace it until it hits the old walk
        {
            let size = self.arena.size_of(c);
            let t = self.arena.tile_mut(c);
            t.dist = d;
            t.any_nearer = Some(gmod(newdir, size));
        }
        self.fix_distances(c)?;

        let mut seen2: HashSet<usize> = HashSet::new();
        let alt_size = self.arena.size_of(alt);
        let mut walkers2: Vec<Walker> = vec![Walker::new(alt, gmod(delta, alt_size))];
        let mut walkerdir2: Vec<usize> = vec![0];
        let mut j = 0;
        while j < walkers2.len() {
            let w = walkers2[j];
            if self.arena.tile(w.tile).dist == 0 {
                break;
            }
            for s in 0..self.arena.size_of(w.tile) {
                let mut w1 = self.arena.rotate(w, s as i64);
                self.arena.ufind(&mut w1);
                if Some(w1.spin) != self.arena.tile(w.tile).any_nearer {
                    continue;
                }
                let Some(n) = self.arena.peek(w1) else { continue };
                if seen2.contains(&n.tile) {
                    break;
                }
                seen2.insert(n.tile);
                walkers2.push(n);
                walkerdir2.push(s);
                if let Some(&wpos) = seen.get(&n.tile) {
                    return self.shortcut_found(c, &walkers, &walkers2, &walkerdir, &walkerdir2, wpos);
                }
            }
            j += 1;
        }
        Ok(())
    }

    /// Store a freshly met shortcut and replay it everywhere
    fn shortcut_found(
        &mut self,
        c: usize,
        walkers: &[Walker],
        walkers2: &[Walker],
        walkerdir: &[usize],
        walkerdir2: &[usize],
        wpos: usize,
    ) -> Result<()> {
        let pre: Vec<usize> = walkerdir[1..=wpos].to_vec();
        let post: Vec<usize> = walkerdir2[1..].to_vec();
        let last2 = walkers2[walkers2.len() - 1];
        let delta = self.arena.to_spin(walkers[wpos], last2.spin as i64) as i64;

        let shape = self.arena.tile(c).shape;
        if self
            .shortcuts
            .get(&shape)
            .is_some_and(|list| list.iter().any(|s| s.pre == pre && s.post == post))
        {
            return Ok(());
        }

        if pre.len() > MAX_SHORTCUT_LENGTH {
            return Err(internal("shortcut_found", "shortcut too long"));
        }

        let sh = Shortcut {
            pre,
            post,
            sample: c,
            delta,
            last_dir: self.arena.tile(c).any_nearer.unwrap_or(0),
        };
        self.shortcuts.entry(shape).or_default().push(sh.clone());

        // replay on every existing tile of the same shape
        for t in 0..self.arena.tile_count() {
            if self.arena.tile(t).shape == shape {
                self.look_for_shortcut(t, &sh)?;
            }
        }
        Ok(())
    }

    /// Replay every learned shortcut of a tile's shape on that tile
    ///
    /// # Errors
    ///
    /// Propagates failures from walking and unification.
    pub(crate) fn look_for_shortcuts(&mut self, c: usize) -> Result<()> {
        if self.arena.tile(c).dist == 0 {
            return Ok(());
        }
        let shape = self.arena.tile(c).shape;
        let mut i = 0;
        // the list can grow while replaying: a replay can trip another
        // solid error which learns a new shortcut
        while i < self.shortcuts.get(&shape).map_or(0, Vec::len) {
            let sh = self.shortcuts[&shape][i].clone();
            self.look_for_shortcut(c, &sh)?;
            i += 1;
        }
        Ok(())
    }

    /// Replay one shortcut starting at a tile
    pub(crate) fn look_for_shortcut(&mut self, c: usize, sh: &Shortcut) -> Result<()> {
        if self.arena.tile(c).dist == 0 || self.arena.tile(c).dist == DIST_UNKNOWN {
            return Ok(());
        }
        if self.strategy.no_smart_shortcuts {
            self.replay_plain(c, sh)
        } else {
            self.replay_smart(c, sh)
        }
    }

    /// Smart replay: unify whenever the post-path proves a strictly
    /// shorter distance, without requiring the full walk to materialize
    fn replay_smart(&mut self, c: usize, sh: &Shortcut) -> Result<()> {
        let mut tw0 = Walker::at(c);
        let mut tw = Walker::at(c);
        self.arena.ufind(&mut tw);
        self.arena.ufind(&mut tw0);

        for &v in &sh.pre {
            tw = self.arena.rotate(tw, v as i64);
            if self.arena.peek(tw).is_none() && !self.strategy.less_smart_retrace {
                return Ok(());
            }
            tw = self.wstep(tw)?;
            self.calc_distances(tw.tile)?;
        }

        let mut more_steps = sh.post.len() as i64;
        let cycle = self.arena.cycle_of(c);
        let near = self.arena.tile(c).any_nearer.unwrap_or(0);
        if sh.last_dir % cycle < near % cycle {
            more_steps -= 1;
        }

        tw = self.arena.rotate(tw, sh.delta);

        for &v in sh.post.iter().rev() {
            self.arena.ufind(&mut tw);
            if self.arena.peek(tw).is_none()
                && dist_i64(self.arena.tile(tw.tile).dist) + more_steps
                    > dist_i64(self.arena.tile(c).dist)
                && !self.strategy.less_smart_advance
            {
                return Ok(());
            }
            tw = self.wstep(tw)?;
            self.calc_distances(tw.tile)?;
            more_steps -= 1;
            tw = self.arena.rotate(tw, -(v as i64));
        }

        self.process_fix_queue()?;
        self.push_unify(tw, tw0)?;
        self.process_fix_queue()
    }

    /// Plain replay: walk both paths in full, then unify the endpoints
    fn replay_plain(&mut self, c: usize, sh: &Shortcut) -> Result<()> {
        let mut tw0 = Walker::at(c);
        let mut tw = Walker::at(c);
        self.arena.ufind(&mut tw);
        self.arena.ufind(&mut tw0);

        for &v in &sh.pre {
            tw = self.arena.rotate(tw, v as i64);
            let Some(n) = self.arena.peek(tw) else {
                return Ok(());
            };
            if dist_i64(self.arena.tile(n.tile).dist) != dist_i64(self.arena.tile(tw.tile).dist) - 1
            {
                return Ok(());
            }
            tw = self.wstep(tw)?;
        }

        self.arena.ufind(&mut tw0);
        let mut npath = Vec::new();
        for &v in &sh.post {
            npath.push(tw0.tile);
            tw0 = self.arena.rotate(tw0, v as i64);
            tw0 = self.wstep(tw0)?;
            self.calc_distances(tw0.tile)?;
        }
        npath.push(tw0.tile);

        let tw1 = self.arena.rotate(tw, sh.delta);
        if self.arena.tile(tw1.tile).shape == self.arena.tile(tw0.tile).shape {
            self.push_unify(tw1, tw0)?;
        }
        self.process_fix_queue()?;
        for t in npath {
            let r = self.arena.repr(t);
            self.fix_distances(r)?;
        }
        Ok(())
    }
}

fn dist_i64(d: u32) -> i64 {
    i64::from(d)
}
