//! Spread patterns and canonical code computation
//!
//! Per key (shape, parent-spin residue), the analyzer holds a tree of
//! walker positions relative to a root walker. Instantiating it at a
//! concrete walker produces the walker's spread; classifying every spread
//! position against the spanning tree yields the cell's code, which is
//! interned into the tree-state table. When two cells that share a code
//! behave differently, the analyzer is extended with the distinguishing
//! path so their codes separate.

use crate::algorithm::executor::Generator;
use crate::algorithm::rules::TreeState;
use crate::graph::walker::Walker;
use crate::io::error::{Result, internal, retry};

/// Analyzer key: shape id plus parent-spin residue modulo cycle length
pub type Aid = (usize, usize);

/// Canonical code: analyzer key plus per-position classification
pub type Code = (Aid, Vec<u8>);

/// Position the spread reaches through a parent that is not a child
pub const C_IGNORE: u8 = 0;
/// Position that is a child of its spread parent
pub const C_CHILD: u8 = 1;
/// Non-child one unit closer to the root
pub const C_UNCLE: u8 = 2;
/// Non-child at equal distance
pub const C_EQUAL: u8 = 4;
/// Non-child one unit further from the root
pub const C_NEPHEW: u8 = 6;
/// Closer non-child lying on the path to the root
pub const C_PARENT: u8 = 8;
/// Flag added when the neighbor sits on the right side of the tree
pub const C_SIDE_RIGHT: u8 = 1;

/// A spread pattern of walker positions
///
/// Node 0 is the root walker; every other node is obtained from its parent
/// node by the recorded spin followed by an edge crossing. `exemplar`
/// stores the concrete walkers of the analyzer's first instantiation, used
/// when new steps are added.
#[derive(Clone, Debug, Default)]
pub struct Analyzer {
    pub(crate) exemplar: Vec<Walker>,
    pub(crate) parent: Vec<Option<usize>>,
    pub(crate) spin: Vec<usize>,
}

impl Analyzer {
    /// Number of positions in the spread
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Whether the analyzer has not been initialized yet
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }
}

impl Generator {
    /// The analyzer for a walker's key, initialized on first use
    ///
    /// A fresh analyzer starts with the root position plus one immediate
    /// child per edge.
    ///
    /// # Errors
    ///
    /// Propagates materialization failures while stepping the exemplar.
    pub(crate) fn ensure_analyzer(&mut self, cw: Walker) -> Result<Aid> {
        let aid = self.arena.aid(cw);
        if self.analyzers.entry(aid).or_default().is_empty() {
            {
                let a = self.analyzers.get_mut(&aid).expect("just inserted");
                a.exemplar.push(cw);
                a.parent.push(None);
                a.spin.push(0);
            }
            for i in 0..self.arena.size_of(cw.tile) {
                self.analyzer_add_step(aid, 0, i)?;
            }
        }
        Ok(aid)
    }

    /// Append one step to an analyzer, walking its exemplar
    pub(crate) fn analyzer_add_step(&mut self, aid: Aid, pid: usize, s: usize) -> Result<()> {
        let cw = self.analyzers[&aid].exemplar[pid];
        let cw = self.arena.rotate(cw, s as i64);
        let stepped = self.wstep(cw)?;
        let a = self.analyzers.get_mut(&aid).expect("analyzer exists");
        a.exemplar.push(stepped);
        a.parent.push(Some(pid));
        a.spin.push(s);
        Ok(())
    }

    /// Instantiate an analyzer at a concrete walker
    ///
    /// # Errors
    ///
    /// Propagates materialization failures.
    pub(crate) fn spread(&mut self, aid: Aid, cw: Walker) -> Result<Vec<Walker>> {
        let (parents, spins) = {
            let a = &self.analyzers[&aid];
            (a.parent.clone(), a.spin.clone())
        };
        let mut res = vec![cw];
        for i in 1..parents.len() {
            let pid = parents[i].expect("non-root spread node has a parent");
            self.arena.ufind(&mut res[pid]);
            let r1 = self.arena.rotate(res[pid], spins[i] as i64);
            let stepped = self.wstep(r1)?;
            res.push(stepped);
        }
        Ok(res)
    }

    /// Extend an analyzer so two conflicting codes become distinguishable
    ///
    /// The conflict was observed at position `pos` of the analyzer of the
    /// neighbor across `dir`; that neighbor's path is spliced into this
    /// walker's analyzer.
    ///
    /// # Errors
    ///
    /// When nothing was added on the first mismatch (a rare effect of
    /// unification) the iteration retries.
    pub(crate) fn extend_analyzer(
        &mut self,
        mut cw_target: Walker,
        dir: usize,
        pos: usize,
        mismatches: usize,
    ) -> Result<()> {
        self.arena.ufind(&mut cw_target);
        let cw_conflict = self.wstep(self.arena.rotate(cw_target, dir as i64))?;
        let a_target = self.ensure_analyzer(cw_target)?;
        let a_conflict = self.ensure_analyzer(cw_conflict)?;

        let mut ids_to_add = Vec::new();
        let mut k = pos;
        while k != 0 {
            let a = &self.analyzers[&a_conflict];
            ids_to_add.push(a.spin[k]);
            k = a.parent[k].expect("non-root spread node has a parent");
        }

        let mut gid = 1 + dir;
        let mut added = false;
        while let Some(spin) = ids_to_add.pop() {
            let found = {
                let a = &self.analyzers[&a_target];
                (0..a.len()).find(|&i| a.parent[i] == Some(gid) && a.spin[i] == spin)
            };
            gid = match found {
                Some(i) => i,
                None => {
                    let next = self.analyzers[&a_target].len();
                    self.analyzer_add_step(a_target, gid, spin)?;
                    added = true;
                    next
                }
            };
        }
        if mismatches == 0 && !added {
            // can happen when unification already merged the witnesses
            return Err(retry("no extension"));
        }
        Ok(())
    }

    /// Classify every spread position of a walker, producing its code
    ///
    /// # Errors
    ///
    /// A distance delta outside `-1..=1` between neighbors is an internal
    /// error; everything else propagates from solidity and side queries.
    pub(crate) fn id_at_spin(&mut self, mut cw: Walker) -> Result<Code> {
        self.arena.ufind(&mut cw);
        let aid = self.ensure_analyzer(cw)?;
        let sprawl = self.spread(aid, cw)?;
        let parents = self.analyzers[&aid].parent.clone();
        let mut classes: Vec<u8> = Vec::with_capacity(sprawl.len());

        for (id, cs) in sprawl.into_iter().enumerate() {
            let mut cs = cs;
            self.be_solid(cs.tile)?;
            self.be_solid(cw.tile)?;
            self.arena.ufind(&mut cw);
            self.arena.ufind(&mut cs);
            let x;
            if parents[id].is_some_and(|pid| classes[pid] != C_CHILD) {
                x = C_IGNORE;
            } else if id == 0 {
                x = C_CHILD;
            } else {
                let mut child = false;
                if self.arena.tile(cs.tile).dist != 0 {
                    let csd = self.get_parent_dir(&mut cs)?;
                    child = csd == Some(cs);
                }
                if child {
                    x = C_CHILD;
                } else {
                    let cs2 = self.wstep(cs)?;
                    self.arena.ufind(&mut cs);
                    self.be_solid(cs2.tile)?;
                    self.fix_distances(cs.tile)?;
                    let n = self
                        .arena
                        .peek(cs)
                        .ok_or_else(|| internal("id_at_spin", "edge lost during classification"))?;
                    let y = i64::from(self.arena.tile(cs.tile).dist)
                        - i64::from(self.arena.tile(n.tile).dist);
                    let mut v = if self.strategy.no_relative_distance {
                        C_EQUAL
                    } else {
                        match y {
                            1 => C_NEPHEW,
                            0 => C_EQUAL,
                            -1 => C_UNCLE,
                            _ => {
                                return Err(internal(
                                    "id_at_spin",
                                    format!("distance problem y={y}"),
                                ));
                            }
                        }
                    };
                    let gs = self.get_side(cs)?;
                    if gs == 0 && v == C_UNCLE {
                        v = C_PARENT;
                    }
                    if gs > 0 {
                        v += C_SIDE_RIGHT;
                    }
                    x = v;
                }
            }
            classes.push(x);
        }
        Ok((aid, classes))
    }

    /// The tree-state of a walker, interning a fresh code if needed
    ///
    /// Returns the canonical parent spin together with the state id. The
    /// walker is rotated conceptually to its parent direction; roots use
    /// spin 0.
    ///
    /// # Errors
    ///
    /// Observing a tile that already carried a different code is a
    /// retryable failure.
    pub(crate) fn get_code(&mut self, cw: &mut Walker) -> Result<(usize, usize)> {
        self.arena.ufind(cw);
        let c = cw.tile;
        {
            let t = self.arena.tile(c);
            if let (Some(code), true) = (t.code, t.parent_dir.is_set()) {
                return Ok((t.parent_dir.canonical_spin(), code));
            }
        }

        self.be_solid(c)?;
        self.arena.ufind(cw);

        let cd = if self.arena.tile(cw.tile).dist == 0 {
            let mut w = Walker::at(cw.tile);
            // roots still need their (trivial) parent decision cached
            self.get_parent_dir(&mut w)?;
            w
        } else {
            self.get_parent_dir(cw)?
                .ok_or_else(|| internal("get_code", "missing parent at positive distance"))?
        };
        self.arena.ufind(cw);

        let code = self.id_at_spin(cd)?;

        if let Some(&id) = self.code_to_id.get(&code) {
            self.arena.tile_mut(cd.tile).code = Some(id);
            return Ok((cd.spin, id));
        }

        let id = self.treestates.len();
        self.code_to_id.insert(code.clone(), id);
        if self.arena.tile(cd.tile).code.is_some() {
            return Err(retry("exit from get_code"));
        }
        self.arena.tile_mut(cd.tile).code = Some(id);

        self.treestates.push(TreeState {
            id,
            known: false,
            rules: Vec::new(),
            giver: None,
            sid: 0,
            parent_dir: 0,
            where_seen: *cw,
            code,
            is_live: true,
            is_root: false,
            is_possible_parent: false,
            possible_parents: Vec::new(),
        });
        Ok((cd.spin, id))
    }
}
