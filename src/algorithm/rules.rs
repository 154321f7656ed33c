//! Tree-state table and per-edge rule derivation
//!
//! A tree-state is an equivalence class of cells under code equality. Its
//! rule vector says, per edge, whether the neighbor is the parent, a child
//! state, or a sibling reached by walking left or right along the parent's
//! children ring. Recomputing a known state's rules and disagreeing
//! pinpoints where the analyzer must grow.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::algorithm::analyzer::{C_IGNORE, Code};
use crate::algorithm::executor::Generator;
use crate::graph::walker::Walker;
use crate::io::error::{Result, internal, retry};

/// Per-edge rule of a tree-state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rule {
    /// The edge leads to the tree parent
    Parent,
    /// The neighbor is found by walking left along the children ring
    Left,
    /// The neighbor is found by walking right along the children ring
    Right,
    /// The edge spawns a child with this state
    Child(usize),
}

impl Rule {
    /// The child state id, if any
    pub const fn child(&self) -> Option<usize> {
        match self {
            Self::Child(c) => Some(*c),
            _ => None,
        }
    }
}

/// One state of the finite automaton
#[derive(Clone, Debug)]
pub struct TreeState {
    /// State id; positions in the table and ids always agree
    pub id: usize,
    /// Whether the rule vector has been derived
    pub known: bool,
    /// Per-edge rules, indexed from the canonical parent direction
    pub rules: Vec<Rule>,
    /// Exemplar walker the rules were derived from
    pub giver: Option<Walker>,
    /// Shape of the state's cells
    pub sid: usize,
    /// Canonical parent direction in shape coordinates
    pub parent_dir: usize,
    /// Walker that first produced this code
    pub where_seen: Walker,
    /// The interned code
    pub code: Code,
    /// Whether the subtree contains children transitively
    pub is_live: bool,
    /// Whether the state can sit above another state in the tree
    pub is_possible_parent: bool,
    /// Whether the state is an origin state
    pub is_root: bool,
    /// `(parent_state, edge)` pairs that list this state as a child
    pub possible_parents: Vec<(usize, usize)>,
}

/// The finished automaton: states plus the root state id
#[derive(Clone, Debug)]
pub struct RuleTable {
    /// Tree-state table
    pub states: Vec<TreeState>,
    /// State assigned to the first origin
    pub root: usize,
}

impl Generator {
    /// Derive the rule vector for a state's canonical walker
    pub(crate) fn gen_rule(&mut self, cwmain: Walker, id: usize) -> Result<Vec<Rule>> {
        let size = self.arena.size_of(cwmain.tile);
        let mut cids: Vec<Option<Rule>> = Vec::with_capacity(size);
        for a in 0..size {
            let front = self.arena.rotate(cwmain, a as i64);
            let mut c1 = self.wstep(front)?;
            self.be_solid(c1.tile)?;
            if a == 0 && self.arena.tile(cwmain.tile).dist != 0 {
                cids.push(Some(Rule::Parent));
                continue;
            }
            if self.arena.tile(c1.tile).dist <= self.arena.tile(cwmain.tile).dist {
                cids.push(None);
                continue;
            }
            let (d1, id1) = self.get_code(&mut c1)?;
            // the rule is a real child only if the chosen parent points
            // back through this very edge
            let back = self.wstep(Walker::new(c1.tile, d1))?;
            if back.tile != cwmain.tile || back.spin != front.spin {
                cids.push(None);
                continue;
            }
            cids.push(Some(Rule::Child(id1)));
        }

        let mut rules = Vec::with_capacity(size);
        for (i, cid) in cids.into_iter().enumerate() {
            match cid {
                Some(r) => rules.push(r),
                None => {
                    let val = self.treestates[id].code.1[i + 1];
                    if !(2..=9).contains(&val) {
                        return Err(retry("wrong code in gen_rule"));
                    }
                    rules.push(if val & 1 == 1 { Rule::Right } else { Rule::Left });
                }
            }
        }
        Ok(rules)
    }

    /// Compute or re-verify the rules of the state seen at a walker
    ///
    /// # Errors
    ///
    /// A disagreement with the stored rules extends the analyzer at the
    /// mismatching positions and retries; a disagreement on the special
    /// rules is an internal error.
    pub(crate) fn rules_iteration_for(&mut self, cw: &mut Walker) -> Result<()> {
        self.arena.ufind(cw);
        let (d, id) = self.get_code(cw)?;
        let mut cwmain = Walker::new(cw.tile, d);
        self.arena.ufind(&mut cwmain);

        let cids = self.gen_rule(cwmain, id)?;

        if !self.treestates[id].known {
            let sid = self.arena.tile(cwmain.tile).shape;
            let is_root = self.arena.tile(cw.tile).dist == 0;
            let ts = &mut self.treestates[id];
            ts.known = true;
            ts.rules = cids;
            ts.giver = Some(cwmain);
            ts.sid = sid;
            ts.parent_dir = cwmain.spin;
            ts.is_root = is_root;
            return Ok(());
        }

        if self.treestates[id].rules == cids {
            return Ok(());
        }

        self.handle_distance_errors()?;
        let stored = self.treestates[id].rules.clone();
        let mut mismatches = 0;
        for z in 0..cids.len() {
            if stored[z] == cids[z] {
                continue;
            }
            let (Some(a), Some(b)) = (stored[z].child(), cids[z].child()) else {
                return Err(internal("rules_iteration_for", "special rule mismatch"));
            };
            let c1 = self.treestates[a].code.1.clone();
            let c2 = self.treestates[b].code.1.clone();
            if c1.len() != c2.len() {
                return Err(internal("rules_iteration_for", "code length mismatch"));
            }
            for k in 0..c1.len() {
                if c1[k] == C_IGNORE || c2[k] == C_IGNORE {
                    continue;
                }
                if c1[k] != c2[k] {
                    self.extend_analyzer(cwmain, z, k, mismatches)?;
                    mismatches += 1;
                    if !self.strategy.conflict_full_extension {
                        return Err(retry("mismatch error"));
                    }
                }
            }
        }

        if mismatches > 0 {
            return Err(retry("mismatch error"));
        }
        Err(internal("rules_iteration_for", "rules differ with no mismatch"))
    }
}

/// Outcome of a seeded spot-check walk over a finished table
#[derive(Clone, Copy, Debug, Default)]
pub struct SpotCheck {
    /// Steps actually walked
    pub steps: usize,
    /// Deepest distance reached
    pub max_dist: u32,
    /// Distinct states visited
    pub states_visited: usize,
}

/// Randomly walk a finished table, validating its closure
///
/// Follows child rules downward and possible parents upward with a seeded
/// generator, checking that every referenced state id exists and that
/// distances stay consistent with the tree structure.
///
/// # Errors
///
/// Returns an internal error on any dangling reference, which would mean
/// the table was not safe to publish.
pub fn spot_check(table: &RuleTable, seed: u64, steps: usize) -> Result<SpotCheck> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = table.root;
    let mut dist: u32 = 0;
    let mut visited = vec![false; table.states.len()];
    let mut report = SpotCheck::default();

    if state >= table.states.len() {
        return Err(internal("spot_check", "root state out of range"));
    }
    visited[state] = true;

    for _ in 0..steps {
        let ts = &table.states[state];
        if ts.rules.is_empty() {
            return Err(internal("spot_check", format!("state {state} has no rules")));
        }
        let edge = rng.random_range(0..ts.rules.len());
        match ts.rules[edge] {
            Rule::Child(c) => {
                if c >= table.states.len() {
                    return Err(internal(
                        "spot_check",
                        format!("state {state} edge {edge} references state {c}"),
                    ));
                }
                state = c;
                dist += 1;
            }
            Rule::Parent => {
                let choices = &ts.possible_parents;
                if choices.is_empty() {
                    return Err(internal(
                        "spot_check",
                        format!("state {state} has no possible parents"),
                    ));
                }
                // depth 0 means the walk already climbed above its start
                if dist > 0 {
                    let (p, _edge) = choices[rng.random_range(0..choices.len())];
                    if p >= table.states.len() {
                        return Err(internal("spot_check", format!("parent {p} out of range")));
                    }
                    state = p;
                    dist -= 1;
                }
            }
            Rule::Left | Rule::Right => {}
        }
        visited[state] = true;
        report.steps += 1;
        report.max_dist = report.max_dist.max(dist);
    }

    report.states_visited = visited.iter().filter(|v| **v).count();
    Ok(report)
}
