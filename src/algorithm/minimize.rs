//! Rule-table minimization and possible-parent computation
//!
//! Partition refinement over the rule vectors: states start partitioned by
//! analyzer key and split until behaviorally equivalent states share a
//! class. Possible parents are the fixpoint of "has a parent rule and is
//! still listed as someone's child".

use std::collections::HashMap;

use bitvec::prelude::*;

use crate::algorithm::executor::Generator;
use crate::algorithm::rules::{Rule, TreeState};

// stable sentinels for the special rules inside refinement hash vectors
const H_LEFT: i64 = -4;
const H_RIGHT: i64 = -5;
const H_PARENT: i64 = -6;

impl Generator {
    /// Recompute liveness to fixpoint
    ///
    /// A state stays live while it has at least one live child.
    pub(crate) fn compute_liveness(&mut self) {
        let n = self.treestates.len();
        let mut live: BitVec = BitVec::repeat(false, n);
        for (i, ts) in self.treestates.iter().enumerate() {
            live.set(i, ts.is_live);
        }
        loop {
            let mut new_deadends = 0;
            for id in 0..n {
                let ts = &self.treestates[id];
                if !ts.known || !live[id] {
                    continue;
                }
                let children = ts
                    .rules
                    .iter()
                    .filter_map(Rule::child)
                    .filter(|c| live[*c])
                    .count();
                if children == 0 {
                    live.set(id, false);
                    new_deadends += 1;
                }
            }
            if new_deadends == 0 {
                break;
            }
        }
        for (i, ts) in self.treestates.iter_mut().enumerate() {
            ts.is_live = live[i];
        }
    }

    /// Merge tree-states with identical behavior
    ///
    /// The initial partition is by analyzer key of each state's giver;
    /// refinement hashes each state's class together with the classes of
    /// its rule vector until the number of classes stabilizes. States are
    /// then renumbered and every internal reference rewritten.
    pub(crate) fn minimize_rules(&mut self) {
        self.states_premini = self.treestates.len();
        let next_id = self.treestates.len();

        let mut new_id = vec![0usize; next_id];
        let mut new_id_of: HashMap<(usize, usize), usize> = HashMap::new();
        let mut new_ids = 0;

        for id in 0..next_id {
            let aid = match self.treestates[id].giver {
                Some(g) => self.arena.aid(g),
                None => (self.treestates[id].sid, 0),
            };
            let class = *new_id_of.entry(aid).or_insert_with(|| {
                let v = new_ids;
                new_ids += 1;
                v
            });
            new_id[id] = class;
        }

        let mut last_new_ids = 0;
        while new_ids > last_new_ids && new_ids < next_id {
            last_new_ids = new_ids;
            let mut hashes: HashMap<Vec<i64>, usize> = HashMap::new();
            new_ids = 0;
            let last = new_id.clone();

            for id in 0..next_id {
                let mut hash: Vec<i64> = Vec::with_capacity(1 + self.treestates[id].rules.len());
                hash.push(last[id] as i64);
                for r in &self.treestates[id].rules {
                    hash.push(match r {
                        Rule::Child(c) => last[*c] as i64,
                        Rule::Left => H_LEFT,
                        Rule::Right => H_RIGHT,
                        Rule::Parent => H_PARENT,
                    });
                }
                let class = *hashes.entry(hash).or_insert_with(|| {
                    let v = new_ids;
                    new_ids += 1;
                    v
                });
                new_id[id] = class;
            }
        }

        // renumber to the representative of each class, in first-seen order
        let mut old_id = vec![usize::MAX; new_ids];
        for i in 0..next_id {
            if old_id[new_id[i]] == usize::MAX {
                old_id[new_id[i]] = i;
            }
        }

        let mut new_states = Vec::with_capacity(new_ids);
        for (i, &old) in old_id.iter().enumerate() {
            let mut ts = self.treestates[old].clone();
            ts.id = i;
            new_states.push(ts);
        }
        for ts in &mut new_states {
            for r in &mut ts.rules {
                if let Rule::Child(c) = r {
                    *c = new_id[*c];
                }
            }
        }
        self.treestates = new_states;

        for v in self.code_to_id.values_mut() {
            *v = new_id[*v];
        }
        self.rule_root = new_id[self.rule_root];
    }

    /// Compute the possible-parent sets of the current table to fixpoint
    pub(crate) fn find_possible_parents(&mut self) {
        compute_possible_parents(&mut self.treestates);
    }
}

/// Compute the possible-parent sets of a tree-state table to fixpoint
///
/// A state is initially a possible parent iff any of its rules is the
/// parent rule; states nobody lists as a child are eliminated until
/// stable. Surviving states record the `(parent, edge)` pairs that contain
/// them. Also used after parsing a persisted table.
pub fn compute_possible_parents(states: &mut [TreeState]) {
    let n = states.len();
    let mut possible: BitVec = BitVec::repeat(false, n);
    for (i, ts) in states.iter().enumerate() {
        possible.set(i, ts.rules.contains(&Rule::Parent));
    }

    loop {
        let mut changes = 0;
        for ts in states.iter_mut() {
            ts.possible_parents.clear();
        }
        let mut links: Vec<(usize, usize, usize)> = Vec::new();
        for id in 0..n {
            if !possible[id] {
                continue;
            }
            for (edge, r) in states[id].rules.iter().enumerate() {
                if let Rule::Child(c) = r {
                    links.push((*c, id, edge));
                }
            }
        }
        for (child, parent, edge) in links {
            states[child].possible_parents.push((parent, edge));
        }
        for id in 0..n {
            if possible[id] && states[id].possible_parents.is_empty() {
                possible.set(id, false);
                changes += 1;
            }
        }
        if changes == 0 {
            break;
        }
    }

    for (i, ts) in states.iter_mut().enumerate() {
        ts.is_possible_parent = possible[i];
    }
}
