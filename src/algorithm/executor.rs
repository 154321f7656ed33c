//! Generator context, configuration and the retry driver
//!
//! All mutable state of one generation run lives in a single `Generator`:
//! the tile arena, the deferred-fix queue, the shortcut store, analyzers,
//! caches and the tree-state table. Restarting after a recoverable failure
//! clears the relevant groups of state rather than constructing a new
//! context, so learned shortcuts and materialized tiles survive retries.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use crate::algorithm::analyzer::{Aid, Analyzer, Code};
use crate::algorithm::propagation::FixTask;
use crate::algorithm::rules::{Rule, RuleTable, TreeState};
use crate::algorithm::shortcut::Shortcut;
use crate::graph::arena::{ParentDir, TileArena};
use crate::graph::walker::Walker;
use crate::io::configuration::{
    MAX_ADV_STEPS, MAX_BDATA, MAX_EXAMINE_BRANCH, MAX_GETSIDE, MAX_RETRIES, MAX_TCELLCOUNT,
    TIMEOUT_SECONDS,
};
use crate::io::error::{GeneratorError, Result, retry};
use crate::tessellation::shape::{ConcreteOracle, Tessellation};

/// Budgets and limits controlling one generation run
#[derive(Clone, Copy, Debug)]
pub struct GeneratorConfig {
    /// Maximum iteration restarts before surrendering
    pub max_retries: usize,
    /// Maximum tiles in the arena
    pub max_tcellcount: usize,
    /// Steps allowed in the exhaustive parent tie-break
    pub max_adv_steps: usize,
    /// Steps allowed per branch in the verifier
    pub max_examine_branch: usize,
    /// Entries allowed on a verifier deadstack
    pub max_bdata: usize,
    /// Steps allowed in a side computation
    pub max_getside: usize,
    /// Wall-clock timeout
    pub timeout: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            max_tcellcount: MAX_TCELLCOUNT,
            max_adv_steps: MAX_ADV_STEPS,
            max_examine_branch: MAX_EXAMINE_BRANCH,
            max_bdata: MAX_BDATA,
            max_getside: MAX_GETSIDE,
            timeout: Duration::from_secs(TIMEOUT_SECONDS),
        }
    }
}

/// Alternate-strategy toggles
///
/// Each flag switches one part of the algorithm to a fallback strategy.
/// They usually make things worse; the defaults are the recommended path.
// Strategy toggles are inherently a flat set of independent booleans
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Copy, Debug, Default)]
pub struct Strategy {
    /// Build the tile graph through the concrete-model oracle
    pub numerical: bool,
    /// Do not make the nearer chain solid together with each tile
    pub near_solid: bool,
    /// Generate no shortcuts
    pub no_shortcuts: bool,
    /// Do not rebuild analyzers at power-of-two attempts
    pub no_restart: bool,
    /// Do not cache side computations
    pub no_sidecache: bool,
    /// Collapse relative-distance classification to a single value
    pub no_relative_distance: bool,
    /// Restart after the first conflict found in analysis
    pub examine_once: bool,
    /// Record all conflicts found in analysis even if already known
    pub examine_all: bool,
    /// Extend the analyzer at every mismatch instead of the first
    pub conflict_full_extension: bool,
    /// Always run the exhaustive parent tie-break
    pub parent_always: bool,
    /// Never run the exhaustive parent tie-break
    pub parent_never: bool,
    /// Allow reversed paths in the parent tie-break
    pub parent_reverse: bool,
    /// Allow side paths in the parent tie-break
    pub parent_side: bool,
    /// Rebuild analyzers and parents after any distance error
    pub always_clean: bool,
    /// Seed a single origin instead of one per shape
    pub single_origin: bool,
    /// Do not try the fast side climb
    pub slow_side: bool,
    /// Compute distances by breadth-first expansion
    pub bfs: bool,
    /// Complete vertices numerically in oracle mode
    pub numerical_fix: bool,
    /// Two-pass mode driven by a prior run's structure
    pub known_structure: bool,
    /// Use distances reported by the oracle
    pub known_distances: bool,
    /// Disable the smart-shortcut optimization
    pub no_smart_shortcuts: bool,
    /// Stop early when retracing a smart shortcut
    pub less_smart_retrace: bool,
    /// Stop early when advancing a smart shortcut
    pub less_smart_advance: bool,
}

/// Counters exposed for diagnostics and status reporting
#[derive(Clone, Copy, Debug, Default)]
pub struct Diagnostics {
    /// Tiles created
    pub tile_count: usize,
    /// Tiles united into other tiles
    pub unified: usize,
    /// Edge traversals performed
    pub move_count: u64,
    /// Cells whose parent needed the exhaustive tie-break
    pub hard_parents: usize,
    /// Roots with a single live branch
    pub single_live_branches: usize,
    /// Roots with double live branches
    pub double_live_branches: usize,
    /// Tree-states before minimization
    pub states_premini: usize,
    /// Total solid errors over the whole run
    pub all_solid_errors: usize,
    /// Iteration attempts used
    pub try_count: usize,
}

/// The strict tree-rule generator
///
/// Owns every piece of mutable state for one run. Construct with a
/// validated tessellation, then call [`Generator::generate`].
pub struct Generator {
    /// Tile arena plus the tessellation being generated
    pub arena: TileArena,
    /// Budgets and limits
    pub config: GeneratorConfig,
    /// Alternate-strategy toggles
    pub strategy: Strategy,

    // tile graph
    pub(crate) fix_queue: VecDeque<FixTask>,
    pub(crate) in_fixing: bool,
    pub(crate) bfs_queue: VecDeque<usize>,

    // oracle mode
    pub(crate) oracle: Option<Box<dyn ConcreteOracle>>,
    pub(crate) cell_to_tile: HashMap<u64, usize>,
    pub(crate) tile_to_cell: HashMap<usize, u64>,

    // distances
    pub(crate) solid_errors: usize,
    pub(crate) solid_errors_list: Vec<usize>,
    /// Total solid errors over the whole run
    pub all_solid_errors: usize,

    // shortcuts, keyed by shape id
    pub(crate) shortcuts: HashMap<usize, Vec<Shortcut>>,

    // parent oracle
    /// Cells whose parent needed the exhaustive tie-break
    pub hard_parents: usize,
    pub(crate) parent_updates: usize,

    // analyzers and codes
    pub(crate) analyzers: HashMap<Aid, Analyzer>,
    pub(crate) code_to_id: HashMap<Code, usize>,
    /// The tree-state table under construction
    pub treestates: Vec<TreeState>,
    /// State id assigned to the first origin
    pub rule_root: usize,

    // side classification
    pub(crate) sidecache: HashMap<Walker, i64>,
    pub(crate) single_live_branch_close_to_root: HashSet<usize>,
    /// Roots with a single live branch
    pub single_live_branches: usize,
    /// Roots with double live branches
    pub double_live_branches: usize,

    // branch verification
    pub(crate) verified_branches: HashSet<Vec<(i64, i64)>>,
    pub(crate) branch_conflicts_seen: HashSet<((usize, usize), (usize, usize))>,

    // driver
    /// Iteration attempts used so far
    pub try_count: usize,
    pub(crate) important: Vec<Walker>,
    pub(crate) t_origin: Vec<Walker>,
    /// Tree-states before minimization
    pub states_premini: usize,
    pub(crate) start_time: Instant,
    /// Shape used as the origin under the single-origin strategy
    pub origin_id: usize,
}

impl Generator {
    /// Create a generator for a tessellation with default budgets
    ///
    /// # Errors
    ///
    /// Returns a `Descriptor` error if the tessellation fails validation.
    pub fn new(tess: Tessellation) -> Result<Self> {
        Self::with_config(tess, GeneratorConfig::default(), Strategy::default())
    }

    /// Create a generator with explicit budgets and strategy toggles
    ///
    /// # Errors
    ///
    /// Returns a `Descriptor` error if the tessellation fails validation.
    pub fn with_config(
        tess: Tessellation,
        config: GeneratorConfig,
        strategy: Strategy,
    ) -> Result<Self> {
        tess.validate()?;
        Ok(Self {
            arena: TileArena::new(tess),
            config,
            strategy,
            fix_queue: VecDeque::new(),
            in_fixing: false,
            bfs_queue: VecDeque::new(),
            oracle: None,
            cell_to_tile: HashMap::new(),
            tile_to_cell: HashMap::new(),
            solid_errors: 0,
            solid_errors_list: Vec::new(),
            all_solid_errors: 0,
            shortcuts: HashMap::new(),
            hard_parents: 0,
            parent_updates: 0,
            analyzers: HashMap::new(),
            code_to_id: HashMap::new(),
            treestates: Vec::new(),
            rule_root: 0,
            sidecache: HashMap::new(),
            single_live_branch_close_to_root: HashSet::new(),
            single_live_branches: 0,
            double_live_branches: 0,
            verified_branches: HashSet::new(),
            branch_conflicts_seen: HashSet::new(),
            try_count: 0,
            important: Vec::new(),
            t_origin: Vec::new(),
            states_premini: 0,
            start_time: Instant::now(),
            origin_id: 0,
        })
    }

    /// Attach a concrete-model oracle for the numerical strategies
    pub fn set_oracle(&mut self, oracle: Box<dyn ConcreteOracle>) {
        self.oracle = Some(oracle);
    }

    /// Abort if the wall-clock timeout has expired
    ///
    /// # Errors
    ///
    /// Returns a `Timeout` surrender once the configured limit passes.
    pub fn check_timeout(&self) -> Result<()> {
        if self.start_time.elapsed() > self.config.timeout {
            return Err(GeneratorError::Timeout {
                limit: self.config.timeout,
            });
        }
        Ok(())
    }

    /// Current diagnostics counters
    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            tile_count: self.arena.tile_count(),
            unified: self.arena.tunified,
            move_count: self.arena.movecount,
            hard_parents: self.hard_parents,
            single_live_branches: self.single_live_branches,
            double_live_branches: self.double_live_branches,
            states_premini: self.states_premini,
            all_solid_errors: self.all_solid_errors,
            try_count: self.try_count,
        }
    }

    /// Human-readable outcome line in the three canonical forms
    pub fn describe_outcome(&self, outcome: &Result<RuleTable>) -> String {
        match outcome {
            Ok(table) => format!(
                "rules generated successfully: {} states using {}-{} cells",
                table.states.len(),
                self.arena.tile_count(),
                self.arena.tunified
            ),
            Err(e) if matches!(e.kind(), crate::io::error::FailureKind::Bug) => {
                format!("bug: {e}")
            }
            Err(e) => format!("too difficult: {e}"),
        }
    }

    /// Drop analyzers and start the important list over from the origins
    pub(crate) fn clean_data(&mut self) {
        self.analyzers.clear();
        self.important = self.t_origin.clone();
    }

    /// Additionally forget every cached parent direction
    pub(crate) fn clean_parents(&mut self) {
        self.clean_data();
        self.sidecache.clear();
        for t in 0..self.arena.tile_count() {
            self.arena.tile_mut(t).parent_dir = ParentDir::Unset;
        }
    }

    /// Forget all computed codes and tree-states
    pub(crate) fn clear_codes(&mut self) {
        self.treestates.clear();
        self.code_to_id.clear();
        for t in 0..self.arena.tile_count() {
            self.arena.tile_mut(t).code = None;
        }
    }

    /// Seed the origin tiles according to the strategy
    fn seed_origins(&mut self) -> Result<()> {
        if self.strategy.numerical || self.strategy.known_structure {
            let (cell, shape) = {
                let oracle = self.oracle.as_ref().ok_or_else(|| {
                    GeneratorError::Descriptor {
                        reason: "numerical strategy requires an oracle".to_string(),
                    }
                })?;
                let cell = oracle.origin();
                (cell, oracle.shape_of(cell))
            };
            let c = self.arena.alloc(shape);
            self.cell_to_tile.insert(cell, c);
            self.tile_to_cell.insert(c, cell);
            self.arena.tile_mut(c).dist = 0;
            self.t_origin.push(Walker::at(c));
        } else if self.strategy.single_origin {
            let c = self.arena.alloc(self.origin_id);
            self.arena.tile_mut(c).dist = 0;
            self.t_origin.push(Walker::at(c));
        } else {
            for id in 0..self.arena.tess.shapes.len() {
                let c = self.arena.alloc(id);
                self.arena.tile_mut(c).dist = 0;
                self.t_origin.push(Walker::at(c));
            }
        }
        if self.strategy.bfs {
            for w in &self.t_origin {
                self.bfs_queue.push_back(w.tile);
            }
        }
        Ok(())
    }

    /// One rules-iteration: codes, rules, liveness, branch verification,
    /// minimization
    ///
    /// # Errors
    ///
    /// Returns retryable errors whenever the iteration must restart, and
    /// surrender or bug errors for fatal conditions.
    pub fn rules_iteration(&mut self) -> Result<()> {
        self.try_count += 1;

        if self.try_count & (self.try_count - 1) == 0 && !self.strategy.no_restart {
            self.clean_data();
            self.clean_parents();
        }

        self.ensure_fix_queue_empty()?;
        self.clear_codes();
        self.parent_updates = 0;

        let mut cq = self.important.clone();
        let mut i = 0;
        while i < cq.len() {
            let mut w = cq[i];
            self.rules_iteration_for(&mut w)?;
            cq[i] = w;
            i += 1;
        }

        self.handle_distance_errors()?;

        let mut w0 = self.t_origin[0];
        self.rule_root = self.get_code(&mut w0)?.1;
        self.t_origin[0] = w0;

        let mut id = 0;
        while id < self.treestates.len() {
            if !self.treestates[id].known {
                let mut ws = self.treestates[id].where_seen;
                self.rules_iteration_for(&mut ws)?;
            }
            id += 1;
        }

        let n_important = self.important.len();

        self.compute_liveness();

        self.handle_distance_errors()?;
        self.verified_branches.clear();

        let q = self.single_live_branch_close_to_root.len();
        self.single_live_branches = 0;
        self.double_live_branches = 0;
        self.branch_conflicts_seen.clear();

        // dead roots: some of their branches must still be examined so
        // parent pointers stay consistent
        for id in 0..self.treestates.len() {
            if !self.treestates[id].is_root || self.treestates[id].is_live {
                continue;
            }
            let r = self.treestates[id].rules.clone();
            for (i, rule) in r.iter().enumerate() {
                if matches!(rule, Rule::Child(_)) {
                    self.examine_branch(id, i as i64, i as i64)?;
                    break;
                }
            }
        }

        for id in 0..self.treestates.len() {
            if !self.treestates[id].is_live {
                continue;
            }
            let r = self.treestates[id].rules.clone();
            if r.is_empty() {
                continue;
            }
            let mut first_live_branch: Option<usize> = None;
            let mut last_live_branch: Option<usize> = None;
            let mut qbranches = 0;
            for (i, rule) in r.iter().enumerate() {
                if let Rule::Child(c) = rule {
                    if self.treestates[*c].is_live {
                        if first_live_branch.is_none() {
                            first_live_branch = Some(i);
                        }
                        if let Some(last) = last_live_branch {
                            self.examine_branch(id, last as i64, i as i64)?;
                        }
                        last_live_branch = Some(i);
                        qbranches += 1;
                    }
                }
            }
            if qbranches == 2 {
                self.double_live_branches += 1;
            }
            if first_live_branch == last_live_branch && self.treestates[id].is_root {
                self.single_live_branches += 1;
                if let Some(g) = self.treestates[id].giver {
                    let mut g = g;
                    self.find_single_live_branch(&mut g)?;
                    self.treestates[id].giver = Some(g);
                }
            }
            if self.single_live_branch_close_to_root.len() != q {
                self.sidecache.clear();
                return Err(retry("single live branch"));
            }
            if self.treestates[id].is_root {
                if let (Some(last), Some(first)) = (last_live_branch, first_live_branch) {
                    self.examine_branch(id, last as i64, first as i64)?;
                }
            }
        }

        for id in 0..self.treestates.len() {
            if self.treestates[id].giver.is_none() {
                let ws = self.treestates[id].where_seen;
                self.important.push(ws);
            }
        }

        self.handle_distance_errors()?;
        if self.important.len() != n_important {
            return Err(retry("need more rules after examine"));
        }

        self.minimize_rules();
        self.find_possible_parents();

        if self.important.len() != n_important {
            return Err(retry("need more rules after minimize"));
        }
        self.handle_distance_errors()?;
        Ok(())
    }

    /// Run the full generation: seed origins, iterate until convergence,
    /// restart on retryable failures
    ///
    /// # Errors
    ///
    /// Returns the final error when the retry budget, a resource budget or
    /// the timeout is exhausted, or when an internal invariant breaks. No
    /// partial table is published on failure.
    pub fn generate(&mut self) -> Result<RuleTable> {
        self.generate_with(|_| {})
    }

    /// Like [`Generator::generate`], invoking an observer after every
    /// iteration attempt
    ///
    /// # Errors
    ///
    /// Same as [`Generator::generate`].
    pub fn generate_with<F: FnMut(&Self)>(&mut self, mut observe: F) -> Result<RuleTable> {
        self.start_time = Instant::now();
        self.reset();
        self.arena.tess.validate()?;
        self.seed_origins()?;

        self.try_count = 0;
        self.important = self.t_origin.clone();

        loop {
            self.check_timeout()?;
            let attempt = self.rules_iteration();
            observe(self);
            match attempt {
                Ok(()) => break,
                Err(e) if e.is_retryable() && self.try_count < self.config.max_retries => {}
                Err(e) => return Err(e),
            }
        }

        Ok(RuleTable {
            states: self.treestates.clone(),
            root: self.rule_root,
        })
    }

    /// Clear all state groups back to a fresh context
    fn reset(&mut self) {
        self.arena = TileArena::new(self.arena.tess.clone());
        self.fix_queue.clear();
        self.in_fixing = false;
        self.bfs_queue.clear();
        self.cell_to_tile.clear();
        self.tile_to_cell.clear();
        self.solid_errors = 0;
        self.solid_errors_list.clear();
        self.all_solid_errors = 0;
        self.shortcuts.clear();
        self.hard_parents = 0;
        self.parent_updates = 0;
        self.analyzers.clear();
        self.code_to_id.clear();
        self.treestates.clear();
        self.rule_root = 0;
        self.sidecache.clear();
        self.single_live_branch_close_to_root.clear();
        self.single_live_branches = 0;
        self.double_live_branches = 0;
        self.verified_branches.clear();
        self.branch_conflicts_seen.clear();
        self.try_count = 0;
        self.important.clear();
        self.t_origin.clear();
        self.states_premini = 0;
    }
}
