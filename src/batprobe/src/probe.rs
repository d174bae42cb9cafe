/******************************************************************************************[probe.rs]
Copyright (c) 2003-2006, Niklas Een, Niklas Sorensson (MiniSat)
Copyright (c) 2007-2010, Niklas Sorensson (MiniSat)
Copyright (c) 2018-2018, Masaki Hara

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

//! Failed-literal probing.
//!
//! For every free variable `v`, the prober assigns `v` and then `¬v` on top
//! of the root assignment, and looks at what unit propagation derives:
//!
//! - if a branch conflicts, the opposite literal holds at the root;
//! - literals implied by both branches hold at the root (*bothSame*);
//! - a literal `l` implied by `v` whose negation is implied by `¬v` is
//!   equivalent to `v`;
//! - XOR constraints reduced to the same two variables, with the same
//!   parity, in both branches give an equivalence between these variables;
//! - literals implied by `v` that are not reachable from `v` through binary
//!   clauses give new binary clauses (hyper-binary resolution), while
//!   binary clauses reachable through other paths are removed.
//!
//! Binary clauses are added and removed in one batch at the end of a pass,
//! so that the whole pass sees the same implication graph.

use {
    crate::{
        clause::{lbool, BinaryClause, LMap, Lit, VMap, Var},
        error::{RootConflict, RootResult},
        interface::ProbeContext,
        intmap::{Comparator, HeapData, IntMapBool, IntSet},
        multilevel,
        stats::Stats,
        xor::TwoLongXor,
    },
    std::{
        cmp,
        collections::BTreeSet,
        mem,
        time::{Duration, Instant},
    },
};

/// Options of the prober
#[derive(Clone, Debug)]
pub struct ProbeOpts {
    /// Base number of propagations per pass, scaled by the effort multiplier
    pub propagation_budget: u64,
    /// Wall-clock limit for one `search()`
    pub max_time: Option<Duration>,
    /// Passes per `search()`; a pass only runs if the previous one simplified something
    pub max_passes: u32,
    pub multiplier_init: f64,
    pub multiplier_min: f64,
    pub multiplier_max: f64,
    /// Multiplier growth after a productive pass
    pub multiplier_up: f64,
    /// Multiplier decay after an unproductive pass
    pub multiplier_down: f64,
    /// A pass is productive if it fixes at least this fraction of the free variables
    pub productive_fraction: f64,
    /// Add binary clauses by hyper-binary resolution
    pub hyper_bin: bool,
    /// Remove binary clauses implied by other binary clauses
    pub remove_useless_bins: bool,
    /// Detect equivalences through XOR constraints
    pub xor_equivalences: bool,
    /// Detect equivalences between the probed variable and implied literals
    pub lit_equivalences: bool,
    pub multi_level: bool,
    /// Check that removed binary clauses are still implied (slow)
    pub verify_bin_removal: bool,
    pub multi_level_chain_len: u32,
    pub multi_level_candidates: usize,
    pub multi_level_max_chains: usize,
    /// Share of the pass budget given to multi-level probing
    pub multi_level_budget_fraction: f64,
    /// Literal visits allowed to re-check a useless binary clause
    pub useless_bin_check_budget: u32,
    pub random_seed: f64,
}

impl Default for ProbeOpts {
    fn default() -> Self {
        ProbeOpts {
            propagation_budget: 20_000_000,
            max_time: None,
            max_passes: 4,
            multiplier_init: 1.0,
            multiplier_min: 0.25,
            multiplier_max: 4.0,
            multiplier_up: 1.5,
            multiplier_down: 0.75,
            productive_fraction: 0.01,
            hyper_bin: true,
            remove_useless_bins: true,
            xor_equivalences: true,
            lit_equivalences: true,
            multi_level: true,
            verify_bin_removal: false,
            multi_level_chain_len: 3,
            multi_level_candidates: 24,
            multi_level_max_chains: 16,
            multi_level_budget_fraction: 0.1,
            useless_bin_check_budget: 2_000,
            random_seed: 91648253.0,
        }
    }
}

impl ProbeOpts {
    /// Check that options are valid.
    pub fn check(&self) -> bool {
        0 < self.propagation_budget
            && 1 <= self.max_passes
            && (0.0 < self.multiplier_min
                && self.multiplier_min <= self.multiplier_init
                && self.multiplier_init <= self.multiplier_max
                && self.multiplier_max < f64::INFINITY)
            && 1.0 <= self.multiplier_up
            && (0.0 < self.multiplier_down && self.multiplier_down <= 1.0)
            && (0.0 <= self.productive_fraction && self.productive_fraction <= 1.0)
            && (2 <= self.multi_level_chain_len && self.multi_level_chain_len <= 6)
            && (0.0 <= self.multi_level_budget_fraction && self.multi_level_budget_fraction < 1.0)
            && 0 < self.useless_bin_check_budget
            && (0.0 < self.random_seed && self.random_seed < f64::INFINITY)
    }
}

/// Adaptive scaling of the propagation budget.
///
/// Kept across passes and across calls to `search()`.
#[derive(Clone, Debug)]
pub struct EffortController {
    multiplier: f64,
    last_zero_depth_assigns: u64,
    num_calls: u64,
}

impl EffortController {
    fn new(opts: &ProbeOpts) -> Self {
        EffortController {
            multiplier: opts.multiplier_init,
            last_zero_depth_assigns: 0,
            num_calls: 0,
        }
    }

    #[inline]
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Number of calls to `search()` so far.
    #[inline]
    pub fn num_calls(&self) -> u64 {
        self.num_calls
    }

    fn budget(&self, opts: &ProbeOpts) -> u64 {
        (opts.propagation_budget as f64 * self.multiplier) as u64
    }

    fn update(&mut self, opts: &ProbeOpts, pass: &Stats) {
        let zda = pass.zero_depth_assigns;
        let productive = (zda > 0
            && zda as f64 >= opts.productive_fraction * pass.orig_num_free_vars as f64)
            || zda > self.last_zero_depth_assigns;
        let m = if productive {
            self.multiplier * opts.multiplier_up
        } else {
            self.multiplier * opts.multiplier_down
        };
        self.multiplier = m.max(opts.multiplier_min).min(opts.multiplier_max);
        self.last_zero_depth_assigns = zda;
    }
}

/// State of one probing pass, dropped at the end of the pass.
pub(crate) struct PassScope {
    /// Probe stamp of the branch that last reached each literal (0: none)
    visited: LMap<u32>,
    stamp: u32,
    /// Variables whose hyper-binary resolution is done for this pass
    cache_updated: IntMapBool<Var>,
    new_bins: BTreeSet<BinaryClause>,
    useless_bins: BTreeSet<BinaryClause>,
    reach: IntSet<Lit>,
    /// Direct child of the probed literal through which a literal was reached
    origin: LMap<Lit>,
    queue: Vec<Lit>,
    deadline: Option<Instant>,
    /// Interrupted, out of time, or out of budget
    pub(crate) stopped: bool,
    pub(crate) stats: Stats,
}

impl PassScope {
    pub(crate) fn new(n_vars: u32, deadline: Option<Instant>) -> Self {
        let mut visited = LMap::new();
        let mut origin = LMap::new();
        if n_vars > 0 {
            let max_lit = Lit::new(Var::unsafe_from_idx(n_vars - 1), false);
            visited.reserve(max_lit, 0);
            origin.reserve(max_lit, Lit::UNDEF);
        }
        PassScope {
            visited,
            stamp: 0,
            cache_updated: IntMapBool::with_len(n_vars as usize),
            new_bins: BTreeSet::new(),
            useless_bins: BTreeSet::new(),
            reach: IntSet::new(),
            origin,
            queue: vec![],
            deadline,
            stopped: false,
            stats: Stats::new(),
        }
    }

    /// Should probing stop before the next probe?
    pub(crate) fn out_of_budget<C: ProbeContext>(&self, ctx: &C, prop_limit: u64) -> bool {
        ctx.num_propagations() >= prop_limit
            || ctx.should_stop()
            || self.deadline.map_or(false, |d| Instant::now() >= d)
    }

    /// Hyper-binary resolution for the probed literal `p`, whose propagation
    /// yielded `implied` (starting with `p`).
    fn hyper_binary<C: ProbeContext>(
        &mut self,
        ctx: &C,
        p: Lit,
        implied: &[Lit],
        collect_useless: bool,
    ) {
        debug_assert_eq!(implied.first(), Some(&p));
        self.reach.clear();
        self.queue.clear();
        self.reach.insert(p);
        for &c in ctx.binary_implied(p) {
            if self.reach.insert(c) {
                self.origin[c] = c;
                self.queue.push(c);
            }
        }

        // binary closure of `p`, without going through `p` again
        while let Some(x) = self.queue.pop() {
            let ox = self.origin[x];
            for &y in ctx.binary_implied(x) {
                if y == p {
                    continue;
                }
                if !self.reach.insert(y) {
                    // `y` is a direct child also reachable from another child
                    if collect_useless && self.origin[y] == y && y != ox {
                        self.useless_bins.insert(BinaryClause::new(!p, y));
                    }
                    continue;
                }
                self.origin[y] = ox;
                self.queue.push(y);
            }
        }

        for &l in &implied[1..] {
            if self.reach.has(l) {
                continue;
            }
            // `p ⇒ l` needs a long clause
            self.new_bins.insert(BinaryClause::new(!p, l));
            self.reach.insert(l);
            self.queue.push(l);
            while let Some(x) = self.queue.pop() {
                for &y in ctx.binary_implied(x) {
                    if self.reach.insert(y) {
                        self.queue.push(y);
                    }
                }
            }
        }
    }

    /// Is `(a ∨ b)` implied by the other binary clauses?
    ///
    /// Searches a path `¬a ⇝ b` that does not use the clause itself,
    /// visiting at most `budget` literals.
    fn implied_without<C: ProbeContext>(&mut self, ctx: &C, a: Lit, b: Lit, budget: u32) -> bool {
        let (from, to) = (!a, b);
        let mut budget = budget;
        self.reach.clear();
        self.queue.clear();
        self.reach.insert(from);
        self.queue.push(from);
        while let Some(x) = self.queue.pop() {
            for &y in ctx.binary_implied(x) {
                if (x == from && y == to) || (x == !to && y == !from) {
                    continue;
                }
                if y == to {
                    return true;
                }
                if budget == 0 {
                    return false;
                }
                budget -= 1;
                if self.reach.insert(y) {
                    self.queue.push(y);
                }
            }
        }
        false
    }
}

#[inline]
fn root_free<C: ProbeContext>(ctx: &C, l: Lit) -> bool {
    ctx.value_lvl_0(l) == lbool::UNDEF
}

/// Ranks variables by `pos*neg` then `pos+neg` (decreasing), then by index.
struct ByOccurrences<'a>(&'a VMap<(u64, u64)>);

impl<'a> Comparator<Var> for ByOccurrences<'a> {
    fn cmp(&self, lhs: &Var, rhs: &Var) -> cmp::Ordering {
        self.0[*rhs].cmp(&self.0[*lhs]).then(lhs.cmp(rhs))
    }
}

/// The failed-literal prober.
///
/// It holds no reference to the solver context: the context is passed to
/// every operation.
///
/// ```
/// use batprobe::*;
/// let mut s = BasicSolver::default();
/// let x: Vec<Lit> = (0..3).map(|_| Lit::new(s.new_var(), true)).collect();
/// s.add_clause(&[!x[0], x[1]]);
/// s.add_clause(&[!x[0], x[2]]);
/// s.add_clause(&[!x[1], !x[2]]);
/// let mut prober = Prober::new(ProbeOpts::default());
/// assert!(prober.search(&mut s));
/// assert_eq!(s.value_lvl_0(x[0]), lbool::FALSE);
/// ```
pub struct Prober {
    opts: ProbeOpts,
    controller: EffortController,
    run_stats: Stats,
    global_stats: Stats,
    order_heap: HeapData<Var>,
    scores: VMap<(u64, u64)>,
    /// Literals implied by the current branch
    trail_buf: Vec<Lit>,
    xor_buf: Vec<TwoLongXor>,
    pos_xors: BTreeSet<TwoLongXor>,
    neg_xors: BTreeSet<TwoLongXor>,
    both_same: Vec<Lit>,
    lit_eqs: Vec<Lit>,
}

impl Default for Prober {
    fn default() -> Self {
        Prober::new(ProbeOpts::default())
    }
}

impl Prober {
    pub fn new(opts: ProbeOpts) -> Self {
        assert!(opts.check());
        Prober {
            controller: EffortController::new(&opts),
            opts,
            run_stats: Stats::new(),
            global_stats: Stats::new(),
            order_heap: HeapData::new(),
            scores: VMap::new(),
            trail_buf: vec![],
            xor_buf: vec![],
            pos_xors: BTreeSet::new(),
            neg_xors: BTreeSet::new(),
            both_same: vec![],
            lit_eqs: vec![],
        }
    }

    pub fn opts(&self) -> &ProbeOpts {
        &self.opts
    }

    /// Statistics of the last `search()`.
    pub fn run_stats(&self) -> &Stats {
        &self.run_stats
    }

    /// Statistics of all calls so far.
    pub fn global_stats(&self) -> &Stats {
        &self.global_stats
    }

    pub fn controller(&self) -> &EffortController {
        &self.controller
    }

    /// Run probing passes over the free variables.
    ///
    /// Returns `false` iff the formula was proved unsatisfiable. Running out
    /// of budget or time, or being interrupted, is not a failure: the
    /// simplifications found so far are kept.
    pub fn search<C: ProbeContext>(&mut self, ctx: &mut C) -> bool {
        let start = Instant::now();
        self.run_stats.clear();
        ctx.notify_start();
        let res = if ctx.is_ok() {
            self.search_passes(ctx, start)
        } else {
            Err(RootConflict::AlreadyUnsat)
        };
        self.run_stats.my_time = start.elapsed().as_secs_f64();
        self.global_stats += &self.run_stats;

        let ok = match res {
            Ok(()) => true,
            Err(e) => {
                info!("probing: {}", e);
                false
            }
        };
        info!(
            "probing done: {} zero-depth assigns, {} equivalences, +{}/-{} binary clauses, {:.2}s",
            self.run_stats.zero_depth_assigns,
            self.run_stats.equivalences,
            self.run_stats.added_bin,
            self.run_stats.removed_bin,
            self.run_stats.my_time
        );
        ctx.notify_result(ok);
        ok
    }

    /// Probe a single variable, applying the resulting binary clause changes.
    ///
    /// Returns `Ok(false)` if `v` is not free (nothing to do).
    pub fn probe<C: ProbeContext>(&mut self, ctx: &mut C, v: Var) -> RootResult<bool> {
        if !ctx.is_ok() {
            return Err(RootConflict::AlreadyUnsat);
        }
        if !ctx.is_free(v) {
            trace!("probe {:?}: already fixed", v);
            return Ok(false);
        }
        let mut scope = PassScope::new(ctx.num_vars(), None);
        let res = self
            .probe_var(ctx, &mut scope, v)
            .and_then(|()| self.apply_bins(ctx, &mut scope));
        self.run_stats += &scope.stats;
        self.global_stats += &scope.stats;
        res.map(|()| true)
    }

    fn search_passes<C: ProbeContext>(&mut self, ctx: &mut C, start: Instant) -> RootResult<()> {
        debug_assert_eq!(ctx.decision_level(), 0);
        self.controller.num_calls += 1;
        let deadline = self.opts.max_time.map(|d| start + d);

        for pass in 0..self.opts.max_passes {
            if ctx.should_stop() {
                break;
            }
            let mut scope = PassScope::new(ctx.num_vars(), deadline);
            let res = self.run_pass(ctx, &mut scope);
            self.run_stats += &scope.stats;
            ctx.notify_pass(pass, &scope.stats);
            self.controller.update(&self.opts, &scope.stats);
            res?;

            info!(
                "probing pass {}: {} probed, {} failed, {} zero-depth, {} eqs, +{}/-{} bins (mult {:.2})",
                pass,
                scope.stats.num_probed,
                scope.stats.num_failed,
                scope.stats.zero_depth_assigns,
                scope.stats.equivalences,
                scope.stats.added_bin,
                scope.stats.removed_bin,
                self.controller.multiplier
            );
            if scope.stopped || !scope.stats.simplified() {
                break;
            }
        }
        Ok(())
    }

    fn run_pass<C: ProbeContext>(&mut self, ctx: &mut C, scope: &mut PassScope) -> RootResult<()> {
        let props = ctx.num_propagations();
        let bogo = ctx.num_bogo_props();
        let confls = ctx.num_conflicts();

        let res = self.run_pass_inner(ctx, scope);

        scope.stats.prop_data.propagations += ctx.num_propagations() - props;
        scope.stats.prop_data.bogo_props += ctx.num_bogo_props() - bogo;
        scope.stats.confl_stats.conflicts += ctx.num_conflicts() - confls;
        res
    }

    fn run_pass_inner<C: ProbeContext>(
        &mut self,
        ctx: &mut C,
        scope: &mut PassScope,
    ) -> RootResult<()> {
        let free = ctx.free_vars();
        scope.stats.orig_num_free_vars = free.len() as u64;
        let order = self.probe_order(ctx, &free);

        let budget = self.controller.budget(&self.opts);
        let ml_budget = if self.opts.multi_level {
            (budget as f64 * self.opts.multi_level_budget_fraction) as u64
        } else {
            0
        };
        let limit = ctx.num_propagations().saturating_add(budget - ml_budget);

        for v in order {
            if scope.out_of_budget(ctx, limit) {
                debug!("probing pass stopped ({} props)", ctx.num_propagations());
                scope.stopped = true;
                break;
            }
            if ctx.is_free(v) {
                self.probe_var(ctx, scope, v)?;
            }
        }

        if self.opts.multi_level && !scope.stopped {
            let limit = ctx.num_propagations().saturating_add(ml_budget);
            multilevel::probe_chains(ctx, &self.opts, scope, limit)?;
        }

        self.apply_bins(ctx, scope)
    }

    /// Free variables, most promising first.
    fn probe_order<C: ProbeContext>(&mut self, ctx: &C, free: &[Var]) -> Vec<Var> {
        for &v in free {
            let pos = ctx.occurrences(Lit::new(v, true)) as u64;
            let neg = ctx.occurrences(Lit::new(v, false)) as u64;
            self.scores.reserve(v, (0, 0));
            self.scores[v] = (pos * neg, pos + neg);
        }
        let mut heap = self.order_heap.promote(ByOccurrences(&self.scores));
        heap.build(free);
        let mut order = Vec::with_capacity(free.len());
        while let Some(v) = heap.pop_min() {
            order.push(v);
        }
        order
    }

    /// Probe both polarities of the free variable `v`.
    fn probe_var<C: ProbeContext>(
        &mut self,
        ctx: &mut C,
        scope: &mut PassScope,
        v: Var,
    ) -> RootResult<()> {
        debug_assert!(ctx.is_free(v));
        let pos = Lit::new(v, true);
        scope.stamp += 2;
        let pos_stamp = scope.stamp - 1;
        let neg_stamp = scope.stamp;
        let hyper_bin = self.opts.hyper_bin && !scope.cache_updated[v];

        // positive branch
        if !self.probe_branch(ctx, scope, pos)? {
            return Ok(());
        }
        for &l in &self.trail_buf {
            if scope.visited[l] == 0 {
                scope.stats.num_visited += 1;
            }
            scope.visited[l] = pos_stamp;
        }
        if hyper_bin {
            scope.hyper_binary(ctx, pos, &self.trail_buf, self.opts.remove_useless_bins);
        }
        self.pos_xors.clear();
        self.pos_xors.extend(self.xor_buf.drain(..));

        // negative branch
        if !self.probe_branch(ctx, scope, !pos)? {
            return Ok(());
        }
        self.both_same.clear();
        self.lit_eqs.clear();
        for &l in &self.trail_buf {
            if scope.visited[l] == pos_stamp {
                self.both_same.push(l);
                continue;
            }
            if scope.visited[!l] == pos_stamp && l.var() != v {
                // v ⇒ ¬l and ¬v ⇒ l
                self.lit_eqs.push(l);
            } else if scope.visited[l] == 0 {
                scope.stats.num_visited += 1;
            }
            scope.visited[l] = neg_stamp;
        }
        if hyper_bin {
            scope.hyper_binary(ctx, !pos, &self.trail_buf, self.opts.remove_useless_bins);
            scope.cache_updated.insert(v);
        }
        self.neg_xors.clear();
        self.neg_xors.extend(self.xor_buf.drain(..));

        // both branches agree
        for &l in &self.both_same {
            if ctx.force_permanent(l)? {
                debug!("both-same {:?} (probing {:?})", l, v);
                scope.stats.both_same += 1;
                scope.stats.zero_depth_assigns += 1;
            }
        }
        if self.opts.lit_equivalences {
            for &l in &self.lit_eqs {
                // v = ¬l
                if ctx.submit_equivalence(v, l.var(), l.sign())? {
                    debug!("equivalence {:?} = {:?}", pos, !l);
                    scope.stats.equivalences += 1;
                }
            }
        }
        if self.opts.xor_equivalences {
            for r in self.pos_xors.intersection(&self.neg_xors) {
                if ctx.submit_equivalence(r.var0(), r.var1(), r.inverted())? {
                    debug!("xor equivalence {:?} (probing {:?})", r, v);
                    scope.stats.equivalences += 1;
                }
            }
            for r in self.neg_xors.iter() {
                if self.pos_xors.contains(&r.flipped()) {
                    debug!("inconsistent equivalence {:?} (probing {:?})", r, v);
                }
            }
        }
        Ok(())
    }

    /// Tentatively assign `lit`. On success, the implied literals are left in
    /// `trail_buf` and the XOR notifications in `xor_buf`.
    ///
    /// On conflict, `¬lit` is forced at the root and `Ok(false)` is returned.
    fn probe_branch<C: ProbeContext>(
        &mut self,
        ctx: &mut C,
        scope: &mut PassScope,
        lit: Lit,
    ) -> RootResult<bool> {
        scope.stats.num_probed += 1;
        let m = ctx.mark();
        if let Err(confl) = ctx.try_assign(lit) {
            ctx.rollback(m);
            trace!("probe {:?}: conflict {:?}", lit, confl);
            scope.stats.num_failed += 1;
            if ctx.force_permanent(!lit)? {
                debug!("failed literal {:?}", lit);
                scope.stats.zero_depth_assigns += 1;
            }
            return Ok(false);
        }
        self.trail_buf.clear();
        self.trail_buf.extend_from_slice(ctx.trail_since(m));
        self.xor_buf.clear();
        if self.opts.xor_equivalences {
            ctx.xor_shrink_notifications(m, &mut self.xor_buf);
        }
        ctx.rollback(m);
        trace!("probe {:?}: {} implied", lit, self.trail_buf.len());
        Ok(true)
    }

    /// Add the binary clauses found by hyper-binary resolution, then remove
    /// the useless ones that are still implied by the others.
    fn apply_bins<C: ProbeContext>(&mut self, ctx: &mut C, scope: &mut PassScope) -> RootResult<()> {
        let new_bins = mem::take(&mut scope.new_bins);
        for bc in &new_bins {
            let (a, b) = (bc.lit1(), bc.lit2());
            if root_free(ctx, a) && root_free(ctx, b) && ctx.add_binary_clause(a, b) {
                trace!("add binary clause {:?}", bc);
                scope.stats.added_bin += 1;
            }
        }
        if !ctx.is_ok() {
            return Err(RootConflict::AlreadyUnsat);
        }

        let useless = mem::take(&mut scope.useless_bins);
        let mut removed = vec![];
        for bc in &useless {
            let (a, b) = (bc.lit1(), bc.lit2());
            if !root_free(ctx, a) || !root_free(ctx, b) || !ctx.has_binary_clause(a, b) {
                continue;
            }
            if scope.implied_without(ctx, a, b, self.opts.useless_bin_check_budget)
                && ctx.remove_binary_clause(a, b)
            {
                trace!("remove binary clause {:?}", bc);
                scope.stats.removed_bin += 1;
                removed.push(*bc);
            }
        }

        if self.opts.verify_bin_removal {
            self.verify_removed(ctx, scope, &removed);
        }
        Ok(())
    }

    /// Check that each removed clause `(a ∨ b)` is still implied: `¬a`
    /// must propagate `b`.
    fn verify_removed<C: ProbeContext>(
        &mut self,
        ctx: &mut C,
        scope: &mut PassScope,
        removed: &[BinaryClause],
    ) {
        for bc in removed {
            let (a, b) = (bc.lit1(), bc.lit2());
            if !root_free(ctx, a) || !root_free(ctx, b) {
                continue;
            }
            let m = ctx.mark();
            let implied = ctx.try_assign(!a).is_err() || ctx.value_lit(b) == lbool::TRUE;
            ctx.rollback(m);
            if !implied {
                info!("removed binary clause {:?} is not implied anymore", bc);
                scope.stats.bin_removal_violations += 1;
            }
        }
    }
}
