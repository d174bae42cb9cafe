/*****************************************************************************************[solver.rs]
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

use {
    crate::{
        callbacks::Callbacks,
        clause::{display::fmt_lits, lbool, BinaryClause, CRef, ClauseDb, LMap, Lit, VMap, Var},
        error::{RootConflict, RootResult},
        interface::{Conflict, ProbeContext, TrailMark},
        intmap::IntSet,
        replace::{Merge, VarReplacer},
        stats::Stats,
        xor::{TwoLongXor, XorClause, XorRef},
    },
    fnv::FnvHashSet,
    std::{
        fmt, mem,
        sync::atomic::{AtomicBool, Ordering},
    },
};

/// The solver context the prober works on.
///
/// It owns the clause store (binary implication lists, long clauses with
/// two watched literals, XOR constraints), the trail with its decision
/// levels, and the variable replacement table.
///
/// ```
/// use batprobe::*;
/// let mut s = BasicSolver::default();
/// let a = Lit::new(s.new_var(), true);
/// let b = Lit::new(s.new_var(), true);
/// assert!(s.add_clause(&[!a, b]));
/// let m = s.mark();
/// assert!(s.try_assign(a).is_ok());
/// assert_eq!(s.trail_since(m), &[a, b]);
/// s.rollback(m);
/// assert_eq!(s.value_lit(b), lbool::UNDEF);
/// ```
pub struct Solver<Cb: Callbacks> {
    cb: Cb,
    opts: SolverOpts,
    asynch_interrupt: AtomicBool,
    v: SolverV,
}

/// Options of the solver context
#[derive(Clone, Debug)]
pub struct SolverOpts {
    /// XOR constraints with more variables are cut into a chain of
    /// shorter ones, linked by fresh variables, before CNF encoding.
    pub xor_cut_len: u32,
}

impl Default for SolverOpts {
    fn default() -> SolverOpts {
        Self { xor_cut_len: 4 }
    }
}

impl SolverOpts {
    /// Check that options are valid.
    pub fn check(&self) -> bool {
        3 <= self.xor_cut_len && self.xor_cut_len <= 8
    }
}

/// Assignment and trail
#[derive(Default)]
struct VarState {
    /// The current assignments.
    ass: VMap<lbool>,
    /// Decision level of each assigned variable.
    level: VMap<u32>,
    /// Assignment stack; stores all assignments made in the order they were made.
    trail: Vec<Lit>,
    /// Separator indices for different decision levels in `trail`.
    trail_lim: Vec<usize>,
}

#[derive(Clone, Copy, Debug)]
struct Watcher {
    cref: CRef,
    blocker: Lit,
}

#[derive(Default)]
struct SolverV {
    vars: VarState,
    /// If `false`, the constraints are already unsatisfiable.
    ok: bool,
    /// Head of the propagation queue (as index into the trail).
    qhead: usize,
    ca: ClauseDb,
    /// `watches[lit]` is a list of long clauses watching `¬lit`.
    watches: LMap<Vec<Watcher>>,
    /// `bins[lit]` are the literals implied by `lit` through binary clauses.
    bins: LMap<Vec<Lit>>,
    bin_set: FnvHashSet<BinaryClause>,
    occs: LMap<u32>,
    xors: Vec<XorClause>,
    xor_occs: VMap<Vec<XorRef>>,
    xor_seen: IntSet<XorRef>,
    /// Clauses added by the CNF encoding of retained XORs.
    xor_bins: FnvHashSet<BinaryClause>,
    xor_crefs: FnvHashSet<CRef>,
    encoding_xor: bool,
    replacer: VarReplacer,

    propagations: u64,
    bogo_props: u64,
    conflicts: u64,
}

impl<Cb: Callbacks + Default> Default for Solver<Cb> {
    fn default() -> Self {
        Solver::new(SolverOpts::default(), Default::default())
    }
}

impl<Cb: Callbacks> Solver<Cb> {
    /// Create a new solver with the given options and callbacks.
    pub fn new(opts: SolverOpts, cb: Cb) -> Self {
        assert!(opts.check());
        let mut v = SolverV::default();
        v.ok = true;
        Self {
            cb,
            opts,
            asynch_interrupt: AtomicBool::new(false),
            v,
        }
    }

    pub fn cb(&self) -> &Cb {
        &self.cb
    }

    pub fn cb_mut(&mut self) -> &mut Cb {
        &mut self.cb
    }

    /// Create a new variable.
    pub fn new_var(&mut self) -> Var {
        self.v.new_var()
    }

    /// Create variables until index `v_idx` exists, and return it.
    pub fn var_of_int(&mut self, v_idx: u32) -> Var {
        while v_idx >= self.v.num_vars() {
            self.new_var();
        }
        let var = Var::from_idx(v_idx);
        debug_assert_eq!(var.idx(), v_idx);
        var
    }

    /// Number of clauses (binary and long) in the store.
    pub fn num_clauses(&self) -> u64 {
        (self.v.bin_set.len() + self.v.ca.len()) as u64
    }

    /// Number of XOR constraints kept for equivalence detection.
    pub fn num_xors(&self) -> usize {
        self.v.xors.len()
    }

    /// Add a clause at the root level.
    ///
    /// Returns `false` if the solver is now in an unsatisfiable state.
    pub fn add_clause(&mut self, clause: &[Lit]) -> bool {
        let mut c = clause.to_vec();
        self.add_clause_reuse(&mut c)
    }

    /// Same as `add_clause`, but uses `clause` as a buffer.
    pub fn add_clause_reuse(&mut self, clause: &mut Vec<Lit>) -> bool {
        debug!("add toplevel clause {:?}", clause);
        debug_assert_eq!(
            self.v.decision_level(),
            0,
            "add clause at non-zero decision level"
        );
        clause.sort_unstable();
        self.v.add_clause_(clause)
    }

    /// Add the constraint `vars[0] ⊕ … ⊕ vars[n-1] = rhs` at the root level.
    ///
    /// A long XOR allocates auxiliary variables with `new_var`, so every
    /// variable of the problem must exist before it is added.
    ///
    /// Returns `false` if the solver is now in an unsatisfiable state.
    pub fn add_xor_clause(&mut self, vars: &[Var], rhs: bool) -> bool {
        debug!("add toplevel xor {:?} = {}", vars, rhs);
        debug_assert_eq!(self.v.decision_level(), 0);
        if !self.v.ok {
            return false;
        }
        let mut x = XorClause::new(vars, rhs);
        {
            let vars = &self.v.vars;
            x.fold(|v| vars.value(v).to_bool());
        }
        match x.len() {
            0 => {
                if x.rhs() {
                    self.v.ok = false;
                }
                self.v.ok
            }
            1 => self.v.add_clause_(&mut vec![Lit::new(x.vars()[0], x.rhs())]),
            _ => {
                let retained = x.len() > 2;
                if retained {
                    let r = XorRef::new(self.v.xors.len());
                    for &v in x.vars() {
                        self.v.xor_occs[v].push(r);
                        self.v.occs[Lit::new(v, true)] += 1;
                        self.v.occs[Lit::new(v, false)] += 1;
                    }
                    self.v.xors.push(x.clone());
                }
                self.v.encoding_xor = retained;
                let ok = self.add_xor_cnf(x.vars().to_vec(), x.rhs());
                self.v.encoding_xor = false;
                ok
            }
        }
    }

    /// Encode the XOR into clauses, cutting it into chunks of at most
    /// `xor_cut_len` variables.
    fn add_xor_cnf(&mut self, mut vars: Vec<Var>, rhs: bool) -> bool {
        let cut = self.opts.xor_cut_len as usize;
        while vars.len() > cut {
            let aux = self.new_var();
            let mut chunk: Vec<Var> = vars.drain(..cut - 1).collect();
            chunk.push(aux);
            // aux = chunk[0] ⊕ … ⊕ chunk[cut-2]
            if !self.add_xor_chunk(&chunk, false) {
                return false;
            }
            vars.push(aux);
        }
        self.add_xor_chunk(&vars, rhs)
    }

    fn add_xor_chunk(&mut self, vars: &[Var], rhs: bool) -> bool {
        for mut c in XorClause::new(vars, rhs).to_cnf() {
            c.sort_unstable();
            if !self.v.add_clause_(&mut c) {
                return false;
            }
        }
        true
    }

    /// Interrupt the probing search from another thread.
    pub fn interrupt_async(&self) {
        self.asynch_interrupt.store(true, Ordering::SeqCst);
    }

    pub fn clear_interrupt(&self) {
        self.asynch_interrupt.store(false, Ordering::SeqCst);
    }

    /// Literals proved at level 0, in the order they were found.
    pub fn proved_at_lvl_0(&self) -> &[Lit] {
        self.v.vars.proved_at_lvl_0()
    }

    /// The canonical literal of `lit`'s equivalence class.
    pub fn representative(&self, lit: Lit) -> Lit {
        self.v.replacer.find(lit)
    }

    /// The replacements performed, in order: `(v, l)` means `v ≡ l`.
    pub fn equivalences(&self) -> &[(Var, Lit)] {
        self.v.replacer.merged()
    }

    /// Binary clauses of the store, in canonical order.
    pub fn binary_clauses(&self) -> Vec<BinaryClause> {
        let mut v: Vec<_> = self.v.bin_set.iter().copied().collect();
        v.sort_unstable();
        v
    }

    /// Long clauses of the store.
    pub fn long_clauses(&self) -> impl Iterator<Item = &[Lit]> + '_ {
        self.v.ca.iter().map(move |cr| self.v.ca.lits(cr))
    }

    /// XOR constraints kept for equivalence detection.
    pub fn xor_clauses(&self) -> &[XorClause] {
        &self.v.xors
    }

    /// The current formula in DIMACS, simplified by the root assignment.
    pub fn dimacs_formula(&self) -> DimacsFormula<Cb> {
        DimacsFormula { s: self }
    }
}

impl VarState {
    #[inline(always)]
    fn num_vars(&self) -> u32 {
        self.ass.len() as u32
    }

    #[inline(always)]
    fn value(&self, x: Var) -> lbool {
        self.ass[x]
    }

    #[inline(always)]
    fn value_lit(&self, x: Lit) -> lbool {
        self.ass[x.var()] ^ !x.sign()
    }

    #[inline(always)]
    fn value_lvl_0(&self, x: Lit) -> lbool {
        let res = self.value_lit(x);
        if self.level[x.var()] != 0 {
            lbool::UNDEF
        } else {
            res
        }
    }

    #[inline(always)]
    fn decision_level(&self) -> u32 {
        self.trail_lim.len() as u32
    }

    fn proved_at_lvl_0(&self) -> &[Lit] {
        // find where the end of the level-0 part of the trail is
        let end = self.trail_lim.first().map_or(self.trail.len(), |&x| x);
        &self.trail[..end]
    }

    fn unchecked_enqueue(&mut self, p: Lit) {
        debug_assert_eq!(
            self.value_lit(p),
            lbool::UNDEF,
            "lit {:?} should be undef",
            p
        );
        self.ass[p.var()] = lbool::new(p.sign());
        self.level[p.var()] = self.decision_level();
        self.trail.push(p);
    }
}

impl SolverV {
    #[inline(always)]
    fn num_vars(&self) -> u32 {
        self.vars.num_vars()
    }

    #[inline(always)]
    fn decision_level(&self) -> u32 {
        self.vars.decision_level()
    }

    fn new_var(&mut self) -> Var {
        let v = Var::from_idx(self.num_vars());
        self.vars.ass.reserve(v, lbool::UNDEF);
        self.vars.level.reserve(v, 0);
        let max_lit = Lit::new(v, false);
        self.watches.reserve_default(max_lit);
        self.bins.reserve_default(max_lit);
        self.occs.reserve(max_lit, 0);
        self.xor_occs.reserve_default(v);
        self.replacer.new_var(v);
        v
    }

    /// Add a clause at level 0.
    ///
    /// Precondition: `clause` is sorted for some ordering on `Lit`
    fn add_clause_(&mut self, clause: &mut Vec<Lit>) -> bool {
        if !self.ok {
            return false;
        }

        let mut last_lit = Lit::UNDEF;
        let mut j = 0;
        // remove duplicates, true literals, etc.
        for i in 0..clause.len() {
            let lit_i = clause[i];
            let value = self.vars.value_lit(lit_i);
            if value == lbool::TRUE || lit_i == !last_lit {
                return true; // tauto or satisfied already at level 0
            } else if value != lbool::FALSE && lit_i != last_lit {
                // not a duplicate
                last_lit = lit_i;
                clause[j] = lit_i;
                j += 1;
            }
        }
        clause.truncate(j);

        match clause.len() {
            0 => self.ok = false,
            1 => {
                self.vars.unchecked_enqueue(clause[0]);
                if self.propagate().is_some() {
                    self.ok = false;
                }
            }
            2 => {
                if self.add_bin(clause[0], clause[1]) && self.encoding_xor {
                    self.xor_bins.insert(BinaryClause::new(clause[0], clause[1]));
                }
            }
            _ => {
                let cr = self.ca.alloc(clause);
                if self.encoding_xor {
                    self.xor_crefs.insert(cr);
                }
                for &lit in clause.iter() {
                    self.occs[lit] += 1;
                }
                self.attach_clause(cr);
            }
        }
        self.ok
    }

    fn attach_clause(&mut self, cr: CRef) {
        let c = self.ca.lits(cr);
        let (c0, c1) = (c[0], c[1]);
        self.watches[!c0].push(Watcher {
            cref: cr,
            blocker: c1,
        });
        self.watches[!c1].push(Watcher {
            cref: cr,
            blocker: c0,
        });
    }

    /// Add `(a ∨ b)` to the binary store; returns `true` if it is new.
    ///
    /// At level 0 a clause with a root-false literal also forces the other one.
    fn add_bin(&mut self, a: Lit, b: Lit) -> bool {
        if !self.bin_set.insert(BinaryClause::new(a, b)) {
            return false;
        }
        self.bins[!a].push(b);
        self.bins[!b].push(a);
        self.occs[a] += 1;
        self.occs[b] += 1;

        if self.decision_level() == 0 {
            let va = self.vars.value_lit(a);
            let vb = self.vars.value_lit(b);
            let unit = if va == lbool::FALSE && vb == lbool::FALSE {
                self.ok = false;
                None
            } else if va == lbool::FALSE && vb == lbool::UNDEF {
                Some(b)
            } else if vb == lbool::FALSE && va == lbool::UNDEF {
                Some(a)
            } else {
                None
            };
            if let Some(lit) = unit {
                self.vars.unchecked_enqueue(lit);
                if self.propagate().is_some() {
                    self.ok = false;
                }
            }
        }
        true
    }

    /// Remove `(a ∨ b)` from the binary store; returns `true` if it was present.
    fn remove_bin(&mut self, a: Lit, b: Lit) -> bool {
        if a.var() == b.var() || !self.bin_set.remove(&BinaryClause::new(a, b)) {
            return false;
        }
        fn remove_lit(v: &mut Vec<Lit>, x: Lit) {
            if let Some(i) = v.iter().position(|&y| y == x) {
                v.remove(i);
            }
        }
        remove_lit(&mut self.bins[!a], b);
        remove_lit(&mut self.bins[!b], a);
        self.occs[a] -= 1;
        self.occs[b] -= 1;
        true
    }

    /// Begins a new decision level.
    fn new_decision_level(&mut self) {
        let lvl = self.vars.trail.len();
        self.vars.trail_lim.push(lvl);
    }

    /// Revert to the state at given level (keeping all assignment at `level` but not beyond).
    fn cancel_until(&mut self, level: u32) {
        if self.decision_level() <= level {
            return;
        }
        let vars = &mut self.vars;
        let trail_lim_level = vars.trail_lim[level as usize];
        for c in (trail_lim_level..vars.trail.len()).rev() {
            let x = vars.trail[c].var();
            vars.ass[x] = lbool::UNDEF;
        }
        self.qhead = trail_lim_level;
        vars.trail.truncate(trail_lim_level);
        vars.trail_lim.truncate(level as usize);
    }

    /// Propagates all enqueued facts, binary implications first.
    ///
    /// If a conflict arises, the conflicting clause is returned.
    /// The propagation queue is empty afterwards, even if there was a conflict.
    fn propagate(&mut self) -> Option<Conflict> {
        let mut confl = None;

        while self.qhead < self.vars.trail.len() {
            // `p` is the next enqueued fact to propagate.
            let p = self.vars.trail[self.qhead];
            self.qhead += 1;
            self.propagations += 1;

            for &q in self.bins[p].iter() {
                let value = self.vars.value_lit(q);
                if value == lbool::FALSE {
                    confl = Some(Conflict::Binary(!p, q));
                    break;
                } else if value == lbool::UNDEF {
                    self.vars.unchecked_enqueue(q);
                }
            }
            if confl.is_some() {
                self.qhead = self.vars.trail.len();
                break;
            }

            // `!c[1] != p` for every new watch, so the list can be taken out
            let mut ws = mem::take(&mut self.watches[p]);
            let mut i: usize = 0;
            let mut j: usize = 0;
            let end: usize = ws.len();
            'clauses: while i < end {
                self.bogo_props += 1;
                // Try to avoid inspecting the clause:
                let blocker = ws[i].blocker;
                if self.vars.value_lit(blocker) == lbool::TRUE {
                    ws[j] = ws[i];
                    j += 1;
                    i += 1;
                    continue;
                }

                // Make sure the false literal is data[1]:
                let cr = ws[i].cref;
                let c = self.ca.lits_mut(cr);
                let false_lit = !p;
                if c[0] == false_lit {
                    c[0] = c[1];
                    c[1] = false_lit;
                }
                debug_assert_eq!(c[1], false_lit);
                i += 1;

                // If 0th watch is true, then clause is already satisfied.
                let first = c[0];
                let w = Watcher {
                    cref: cr,
                    blocker: first,
                };
                if first != blocker && self.vars.value_lit(first) == lbool::TRUE {
                    ws[j] = w;
                    j += 1;
                    continue;
                }

                // Look for new watch:
                for k in 2..c.len() {
                    if self.vars.value_lit(c[k]) != lbool::FALSE {
                        c[1] = c[k];
                        c[k] = false_lit;
                        debug_assert_ne!(!c[1], p);
                        self.watches[!c[1]].push(w);
                        continue 'clauses;
                    }
                }

                // Did not find watch -- clause is unit under assignment:
                ws[j] = w;
                j += 1;
                if self.vars.value_lit(first) == lbool::FALSE {
                    confl = Some(Conflict::Clause(cr));
                    self.qhead = self.vars.trail.len();
                    // Copy the remaining watches:
                    while i < end {
                        ws[j] = ws[i];
                        j += 1;
                        i += 1;
                    }
                } else {
                    self.vars.unchecked_enqueue(first);
                }
            }
            ws.truncate(j);
            self.watches[p] = ws;
        }

        if confl.is_some() {
            self.conflicts += 1;
        }
        confl
    }
}

impl<Cb: Callbacks> ProbeContext for Solver<Cb> {
    fn num_vars(&self) -> u32 {
        self.v.num_vars()
    }

    fn is_ok(&self) -> bool {
        self.v.ok
    }

    fn is_free(&self, v: Var) -> bool {
        self.v.vars.value_lvl_0(Lit::new(v, true)) == lbool::UNDEF
            && !self.v.replacer.is_replaced(v)
    }

    fn occurrences(&self, lit: Lit) -> u32 {
        self.v.occs[lit]
    }

    #[inline]
    fn value_lit(&self, lit: Lit) -> lbool {
        self.v.vars.value_lit(lit)
    }

    #[inline]
    fn value_lvl_0(&self, lit: Lit) -> lbool {
        self.v.vars.value_lvl_0(lit)
    }

    fn decision_level(&self) -> u32 {
        self.v.decision_level()
    }

    fn num_propagations(&self) -> u64 {
        self.v.propagations
    }

    fn num_bogo_props(&self) -> u64 {
        self.v.propagations + self.v.bogo_props
    }

    fn num_conflicts(&self) -> u64 {
        self.v.conflicts
    }

    fn mark(&mut self) -> TrailMark {
        debug_assert_eq!(self.v.qhead, self.v.vars.trail.len());
        let m = TrailMark::new(self.v.decision_level(), self.v.vars.trail.len());
        self.v.new_decision_level();
        m
    }

    fn rollback(&mut self, mark: TrailMark) {
        self.v.cancel_until(mark.level());
        debug_assert_eq!(self.v.vars.trail.len(), mark.trail_len());
    }

    fn try_assign(&mut self, lit: Lit) -> Result<(), Conflict> {
        debug_assert!(self.v.decision_level() > 0, "tentative assignment at level 0");
        let value = self.v.vars.value_lit(lit);
        if value == lbool::TRUE {
            return Ok(());
        } else if value == lbool::FALSE {
            self.v.conflicts += 1;
            return Err(Conflict::Falsified(lit));
        }
        trace!("try assign {:?}", lit);
        self.v.vars.unchecked_enqueue(lit);
        match self.v.propagate() {
            None => Ok(()),
            Some(c) => Err(c),
        }
    }

    fn trail_since(&self, mark: TrailMark) -> &[Lit] {
        &self.v.vars.trail[mark.trail_len()..]
    }

    fn force_permanent(&mut self, lit: Lit) -> RootResult<bool> {
        if !self.v.ok {
            return Err(RootConflict::AlreadyUnsat);
        }
        debug_assert_eq!(self.v.decision_level(), 0);
        let value = self.v.vars.value_lit(lit);
        if value == lbool::TRUE {
            Ok(false)
        } else if value == lbool::FALSE {
            self.v.ok = false;
            Err(RootConflict::Contradiction { lit })
        } else {
            debug!("force {:?} at level 0", lit);
            self.v.vars.unchecked_enqueue(lit);
            if self.v.propagate().is_some() {
                self.v.ok = false;
                Err(RootConflict::Propagation { lit })
            } else {
                Ok(true)
            }
        }
    }

    fn add_binary_clause(&mut self, a: Lit, b: Lit) -> bool {
        debug_assert_eq!(self.v.decision_level(), 0);
        self.v.ok && self.v.add_bin(a, b)
    }

    fn remove_binary_clause(&mut self, a: Lit, b: Lit) -> bool {
        self.v.remove_bin(a, b)
    }

    fn has_binary_clause(&self, a: Lit, b: Lit) -> bool {
        a.var() != b.var() && self.v.bin_set.contains(&BinaryClause::new(a, b))
    }

    fn binary_implied(&self, lit: Lit) -> &[Lit] {
        &self.v.bins[lit]
    }

    fn xor_shrink_notifications(&mut self, mark: TrailMark, out: &mut Vec<TwoLongXor>) {
        let v = &mut self.v;
        v.xor_seen.clear();
        for i in mark.trail_len()..v.vars.trail.len() {
            let var = v.vars.trail[i].var();
            for &x in v.xor_occs[var].iter() {
                if !v.xor_seen.insert(x) {
                    continue;
                }
                let mut rhs = v.xors[x.idx()].rhs();
                let mut undef = [Var::UNDEF; 2];
                let mut n_undef = 0;
                for &y in v.xors[x.idx()].vars() {
                    match v.vars.value(y).to_bool() {
                        Some(b) => rhs ^= b,
                        None => {
                            if n_undef < 2 {
                                undef[n_undef] = y;
                            }
                            n_undef += 1;
                        }
                    }
                }
                if n_undef == 2 {
                    out.push(TwoLongXor::new(undef[0], undef[1], rhs));
                }
            }
        }
    }

    fn submit_equivalence(&mut self, v0: Var, v1: Var, inverted: bool) -> RootResult<bool> {
        if !self.v.ok {
            return Err(RootConflict::AlreadyUnsat);
        }
        debug_assert_eq!(self.v.decision_level(), 0);
        let lit1 = Lit::new(v0, true);
        let lit2 = Lit::new(v1, !inverted);
        match self.v.replacer.merge(lit1, lit2) {
            Merge::Known => Ok(false),
            Merge::Contradiction => {
                self.v.ok = false;
                Err(RootConflict::Equivalence { lit1, lit2 })
            }
            Merge::Merged { var, lit } => {
                debug!("replace {:?} by {:?}", var, lit);
                self.v.add_bin(!lit1, lit2);
                self.v.add_bin(lit1, !lit2);
                if self.v.ok {
                    Ok(true)
                } else {
                    Err(RootConflict::Equivalence { lit1, lit2 })
                }
            }
        }
    }

    fn should_stop(&self) -> bool {
        self.asynch_interrupt.load(Ordering::Relaxed) || self.cb.stop()
    }

    fn notify_start(&mut self) {
        self.cb.on_start()
    }

    fn notify_pass(&mut self, pass: u32, stats: &Stats) {
        self.cb.on_pass(pass, stats)
    }

    fn notify_result(&mut self, ok: bool) {
        self.cb.on_result(ok)
    }
}

/// Displays the current formula of a solver in DIMACS
///
/// Retained XORs are written as `x` lines, without the clauses that encode
/// them. Auxiliary variables of those encodings stay in the numbering.
pub struct DimacsFormula<'a, Cb: Callbacks> {
    s: &'a Solver<Cb>,
}

impl<'a, Cb: Callbacks> fmt::Display for DimacsFormula<'a, Cb> {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        let v = &self.s.v;
        let n_vars = v.num_vars();
        if !v.ok {
            writeln!(out, "p cnf {} 1", n_vars)?;
            return writeln!(out, "0");
        }
        let root = |l: Lit| v.vars.value_lvl_0(l);

        let mut clauses: Vec<Vec<Lit>> = v.vars.proved_at_lvl_0().iter().map(|&l| vec![l]).collect();
        let mut push_clause = |c: &[Lit]| {
            if c.iter().all(|&l| root(l) != lbool::TRUE) {
                clauses.push(c.iter().copied().filter(|&l| root(l) == lbool::UNDEF).collect());
            }
        };
        for bc in self.s.binary_clauses() {
            if !v.xor_bins.contains(&bc) {
                push_clause(bc.lits());
            }
        }
        for cr in v.ca.iter().filter(|cr| !v.xor_crefs.contains(cr)) {
            push_clause(v.ca.lits(cr));
        }
        let mut xors = vec![];
        for x in v.xors.iter() {
            let mut x = x.clone();
            x.fold(|y| v.vars.value_lvl_0(Lit::new(y, true)).to_bool());
            if !x.is_empty() {
                xors.push(x);
            }
        }

        writeln!(out, "p cnf {} {}", n_vars, clauses.len() + xors.len())?;
        for c in &clauses {
            fmt_lits(c, out)?;
            writeln!(out)?;
        }
        for x in &xors {
            // the XOR of the literals of an `x` line is true
            let lits: Vec<Lit> = x
                .vars()
                .iter()
                .enumerate()
                .map(|(i, &y)| Lit::new(y, i > 0 || x.rhs()))
                .collect();
            write!(out, "x")?;
            fmt_lits(&lits, out)?;
            writeln!(out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::BasicSolver;

    fn lit(i: i32) -> Lit {
        Lit::from_dimacs(i)
    }

    fn solver_with(n: u32, clauses: &[&[i32]]) -> BasicSolver {
        let mut s = BasicSolver::default();
        for _ in 0..n {
            s.new_var();
        }
        for c in clauses {
            let c: Vec<Lit> = c.iter().map(|&i| lit(i)).collect();
            s.add_clause(&c);
        }
        s
    }

    #[test]
    fn test_add_clause_simplifies() {
        let mut s = solver_with(4, &[&[1, -1, 2], &[3, 3, 4], &[2]]);
        assert_eq!(s.num_clauses(), 1);
        assert!(s.has_binary_clause(lit(4), lit(3)));
        assert_eq!(s.value_lvl_0(lit(2)), lbool::TRUE);
        // satisfied at root
        assert!(s.add_clause(&[lit(2), lit(1), lit(3)]));
        // root-false literal dropped
        assert!(s.add_clause(&[lit(-2), lit(1), lit(4)]));
        assert!(s.has_binary_clause(lit(1), lit(4)));
        assert!(!s.add_clause(&[lit(-2)]));
        assert!(!s.is_ok());
    }

    #[test]
    fn test_mark_rollback_is_exact() {
        let mut s = solver_with(5, &[&[-1, 2], &[-2, 3, 4], &[-3, 5], &[1, 3, -5]]);
        let trail0 = s.v.vars.trail.clone();
        let m = s.mark();
        assert_eq!(m.level(), 0);
        assert!(s.try_assign(lit(1)).is_ok());
        assert!(s.try_assign(lit(-4)).is_ok());
        assert_eq!(s.trail_since(m), &[lit(1), lit(2), lit(-4), lit(3), lit(5)]);
        s.rollback(m);
        assert_eq!(s.v.vars.trail, trail0);
        assert_eq!(s.decision_level(), 0);
        for i in 1..=5 {
            assert_eq!(s.value_lit(lit(i)), lbool::UNDEF);
        }
        // watches still consistent: same propagation again
        let m = s.mark();
        assert!(s.try_assign(lit(-4)).is_ok());
        assert!(s.try_assign(lit(1)).is_ok());
        assert_eq!(s.value_lit(lit(5)), lbool::TRUE);
        s.rollback(m);
    }

    #[test]
    fn test_conflicts() {
        let mut s = solver_with(3, &[&[-1, 2], &[-1, 3], &[-2, -3]]);
        let m = s.mark();
        assert!(matches!(s.try_assign(lit(1)), Err(Conflict::Binary(..))));
        s.rollback(m);
        assert_eq!(s.num_conflicts(), 1);
        assert_eq!(s.force_permanent(lit(-1)), Ok(true));
        assert_eq!(s.force_permanent(lit(-1)), Ok(false));
        let m = s.mark();
        assert_eq!(s.try_assign(lit(1)), Err(Conflict::Falsified(lit(1))));
        s.rollback(m);
        assert_eq!(
            s.force_permanent(lit(1)),
            Err(RootConflict::Contradiction { lit: lit(1) })
        );
        assert_eq!(s.force_permanent(lit(2)), Err(RootConflict::AlreadyUnsat));
    }

    #[test]
    fn test_long_clause_conflict() {
        let mut s = solver_with(3, &[&[-1, -2, 3], &[-1, -2, -3]]);
        let m = s.mark();
        assert!(s.try_assign(lit(1)).is_ok());
        assert!(matches!(s.try_assign(lit(2)), Err(Conflict::Clause(_))));
        s.rollback(m);
        assert!(s.trail_since(m).is_empty());
    }

    #[test]
    fn test_binary_store() {
        let mut s = solver_with(3, &[]);
        assert!(s.add_binary_clause(lit(1), lit(-2)));
        assert!(!s.add_binary_clause(lit(-2), lit(1)));
        assert_eq!(s.binary_implied(lit(2)), &[lit(1)]);
        assert_eq!(s.binary_implied(lit(-1)), &[lit(-2)]);
        assert_eq!(s.occurrences(lit(1)), 1);
        assert!(s.remove_binary_clause(lit(-2), lit(1)));
        assert!(!s.remove_binary_clause(lit(-2), lit(1)));
        assert!(s.binary_implied(lit(2)).is_empty());
        assert_eq!(s.occurrences(lit(1)), 0);
        // unit through a root-false literal
        assert_eq!(s.force_permanent(lit(-3)), Ok(true));
        assert!(s.add_binary_clause(lit(3), lit(2)));
        assert_eq!(s.value_lvl_0(lit(2)), lbool::TRUE);
    }

    /// Check by enumeration that the clauses of the solver (over the first
    /// `n` variables, projecting auxiliary ones) accept exactly the models of `f`.
    fn check_models(s: &BasicSolver, n: u32, f: impl Fn(u32) -> bool) {
        let nv = s.num_vars();
        let mut projected = vec![false; 1 << n];
        for a in 0u64..(1 << nv) {
            let value = |l: Lit| ((a >> l.var().idx()) & 1 == 1) == l.sign();
            let units_ok = s.proved_at_lvl_0().iter().all(|&l| value(l));
            let bins_ok = s.binary_clauses().iter().all(|c| c.lits().iter().any(|&l| value(l)));
            let long_ok = s.long_clauses().all(|c| c.iter().any(|&l| value(l)));
            if units_ok && bins_ok && long_ok {
                projected[(a & ((1 << n) - 1)) as usize] = true;
            }
        }
        for a in 0..(1u32 << n) {
            assert_eq!(projected[a as usize], f(a), "assignment {:b}", a);
        }
    }

    #[test]
    fn test_xor_cut_encoding() {
        let mut s = BasicSolver::default();
        let vs: Vec<Var> = (0..6).map(|_| s.new_var()).collect();
        assert!(s.add_xor_clause(&vs, true));
        assert!(s.num_vars() > 6);
        assert_eq!(s.num_xors(), 1);
        check_models(&s, 6, |a| a.count_ones() % 2 == 1);
    }

    #[test]
    fn test_xor_degenerate() {
        let mut s = solver_with(3, &[&[2]]);
        let v = |i: u32| Var::from_idx(i);
        // 1 ^ 2 ^ 2 = 1, i.e. 1 = 1
        assert!(s.add_xor_clause(&[v(0), v(1), v(1)], true));
        assert_eq!(s.value_lvl_0(lit(1)), lbool::TRUE);
        // 2 ^ 3 = 1 with 2 true, i.e. 3 = 0
        assert!(s.add_xor_clause(&[v(1), v(2)], true));
        assert_eq!(s.value_lvl_0(lit(-3)), lbool::TRUE);
        assert_eq!(s.num_xors(), 0);
        assert!(!s.add_xor_clause(&[v(0)], false));
    }

    #[test]
    fn test_xor_shrink_notifications() {
        let mut s = BasicSolver::default();
        let vs: Vec<Var> = (0..4).map(|_| s.new_var()).collect();
        s.add_xor_clause(&vs[..3], false);
        s.add_xor_clause(&[vs[0], vs[1], vs[3]], true);
        let m = s.mark();
        s.try_assign(Lit::new(vs[0], true)).unwrap();
        let mut out = vec![];
        s.xor_shrink_notifications(m, &mut out);
        out.sort();
        assert_eq!(
            out,
            vec![
                TwoLongXor::new(vs[1], vs[2], true),
                TwoLongXor::new(vs[1], vs[3], false)
            ]
        );
        s.rollback(m);
    }

    #[test]
    fn test_submit_equivalence() {
        let mut s = solver_with(3, &[]);
        let v = |i: u32| Var::from_idx(i);
        assert_eq!(s.submit_equivalence(v(0), v(2), true), Ok(true));
        assert!(!s.is_free(v(2)));
        assert!(s.is_free(v(0)));
        assert_eq!(s.representative(lit(3)), lit(-1));
        assert!(s.has_binary_clause(lit(1), lit(3)));
        assert!(s.has_binary_clause(lit(-1), lit(-3)));
        assert_eq!(s.submit_equivalence(v(2), v(0), true), Ok(false));
        assert!(matches!(
            s.submit_equivalence(v(0), v(2), false),
            Err(RootConflict::Equivalence { .. })
        ));
        assert!(!s.is_ok());
    }

    #[test]
    fn test_dimacs_formula() {
        let mut s = solver_with(4, &[&[1], &[-1, 2, 3], &[3, 4], &[-2, -3, 4]]);
        s.add_xor_clause(&[Var::from_idx(1), Var::from_idx(2), Var::from_idx(3)], false);
        let out = s.dimacs_formula().to_string();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("p cnf 4 5"));
        assert_eq!(lines.next(), Some("1 0"));
        assert!(out.contains("2 3 0\n"));
        assert!(out.contains("x-2 3 4 0\n"));
        // only (¬2 ∨ ¬3 ∨ 4): the XOR is not written as clauses too
        let ternary = out
            .lines()
            .filter(|l| !l.starts_with('x') && l.split(' ').count() == 4)
            .count();
        assert_eq!(ternary, 1);
    }

    #[test]
    fn test_dimacs_long_xor_reparses() {
        let mut s = BasicSolver::default();
        let vs: Vec<Var> = (0..6).map(|_| s.new_var()).collect();
        assert!(s.add_xor_clause(&vs, true));
        assert_eq!(s.num_vars(), 7);
        let out = s.dimacs_formula().to_string();
        assert!(out.starts_with("p cnf 7 1\n"));

        let mut s2 = BasicSolver::default();
        crate::dimacs::parse(&mut out.as_bytes(), &mut s2, true).unwrap();
        // one fresh auxiliary variable, after the declared ones
        assert_eq!(s2.num_vars(), 8);
        assert_eq!(s2.num_xors(), 1);
        check_models(&s2, 6, |a| a.count_ones() % 2 == 1);
    }
}
