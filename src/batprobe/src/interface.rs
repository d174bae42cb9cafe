/**************************************************************************************[interface.rs]
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

/* Collaborator interface of the prober */

use crate::{
    clause::{lbool, CRef, Lit, Var},
    error::RootResult,
    stats::Stats,
    xor::TwoLongXor,
};

/// A position on the trail, obtained from `ProbeContext::mark`.
///
/// Rolling back to a mark restores the trail and the assignment exactly
/// as they were when the mark was taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrailMark {
    level: u32,
    trail_len: usize,
}

impl TrailMark {
    pub fn new(level: u32, trail_len: usize) -> Self {
        TrailMark { level, trail_len }
    }

    /// Decision level at which the mark was taken.
    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Length of the trail when the mark was taken.
    #[inline]
    pub fn trail_len(&self) -> usize {
        self.trail_len
    }
}

/// A unit propagation conflict.
///
/// This is the routine outcome of a failed probe, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conflict {
    /// The binary clause `(a ∨ b)` is falsified
    Binary(Lit, Lit),
    /// The long clause is falsified
    Clause(CRef),
    /// The literal to assign is already false
    Falsified(Lit),
}

/// The solver context, as seen by the prober.
///
/// Every probing operation takes the context explicitly; the prober keeps no
/// reference to it between calls. Implementations must be sequential: a
/// tentative assignment is always rolled back before the next one starts.
pub trait ProbeContext {
    /// Number of variables.
    fn num_vars(&self) -> u32;

    /// `false` once the formula has been proved unsatisfiable.
    fn is_ok(&self) -> bool;

    /// Is `v` unassigned at the root and not replaced by another variable?
    fn is_free(&self, v: Var) -> bool;

    /// Enumerate the free variables.
    fn free_vars(&self) -> Vec<Var> {
        (0..self.num_vars())
            .map(Var::unsafe_from_idx)
            .filter(|&v| self.is_free(v))
            .collect()
    }

    /// Number of clauses `lit` occurs in.
    fn occurrences(&self, lit: Lit) -> u32;

    /// Current value of `lit`, including tentative assignments.
    fn value_lit(&self, lit: Lit) -> lbool;

    /// Value of `lit` if it is assigned at the root, `UNDEF` otherwise.
    fn value_lvl_0(&self, lit: Lit) -> lbool;

    fn decision_level(&self) -> u32;

    /// Number of literals propagated so far.
    fn num_propagations(&self) -> u64;

    /// Propagation cost weighted by the clauses inspected.
    fn num_bogo_props(&self) -> u64 {
        self.num_propagations()
    }

    /// Number of propagation conflicts so far.
    fn num_conflicts(&self) -> u64;

    /// Open a new scope for tentative assignments.
    fn mark(&mut self) -> TrailMark;

    /// Undo every assignment made since `mark`, closing its scope.
    fn rollback(&mut self, mark: TrailMark);

    /// Tentatively assign `lit` and propagate to fixpoint.
    ///
    /// On success, the implied literals are `trail_since(mark)`. Assigning a
    /// literal that is already true succeeds without effect, assigning one
    /// that is already false is a `Conflict::Falsified`.
    fn try_assign(&mut self, lit: Lit) -> Result<(), Conflict>;

    /// Literals assigned since `mark`, in assignment order.
    fn trail_since(&self, mark: TrailMark) -> &[Lit];

    /// Commit `lit` at the root and propagate.
    ///
    /// Returns `Ok(false)` if `lit` was already true at the root.
    fn force_permanent(&mut self, lit: Lit) -> RootResult<bool>;

    /// Add the clause `(a ∨ b)`; returns `true` if it was not present.
    fn add_binary_clause(&mut self, a: Lit, b: Lit) -> bool;

    /// Remove the clause `(a ∨ b)`; returns `true` if it was present.
    fn remove_binary_clause(&mut self, a: Lit, b: Lit) -> bool;

    fn has_binary_clause(&self, a: Lit, b: Lit) -> bool;

    /// Literals directly implied by `lit` through binary clauses.
    fn binary_implied(&self, lit: Lit) -> &[Lit];

    /// Push into `out` every XOR constraint that has exactly two unassigned
    /// variables and contains a variable assigned since `mark`.
    fn xor_shrink_notifications(&mut self, mark: TrailMark, out: &mut Vec<TwoLongXor>);

    /// Declare `v0 = v1` (or `v0 = ¬v1` if `inverted`) and replace one by the other.
    ///
    /// Returns `Ok(false)` if the equivalence was already known.
    fn submit_equivalence(&mut self, v0: Var, v1: Var, inverted: bool) -> RootResult<bool>;

    /// Cooperative cancellation, checked between probes.
    fn should_stop(&self) -> bool {
        false
    }

    /// Called when a probing search starts.
    fn notify_start(&mut self) {}

    /// Called after each probing pass.
    fn notify_pass(&mut self, _pass: u32, _stats: &Stats) {}

    /// Called when a probing search is over.
    fn notify_result(&mut self, _ok: bool) {}
}
