/*************************************************************************************[multilevel.rs]
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

//! Multi-level probing: failures that only show up under a conjunction of
//! a few literals.
//!
//! A chain of `k` variables is explored depth-first, one decision level per
//! variable, over all `2^k` sign patterns. A literal of the chain that
//! belongs to no pattern surviving propagation is false in every model, so
//! its negation is forced at the root.

use {
    crate::{
        clause::{Lit, Var},
        error::RootResult,
        interface::ProbeContext,
        probe::{PassScope, ProbeOpts},
    },
    std::cmp,
};

/// Generate a random double:
fn drand(seed: &mut f64) -> f64 {
    *seed *= 1389796.0;
    let q = (*seed / 2147483647.0) as i32;
    *seed -= q as f64 * 2147483647.0;
    *seed / 2147483647.0
}

/// Generate a random integer:
fn irand(seed: &mut f64, size: i32) -> i32 {
    (drand(seed) * size as f64) as i32
}

fn shuffle<T>(xs: &mut [T], seed: &mut f64) {
    for i in (1..xs.len()).rev() {
        let j = irand(seed, i as i32 + 1) as usize;
        xs.swap(i, j);
    }
}

/// Candidates for chains: free variables with the most occurrences in
/// their rarest polarity.
fn candidates<C: ProbeContext>(ctx: &C, max: usize) -> Vec<Var> {
    let mut vars = ctx.free_vars();
    vars.sort_by_key(|&v| {
        let pos = ctx.occurrences(Lit::new(v, true));
        let neg = ctx.occurrences(Lit::new(v, false));
        (cmp::Reverse(pos.min(neg)), v)
    });
    vars.truncate(max);
    vars
}

/// Probe chains of `opts.multi_level_chain_len` variables until the
/// propagation count reaches `prop_limit`.
///
/// The shuffle restarts from `opts.random_seed` at every call, so that two
/// calls on the same formula explore the same chains.
pub(crate) fn probe_chains<C: ProbeContext>(
    ctx: &mut C,
    opts: &ProbeOpts,
    scope: &mut PassScope,
    prop_limit: u64,
) -> RootResult<()> {
    let k = opts.multi_level_chain_len as usize;
    let mut cands = candidates(ctx, opts.multi_level_candidates);
    if cands.len() < k {
        return Ok(());
    }
    let mut seed = opts.random_seed;
    shuffle(&mut cands, &mut seed);

    for chain in cands.chunks_exact(k).take(opts.multi_level_max_chains) {
        if scope.out_of_budget(ctx, prop_limit) {
            scope.stopped = true;
            break;
        }
        // earlier chains may have fixed some of these
        if !chain.iter().all(|&v| ctx.is_free(v)) {
            continue;
        }
        if !probe_chain(ctx, scope, chain, prop_limit)? {
            debug!("multi-level: chain {:?} abandoned", chain);
            scope.stopped = true;
            break;
        }
    }
    Ok(())
}

/// Explore every sign pattern of `chain`, then force the literals that
/// belong to no successful pattern.
///
/// Returns `Ok(false)` if the budget ran out before the exploration was
/// complete; nothing is forced in that case.
pub(crate) fn probe_chain<C: ProbeContext>(
    ctx: &mut C,
    scope: &mut PassScope,
    chain: &[Var],
    prop_limit: u64,
) -> RootResult<bool> {
    scope.stats.multi_level_chains += 1;
    // succeeded[i][s]: some full pattern with `chain[i]` of sign `s` survives
    let mut succeeded = vec![[false; 2]; chain.len()];
    let mut signs = Vec::with_capacity(chain.len());
    if !explore(ctx, scope, chain, &mut signs, &mut succeeded, prop_limit) {
        return Ok(false);
    }
    scope.stats.multi_level_finished += 1;

    let mut forced = 0;
    for (&v, ok) in chain.iter().zip(succeeded.iter()) {
        for &sign in &[true, false] {
            if !ok[sign as usize] && ctx.force_permanent(Lit::new(v, !sign))? {
                debug!("multi-level: {:?} fails in chain {:?}", Lit::new(v, sign), chain);
                forced += 1;
            }
        }
    }
    if forced > 0 {
        scope.stats.multi_level_failed += 1;
        scope.stats.zero_depth_assigns += forced;
    }
    Ok(true)
}

/// Depth-first exploration below the current prefix `signs`. Returns
/// `false` if interrupted by the budget.
fn explore<C: ProbeContext>(
    ctx: &mut C,
    scope: &PassScope,
    chain: &[Var],
    signs: &mut Vec<bool>,
    succeeded: &mut [[bool; 2]],
    prop_limit: u64,
) -> bool {
    let depth = signs.len();
    if depth == chain.len() {
        for (ok, &s) in succeeded.iter_mut().zip(signs.iter()) {
            ok[s as usize] = true;
        }
        return true;
    }
    for &sign in &[true, false] {
        if scope.out_of_budget(ctx, prop_limit) {
            return false;
        }
        let m = ctx.mark();
        let done = match ctx.try_assign(Lit::new(chain[depth], sign)) {
            Ok(()) => {
                signs.push(sign);
                let done = explore(ctx, scope, chain, signs, succeeded, prop_limit);
                signs.pop();
                done
            }
            Err(_) => true, // the whole subtree fails
        };
        ctx.rollback(m);
        if !done {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{clause::lbool, error::RootConflict, BasicSolver};

    fn lit(i: i32) -> Lit {
        Lit::from_dimacs(i)
    }

    fn solver_with(n: u32, clauses: &[&[i32]]) -> BasicSolver {
        let mut s = BasicSolver::default();
        s.var_of_int(n - 1);
        for c in clauses {
            let c: Vec<Lit> = c.iter().map(|&i| lit(i)).collect();
            assert!(s.add_clause(&c));
        }
        s
    }

    #[test]
    fn test_drand_range() {
        let mut seed = 91648253.0;
        for _ in 0..1000 {
            let x = drand(&mut seed);
            assert!(x >= 0. && x < 1.);
        }
        let mut xs: Vec<u32> = (0..20).collect();
        let mut seed = 91648253.0;
        shuffle(&mut xs, &mut seed);
        let mut sorted = xs.clone();
        sorted.sort();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_pair_failure() {
        // 1 fails with 2 and with ¬2, but propagates nothing alone
        let mut s = solver_with(
            4,
            &[&[-1, -2, 3], &[-1, -2, -3], &[-1, 2, 4], &[-1, 2, -4]],
        );
        let mut scope = PassScope::new(4, None);
        let chain = [Var::from_idx(0), Var::from_idx(1)];
        assert_eq!(probe_chain(&mut s, &mut scope, &chain, u64::MAX), Ok(true));
        assert_eq!(s.value_lvl_0(lit(1)), lbool::FALSE);
        assert_eq!(s.value_lvl_0(lit(2)), lbool::UNDEF);
        assert_eq!(scope.stats.multi_level_chains, 1);
        assert_eq!(scope.stats.multi_level_finished, 1);
        assert_eq!(scope.stats.multi_level_failed, 1);
        assert_eq!(scope.stats.zero_depth_assigns, 1);
        assert_eq!(s.decision_level(), 0);
    }

    #[test]
    fn test_all_patterns_fail() {
        let mut clauses = vec![];
        for pattern in 0..8 {
            let c: Vec<i32> = (0..3)
                .map(|i| if (pattern >> i) & 1 == 1 { i + 1 } else { -(i + 1) })
                .collect();
            clauses.push(c);
        }
        let clauses: Vec<&[i32]> = clauses.iter().map(|c| &c[..]).collect();
        let mut s = solver_with(3, &clauses);
        let mut scope = PassScope::new(3, None);
        let opts = ProbeOpts {
            multi_level_chain_len: 3,
            ..ProbeOpts::default()
        };
        let r = probe_chains(&mut s, &opts, &mut scope, u64::MAX);
        assert!(matches!(r, Err(RootConflict::Contradiction { .. })));
        assert!(!s.is_ok());
    }

    #[test]
    fn test_budget_abandons_chain() {
        let mut s = solver_with(4, &[&[-1, -2, 3], &[-1, -2, -3], &[-1, 2, 4], &[-1, 2, -4]]);
        let mut scope = PassScope::new(4, None);
        let chain = [Var::from_idx(0), Var::from_idx(1)];
        let limit = s.num_propagations() + 1;
        assert_eq!(probe_chain(&mut s, &mut scope, &chain, limit), Ok(false));
        assert_eq!(s.value_lvl_0(lit(1)), lbool::UNDEF);
        assert_eq!(scope.stats.multi_level_chains, 1);
        assert_eq!(scope.stats.multi_level_finished, 0);
        assert_eq!(s.decision_level(), 0);
    }

    #[test]
    fn test_chains_are_deterministic() {
        let mut s = solver_with(6, &[&[1, 2, 3], &[-4, 5, 6]]);
        let opts = ProbeOpts::default();
        let p0 = s.num_propagations();
        let mut scope1 = PassScope::new(6, None);
        probe_chains(&mut s, &opts, &mut scope1, u64::MAX).unwrap();
        assert_eq!(scope1.stats.multi_level_chains, 2);
        assert_eq!(scope1.stats.multi_level_finished, 2);
        assert_eq!(scope1.stats.multi_level_failed, 0);
        let p1 = s.num_propagations();
        let mut scope2 = PassScope::new(6, None);
        probe_chains(&mut s, &opts, &mut scope2, u64::MAX).unwrap();
        assert_eq!(scope1.stats, scope2.stats);
        assert_eq!(p1 - p0, s.num_propagations() - p1);
    }
}
