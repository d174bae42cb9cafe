/****************************************************************************************[probing.rs]
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
    batprobe::*,
    rand::{rngs::SmallRng, seq::index, Rng, SeedableRng},
    std::time::Duration,
};

/// A small formula kept on the side, to enumerate its models.
struct Formula {
    n: u32,
    clauses: Vec<Vec<Lit>>,
    xors: Vec<(Vec<Var>, bool)>,
}

fn value(lit: Lit, a: u32) -> bool {
    ((a >> lit.var().idx()) & 1 == 1) == lit.sign()
}

fn models(n: u32, f: impl Fn(u32) -> bool) -> Vec<u32> {
    (0..1u32 << n).filter(|&a| f(a)).collect()
}

impl Formula {
    fn random(rng: &mut SmallRng, s: &mut BasicSolver) -> Self {
        let n = rng.gen_range(5..=12);
        let vars: Vec<Var> = (0..n).map(|i| s.var_of_int(i)).collect();
        let mut f = Formula {
            n,
            clauses: vec![],
            xors: vec![],
        };
        let n_bin = rng.gen_range(n..=2 * n);
        let n_tern = rng.gen_range(1..=n);
        let n_xor = rng.gen_range(0..=2);
        for i in 0..n_bin + n_tern {
            let k = if i < n_bin { 2 } else { 3 };
            let c: Vec<Lit> = index::sample(rng, n as usize, k)
                .into_iter()
                .map(|v| Lit::new(vars[v], rng.gen()))
                .collect();
            s.add_clause(&c);
            f.clauses.push(c);
        }
        for _ in 0..n_xor {
            // 5 or 6 variables are cut, with an auxiliary variable
            let k = rng.gen_range(3..=n.min(6)) as usize;
            let xs: Vec<Var> = index::sample(rng, n as usize, k)
                .into_iter()
                .map(|v| vars[v])
                .collect();
            let rhs = rng.gen();
            s.add_xor_clause(&xs, rhs);
            f.xors.push((xs, rhs));
        }
        f
    }

    fn eval(&self, a: u32) -> bool {
        self.clauses.iter().all(|c| c.iter().any(|&l| value(l, a)))
            && self.xors.iter().all(|(xs, rhs)| {
                xs.iter()
                    .fold(false, |acc, &v| acc ^ value(Lit::new(v, true), a))
                    == *rhs
            })
    }
}

/// Models of the formula currently held by the solver, over all its
/// variables (auxiliary ones included).
fn solver_models(s: &BasicSolver) -> Vec<u32> {
    let units = s.proved_at_lvl_0().to_vec();
    let bins = s.binary_clauses();
    let longs: Vec<Vec<Lit>> = s.long_clauses().map(|c| c.to_vec()).collect();
    models(s.num_vars(), |a| {
        units.iter().all(|&l| value(l, a))
            && bins.iter().all(|bc| bc.lits().iter().any(|&l| value(l, a)))
            && longs.iter().all(|c| c.iter().any(|&l| value(l, a)))
    })
}

/// Models restricted to the first `n` variables.
fn project(ms: &[u32], n: u32) -> Vec<u32> {
    let mut p: Vec<u32> = ms.iter().map(|&a| a & ((1 << n) - 1)).collect();
    p.sort_unstable();
    p.dedup();
    p
}

fn lits(s: &BasicSolver) -> Vec<Lit> {
    (0..s.num_vars())
        .flat_map(|i| {
            let v = Var::unsafe_from_idx(i);
            vec![Lit::new(v, true), Lit::new(v, false)]
        })
        .collect()
}

#[test]
fn test_random_formulas_keep_models() {
    let mut total = Stats::new();
    let mut with_aux = 0;
    for seed in 0..300 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut s = BasicSolver::default();
        let f = Formula::random(&mut rng, &mut s);
        assert!(s.num_vars() <= f.n + 2);
        let orig = models(f.n, |a| f.eval(a));
        if !s.is_ok() {
            assert!(orig.is_empty(), "seed {}", seed);
            continue;
        }
        // auxiliary variables are defined by the problem ones
        let full = solver_models(&s);
        assert_eq!(full.len(), orig.len(), "seed {}", seed);
        assert_eq!(project(&full, f.n), orig, "seed {}", seed);
        if s.num_vars() > f.n {
            with_aux += 1;
        }

        let mut prober = Prober::new(ProbeOpts {
            max_passes: 1000,
            verify_bin_removal: true,
            ..ProbeOpts::default()
        });
        if !prober.search(&mut s) {
            assert!(orig.is_empty(), "seed {}: satisfiable formula refuted", seed);
            continue;
        }
        total += prober.run_stats();
        assert_eq!(prober.run_stats().bin_removal_violations, 0, "seed {}", seed);

        // no tentative assignment left behind
        assert_eq!(s.decision_level(), 0);
        for l in lits(&s) {
            assert_eq!(s.value_lit(l), s.value_lvl_0(l), "seed {}", seed);
        }

        // root facts and equivalences hold in every model
        for &l in s.proved_at_lvl_0() {
            assert!(full.iter().all(|&a| value(l, a)), "seed {}: {:?}", seed, l);
        }
        for &(v, l) in s.equivalences() {
            let p = Lit::new(v, true);
            assert!(
                full.iter().all(|&a| value(p, a) == value(l, a)),
                "seed {}: {:?} = {:?}",
                seed,
                v,
                l
            );
        }

        // added and removed binary clauses keep the same models
        assert_eq!(solver_models(&s), full, "seed {}", seed);
    }
    assert!(with_aux > 0);
    assert!(total.num_probed > 0);
    assert!(total.zero_depth_assigns > 0);
    assert!(total.added_bin > 0);
}

#[test]
fn test_search_is_idempotent() {
    for seed in 0..100 {
        let mut rng = SmallRng::seed_from_u64(1000 + seed);
        let mut s = BasicSolver::default();
        Formula::random(&mut rng, &mut s);

        let mut prober = Prober::new(ProbeOpts {
            max_passes: 1000,
            ..ProbeOpts::default()
        });
        if !prober.search(&mut s) {
            continue;
        }
        let bins = s.binary_clauses();
        let units = s.proved_at_lvl_0().to_vec();
        let n_eqs = s.equivalences().len();

        let mut prober = Prober::new(ProbeOpts::default());
        assert!(prober.search(&mut s));
        let st = prober.run_stats();
        assert_eq!(st.zero_depth_assigns, 0, "seed {}", seed);
        assert_eq!(st.added_bin, 0, "seed {}", seed);
        assert_eq!(st.removed_bin, 0, "seed {}", seed);
        assert_eq!(st.equivalences, 0, "seed {}", seed);
        assert!(!st.simplified());
        assert_eq!(s.binary_clauses(), bins);
        assert_eq!(s.proved_at_lvl_0(), &units[..]);
        assert_eq!(s.equivalences().len(), n_eqs);
    }
}

#[test]
fn test_rollback_is_exact() {
    for seed in 0..50 {
        let mut rng = SmallRng::seed_from_u64(2000 + seed);
        let mut s = BasicSolver::default();
        Formula::random(&mut rng, &mut s);
        if !s.is_ok() {
            continue;
        }
        let all = lits(&s);
        let values: Vec<lbool> = all.iter().map(|&l| s.value_lit(l)).collect();
        let bins = s.binary_clauses();
        let units = s.proved_at_lvl_0().to_vec();
        for &l in &all {
            let m = s.mark();
            let _ = s.try_assign(l);
            s.rollback(m);
            assert_eq!(s.decision_level(), 0);
            let now: Vec<lbool> = all.iter().map(|&l| s.value_lit(l)).collect();
            assert_eq!(now, values, "seed {}: probing {:?}", seed, l);
            assert_eq!(s.binary_clauses(), bins);
            assert_eq!(s.proved_at_lvl_0(), &units[..]);
        }
    }
}

#[test]
fn test_failed_literal_scenario() {
    let mut s = BasicSolver::default();
    let x: Vec<Lit> = (0..3).map(|_| Lit::new(s.new_var(), true)).collect();
    s.add_clause(&[!x[0], x[1]]);
    s.add_clause(&[!x[0], x[2]]);
    s.add_clause(&[!x[1], !x[2]]);

    let mut prober = Prober::default();
    assert!(prober.search(&mut s));
    assert_eq!(s.value_lvl_0(x[0]), lbool::FALSE);
    assert!(prober.run_stats().zero_depth_assigns >= 1);

    // already fixed: nothing to probe
    let probed = prober.global_stats().num_probed;
    assert_eq!(prober.probe(&mut s, x[0].var()), Ok(false));
    assert_eq!(prober.global_stats().num_probed, probed);
}

#[test]
fn test_multi_level_refutes() {
    // all 8 clauses over 3 variables: single literals propagate nothing
    let mut s = BasicSolver::default();
    let vars: Vec<Var> = (0..3).map(|_| s.new_var()).collect();
    for pattern in 0..8 {
        let c: Vec<Lit> = (0..3)
            .map(|i| Lit::new(vars[i], (pattern >> i) & 1 == 1))
            .collect();
        s.add_clause(&c);
    }
    let mut prober = Prober::new(ProbeOpts {
        multi_level: false,
        ..ProbeOpts::default()
    });
    assert!(prober.search(&mut s));
    assert_eq!(prober.run_stats().num_failed, 0);

    let mut prober = Prober::default();
    assert!(!prober.search(&mut s));
    assert!(!s.is_ok());
    assert_eq!(prober.run_stats().multi_level_chains, 1);
}

#[test]
fn test_stop_and_time_limit() {
    let mut s = BasicSolver::default();
    let x: Vec<Lit> = (0..3).map(|_| Lit::new(s.new_var(), true)).collect();
    s.add_clause(&[!x[0], x[1]]);
    s.add_clause(&[!x[0], x[2]]);
    s.add_clause(&[!x[1], !x[2]]);

    let mut prober = Prober::new(ProbeOpts {
        max_time: Some(Duration::from_secs(0)),
        ..ProbeOpts::default()
    });
    assert!(prober.search(&mut s));
    assert_eq!(prober.run_stats().num_probed, 0);
    assert_eq!(s.value_lvl_0(x[0]), lbool::UNDEF);

    s.cb_mut().set_stop(|| true);
    let mut prober = Prober::default();
    assert!(prober.search(&mut s));
    assert_eq!(prober.run_stats().num_probed, 0);
}

#[test]
fn test_dimacs_output_reparses() {
    let mut s = BasicSolver::default();
    let mut input = "p cnf 5 5\n1 2 0\n-1 3 0\n-2 3 0\n-3 4 5 0\nx3 4 5 0\n".as_bytes();
    dimacs::parse(&mut input, &mut s, true).unwrap();
    let mut prober = Prober::default();
    assert!(prober.search(&mut s));
    // 3 holds in both branches of 1
    assert_eq!(s.value_lvl_0(Lit::from_dimacs(3)), lbool::TRUE);

    let out = s.dimacs_formula().to_string();
    let mut s2 = BasicSolver::default();
    dimacs::parse(&mut out.as_bytes(), &mut s2, true).unwrap();
    assert_eq!(s2.value_lvl_0(Lit::from_dimacs(3)), lbool::TRUE);
    assert_eq!(solver_models(&s2), solver_models(&s));
}

#[test]
fn test_long_xor_line_before_clauses() {
    // satisfiable with 4 = 5 = false
    let mut s = BasicSolver::default();
    let mut input = "p cnf 6 5\nx1 2 3 4 5 0\n1 0\n2 0\n3 0\n-6 0\n".as_bytes();
    dimacs::parse(&mut input, &mut s, true).unwrap();
    assert!(s.is_ok());
    let mut prober = Prober::default();
    assert!(prober.search(&mut s));
    assert_eq!(s.value_lvl_0(Lit::from_dimacs(-6)), lbool::TRUE);

    // clauses on variables above the XOR's, with auxiliary variables kept
    let mut s = BasicSolver::default();
    let mut input = "p cnf 8 3\nx1 2 3 4 5 6 0\n-7 1 0\n7 8 -2 0\n".as_bytes();
    dimacs::parse(&mut input, &mut s, true).unwrap();
    assert_eq!(s.num_vars(), 9);
    let bit = |a: u32, i: u32| (a >> i) & 1 == 1;
    let expected = models(8, |a| {
        (a & 0b11_1111).count_ones() % 2 == 1
            && (!bit(a, 6) || bit(a, 0))
            && (bit(a, 6) || bit(a, 7) || !bit(a, 1))
    });
    let before = solver_models(&s);
    assert_eq!(project(&before, 8), expected);
    let mut prober = Prober::new(ProbeOpts {
        verify_bin_removal: true,
        ..ProbeOpts::default()
    });
    assert!(prober.search(&mut s));
    assert_eq!(solver_models(&s), before);
}
