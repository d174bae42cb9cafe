/******************************************************************************************[stats.rs]
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

use std::{fmt, ops};

/// Cost of propagation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropStats {
    /// Literals dequeued by unit propagation
    pub propagations: u64,
    /// Propagations weighted by the number of watchers inspected
    pub bogo_props: u64,
}

impl ops::AddAssign for PropStats {
    fn add_assign(&mut self, o: Self) {
        self.propagations += o.propagations;
        self.bogo_props += o.bogo_props;
    }
}

/// Cost of conflicts met while probing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConflStats {
    pub conflicts: u64,
}

impl ops::AddAssign for ConflStats {
    fn add_assign(&mut self, o: Self) {
        self.conflicts += o.conflicts;
    }
}

/// Statistics of the prober.
///
/// Counters are summed with `+=`, so the statistics of several passes, calls,
/// or independent solver instances can be merged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stats {
    /// Time spent, in seconds
    pub my_time: f64,
    /// Failed literals found
    pub num_failed: u64,
    /// Literals probed
    pub num_probed: u64,
    /// Literals reached for the first time in a pass
    pub num_visited: u64,
    /// Literals forced at the root (failed literals, bothSame, multi-level)
    pub zero_depth_assigns: u64,
    /// Free variables at the start of the pass
    pub orig_num_free_vars: u64,
    /// Literals forced because both branches implied them
    pub both_same: u64,
    /// Equivalences submitted
    pub equivalences: u64,
    /// Binary clauses added by hyper-binary resolution
    pub added_bin: u64,
    /// Binary clauses removed as useless
    pub removed_bin: u64,
    /// Removed binary clauses found not to be implied anymore
    pub bin_removal_violations: u64,
    pub multi_level_chains: u64,
    pub multi_level_finished: u64,
    pub multi_level_failed: u64,
    pub prop_data: PropStats,
    pub confl_stats: ConflStats,
}

impl ops::AddAssign<&Stats> for Stats {
    fn add_assign(&mut self, o: &Stats) {
        self.my_time += o.my_time;
        self.num_failed += o.num_failed;
        self.num_probed += o.num_probed;
        self.num_visited += o.num_visited;
        self.zero_depth_assigns += o.zero_depth_assigns;
        self.orig_num_free_vars += o.orig_num_free_vars;
        self.both_same += o.both_same;
        self.equivalences += o.equivalences;
        self.added_bin += o.added_bin;
        self.removed_bin += o.removed_bin;
        self.bin_removal_violations += o.bin_removal_violations;
        self.multi_level_chains += o.multi_level_chains;
        self.multi_level_finished += o.multi_level_finished;
        self.multi_level_failed += o.multi_level_failed;
        self.prop_data += o.prop_data;
        self.confl_stats += o.confl_stats;
    }
}

impl ops::AddAssign for Stats {
    fn add_assign(&mut self, o: Stats) {
        *self += &o;
    }
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all counters.
    pub fn clear(&mut self) {
        *self = Stats::default();
    }

    /// Did these statistics record any simplification of the formula?
    pub fn simplified(&self) -> bool {
        self.zero_depth_assigns > 0
            || self.equivalences > 0
            || self.added_bin > 0
            || self.removed_bin > 0
    }

    /// Print in the style of the solver statistics, `n_vars` being the
    /// number of variables of the formula.
    pub fn print(&self, n_vars: u32) {
        print!("{}", self.display(n_vars));
    }

    pub fn display(&self, n_vars: u32) -> StatsDisplay {
        StatsDisplay { stats: self, n_vars }
    }
}

fn ratio(a: u64, b: u64) -> f64 {
    if b == 0 {
        0.
    } else {
        a as f64 / b as f64
    }
}

/// Displays `Stats` as `c ...` comment lines
pub struct StatsDisplay<'a> {
    stats: &'a Stats,
    n_vars: u32,
}

impl<'a> fmt::Display for StatsDisplay<'a> {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        let s = self.stats;
        writeln!(out, "c probing time         : {:.2} s", s.my_time)?;
        writeln!(
            out,
            "c probed literals      : {:<12}   ({:4.2} /s)",
            s.num_probed,
            if s.my_time > 0. { s.num_probed as f64 / s.my_time } else { 0. }
        )?;
        writeln!(
            out,
            "c free vars at start   : {:<12}   ({:4.2} % of vars)",
            s.orig_num_free_vars,
            ratio(s.orig_num_free_vars, self.n_vars as u64) * 100.
        )?;
        writeln!(
            out,
            "c failed literals      : {:<12}   ({:4.2} % of probes)",
            s.num_failed,
            ratio(s.num_failed, s.num_probed) * 100.
        )?;
        writeln!(
            out,
            "c visited literals     : {:<12}   ({:4.2} % of lits)",
            s.num_visited,
            ratio(s.num_visited, 2 * self.n_vars as u64) * 100.
        )?;
        writeln!(
            out,
            "c zero-depth assigns   : {:<12}   ({:4.2} % of vars)",
            s.zero_depth_assigns,
            ratio(s.zero_depth_assigns, self.n_vars as u64) * 100.
        )?;
        writeln!(out, "c both-same forced     : {:<12}", s.both_same)?;
        writeln!(out, "c equivalences         : {:<12}", s.equivalences)?;
        writeln!(out, "c binary clauses added : {:<12}", s.added_bin)?;
        writeln!(out, "c binary clauses rem.  : {:<12}", s.removed_bin)?;
        if s.bin_removal_violations > 0 {
            writeln!(out, "c bin removal errors   : {:<12}", s.bin_removal_violations)?;
        }
        writeln!(
            out,
            "c multi-level chains   : {:<12}   ({} finished, {} failed)",
            s.multi_level_chains, s.multi_level_finished, s.multi_level_failed
        )?;
        writeln!(
            out,
            "c propagations         : {:<12}   ({} bogo-props)",
            s.prop_data.propagations, s.prop_data.bogo_props
        )?;
        writeln!(out, "c conflicts            : {:<12}", s.confl_stats.conflicts)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_merge_and_clear() {
        let mut a = Stats::new();
        a.num_probed = 4;
        a.added_bin = 1;
        a.prop_data.propagations = 10;
        let mut b = Stats::new();
        b.num_probed = 2;
        b.confl_stats.conflicts = 3;
        b.my_time = 0.5;
        a += &b;
        assert_eq!(a.num_probed, 6);
        assert_eq!(a.added_bin, 1);
        assert_eq!(a.prop_data.propagations, 10);
        assert_eq!(a.confl_stats.conflicts, 3);
        assert!(a.simplified());
        assert!(!b.simplified());
        a.clear();
        assert_eq!(a, Stats::default());
    }

    #[test]
    fn test_display() {
        let mut s = Stats::new();
        s.num_probed = 10;
        s.num_failed = 5;
        let out = s.display(20).to_string();
        assert!(out.lines().all(|l| l.starts_with("c ")));
        assert!(out.contains("50.00 % of probes"));
        assert!(!out.contains("bin removal errors"));
    }
}
