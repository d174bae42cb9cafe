/****************************************************************************************[replace.rs]
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

use crate::clause::{Lit, VMap, Var};

/// Table of variable replacements.
///
/// A union-find over literals: each variable points to a literal it is
/// equivalent to, and the root of a class (its representative) points to
/// itself. The representative of a class is always its smallest variable.
#[derive(Debug, Default, Clone)]
pub struct VarReplacer {
    table: VMap<Lit>,
    merged: Vec<(Var, Lit)>,
}

/// Outcome of `VarReplacer::merge`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Merge {
    /// The two literals were already equivalent
    Known,
    /// The two literals are already known to be opposite
    Contradiction,
    /// `var` now points to `lit`
    Merged { var: Var, lit: Lit },
}

impl VarReplacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_var(&mut self, v: Var) {
        self.table.reserve(v, Lit::UNDEF);
        self.table[v] = Lit::new(v, true);
    }

    /// The representative literal of `lit`'s class.
    pub fn find(&self, lit: Lit) -> Lit {
        let mut cur = lit;
        loop {
            let next = self.table[cur.var()].apply_sign(cur.sign());
            if next == cur {
                return cur;
            }
            cur = next;
        }
    }

    /// Is `v` replaced by another variable?
    #[inline]
    pub fn is_replaced(&self, v: Var) -> bool {
        self.table[v].var() != v
    }

    /// Record `a ≡ b`.
    pub fn merge(&mut self, a: Lit, b: Lit) -> Merge {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return Merge::Known;
        } else if ra == !rb {
            return Merge::Contradiction;
        }
        // the larger representative points to the smaller one
        let (small, large) = if ra.var() < rb.var() { (ra, rb) } else { (rb, ra) };
        let lit = small.apply_sign(large.sign());
        self.table[large.var()] = lit;
        self.merged.push((large.var(), lit));
        Merge::Merged {
            var: large.var(),
            lit,
        }
    }

    /// Merges performed so far, in order: `(var, lit)` means `var ≡ lit`.
    pub fn merged(&self) -> &[(Var, Lit)] {
        &self.merged
    }

    pub fn num_replaced(&self) -> usize {
        self.merged.len()
    }
}
