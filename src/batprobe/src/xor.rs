/********************************************************************************************[xor.rs]
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
        clause::{Lit, Var},
        intmap::AsIndex,
    },
    std::fmt,
};

/// An XOR constraint: the sum modulo 2 of `vars` equals `rhs`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XorClause {
    vars: Vec<Var>,
    rhs: bool,
}

impl XorClause {
    /// Build the constraint. Variables occurring twice cancel each other out.
    pub fn new(vars: &[Var], rhs: bool) -> Self {
        let mut vars = vars.to_vec();
        vars.sort_unstable();
        let mut j = 0;
        let mut i = 0;
        while i < vars.len() {
            if i + 1 < vars.len() && vars[i] == vars[i + 1] {
                i += 2; // x ^ x = 0
            } else {
                vars[j] = vars[i];
                j += 1;
                i += 1;
            }
        }
        vars.truncate(j);
        XorClause { vars, rhs }
    }

    #[inline]
    pub fn vars(&self) -> &[Var] {
        &self.vars
    }

    #[inline]
    pub fn rhs(&self) -> bool {
        self.rhs
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Remove variables whose value is known, folding their values into `rhs`.
    pub fn fold(&mut self, mut value: impl FnMut(Var) -> Option<bool>) {
        let mut rhs = self.rhs;
        self.vars.retain(|&v| match value(v) {
            Some(b) => {
                rhs ^= b;
                false
            }
            None => true,
        });
        self.rhs = rhs;
    }

    /// The clauses of the direct CNF encoding (one per forbidden assignment).
    ///
    /// Exponential in the length; only meant for short constraints.
    pub fn to_cnf(&self) -> Vec<Vec<Lit>> {
        let n = self.vars.len();
        debug_assert!(n < 16, "xor too long for direct encoding");
        let mut clauses = Vec::with_capacity(1 << n.saturating_sub(1));
        for pattern in 0u32..(1 << n) {
            let parity = pattern.count_ones() % 2 == 1;
            if parity == self.rhs {
                continue; // allowed assignment
            }
            // forbid the assignment `vars[i] = bit i of pattern`
            let c = self
                .vars
                .iter()
                .enumerate()
                .map(|(i, &v)| Lit::new(v, (pattern >> i) & 1 == 0))
                .collect();
            clauses.push(c);
        }
        clauses
    }
}

/// Index of an XOR constraint in the solver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XorRef(u32);

impl XorRef {
    pub(crate) fn new(i: usize) -> Self {
        XorRef(i as u32)
    }
    pub(crate) fn idx(&self) -> usize {
        self.0 as usize
    }
}

impl AsIndex for XorRef {
    #[inline(always)]
    fn as_index(self) -> usize {
        self.0 as usize
    }
    #[inline(always)]
    fn from_index(index: usize) -> Self {
        XorRef(index as u32)
    }
}

/// An XOR constraint reduced to two variables: `var0 = var1`, or
/// `var0 = ¬var1` if `inverted`.
///
/// Canonical: `var0 < var1`. The derived order (by `var0`, then `var1`,
/// then `inverted`) lets sets of records be intersected cheaply.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TwoLongXor {
    var0: Var,
    var1: Var,
    inverted: bool,
}

impl TwoLongXor {
    /// Record `a ^ b = inverted`.
    pub fn new(a: Var, b: Var, inverted: bool) -> Self {
        debug_assert_ne!(a, b);
        let (var0, var1) = if a < b { (a, b) } else { (b, a) };
        TwoLongXor {
            var0,
            var1,
            inverted,
        }
    }

    #[inline]
    pub fn var0(&self) -> Var {
        self.var0
    }

    #[inline]
    pub fn var1(&self) -> Var {
        self.var1
    }

    #[inline]
    pub fn inverted(&self) -> bool {
        self.inverted
    }

    /// Same pair of variables with the opposite relation.
    pub fn flipped(&self) -> Self {
        TwoLongXor {
            inverted: !self.inverted,
            ..*self
        }
    }
}

impl fmt::Debug for TwoLongXor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let op = if self.inverted { "= ¬" } else { "=" };
        write!(f, "{:?} {} {:?}", self.var0, op, self.var1)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn v(i: u32) -> Var {
        Var::from_idx(i)
    }

    #[test]
    fn test_cancel_duplicates() {
        let x = XorClause::new(&[v(3), v(1), v(3), v(2), v(3)], true);
        assert_eq!(x.vars(), &[v(1), v(2), v(3)]);
        let y = XorClause::new(&[v(0), v(0)], false);
        assert!(y.is_empty());
    }

    #[test]
    fn test_fold() {
        let mut x = XorClause::new(&[v(0), v(1), v(2)], false);
        x.fold(|var| if var == v(1) { Some(true) } else { None });
        assert_eq!(x.vars(), &[v(0), v(2)]);
        assert!(x.rhs());
    }

    #[test]
    fn test_cnf_encoding_is_exact() {
        let x = XorClause::new(&[v(0), v(1), v(2)], true);
        let cnf = x.to_cnf();
        assert_eq!(cnf.len(), 4);
        for a in 0u32..8 {
            let value = |l: Lit| ((a >> l.var().idx()) & 1 == 1) == l.sign();
            let sat = cnf.iter().all(|c| c.iter().any(|&l| value(l)));
            assert_eq!(sat, a.count_ones() % 2 == 1, "assignment {:03b}", a);
        }
    }

    #[test]
    fn test_two_long_xor_order() {
        let a = TwoLongXor::new(v(5), v(2), false);
        assert_eq!(a.var0(), v(2));
        assert_eq!(a.var1(), v(5));
        assert_eq!(a, TwoLongXor::new(v(2), v(5), false));
        assert!(a < a.flipped());
        assert!(TwoLongXor::new(v(1), v(9), true) < a);
        assert!(a < TwoLongXor::new(v(2), v(6), false));
    }
}
