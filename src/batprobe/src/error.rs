/******************************************************************************************[error.rs]
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

use {crate::clause::Lit, thiserror::Error};

/// The formula was proved unsatisfiable at the root level.
///
/// This is terminal: once returned, the solver stays in the unsat state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RootConflict {
    /// `lit` had to be made permanent but its negation already is.
    #[error("literal {lit:?} contradicts a root-level fact")]
    Contradiction { lit: Lit },
    /// Propagating at the root level (after committing `lit`) ran into a conflict.
    #[error("root-level propagation of {lit:?} conflicts")]
    Propagation { lit: Lit },
    /// Two variables were found both equivalent and anti-equivalent.
    #[error("equivalence {lit1:?} = {lit2:?} contradicts earlier equivalences")]
    Equivalence { lit1: Lit, lit2: Lit },
    /// The solver was already in the unsat state.
    #[error("the formula is already unsatisfiable")]
    AlreadyUnsat,
}

/// Result of an operation that can only fail by proving unsatisfiability
pub type RootResult<T> = Result<T, RootConflict>;
