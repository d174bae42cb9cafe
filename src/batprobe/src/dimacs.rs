/*****************************************************************************************[dimacs.rs]
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
        clause::{Lit, Var},
        solver::Solver,
    },
    std::io::{self, BufRead},
};

/// `parse(input, solver, is_strict)` adds the content of `input` to the solver
///
/// Besides clauses, lines starting with `x` are XOR constraints: the XOR
/// of their literals is true. They are added after every clause has been
/// read, since long XORs allocate auxiliary variables.
///
/// ## Params
/// - `is_strict` if true, will fail if number of clauses/vars does not match the declared header
///   (XOR lines count as clauses)
///
/// ```
/// use batprobe::*;
/// let mut s = BasicSolver::default();
/// let mut input = "p cnf 3 2\nc comment\n1 -2 0\nx1 2 -3 0\n".as_bytes();
/// dimacs::parse(&mut input, &mut s, true).unwrap();
/// assert_eq!(s.num_vars(), 3);
/// assert_eq!(s.num_xors(), 1);
/// ```
pub fn parse<Cb: Callbacks, R: BufRead>(
    input: &mut R,
    solver: &mut Solver<Cb>,
    is_strict: bool,
) -> io::Result<()> {
    let mut lits = vec![];
    let mut xors: Vec<(Vec<Var>, bool)> = vec![];
    let mut header: Option<(i32, i32)> = None;
    let mut num_read_clauses = 0;
    let mut max_var = 0;
    loop {
        skip_whitespace(input)?;
        let ch = next_byte(input)?;
        if ch == Some(b'p') {
            let mut p = [0; 5];
            input.read_exact(&mut p)?;
            if &p != b"p cnf" {
                return parse_error("PARSE ERROR! Unexpected char: p".to_string());
            }
            let num_vars = parse_int(input)?;
            let num_clauses = parse_int(input)?;
            if num_vars > 0 {
                solver.var_of_int((num_vars - 1) as u32);
            }
            header = Some((num_vars, num_clauses));
        } else if ch == Some(b'c') {
            skip_line(input)?;
        } else if ch == Some(b'x') {
            input.consume(1); // skip 'x'
            max_var = max_var.max(read_clause(input, solver, &mut lits)?);
            // ¬a ⊕ b = ¬(a ⊕ b)
            let rhs = lits.iter().fold(true, |rhs, lit| rhs ^ !lit.sign());
            xors.push((lits.iter().map(|lit| lit.var()).collect(), rhs));
            num_read_clauses += 1;
        } else if ch.is_some() {
            max_var = max_var.max(read_clause(input, solver, &mut lits)?);
            solver.add_clause_reuse(&mut lits);
            num_read_clauses += 1;
        } else {
            break;
        }
    }
    for (vars, rhs) in xors {
        solver.add_xor_clause(&vars, rhs);
    }
    if is_strict {
        match header {
            None => {
                return parse_error("PARSE ERROR! Missing DIMACS header".to_string());
            }
            Some((_, num_clauses)) if num_clauses != num_read_clauses => {
                return parse_error(
                    "PARSE ERROR! DIMACS header mismatch: wrong number of clauses".to_string(),
                );
            }
            Some((num_vars, _)) if num_vars < max_var => {
                return parse_error(
                    "PARSE ERROR! DIMACS header mismatch: wrong number of variables".to_string(),
                );
            }
            Some(_) => (),
        }
    }
    Ok(())
}

/// Read literals up to the terminating `0`; returns the largest variable
/// (in DIMACS numbering).
fn read_clause<Cb: Callbacks, R: BufRead>(
    input: &mut R,
    solver: &mut Solver<Cb>,
    lits: &mut Vec<Lit>,
) -> io::Result<i32> {
    lits.clear();
    let mut max_var = 0;
    loop {
        let parsed_lit = parse_int(input)?;
        if parsed_lit == 0 {
            return Ok(max_var);
        }
        max_var = max_var.max(parsed_lit.abs());
        let var: Var = solver.var_of_int((parsed_lit.abs() - 1) as u32);
        lits.push(Lit::new(var, parsed_lit > 0));
    }
}

fn parse_int<R: BufRead>(input: &mut R) -> io::Result<i32> {
    skip_whitespace(input)?;
    let ch = next_byte(input)?;
    let neg = if ch == Some(b'+') || ch == Some(b'-') {
        input.consume(1);
        ch == Some(b'-')
    } else {
        false
    };
    match next_byte(input)? {
        Some(ch) if ch.is_ascii_digit() => (),
        Some(ch) => {
            return parse_error(format!("PARSE ERROR! Unexpected char: {}", ch as char));
        }
        None => return parse_error("PARSE ERROR! Unexpected EOF".to_string()),
    }
    let mut val: i32 = 0;
    while let Some(ch) = next_byte(input)? {
        if !ch.is_ascii_digit() {
            break;
        }
        input.consume(1);
        val = match val.checked_mul(10).and_then(|v| v.checked_add((ch - b'0') as i32)) {
            Some(v) => v,
            None => return parse_error("PARSE ERROR! Integer overflow".to_string()),
        };
    }
    if neg {
        Ok(-val)
    } else {
        Ok(val)
    }
}

#[inline(always)]
fn is_whitespace(ch: Option<u8>) -> bool {
    ch.map(|ch| (b'\x09'..=b'\x0d').contains(&ch) || ch == b' ')
        .unwrap_or(false)
}

fn skip_whitespace<R: BufRead>(input: &mut R) -> io::Result<()> {
    while is_whitespace(next_byte(input)?) {
        input.consume(1);
    }
    Ok(())
}

fn skip_line<R: BufRead>(input: &mut R) -> io::Result<()> {
    while let Some(ch) = next_byte(input)? {
        input.consume(1);
        if ch == b'\n' {
            break;
        }
    }
    Ok(())
}

fn next_byte<R: BufRead>(input: &mut R) -> io::Result<Option<u8>> {
    Ok(input.fill_buf()?.first().copied())
}

fn parse_error<T>(message: String) -> io::Result<T> {
    Err(io::Error::new(io::ErrorKind::InvalidInput, message))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{clause::lbool, interface::ProbeContext, BasicSolver};

    fn parse_str(s: &str, strict: bool) -> io::Result<BasicSolver> {
        let mut solver = BasicSolver::default();
        parse(&mut s.as_bytes(), &mut solver, strict)?;
        Ok(solver)
    }

    #[test]
    fn test_parse_clauses() {
        let s = parse_str("c hello\np cnf 4 3\n1 -2 0\n2 3 -4 0\n  -1 0\n", true).unwrap();
        assert_eq!(s.num_vars(), 4);
        assert_eq!(s.value_lvl_0(Lit::from_dimacs(1)), lbool::FALSE);
        assert_eq!(s.value_lvl_0(Lit::from_dimacs(2)), lbool::FALSE);
        assert_eq!(s.long_clauses().count(), 1);
    }

    #[test]
    fn test_parse_xor() {
        // ¬1 ⊕ 2 ⊕ 3 = 1, that is 1 ⊕ 2 ⊕ 3 = 0
        let s = parse_str("p cnf 3 1\nx-1 2 3 0\n", true).unwrap();
        let x = &s.xor_clauses()[0];
        assert_eq!(x.len(), 3);
        assert!(!x.rhs());
        // a short XOR becomes clauses only
        let s = parse_str("x1 2 0\n", false).unwrap();
        assert_eq!(s.num_xors(), 0);
        assert!(s.has_binary_clause(Lit::from_dimacs(1), Lit::from_dimacs(2)));
    }

    #[test]
    fn test_long_xor_before_clauses() {
        // DIMACS 6 is a problem variable, not the auxiliary of the XOR
        let s = parse_str("p cnf 6 2\nx1 2 3 4 5 0\n-6 0\n", true).unwrap();
        assert!(s.is_ok());
        assert_eq!(s.num_vars(), 7);
        assert_eq!(s.value_lvl_0(Lit::from_dimacs(-6)), lbool::TRUE);
        assert_eq!(s.xor_clauses()[0].len(), 5);

        // same without header
        let s = parse_str("x1 2 3 4 5 0\n6 -1 0\n", false).unwrap();
        assert_eq!(s.num_vars(), 7);
        assert!(s.has_binary_clause(Lit::from_dimacs(6), Lit::from_dimacs(-1)));
        assert_eq!(s.num_clauses(), 1 + 8 + 4);

        // declared variables exist even if unused
        let s = parse_str("p cnf 9 1\n1 2 0\n", true).unwrap();
        assert_eq!(s.num_vars(), 9);
    }

    #[test]
    fn test_strict_header() {
        assert!(parse_str("p cnf 2 2\n1 2 0\n", true).is_err());
        assert!(parse_str("p cnf 2 2\n1 2 0\n", false).is_ok());
        assert!(parse_str("p cnf 1 1\n1 2 0\n", true).is_err());
        assert!(parse_str("1 2 0\n", true).is_err());
    }

    #[test]
    fn test_parse_errors() {
        let e = parse_str("p dnf 1 1\n", false).err().unwrap();
        assert_eq!(e.kind(), io::ErrorKind::InvalidInput);
        assert!(parse_str("1 a 0\n", false).is_err());
        assert!(parse_str("1 2", false).is_err());
        assert!(parse_str("99999999999 0\n", false).is_err());
    }
}
