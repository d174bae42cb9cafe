/**************************************************************************************[callbacks.rs]
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

use crate::stats::Stats;

/// Basic callbacks to the solver
///
/// Typically intended for printing/statistics
pub trait Callbacks {
    /// Called when a probing `search()` starts
    fn on_start(&mut self) {}

    /// Called at the end of each probing pass with the statistics of that pass
    fn on_pass(&mut self, _pass: u32, _stats: &Stats) {}

    /// Called when a `search()` is finished; `ok` is `false` iff it proved unsatisfiability
    fn on_result(&mut self, _ok: bool) {}

    /// Should we stop? called at probe boundaries for asynchronous interrupts and such
    fn stop(&self) -> bool {
        false
    }
}

/// Basic set of callbacks
///
/// This doesn't do anything except storing a function to `stop`
#[derive(Default)]
pub struct Basic {
    stop: Option<Box<dyn Fn() -> bool>>,
}

impl Callbacks for Basic {
    fn stop(&self) -> bool {
        match self.stop {
            None => false,
            Some(ref f) => f(),
        }
    }
}

impl Basic {
    /// Allocate a new set of callbacks
    pub fn new() -> Self {
        Basic { stop: None }
    }

    /// Set the `stop` function
    pub fn set_stop<F>(&mut self, f: F)
    where
        F: 'static + Fn() -> bool,
    {
        self.stop = Some(Box::new(f));
    }
}
