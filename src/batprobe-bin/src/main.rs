/*****************************************************************************************[main.rs]
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

#[cfg(feature = "logging")]
#[macro_use]
extern crate log;

#[cfg(not(feature = "logging"))]
macro_rules! debug {
    ($( $x:expr ),*) => {};
}

use batprobe::{Callbacks, ProbeContext, ProbeOpts, Prober, Solver, SolverOpts, Stats};
use clap::{App, Arg, ArgMatches};
use flate2::bufread::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::process::exit;
use std::str::FromStr;
use std::time::{Duration, Instant};

mod system;

/// Callbacks of the command-line tool: progress lines and CPU limit
#[derive(Default)]
struct Verbose {
    verbosity: i32,
    stop: Option<Box<dyn Fn() -> bool>>,
}

impl Callbacks for Verbose {
    fn on_start(&mut self) {
        if self.verbosity > 0 {
            println!("c ============================[ Probing ]========================================");
        }
    }

    fn on_pass(&mut self, pass: u32, stats: &Stats) {
        if self.verbosity > 1 {
            println!(
                "c | pass {:3} | probed {:9} | failed {:7} | zero-depth {:7} | eqs {:6} | +{} -{} bins",
                pass,
                stats.num_probed,
                stats.num_failed,
                stats.zero_depth_assigns,
                stats.equivalences,
                stats.added_bin,
                stats.removed_bin
            );
        }
    }

    fn stop(&self) -> bool {
        self.stop.as_ref().map_or(false, |f| f())
    }
}

type MySolver = Solver<Verbose>;

fn main() {
    #[cfg(feature = "logging")]
    env_logger::init();
    let exitcode = main2().unwrap_or_else(|err| {
        eprintln!("{}", err);
        exit(1)
    });
    exit(exitcode);
}

fn get_or<T: FromStr>(matches: &ArgMatches, name: &str, default: T) -> T {
    matches
        .value_of(name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn main2() -> io::Result<i32> {
    let resource = system::ResourceMeasure::new();

    let matches = App::new("BatProbe")
        .version("0.1.0")
        .about("Failed-literal probing preprocessor for DIMACS formulas")
        .arg(Arg::with_name("input-file"))
        .arg(Arg::with_name("output-file").help("Where to write the simplified formula"))
        .arg(
            Arg::with_name("verbosity")
                .long("verb")
                .default_value("1")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("cpu-lim")
                .long("cpu-lim")
                .default_value("-1.0")
                .takes_value(true),
        )
        .arg(Arg::with_name("is-strict").long("strict"))
        .arg(Arg::with_name("budget").long("budget")
             .help("Base number of propagations per pass")
             .default_value("20000000")
             .takes_value(true))
        .arg(Arg::with_name("max-passes").long("max-passes")
             .help("Maximum number of probing passes")
             .default_value("4")
             .takes_value(true))
        .arg(Arg::with_name("time-lim").long("time-lim")
             .help("Wall-clock limit for probing, in seconds")
             .takes_value(true))
        .arg(Arg::with_name("xor-cut").long("xor-cut")
             .help("XOR constraints longer than this are cut before CNF encoding")
             .default_value("4")
             .takes_value(true))
        .arg(Arg::with_name("chain-len").long("chain-len")
             .help("Number of variables in a multi-level probing chain")
             .default_value("3")
             .takes_value(true))
        .arg(Arg::with_name("no-hyper-bin").long("no-hyper-bin")
             .help("Do not add binary clauses by hyper-binary resolution"))
        .arg(Arg::with_name("no-useless-bin").long("no-useless-bin")
             .help("Do not remove redundant binary clauses"))
        .arg(Arg::with_name("no-xor-eq").long("no-xor-eq")
             .help("Do not detect equivalences through XOR constraints"))
        .arg(Arg::with_name("no-lit-eq").long("no-lit-eq")
             .help("Do not detect equivalences between probed and implied literals"))
        .arg(Arg::with_name("no-multi-level").long("no-multi-level")
             .help("Disable multi-level probing"))
        .arg(Arg::with_name("verify-bin-removal").long("verify-bin-removal")
             .help("Check that removed binary clauses are still implied"))
        .get_matches();

    let mut solver_opts = SolverOpts::default();
    solver_opts.xor_cut_len = get_or(&matches, "xor-cut", solver_opts.xor_cut_len);

    let mut opts = ProbeOpts::default();
    opts.propagation_budget = get_or(&matches, "budget", opts.propagation_budget);
    opts.max_passes = get_or(&matches, "max-passes", opts.max_passes);
    opts.max_time = matches
        .value_of("time-lim")
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|x| *x >= 0.)
        .map(Duration::from_secs_f64);
    opts.multi_level_chain_len = get_or(&matches, "chain-len", opts.multi_level_chain_len);
    opts.hyper_bin = !matches.is_present("no-hyper-bin");
    opts.remove_useless_bins = !matches.is_present("no-useless-bin");
    opts.xor_equivalences = !matches.is_present("no-xor-eq");
    opts.lit_equivalences = !matches.is_present("no-lit-eq");
    opts.multi_level = !matches.is_present("no-multi-level");
    opts.verify_bin_removal = matches.is_present("verify-bin-removal");

    if !solver_opts.check() || !opts.check() {
        eprintln!("Invalid option value");
        exit(1);
    }

    let input_file = matches.value_of("input-file");
    let output_file = matches.value_of("output-file");
    let verbosity: i32 = get_or(&matches, "verbosity", 0);
    if !(0..=2).contains(&verbosity) {
        eprintln!(
            "ERROR! value <{}> is out of range for option \"verb\".",
            verbosity
        );
        exit(1);
    }
    let is_strict = matches.is_present("is-strict");
    let cpu_lim = matches
        .value_of("cpu-lim")
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|x| *x > 0.);

    let mut cb = Verbose {
        verbosity,
        stop: None,
    };
    // setup timeout handler, if any
    if let Some(max_cpu) = cpu_lim {
        let r = system::ResourceMeasure::new();
        cb.stop = Some(Box::new(move || r.cpu_time() > max_cpu));
    }
    let mut solver = Solver::new(solver_opts, cb);

    let initial_time = Instant::now();

    if let Some(input_file) = input_file {
        debug!("probe file {}", input_file);
        let file = BufReader::new(File::open(input_file)?);
        read_input_autogz(file, &mut solver, is_strict)?;
    } else {
        println!("c Reading from standard input... Use '--help' for help.");
        let stdin = io::stdin();
        read_input_autogz(stdin.lock(), &mut solver, is_strict)?;
    }

    if verbosity > 0 {
        println!(
            "c |  Number of variables:  {:12}                                         |",
            solver.num_vars()
        );
        println!(
            "c |  Number of clauses:    {:12}                                         |",
            solver.num_clauses()
        );
        println!(
            "c |  Number of XORs:       {:12}                                         |",
            solver.num_xors()
        );
        let duration = Instant::now() - initial_time;
        println!(
            "c |  Parse time:           {:9}.{:02} s                                       |",
            duration.as_secs(),
            duration.subsec_nanos() / 10_000_000
        );
        println!("c |                                                                             |");
    }

    let n_vars = solver.num_vars();
    let mut prober = Prober::new(opts);
    let ok = solver.is_ok() && prober.search(&mut solver);

    if verbosity > 0 {
        println!("c ===============================================================================");
        prober.global_stats().print(n_vars);
        println!("c CPU time              : {:.3}s", resource.cpu_time());
    }

    if let Some(output_file) = output_file {
        let mut out = BufWriter::new(File::create(output_file)?);
        write!(out, "{}", solver.dimacs_formula())?;
        out.flush()?;
    }

    if ok {
        println!("s UNKNOWN");
        Ok(0)
    } else {
        println!("s UNSATISFIABLE");
        Ok(20)
    }
}

fn read_input_autogz<R: BufRead>(
    mut input: R,
    solver: &mut MySolver,
    is_strict: bool,
) -> io::Result<()> {
    let is_gz = input.fill_buf()?.starts_with(b"\x1F\x8B");
    if is_gz {
        read_input(BufReader::new(GzDecoder::new(input)), solver, is_strict)
    } else {
        read_input(input, solver, is_strict)
    }
}

fn read_input<R: BufRead>(mut input: R, solver: &mut MySolver, is_strict: bool) -> io::Result<()> {
    if solver.cb().verbosity > 0 {
        println!("c ============================[ Problem Statistics ]=============================");
        println!("c |                                                                             |");
    }
    batprobe::dimacs::parse(&mut input, solver, is_strict)
}
