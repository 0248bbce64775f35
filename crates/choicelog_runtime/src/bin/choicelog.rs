//! choicelog CLI entry point.
//!
//! Loads a compiled program and prints one JSON array of facts per solution
//! on stdout. Diagnostics and traces go to stderr.

use std::env;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use choicelog_engine::SolverConfig;
use choicelog_runtime::{Session, load_program};

const DEFAULT_BUDGET: usize = 1024;

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    program: Option<PathBuf>,
    seed: u64,
    limit: Option<u64>,
    budget: Option<usize>,
    jitter: bool,
    show_stats: bool,
    trace: bool,
    show_help: bool,
    show_version: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn parse_value<T: std::str::FromStr>(
    args: &[String],
    i: &mut usize,
    flag: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    *i += 1;
    let Some(raw) = args.get(*i) else {
        return Err(format!("{flag} requires a value").into());
    };
    raw.parse()
        .map_err(|_| format!("invalid {flag} value: {raw}").into())
}

fn parse_args(args: &[String]) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "--stats" => config.show_stats = true,
            "--trace" => config.trace = true,
            "--jitter" => config.jitter = true,
            "--seed" => config.seed = parse_value(args, &mut i, "--seed")?,
            "--limit" => config.limit = Some(parse_value(args, &mut i, "--limit")?),
            "--budget" => config.budget = Some(parse_value(args, &mut i, "--budget")?),
            arg if arg.starts_with('-') => {
                return Err(format!("unknown option: {arg}").into());
            }
            path => {
                if config.program.is_some() {
                    return Err("only one program may be given".into());
                }
                config.program = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }

    Ok(config)
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args(&args)?;

    if config.show_help {
        print_help();
        return Ok(());
    }

    if config.show_version {
        println!("choicelog {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let Some(path) = &config.program else {
        return Err("no program given (see --help)".into());
    };

    if config.trace {
        init_subscriber();
    }

    let program = load_program(path)?;
    let solver_config = SolverConfig::new()
        .with_seed(config.seed)
        .with_budget_jitter(config.jitter);
    let mut session = Session::with_config(&program, solver_config)?;
    let budget = config.budget.unwrap_or(DEFAULT_BUDGET);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut printed = 0u64;
    while config.limit.is_none_or(|limit| printed < limit) {
        let report = session.step(budget)?;
        if let Some(facts) = report.solution {
            serde_json::to_writer(&mut out, &facts)?;
            writeln!(out)?;
            printed += 1;
        }
        if report.exhausted {
            break;
        }
    }
    out.flush()?;

    if config.show_stats {
        let stats = session.stats();
        eprintln!(
            "cycles: {}  solutions: {}  branches: {}  dead ends: {}  exhausted: {}",
            stats.cycles,
            stats.solutions,
            stats.branches,
            stats.dead_ends,
            session.is_exhausted()
        );
    }

    Ok(())
}

/// Installs a stderr fmt subscriber. `RUST_LOG` overrides the `debug` default.
fn init_subscriber() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_ansi(false),
        )
        .with(filter)
        .try_init()
        .ok();
}

fn print_help() {
    println!(
        "choicelog - Enumerate the stable models of a compiled program

USAGE:
    choicelog [OPTIONS] PROGRAM

ARGUMENTS:
    PROGRAM          Compiled program (.json or .msgpack)

OPTIONS:
    -h, --help       Print help information
    -V, --version    Print version information
    --seed N         Seed for branch priorities (default 0)
    --limit N        Stop after N solutions
    --budget N       Cycles per step (default {DEFAULT_BUDGET})
    --jitter         Randomize each step's budget within [N/2, N]
    --stats          Print search statistics to stderr
    --trace          Log solver events to stderr (filter with RUST_LOG)

OUTPUT:
    One JSON array of facts per solution, one solution per line."
    );
}
