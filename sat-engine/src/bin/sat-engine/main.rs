mod os_signal_termination;
mod parsers;
mod result;

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::debug;
use log::error;
use log::info;
use log::warn;
use log::Level;
use log::LevelFilter;
use os_signal_termination::OsSignal;
use parsers::dimacs::parse_cnf;
use parsers::dimacs::EngineDimacsSink;
use result::SatEngineError;
use result::SatEngineResult;
use sat_engine::asserts::SAT_ASSERT_LEVEL_DEFINITION;
use sat_engine::asserts::SAT_ASSERT_MODERATE;
use sat_engine::basic_types::sequence_generators::SequenceGeneratorType;
use sat_engine::branching::VsidsBrancher;
use sat_engine::clause_stores::ClauseStoreKind;
use sat_engine::results::SolutionPrinter;
use sat_engine::search::Solver;
use sat_engine::statistics::configure_statistic_logging;
use sat_engine::termination::Combinator;
use sat_engine::termination::TimeBudget;
use sat_engine::EngineConfig;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The instance to solve, given in the DIMACS CNF format ('.cnf').
    instance_path: PathBuf,

    /// The time budget for the solver, given in milliseconds. Parsing the instance counts
    /// towards the budget.
    #[arg(short = 't', long = "time-limit")]
    time_limit: Option<u64>,

    /// The time budget for the search itself, given in milliseconds.
    #[arg(long = "search-time-limit")]
    search_time_limit: Option<u64>,

    /// The random seed to use for the PRNG. This influences the initial order of the variables.
    #[arg(short = 'r', long = "random-seed", default_value_t = 42)]
    random_seed: u64,

    /// Decides the sequence based on which the restarts are performed.
    /// To be used in combination with "restart-initial-conflicts".
    #[arg(long = "restart-sequence", value_enum, default_value_t = SequenceGeneratorType::Luby)]
    restart_sequence: SequenceGeneratorType,

    /// The number of conflicts before the first restart; it scales the restart sequence.
    #[arg(long = "restart-initial-conflicts", default_value_t = 50)]
    restart_initial_conflicts: u64,

    /// The coefficient in the geometric sequence x_i = x_{i-1} * growth-factor. Used only if
    /// "restart-sequence" is "geometric".
    #[arg(long = "restart-growth-factor", default_value_t = 1.5)]
    restart_growth_factor: f64,

    /// Learned clauses are forgotten every this many restarts; 0 never forgets.
    #[arg(long = "forget-interval", default_value_t = 4)]
    forget_interval: u64,

    /// The fraction of the removable learned clauses that is forgotten at once.
    #[arg(long = "forget-fraction", default_value_t = 0.5)]
    forget_fraction: f64,

    /// The decay of the activity of learned clauses after each conflict.
    #[arg(long = "clause-activity-decay", default_value_t = 0.999)]
    clause_activity_decay: f64,

    /// The decay of the activity of variables after each conflict.
    #[arg(long = "variable-activity-decay", default_value_t = 0.95)]
    variable_activity_decay: f64,

    /// The clause stores to combine, in the order in which clauses are routed to them.
    #[arg(
        long = "clause-stores",
        value_enum,
        value_delimiter = ',',
        default_values_t = [ClauseStoreKind::Binary, ClauseStoreKind::Watched]
    )]
    clause_stores: Vec<ClauseStoreKind>,

    /// The number of literal buffers which are kept for reuse.
    #[arg(long = "buffer-pool-capacity", default_value_t = 16)]
    buffer_pool_capacity: usize,

    /// Enables log message output from the solver
    #[arg(short = 'v', long = "verbose", default_value_t = false)]
    verbose: bool,

    /// Enables logging of statistics from the solver
    #[arg(short = 's', long = "log-statistics", default_value_t = false)]
    log_statistics: bool,

    /// If `--verbose` is enabled removes the timestamp information from the log messages
    #[arg(long = "omit-timestamp", default_value_t = false)]
    omit_timestamp: bool,

    /// If `--verbose` is enabled removes the call site information from the log messages.
    /// Call site is the file and line in it that originated the message.
    #[arg(long = "omit-call-site", default_value_t = false)]
    omit_call_site: bool,
}

impl Args {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            clause_activity_decay: self.clause_activity_decay,
            variable_activity_decay: self.variable_activity_decay,
            restart_sequence: self.restart_sequence,
            restart_initial_conflicts: self.restart_initial_conflicts,
            restart_growth_factor: self.restart_growth_factor,
            forget_interval: self.forget_interval,
            forget_fraction: self.forget_fraction,
            buffer_pool_capacity: self.buffer_pool_capacity,
            verbosity: u8::from(self.verbose),
            timeout: self.search_time_limit.map(Duration::from_millis),
            random_seed: self.random_seed,
            clause_stores: self.clause_stores.clone(),
            ..EngineConfig::default()
        }
    }
}

fn configure_logging_sat(
    verbose: bool,
    log_statistics: bool,
    omit_timestamp: bool,
    omit_call_site: bool,
) -> std::io::Result<()> {
    if log_statistics {
        configure_statistic_logging("c STAT", None, None, None);
    }
    let level_filter = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .format(move |buf, record| {
            write!(buf, "c ")?;
            if record.level() != Level::Info && !omit_timestamp {
                write!(buf, "{} ", buf.timestamp())?;
            }
            write!(buf, "{} ", record.level())?;
            if record.level() != Level::Info && !omit_call_site {
                write!(
                    buf,
                    "[{}:{}] ",
                    record.file().unwrap_or("unknown"),
                    record.line().unwrap_or(0)
                )?;
            }
            writeln!(buf, "{}", record.args())
        })
        .filter_level(level_filter)
        .target(env_logger::Target::Stdout)
        .init();
    info!("Logging successfully configured");
    Ok(())
}

fn main() {
    match run() {
        Ok(return_code) => std::process::exit(return_code),
        Err(e) => {
            error!("Execution failed, error: {e}");
            std::process::exit(1);
        }
    }
}

fn run() -> SatEngineResult<i32> {
    let args = Args::parse();
    let termination = args
        .time_limit
        .map(|milliseconds| TimeBudget::starting_now(Duration::from_millis(milliseconds)));

    configure_logging_sat(
        args.verbose,
        args.log_statistics,
        args.omit_timestamp,
        args.omit_call_site,
    )?;

    if SAT_ASSERT_LEVEL_DEFINITION >= SAT_ASSERT_MODERATE {
        warn!("Potential performance degradation: contract checks above the simple level are enabled");
    }

    let is_cnf = args
        .instance_path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension == "cnf");
    if !is_cnf {
        return Err(SatEngineError::invalid_instance(args.instance_path.display()));
    }

    let config = args.engine_config();
    for line in config.to_string().lines() {
        info!("{line}");
    }

    let instance_file = File::open(&args.instance_path).map_err(|error| {
        SatEngineError::FileReadingError(error, args.instance_path.display().to_string())
    })?;
    let mut engine = parse_cnf::<EngineDimacsSink>(instance_file, config)?;
    info!(
        "Parsed {} clauses over {} variables",
        engine.clause_store().num_clauses(),
        engine.max_variable()
    );

    let signal = OsSignal::install(engine.cancellation_token())?;
    let brancher = engine.add_listener(VsidsBrancher::new(engine.config()));
    let mut solver = Solver::new(engine.config());

    let outcome = solver.solve(
        &mut engine,
        brancher,
        &mut Combinator::new(signal, termination),
    );
    debug!(
        "Search ended with {outcome:?}, {} of {} variables assigned",
        engine.trail().size(),
        engine.max_variable()
    );

    SolutionPrinter::default().print(&engine, &mut std::io::stdout().lock())?;
    engine.log_statistics();

    Ok(engine.get_return_code())
}
