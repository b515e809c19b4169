use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use motifkit::reduction::{deletion_reduction, mediator_reduction};
use motifkit::{
    Pattern, ReductionConfig, RuleSystem, SuccessionConfig, SuccessionDiagram,
    DEFAULT_MAX_STG_SIZE,
};

#[derive(Parser)]
#[command(name = "motifkit")]
#[command(about = "Identify the attractor repertoire of a Boolean network using stable motifs")]
struct Args {
    /// Path to a rule file with one rule per line (A* = B and not C)
    #[arg(value_name = "FILE")]
    file: String,

    /// Do not merge the stable motifs of source nodes
    #[arg(long)]
    no_source_merge: bool,

    /// Do not explore state transition graphs to decide ambiguous branches
    #[arg(long)]
    no_stg_search: bool,

    /// Maximal number of free nodes for the state transition graph search
    #[arg(long, default_value_t = DEFAULT_MAX_STG_SIZE, require_equals = true)]
    max_stg_size: usize,

    /// Reduce the network before building the succession diagram
    #[arg(long, require_equals = true)]
    reduce: Option<Reduction>,

    /// Print the report of all reduced networks instead of the attractor candidates
    #[arg(long)]
    full: bool,

    /// Logging verbosity (use -v for info, or -v=LEVEL for a specific level)
    #[arg(long, short = 'v', value_name = "LEVEL", num_args = 0..=1, default_missing_value = "info", require_equals = true)]
    verbose: Option<Option<LogLevel>>,
}

#[derive(Clone, clap::ValueEnum)]
enum Reduction {
    Deletion,
    Mediator,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
        }
    }
}

fn main() {
    let args = Args::parse();

    let log_level = match args.verbose {
        None => LevelFilter::Warn,
        Some(None) => LevelFilter::Info,
        Some(Some(level)) => level.into(),
    };
    Builder::from_default_env().filter_level(log_level).init();

    let text = std::fs::read_to_string(&args.file).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", args.file, e);
        std::process::exit(1);
    });
    let rules = RuleSystem::canonicalize(&text).unwrap_or_else(|e| {
        eprintln!("Failed to load the rules of {}: {}", args.file, e);
        std::process::exit(1);
    });
    println!("Loaded {} rules.", rules.len());

    let (rules, constants) = rules.percolate(&Pattern::default());
    if !constants.is_empty() {
        println!(
            "Constant propagation fixed {} nodes: {}",
            constants.len(),
            constants.named(rules.space())
        );
    }

    let rules = match &args.reduce {
        None => Ok(rules),
        Some(Reduction::Deletion) => deletion_reduction(&rules, None),
        Some(Reduction::Mediator) => mediator_reduction(&rules),
    }
    .unwrap_or_else(|e| {
        eprintln!("Failed to reduce the network: {}", e);
        std::process::exit(1);
    });
    if args.reduce.is_some() {
        println!("The reduced network has {} nodes:\n{}", rules.len(), rules);
    }

    let config = SuccessionConfig::from(
        ReductionConfig::new()
            .with_source_merging(!args.no_source_merge)
            .with_stg_search(!args.no_stg_search)
            .with_max_stg_size(args.max_stg_size),
    );
    let diagram = SuccessionDiagram::build_with(&rules, config);
    println!(
        "Found {} reduced networks and {} attractor candidates.",
        diagram.len(),
        diagram.attractor_candidates().count()
    );

    if args.full {
        print!("{}", diagram.summary(None));
    } else {
        print!("{}", diagram.attractor_candidate_summary());
    }
}
