//! Pentomino search-tree tracer
//!
//! Runs an instrumented backtracking search for pentomino tilings, records
//! a display-sized slice of its search tree, and lays the tree out for
//! rendering. Reports are written as JSON and can be browsed in a 3D viewer.

mod visualization;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pentotrace::error::CliError;
use pentotrace::grid::{format_board, BoardMap};
use pentotrace::ordering::{pick_order_with_right_solution_branch, OrderSearch};
use pentotrace::persistence;
use pentotrace::pieces::{parse_pieces, Piece, Problem, PIECES};
use pentotrace::replay::{replay_steps, StepOp};
use pentotrace::sampler::find_unique_solutions;
use pentotrace::scenarios::{run_scenario, ScenarioConfig, ScenarioReport};
use pentotrace::trace::DEFAULT_MAX_NODES;

/// Traces pentomino tiling searches and lays out their search trees.
#[derive(Parser)]
#[command(name = "pentotrace")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Trace the twelve pentominoes in a 6x10 rectangle.
    Rect(TraceArgs),
    /// Trace a pentomino scaled by three, tiled by nine others.
    Triplicate {
        /// Piece to scale up.
        #[arg(long, default_value = "Z")]
        piece: Piece,
        /// Pieces to tile it with.
        #[arg(long, default_value = "TIPXWUYNV")]
        pieces: String,
        /// Shuffles tried while searching for a piece order.
        #[arg(long, default_value_t = 80)]
        attempts: usize,
        /// Seed for the order shuffles.
        #[arg(long, default_value_t = 1)]
        seed: u32,
        #[command(flatten)]
        trace: TraceArgs,
    },
    /// Collect distinct solutions from seeded randomized searches.
    Sample {
        #[arg(long, default_value_t = 6)]
        rows: i32,
        #[arg(long, default_value_t = 10)]
        cols: i32,
        /// Number of distinct solutions wanted.
        #[arg(long, default_value_t = 5)]
        count: usize,
        #[arg(long, default_value_t = 300)]
        max_attempts: u32,
    },
    /// Print the first place/remove steps of a plain search.
    Replay {
        #[arg(long, default_value_t = 6)]
        rows: i32,
        #[arg(long, default_value_t = 10)]
        cols: i32,
        #[arg(long, default_value_t = 100)]
        max_steps: usize,
    },
    /// Show the counters of a saved report.
    Summary { path: PathBuf },
    /// Browse a saved report in an interactive 3D viewer.
    Display { path: PathBuf },
}

/// Options shared by the tracing subcommands.
#[derive(Args)]
struct TraceArgs {
    /// Hard cap on search visits per trace.
    #[arg(long, default_value_t = DEFAULT_MAX_NODES)]
    max_nodes: u64,
    /// Depth cap for nodes off the solution chain.
    #[arg(long)]
    display_depth: Option<usize>,
    /// Widest level shown in full.
    #[arg(long)]
    display_children: Option<usize>,
    /// Depth cap along the solution chain.
    #[arg(long)]
    chain_depth: Option<usize>,
    /// Keep exploring siblings after a solution is found.
    #[arg(long)]
    continue_siblings: Option<bool>,
    /// Where to write the JSON report.
    #[arg(long, short)]
    out: Option<PathBuf>,
}

impl TraceArgs {
    /// Applies command-line overrides on top of a scenario's defaults.
    fn apply(&self, mut config: ScenarioConfig) -> ScenarioConfig {
        config.trace.max_nodes = self.max_nodes;
        if let Some(depth) = self.display_depth {
            config.trace.max_display_depth = depth;
        }
        if let Some(children) = self.display_children {
            config.trace.max_display_children = children;
        }
        if let Some(depth) = self.chain_depth {
            config.trace.rightmost_branch_depth = Some(depth);
            config.layout.chain_depth = depth as f64;
        }
        if let Some(continue_siblings) = self.continue_siblings {
            config.trace.continue_siblings_after_solution = continue_siblings;
        }
        config
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Rect(args) => run_rect(&args),
        Command::Triplicate {
            piece,
            pieces,
            attempts,
            seed,
            trace,
        } => run_triplicate(piece, &pieces, attempts, seed, &trace),
        Command::Sample {
            rows,
            cols,
            count,
            max_attempts,
        } => run_sample(rows, cols, count, max_attempts),
        Command::Replay {
            rows,
            cols,
            max_steps,
        } => run_replay(rows, cols, max_steps),
        Command::Summary { path } => run_summary(&path),
        Command::Display { path } => run_display(&path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Traces the 6x10 rectangle and writes or prints the report.
fn run_rect(args: &TraceArgs) -> Result<(), CliError> {
    let problem = Problem::rectangle(6, 10, PIECES.to_vec())?;
    let config = args.apply(ScenarioConfig::rect_6x10(args.max_nodes));
    emit(&run_scenario(problem, &config), args.out.as_deref())
}

/// Picks a piece order for the triplicated region, then traces it.
fn run_triplicate(
    piece: Piece,
    pieces: &str,
    attempts: usize,
    seed: u32,
    args: &TraceArgs,
) -> Result<(), CliError> {
    let base = Problem::triplicated(piece, parse_pieces(pieces)?)?;
    let search = OrderSearch {
        attempts,
        seed,
        ..OrderSearch::default()
    };
    let order = pick_order_with_right_solution_branch(&base, &search);
    info!(
        order = %order.iter().map(|p| p.letter()).collect::<String>(),
        "picked piece order"
    );

    let problem = base.with_pieces(order)?;
    let config = args.apply(ScenarioConfig::triplication(args.max_nodes));
    emit(&run_scenario(problem, &config), args.out.as_deref())
}

/// Saves the report if a path was given, else prints it as JSON.
fn emit(report: &ScenarioReport, out: Option<&Path>) -> Result<(), CliError> {
    match out {
        Some(path) => {
            let text_path =
                persistence::save_report(path, report).map_err(|source| CliError::Save {
                    path: path.display().to_string(),
                    source,
                })?;
            println!("Wrote {} and {}", path.display(), text_path.display());
            print_summary(report);
        }
        None => println!("{}", serde_json::to_string(report)?),
    }
    Ok(())
}

/// Loads a saved report, tagging failures with the path.
fn load(path: &Path) -> Result<ScenarioReport, CliError> {
    persistence::load_report(path).map_err(|source| CliError::Load {
        path: path.display().to_string(),
        source,
    })
}

fn run_sample(rows: i32, cols: i32, count: usize, max_attempts: u32) -> Result<(), CliError> {
    let problem = Problem::rectangle(rows, cols, PIECES.to_vec())?;
    let solutions = find_unique_solutions(&problem, count, max_attempts, DEFAULT_MAX_NODES);

    println!("Found {} of {} requested solutions\n", solutions.len(), count);
    for (i, solution) in solutions.iter().enumerate() {
        let board: BoardMap = solution
            .iter()
            .flat_map(|placement| placement.cells.iter().map(|&cell| (cell, placement.piece)))
            .collect();
        println!("Solution {}:", i + 1);
        print!("{}", format_board(&board, &problem));
        println!();
    }
    Ok(())
}

fn run_replay(rows: i32, cols: i32, max_steps: usize) -> Result<(), CliError> {
    let problem = Problem::rectangle(rows, cols, PIECES.to_vec())?;
    for (step, event) in replay_steps(&problem, max_steps).iter().enumerate() {
        let op = match event.op {
            StepOp::Place => "place",
            StepOp::Remove => "remove",
        };
        let cells: Vec<String> = event.cells.iter().map(|(r, c)| format!("{r},{c}")).collect();
        println!("{:>4} {:<6} {} {}", step + 1, op, event.piece, cells.join(" "));
    }
    Ok(())
}

fn print_summary(report: &ScenarioReport) {
    let pieces: String = report.problem.pieces.iter().map(|p| p.letter()).collect();
    println!(
        "Board {}x{} ({} cells), pieces {}",
        report.problem.rows,
        report.problem.cols,
        report.problem.mask.len(),
        pieces
    );
    for (label, summary) in [("pruned", &report.pruned), ("unpruned", &report.unpruned)] {
        println!(
            "{:<9} steps={} nodes={} events={} elapsed={:.1}ms",
            label,
            summary.total_steps,
            summary.node_count,
            summary.event_count,
            summary.total_elapsed_ms
        );
    }
    let counterfactual = report.trace.nodes.iter().filter(|n| n.counterfactual).count();
    println!(
        "merged    nodes={} counterfactual={} chain={} outcome={:?}",
        report.trace.nodes.len(),
        counterfactual,
        report.trace.chain().len(),
        report.trace.outcome
    );
}

/// Prints the counters of a saved report.
fn run_summary(path: &Path) -> Result<(), CliError> {
    print_summary(&load(path)?);
    Ok(())
}

/// Loads a saved report and opens the viewer.
fn run_display(path: &Path) -> Result<(), CliError> {
    let report = load(path)?;
    println!("Loaded {} nodes", report.trace.nodes.len());
    println!("Controls: Left/Right step, Up/Down step x10, R show all");
    visualization::display(report);
    Ok(())
}
