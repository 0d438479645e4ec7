use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use orrery::graph::{Point, Status};
use orrery::layout::LayoutStrategy;

mod commands;

#[derive(Parser)]
#[command(name = "orrery")]
#[command(about = "Orrery - lay out and track a task dependency graph")]
#[command(version)]
struct Cli {
    /// Path to the orrery directory (default: .orrery in current dir)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Output as JSON for machine consumption
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new orrery in the current directory
    Init,

    /// Add a new task
    Add {
        /// Task title
        title: String,

        /// Task ID (auto-generated if not provided)
        #[arg(long)]
        id: Option<String>,

        /// Upstream task that must be completed first (can specify multiple)
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        after: Vec<String>,

        /// Initial status (available, in-progress, completed, abandoned)
        #[arg(long)]
        status: Option<Status>,

        /// Quest this task belongs to (can specify multiple)
        #[arg(long)]
        quest: Vec<String>,
    },

    /// Add a dependency edge: TARGET waits on SOURCE
    Link { source: String, target: String },

    /// Remove a dependency edge
    Unlink { source: String, target: String },

    /// Remove a task and every edge touching it
    Remove { id: String },

    /// Show the effective status of every task
    Status {
        /// Task currently being worked on
        #[arg(long)]
        focus: Option<String>,
    },

    /// Compute and print task positions
    Layout {
        /// Layout strategy (dag or force); defaults to the configured one
        #[arg(long)]
        strategy: Option<LayoutStrategy>,

        /// Viewport width for the force layout
        #[arg(long)]
        width: Option<f64>,

        /// Viewport height for the force layout
        #[arg(long)]
        height: Option<f64>,
    },

    /// Store a manual position for a task
    Pin {
        id: String,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },

    /// Clear a task's manual position
    Unpin { id: String },

    /// Check the graph for cycles and dangling edges
    Check,

    /// Run the force simulation, optionally replaying a drag
    Simulate {
        /// Tick limit for each settle phase
        #[arg(long)]
        max_steps: Option<usize>,

        /// Task to drag
        #[arg(long, requires = "to")]
        drag: Option<String>,

        /// Drop point as x,y
        #[arg(long, value_parser = parse_point_arg, allow_hyphen_values = true)]
        to: Option<Point>,

        /// Keep the dragged task where it was dropped
        #[arg(long, requires = "drag")]
        stick: bool,
    },
}

fn parse_point_arg(s: &str) -> Result<Point, String> {
    commands::parse_point(s).map_err(|e| e.to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ORRERY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let orrery_dir = cli.dir.unwrap_or_else(|| PathBuf::from(".orrery"));

    match cli.command {
        Commands::Init => commands::init::run(&orrery_dir),
        Commands::Add {
            title,
            id,
            after,
            status,
            quest,
        } => commands::add::run(
            &orrery_dir,
            &title,
            id.as_deref(),
            &after,
            status,
            &quest,
        ),
        Commands::Link { source, target } => commands::link::link(&orrery_dir, &source, &target),
        Commands::Unlink { source, target } => {
            commands::link::unlink(&orrery_dir, &source, &target)
        }
        Commands::Remove { id } => commands::remove::run(&orrery_dir, &id),
        Commands::Status { focus } => commands::status::run(&orrery_dir, focus.as_deref(), cli.json),
        Commands::Layout {
            strategy,
            width,
            height,
        } => commands::layout::run(&orrery_dir, strategy, width, height, cli.json),
        Commands::Pin { id, x, y } => commands::pin::pin(&orrery_dir, &id, x, y),
        Commands::Unpin { id } => commands::pin::unpin(&orrery_dir, &id),
        Commands::Check => commands::check::run(&orrery_dir, cli.json),
        Commands::Simulate {
            max_steps,
            drag,
            to,
            stick,
        } => commands::simulate::run(&orrery_dir, max_steps, drag.as_deref(), to, stick, cli.json),
    }
}
