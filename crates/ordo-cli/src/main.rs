#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "ordo: an ordered task list with gap-free reordering",
    long_about = None
)]
struct Cli {
    /// Enable debug logging for ordo crates.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Database file (overrides ORDO_DB and .ordo/config.toml).
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Project",
        about = "Initialize an ordo project",
        long_about = "Write .ordo/config.toml with defaults and create an empty store.",
        after_help = "EXAMPLES:\n    # Initialize in the current directory\n    ordo init\n\n    # Use an explicit database file\n    ordo --db /tmp/todo.db init"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Read",
        about = "List items in rank order",
        after_help = "EXAMPLES:\n    ordo list\n\n    # Emit machine-readable output\n    ordo list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one item",
        after_help = "EXAMPLES:\n    ordo show 3f0c2a9e-6d1b-4c55-9a77-0e5b8d2f4c11"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Create an item at the end of the list",
        after_help = "EXAMPLES:\n    ordo create --title \"Buy milk\"\n\n    ordo create --title \"Call mom\" --description \"Sunday\" --json"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Edit an item's title, description or completion",
        long_about = "Replace an item's content. Unset flags keep the stored value. The item's rank never changes; use `ordo reorder` for that."
    )]
    Update(cmd::update::UpdateArgs),

    #[command(next_help_heading = "Edit", about = "Mark an item completed")]
    Done(cmd::done::DoneArgs),

    #[command(next_help_heading = "Edit", about = "Mark an item not completed")]
    Undone(cmd::done::DoneArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Move an item to a new rank",
        long_about = "Move an item to a zero-based rank. Items between the old and new rank shift by one so ranks stay 0..N-1.",
        after_help = "EXAMPLES:\n    # Move to the front\n    ordo reorder <id> 0\n\n    # Print the new order as JSON\n    ordo reorder <id> 3 --json"
    )]
    Reorder(cmd::reorder::ReorderArgs),

    #[command(next_help_heading = "Edit", about = "Delete an item")]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Project",
        about = "Verify ranks are dense",
        long_about = "Report duplicate and missing ranks. Exits non-zero when ranks are not exactly 0..N-1."
    )]
    Check(cmd::check::CheckArgs),

    #[command(
        next_help_heading = "Project",
        about = "Rewrite ranks to 0..N-1 in current order"
    )]
    Renumber(cmd::renumber::RenumberArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("ORDO_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "ordo_core=debug,ordo=debug,info"
        } else {
            "ordo_core=info,ordo=info,warn"
        })
    });

    let format = env::var("ORDO_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output; logs always go to stderr.
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = cmd::Context {
        output: output::resolve_output_mode(cli.json),
        project_root: env::current_dir()?,
        db: cli.db,
    };
    debug!(
        root = %ctx.project_root.display(),
        json = ctx.output.is_json(),
        "starting"
    );

    match cli.command {
        Commands::Init(ref args) => cmd::init::run_init(args, &ctx),
        Commands::List(ref args) => cmd::list::run_list(args, &ctx),
        Commands::Show(ref args) => cmd::show::run_show(args, &ctx),
        Commands::Create(ref args) => cmd::create::run_create(args, &ctx),
        Commands::Update(ref args) => cmd::update::run_update(args, &ctx),
        Commands::Done(ref args) => cmd::done::run_done(args, &ctx),
        Commands::Undone(ref args) => cmd::done::run_undone(args, &ctx),
        Commands::Reorder(ref args) => cmd::reorder::run_reorder(args, &ctx),
        Commands::Delete(ref args) => cmd::delete::run_delete(args, &ctx),
        Commands::Check(ref args) => cmd::check::run_check(args, &ctx),
        Commands::Renumber(ref args) => cmd::renumber::run_renumber(args, &ctx),
    }
}
