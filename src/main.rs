mod commands;
mod diagnostics;
mod exclusions;
mod watch;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use linkmark::{Error, ErrorPolicy, OutOfRoot};
use tracing_subscriber::EnvFilter;

use crate::commands::{GraphOverrides, ScanOptions};

#[derive(Parser)]
#[command(name = "linkmark", version, about = "Map cross-document links in a markdown tree")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Log more: -v for info, -vv for debug. `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the exclusion list in .linkmark.toml
    Exclude {
        #[command(subcommand)]
        action: ExcludeAction,
        /// Directory holding .linkmark.toml
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Render the link graph as Graphviz DOT
    Graph {
        /// Root directory of the markdown tree
        #[arg(default_value = ".")]
        root: PathBuf,
        /// Write DOT here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        scan: ScanArgs,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Print the link index as JSON
    Links {
        /// Root directory of the markdown tree
        #[arg(default_value = ".")]
        root: PathBuf,
        /// Print absolute paths instead of paths relative to the root
        #[arg(long)]
        absolute: bool,
        #[command(flatten)]
        scan: ScanArgs,
    },
    /// Re-render the graph whenever a document changes
    Watch {
        /// Root directory of the markdown tree
        #[arg(default_value = ".")]
        root: PathBuf,
        /// DOT file to keep up to date
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        scan: ScanArgs,
        #[command(flatten)]
        style: StyleArgs,
    },
}

#[derive(Subcommand)]
enum ExcludeAction {
    /// Leave a document out of the index
    Add {
        /// Root-relative path, e.g. diary/diary.md
        file: String,
    },
    /// Show excluded documents
    List,
    /// Put an excluded document back
    Remove {
        /// Root-relative path as listed
        file: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OnErrorArg {
    Abort,
    Continue,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutOfRootArg {
    Drop,
    Fail,
}

#[derive(Args)]
struct ScanArgs {
    /// Leave a document out (root-relative path). Repeatable.
    #[arg(long = "exclude", value_name = "FILE")]
    exclude: Vec<String>,
    /// What to do with a document that cannot be read or parsed
    #[arg(long, value_enum)]
    on_error: Option<OnErrorArg>,
    /// What to do with a link that leaves the root
    #[arg(long, value_enum)]
    out_of_root: Option<OutOfRootArg>,
}

#[derive(Args)]
struct StyleArgs {
    /// Graphviz layout engine (sfdp, dot, circo, ...)
    #[arg(long)]
    layout: Option<String>,
    /// Built-in palette: pastel, shmoop, shmoop2
    #[arg(long)]
    palette: Option<String>,
}

impl From<OnErrorArg> for ErrorPolicy {
    fn from(arg: OnErrorArg) -> Self {
        return match arg {
            OnErrorArg::Abort => ErrorPolicy::Abort,
            OnErrorArg::Continue => ErrorPolicy::Continue,
        };
    }
}

impl From<OutOfRootArg> for OutOfRoot {
    fn from(arg: OutOfRootArg) -> Self {
        return match arg {
            OutOfRootArg::Drop => OutOfRoot::Drop,
            OutOfRootArg::Fail => OutOfRoot::Fail,
        };
    }
}

impl From<ScanArgs> for ScanOptions {
    fn from(args: ScanArgs) -> Self {
        return Self {
            exclude: args.exclude,
            on_error: args.on_error.map(ErrorPolicy::from),
            out_of_root: args.out_of_root.map(OutOfRoot::from),
        };
    }
}

impl From<StyleArgs> for GraphOverrides {
    fn from(args: StyleArgs) -> Self {
        return Self {
            layout: args.layout,
            palette: args.palette,
        };
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    return match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}

/// Install a stderr subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_err| return EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Dispatch one subcommand.
///
/// # Errors
///
/// Returns whatever the subcommand returns.
fn run(command: Commands) -> Result<ExitCode, Error> {
    return match command {
        Commands::Exclude { action, root } => {
            match action {
                ExcludeAction::Add { file } => exclusions::cmd_add(&root, &file)?,
                ExcludeAction::List => exclusions::cmd_list(&root)?,
                ExcludeAction::Remove { file } => exclusions::cmd_remove(&root, &file)?,
            }
            Ok(ExitCode::SUCCESS)
        },
        Commands::Graph { root, output, scan, style } => {
            commands::graph(&root, output.as_deref(), &style.into(), &scan.into())
        },
        Commands::Links { root, absolute, scan } => commands::links(&root, absolute, &scan.into()),
        Commands::Watch { root, output, scan, style } => {
            watch::run(&root, &output, &style.into(), &scan.into())
        },
    };
}
