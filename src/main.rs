use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod error;
mod graph;
mod repository;
mod telemetry;

/// Print the commits of every local branch in topological order, children
/// before parents, marking each place where the listing jumps between
/// commits that are not directly connected.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Run as if started in <PATH> instead of the current working directory
    #[arg(short = 'C', value_name = "PATH")]
    directory: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug); logs go to stderr
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    let start_dir = match cli.directory {
        Some(dir) => dir,
        None => PathBuf::from("."),
    };

    match commands::topo_order::execute(&start_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<error::Error>() {
                Some(not_a_repo @ error::Error::NotARepository) => eprintln!("{}", not_a_repo),
                _ => eprintln!("fatal: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}
