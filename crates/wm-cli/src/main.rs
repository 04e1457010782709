//! WM Console - terminal front end for the waste-management API
//!
//! Admin lists, driver flows, skip labels and waste transfer notes from the
//! command line.

mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

const RESET_HINT: &str = "If the stored configuration is broken, run `wm-console config --reset`.";

/// `-v` forces debug; otherwise `RUST_LOG`, defaulting to warnings only
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn install_panic_hint() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        default_hook(info);
        eprintln!("{RESET_HINT}");
    }));
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    install_panic_hint();

    if let Err(e) = commands::execute(cli) {
        eprintln!("Error: {}", e);
        eprintln!("{RESET_HINT}");
        std::process::exit(1);
    }
}
