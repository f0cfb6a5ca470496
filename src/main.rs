use clap::Parser;
use log::{warn, LevelFilter};
use snafu::ErrorCompat;

mod args;
mod csvdata;

use crate::args::{Args, Command};

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    let res = match &args.command {
        Command::Export(export_args) => csvdata::run_export(export_args),
        Command::Import(import_args) => csvdata::run_import(import_args),
    };

    if let Err(e) = res {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured: {}", e);
        if let Some(source) = std::error::Error::source(e.as_ref()) {
            eprintln!("caused by: {}", source);
        }
        if let Some(bt) = ErrorCompat::backtrace(e.as_ref()) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
