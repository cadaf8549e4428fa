//! Command-line entry point for the TVM contract build driver.

use clap::Parser;
use std::process;
use tvm_build::cli::{self, Args};

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli::run(args) {
        Ok(_) => println!("Build succeeded."),
        Err(err) => {
            if let Some(output) = err.tool_output() {
                print!("{output}");
            }
            eprintln!("{err}");
            process::exit(1);
        }
    }
}
