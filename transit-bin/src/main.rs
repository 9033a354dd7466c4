use std::env;
use std::io;
use std::process::ExitCode;

use transit_core::prelude::*;

fn print_usage() {
    eprintln!("Usage: transport_catalogue [make_base|process_requests]");
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "make_base" => make_base(io::stdin().lock()),
        "process_requests" => process_requests(io::stdin().lock(), io::stdout().lock()),
        _ => {
            print_usage();
            return ExitCode::from(1);
        }
    };

    if let Err(err) = result {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
