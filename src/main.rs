//! tick - abbreviation-friendly command-line task manager

use std::process::ExitCode;

use tick_cli::cli::UnsetFlag;

fn main() -> ExitCode {
    match tick_cli::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.chain().any(|cause| cause.is::<UnsetFlag>()) => {
            eprintln!("Internal error: {:#}", e);
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
