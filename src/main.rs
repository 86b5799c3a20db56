//! Binary entrypoint for the `fileman` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    match filemanager::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
