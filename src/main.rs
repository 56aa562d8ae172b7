use std::process::ExitCode;

fn main() -> ExitCode {
    ansimap::cli::run()
}
