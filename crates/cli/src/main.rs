use std::process::ExitCode;

fn main() -> ExitCode {
    immo_cli::run()
}
