use std::process::ExitCode;

fn main() -> ExitCode {
    sitetrack_cli::run()
}
