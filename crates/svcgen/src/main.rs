//! svcgen binary: thin wrapper over the CLI driver.

fn main() {
    std::process::exit(svcgen_cli::run());
}
