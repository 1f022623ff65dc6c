use clap::Parser;
use scxml2jani::Cli;

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let result = cli.run();
    if let Err(err) = result {
        eprintln!("ERROR: {err:#}");
        std::process::exit(1);
    }
}
