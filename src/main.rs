use clap::Parser;
use hybridscan::args::Args;
use hybridscan::runner::Runner;

fn main() {
    let args = Args::parse();
    let result = Runner::new(args).and_then(|runner| runner.start());
    if let Err(err) = result {
        log::error!("{err:#}");
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
