use clap::Parser;
use tracing_subscriber::EnvFilter;

use dascrubber_wrapper::cli;

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging based on verbosity flag. Everything goes to stderr:
    // stdout is reserved for the scrubbed FASTA output.
    let filter = if args.verbose {
        EnvFilter::new("dascrubber_wrapper=debug,info")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    cli::run(args)
}
