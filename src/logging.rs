//! Log output for the command line tool. Logs go to stderr so they never mix
//! with the trees printed on stdout.

use tracing_subscriber::EnvFilter;

fn filter_from_verbosity(verbose: u8) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    EnvFilter::new(level)
}

pub fn init(verbose: u8) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter_from_verbosity(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    // A subscriber may already be installed; the first one wins.
    let _ = tracing::subscriber::set_global_default(subscriber);
}
