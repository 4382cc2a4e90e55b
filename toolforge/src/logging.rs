//! Logging setup for the `toolforge` binary.

use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber, writing to stderr.
///
/// `RUST_LOG` wins over the `debug` switch when set.
pub fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // a second initialization (tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

/// Whether `-d`/`--debug` was passed to the top-level command.
///
/// Looked up before argument parsing because plugin discovery, which has to run
/// first, should already be logged.
pub fn debug_requested<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for arg in args.into_iter().skip(1) {
        let arg = arg.as_ref();
        if arg == "-d" || arg == "--debug" {
            return true;
        }
        if !arg.starts_with('-') {
            // first subcommand reached; its flags are not ours
            return false;
        }
        // combined short flags such as -vd
        if !arg.starts_with("--") && arg[1..].contains('d') {
            return true;
        }
    }
    false
}
