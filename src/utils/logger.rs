use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

const DEFAULT_FILTER: &str = "warn,atenea=info";
const VERBOSE_FILTER: &str = "warn,atenea=debug";

/// Initialise the global logger
///
/// `RUST_LOG` takes precedence over the built-in filter. Safe to call more
/// than once; later calls are ignored.
pub fn init_logger(verbose: bool) {
    let default_filter = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let env = Env::default().filter_or("RUST_LOG", default_filter);

    let mut builder = Builder::from_env(env);

    // Keep HTTP internals quiet unless explicitly requested
    builder
        .filter_module("hyper", LevelFilter::Error)
        .filter_module("hyper_util", LevelFilter::Error)
        .filter_module("mio", LevelFilter::Error)
        .filter_module("reqwest", LevelFilter::Warn)
        .parse_env(Env::default().filter("RUST_LOG"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr);

    let _ = builder.try_init();
}
