/*!

Logging configuration.

Re-exports the `log` crate's macros and level type so downstream code can
write `use outbreak_core::{info, warn};` without depending on `log` directly,
and wires them to a `log4rs` console appender. Logging is off until a caller
opts in with [`enable_logging`]; the level can be changed at any time with
[`set_log_level`].

*/

pub use log::{debug, error, info, trace, warn, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Handle;
use std::sync::Mutex;

const LOG_PATTERN: &str = "{d(%H:%M:%S)} {h({l})} [{t}] {m}{n}";

// `None` until the first `enable_logging`/`set_log_level` call installs the
// global logger; afterwards holds the handle used to swap configurations.
static LOG_HANDLE: Mutex<Option<Handle>> = Mutex::new(None);

fn build_config(level: LevelFilter) -> Config {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();
    Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))
        .unwrap() // Infallible: the appender/root names are fixed and consistent
}

/// Turns on console logging at the given level. Safe to call more than once.
pub fn enable_logging(level: LevelFilter) {
    set_log_level(level);
}

/// Changes the log level, installing the global logger on first use.
///
/// If another crate in the process has already installed a different global
/// logger, this is a no-op; `log4rs` can only reconfigure its own logger.
pub fn set_log_level(level: LevelFilter) {
    let mut handle = LOG_HANDLE.lock().unwrap();
    match handle.as_ref() {
        Some(handle) => handle.set_config(build_config(level)),
        None => {
            if let Ok(new_handle) = log4rs::init_config(build_config(level)) {
                *handle = Some(new_handle);
            }
        }
    }
}

/// Silences all logging from this crate.
pub fn disable_logging() {
    set_log_level(LevelFilter::Off);
}
