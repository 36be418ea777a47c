//! Structured logging setup.
//!
//! The original core writes every decision through `writeLog`/`writeStatus`
//! into a run log; here that is the `log` facade, dispatched through `fern`
//! so the CLI can route "status" lines (info and above) to stderr while
//! "log" detail (debug/trace) goes to a file when requested.

use fern::Dispatch;
use log::LevelFilter;
use std::path::Path;

/// Initialise the global logger.
///
/// `verbosity` follows the common CLI convention: 0 = warn, 1 = info,
/// 2 = debug, 3+ = trace. `detail_log` mirrors the best-edges-file-style
/// "log" output the original writes alongside the terse status lines.
pub fn init_logging(verbosity: u8, detail_log: Option<&Path>) -> Result<(), fern::InitError> {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut dispatch = Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if let Some(path) = detail_log {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}
