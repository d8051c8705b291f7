//! Minimal stderr logger for the command line front end.

use std::io::{self, Write};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Records from other crates (image decoders and such) are dropped. The binary
/// and the library share this crate name.
const ALLOWED_TARGETS: &[&str] = &["ascii_studio"];

struct StderrLogger {
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level && is_allowed_target(metadata.target())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "[{:<5}] [{}] {}", record.level(), record.target(), record.args());
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

fn is_allowed_target(target: &str) -> bool {
    ALLOWED_TARGETS.iter().any(|allowed| {
        target == *allowed || target.strip_prefix(allowed).is_some_and(|rest| rest.starts_with("::"))
    })
}

/// Map the number of `-v` flags to a level filter.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn initialize(verbosity: u8) -> Result<LevelFilter, SetLoggerError> {
    let level = level_for(verbosity);
    log::set_boxed_logger(Box::new(StderrLogger { level }))?;
    log::set_max_level(level);
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(level_for(0), LevelFilter::Warn);
        assert_eq!(level_for(2), LevelFilter::Debug);
        assert_eq!(level_for(9), LevelFilter::Trace);
    }

    #[test]
    fn only_own_crates_pass() {
        assert!(is_allowed_target("ascii_studio"));
        assert!(is_allowed_target("ascii_studio::session"));
        assert!(is_allowed_target("ascii_studio::script"));
        assert!(!is_allowed_target("ascii_studio_extra"));
        assert!(!is_allowed_target("png::decoder"));
    }
}
