use std::{
    env,
    io::{self, Write},
};

use chrono::Local;
use colored::{ColoredString, Colorize};
use env_logger::{fmt::Formatter, Builder};
use log::{Level, LevelFilter, Record};

use crate::constants::KILN_LOG;

fn level_label(level: Level) -> ColoredString {
    // padded before coloring, escape codes break width formatting
    let label = format!("{:<5}", level.as_str());
    let label = label.as_str();
    match level {
        Level::Error => label.red().bold(),
        Level::Warn => label.yellow(),
        Level::Info => label.green(),
        Level::Debug | Level::Trace => label.dimmed(),
    }
}

/// The crate a record came from, e.g. `kiln_template`.
fn origin(target: &str) -> &str {
    target.split("::").next().unwrap_or(target)
}

fn write_record(buf: &mut Formatter, record: &Record, verbose: bool) -> io::Result<()> {
    let level = level_label(record.level());

    if verbose {
        let origin = format!("[{}]", origin(record.target()));
        writeln!(
            buf,
            "{time} {level} {origin} {args}",
            time = Local::now().format("%H:%M:%S%.3f"),
            origin = origin.as_str().dimmed(),
            args = record.args(),
        )
    } else {
        writeln!(buf, "{level} {}", record.args())
    }
}

/// Installs the global logger.
///
/// At `info` and above a line is just the level and the message.
/// `debug` and `trace` prefix a timestamp and the emitting crate,
/// which tells config parsing (`kiln_recipe`) apart from rendering
/// (`kiln_template`).
///
/// The `KILN_LOG` environment variable takes the same
/// module filter syntax as `RUST_LOG` and is applied on
/// top of the given level.
pub fn init(log_level: LevelFilter) {
    let verbose = log_level >= LevelFilter::Debug;

    let mut builder = Builder::new();
    builder
        .filter_level(log_level)
        .format(move |buf, record| write_record(buf, record, verbose));

    if let Ok(filters) = env::var(KILN_LOG) {
        builder.parse_filters(&filters);
    }

    if let Err(e) = builder.try_init() {
        eprintln!("Logger already initialized: {e}");
    }
}
