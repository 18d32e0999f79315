use std::io::Write;

use colored::Colorize;
use env_logger::Builder;
use log::LevelFilter;
use time::{UtcOffset, macros::format_description};

/// Configure a colored, timestamped logger for hosts and tests.
///
/// Opt-in: the library itself only uses the `log` facade. Call once at
/// startup; repeated calls are ignored (the first installed logger wins).
pub fn init_logging(level: LevelFilter) {
    let time_format = format_description!("[hour]:[minute]:[second].[subsecond digits:3]");
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    let mut builder = Builder::new();
    builder
        .format(move |buf, record| {
            let level = match record.level() {
                log::Level::Error => record.level().to_string().red(),
                log::Level::Warn => record.level().to_string().yellow(),
                log::Level::Info => record.level().to_string().green(),
                log::Level::Debug => record.level().to_string().cyan(),
                log::Level::Trace => record.level().to_string().magenta(),
            };
            let now = time::OffsetDateTime::now_utc().to_offset(offset);
            writeln!(
                buf,
                "{} [{}] - {}:{} - {}",
                now.format(&time_format).unwrap(),
                level,
                record
                    .file()
                    .unwrap_or("unknown")
                    .trim_start_matches(&format!("src{}", std::path::MAIN_SEPARATOR)),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(level);

    let _ = builder.try_init();
}
