use chrono::Local;
use log::{LevelFilter, Metadata, Record, SetLoggerError};
use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::OnceLock;

// Debug topics understood by --debug-filter
pub const TOPICS: [&str; 3] = ["vehicle", "environment", "episode"];

// Custom logger structure
#[derive(Debug)]
struct CarControlLogger {
    level: LevelFilter,
    debug_filters: Option<HashSet<String>>,
}

// Pulls the number following `label` out of a message, e.g. "Episode 3"
fn find_number(message: &str, label: &str) -> Option<u64> {
    let start = message.find(label)? + label.len();
    let digits: String = message[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

// Builds the [E..][T....] prefix for messages that mention an episode or tick
fn context_prefix(message: &str) -> String {
    // Messages already carrying a prefix from the debug macros are left alone
    if message.starts_with("[E") {
        return String::new();
    }

    let mut context = String::new();
    if let Some(episode) = find_number(message, "Episode ") {
        context.push_str(&format!("[E{:02}]", episode));
    }
    if let Some(tick) = find_number(message, "tick ") {
        context.push_str(&format!("[T{:04}]", tick));
    }
    if !context.is_empty() {
        context.push(' ');
    }
    context
}

impl log::Log for CarControlLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if metadata.level() > self.level {
            return false;
        }
        // Debug filters only restrict debug and trace output
        if let Some(filters) = &self.debug_filters {
            if metadata.level() >= log::Level::Debug {
                return filters.contains(metadata.target())
                    || filters.iter().any(|f| metadata.target().starts_with(f.as_str()));
            }
        }
        true
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level_color = match record.level() {
            log::Level::Error => "\x1B[31m", // Red
            log::Level::Warn => "\x1B[33m",  // Yellow
            log::Level::Info => "\x1B[32m",  // Green
            log::Level::Debug => "\x1B[36m", // Cyan
            log::Level::Trace => "\x1B[35m", // Magenta
        };
        let reset = "\x1B[0m";
        let timestamp = Local::now().format("%H:%M:%S%.3f");

        let message = record.args().to_string();
        let context = context_prefix(&message);

        let mut output = format!(
            "{timestamp} {level_color}{level:5}{reset} {context}{target}: {message}",
            level = record.level(),
            target = record.target(),
        );

        if let Some(module_path) = record.module_path() {
            if module_path != record.target() {
                output.push_str(&format!(" [{}]", module_path));
            }
        }

        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", output);
        let _ = stdout.flush();
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

static LOGGER: OnceLock<CarControlLogger> = OnceLock::new();

/// Splits a comma-separated topic list, e.g. "vehicle,environment"
pub fn parse_debug_filter(filter: &str) -> HashSet<String> {
    filter
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Initialize the logger with optional debug filters
pub fn init_logger(level: LevelFilter, debug_filter: Option<String>) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(|| CarControlLogger {
        level,
        debug_filters: debug_filter.as_deref().map(parse_debug_filter),
    });
    log::set_logger(logger).map(|()| log::set_max_level(level))
}

// Topic-scoped debug macros. `debug_episode!` takes an `episode = .., tick = ..;` context prefix.
#[macro_export]
macro_rules! debug_vehicle {
    ($($arg:tt)*) => {
        log::debug!(target: "vehicle", "{}", format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_environment {
    ($($arg:tt)*) => {
        log::debug!(target: "environment", "{}", format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_episode {
    (episode = $episode:expr, tick = $tick:expr; $($arg:tt)*) => {
        log::debug!(target: "episode", "[E{:02}][T{:04}] {}", $episode, $tick, format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    #[test]
    fn test_context_prefix() {
        assert_eq!(context_prefix("Episode 3 finished at tick 120"), "[E03][T0120] ");
        assert_eq!(context_prefix("Episode 12 started"), "[E12] ");
        assert_eq!(context_prefix("no context here"), "");
        assert_eq!(context_prefix("[E01][T0002] already tagged tick 2"), "");
    }

    #[test]
    fn test_parse_debug_filter() {
        let filters = parse_debug_filter("vehicle, environment,,");
        assert_eq!(filters.len(), 2);
        assert!(filters.contains("vehicle"));
        assert!(filters.contains("environment"));
    }

    #[test]
    fn test_debug_filters_only_restrict_debug_output() {
        let logger = CarControlLogger {
            level: LevelFilter::Trace,
            debug_filters: Some(parse_debug_filter("vehicle")),
        };
        let debug_vehicle = Metadata::builder()
            .level(log::Level::Debug)
            .target("vehicle")
            .build();
        let debug_env = Metadata::builder()
            .level(log::Level::Debug)
            .target("environment")
            .build();
        let info_env = Metadata::builder()
            .level(log::Level::Info)
            .target("environment")
            .build();
        assert!(logger.enabled(&debug_vehicle));
        assert!(!logger.enabled(&debug_env));
        assert!(logger.enabled(&info_env));
    }

    #[test]
    fn test_level_threshold() {
        let logger = CarControlLogger {
            level: LevelFilter::Warn,
            debug_filters: None,
        };
        let info = Metadata::builder().level(log::Level::Info).target("x").build();
        let error = Metadata::builder().level(log::Level::Error).target("x").build();
        assert!(!logger.enabled(&info));
        assert!(logger.enabled(&error));
    }

    #[test]
    fn test_debug_macros_expand() {
        // No logger is installed here, so these only need to expand and run
        let speed = 12.5;
        crate::debug_vehicle!("speed {:.1}", speed);
        crate::debug_environment!("{} obstacles", 3);
        crate::debug_episode!(episode = 2, tick = 40; "reward {:.2}", 0.4);
        assert_eq!(context_prefix(&format!("[E{:02}][T{:04}] reward", 2, 40)), "");
    }
}
