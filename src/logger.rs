use chrono::Local;
use fern::Dispatch;
use log::LevelFilter;
use std::fs;

// Define where to store logs
const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "atc.log";

/// Initializes the global logger for one process of the network.
///
/// `role` tags every line (`controller`, `airport-0`, ...), because the controller and all
/// airport node processes append to the same log file.
///
/// Log level is controlled by the `RUST_LOG` environment variable.
/// Example: `RUST_LOG=debug atc -n 2 -- 3 4`
///
/// If `RUST_LOG` is not set, it defaults to `info`.
/// Logs will be written to `logs/atc.log` and to stderr.
pub fn init(role: &str) {
    if let Err(e) = fs::create_dir_all(LOG_DIR) {
        eprintln!("Failed to create log directory at '{}': {}", LOG_DIR, e);
    }

    let log_file_path = format!("{}/{}", LOG_DIR, LOG_FILE);

    // Get the log level from RUST_LOG, defaulting to "info" (RUST_LOG=debug or RUST_LOG=warn)
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let log_level_filter = log_level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info);

    let base_config = Dispatch::new().level(log_level_filter).level_for("mio", LevelFilter::Warn).level_for("tokio_util", LevelFilter::Warn);

    let console_role = role.to_string();
    let console_config = Dispatch::new()
        .format(move |out, message, record| {
            let colors = fern::colors::ColoredLevelConfig::new()
                .error(fern::colors::Color::Red)
                .warn(fern::colors::Color::Yellow)
                .info(fern::colors::Color::Green)
                .debug(fern::colors::Color::Blue)
                .trace(fern::colors::Color::BrightBlack);

            out.finish(format_args!(
                "[{} {} {}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                colors.color(record.level()),
                console_role,
                message
            ))
        })
        .chain(std::io::stderr());

    let file_role = role.to_string();
    let file_config = Dispatch::new().format(move |out, message, record| {
        out.finish(format_args!(
            "[{} {} {} {}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            file_role,
            record.target(),
            message
        ))
    });

    let dispatch = match fern::log_file(&log_file_path) {
        Ok(file) => base_config.chain(console_config).chain(file_config.chain(file)),
        Err(e) => {
            eprintln!("Failed to open log file '{}': {}", log_file_path, e);
            base_config.chain(console_config)
        }
    };

    dispatch.apply().unwrap_or_else(|e| {
        eprintln!("Failed to apply logger configuration: {}", e);
    });

    log::debug!("Logger initialized. Logging to stderr and '{}'.", log_file_path);
}
