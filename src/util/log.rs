use std::fs;

use color_eyre::eyre::WrapErr;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LOG_ENV, LOG_FILE, get_data_dir};

/// Logs to `mplay.log` in the data directory. The filter comes from
/// `RUST_LOG`, then `MPLAY_LOGLEVEL`, then defaults to `info` for this crate.
pub fn initialize_logging() -> color_eyre::Result<()> {
    let directory = get_data_dir();
    fs::create_dir_all(&directory)
        .wrap_err_with(|| format!("creating {}", directory.display()))?;
    let log_path = directory.join(LOG_FILE.as_str());
    let log_file = fs::File::create(&log_path)
        .wrap_err_with(|| format!("creating {}", log_path.display()))?;

    let filter = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_ENV.as_str()))
        .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")));

    let file_subscriber = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_filter(EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(file_subscriber)
        .with(ErrorLayer::default())
        .try_init()?;

    Ok(())
}
