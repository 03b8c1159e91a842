use anyhow::Context as _;
use hello_triangle::{AppConfig, LoggingConfig, init_logging, run_with_config};

fn main() {
    init_logging(LoggingConfig::default());

    let result = run_with_config(AppConfig::default()).context("hello triangle failed");
    if let Err(err) = result {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}
