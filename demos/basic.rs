//! Basic configured logging example.
//!
//! Loads `demos/cfglog.yaml` and logs through the appenders it declares.
//!
//! Run with:
//! ```bash
//! cargo run --example basic
//! ```

use cfglog::{ConfigOption, get_logger};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let option = ConfigOption::new().with_search_paths(["demos", "."]);

    let (logger, err) = get_logger(Some(&option));
    if let Some(err) = err {
        eprintln!("no configured logger, using the fallback: {}", err);
    }
    logger.try_init_global()?;

    tracing::debug!("This is a debug message");
    tracing::info!(user = "alice", "This is an info message");
    tracing::warn!("This is a warning message");
    tracing::error!("This is an error message");

    logger.sync()?;
    Ok(())
}
