//! Build a logger in code, without a config file.
//!
//! Debug records go to a rotating JSON file, warnings and errors to the
//! console.
//!
//! Run with:
//! ```bash
//! cargo run --example multi_appender
//! ```

use cfglog::{
    AppenderSpec, DurationEncoding, EncoderConfig, EncoderKind, LevelEncoding, LoggerBuilder,
    LoggerOption, RotationPolicy, Target,
};
use tracing::Level;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let file = AppenderSpec {
        name: "file".to_string(),
        target: Target::RotatingFile {
            path: "logs/multi_appender.log".into(),
            policy: RotationPolicy::new()
                .with_max_size_mb(10)
                .with_max_backups(3)
                .with_compress(true),
        },
        encoder_config: EncoderConfig {
            encode_duration: DurationEncoding::Millis,
            ..EncoderConfig::default()
        },
        encoder_kind: EncoderKind::Json,
        level: Level::DEBUG,
    };

    let console = AppenderSpec {
        name: "console".to_string(),
        target: Target::Stdout,
        encoder_config: EncoderConfig {
            encode_level: LevelEncoding::CapitalColor,
            ..EncoderConfig::development()
        },
        encoder_kind: EncoderKind::Console,
        level: Level::WARN,
    };

    std::fs::create_dir_all("logs")?;

    let logger = LoggerBuilder::new()
        .with_appenders([file, console])
        .with_option(LoggerOption::AddCaller)
        .with_option(LoggerOption::Fields(vec![(
            "demo".to_string(),
            "multi_appender".to_string(),
        )]))
        .build();

    logger.in_scope(|| {
        let span = tracing::info_span!("batch", size = 3);
        let _guard = span.enter();

        for item in 0..3 {
            tracing::debug!(item, "processing");
        }
        tracing::warn!("one item was skipped");
    });

    logger.sync()?;
    Ok(())
}
