use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Size used when `max_size_mb` is zero.
pub const DEFAULT_MAX_SIZE_MB: u64 = 100;

/// Timestamp embedded in backup file names, e.g. `app-2026-01-09T15-04-05.000.log`.
pub(crate) const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

/// When and how a log file is rotated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RotationPolicy {
    /// Maximum size in megabytes before rotation; 0 means 100.
    #[serde(rename = "maxSize")]
    pub max_size_mb: u64,
    /// Days to retain backups; 0 keeps them regardless of age.
    #[serde(rename = "maxAge")]
    pub max_age_days: u64,
    /// Backups to retain; 0 keeps all of them.
    pub max_backups: usize,
    /// Gzip backups after rotation.
    pub compress: bool,
    /// Use local time instead of UTC in backup names.
    pub local_time: bool,
}

impl RotationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_size_mb(mut self, max_size_mb: u64) -> Self {
        self.max_size_mb = max_size_mb;
        self
    }

    pub fn with_max_age_days(mut self, max_age_days: u64) -> Self {
        self.max_age_days = max_age_days;
        self
    }

    pub fn with_max_backups(mut self, max_backups: usize) -> Self {
        self.max_backups = max_backups;
        self
    }

    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_local_time(mut self, local_time: bool) -> Self {
        self.local_time = local_time;
        self
    }

    /// Maximum file size in bytes.
    pub fn max_size_bytes(&self) -> u64 {
        let mb = if self.max_size_mb == 0 {
            DEFAULT_MAX_SIZE_MB
        } else {
            self.max_size_mb
        };
        mb.saturating_mul(1024 * 1024)
    }

    /// Timestamp suffix for a backup made now.
    pub(crate) fn backup_timestamp(&self) -> String {
        if self.local_time {
            Local::now().format(BACKUP_TIME_FORMAT).to_string()
        } else {
            Utc::now().format(BACKUP_TIME_FORMAT).to_string()
        }
    }

    /// Parse a backup timestamp back into an instant.
    pub(crate) fn parse_backup_timestamp(&self, s: &str) -> Option<DateTime<Utc>> {
        let naive = NaiveDateTime::parse_from_str(s, BACKUP_TIME_FORMAT).ok()?;
        if self.local_time {
            Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|t| t.with_timezone(&Utc))
        } else {
            Some(Utc.from_utc_datetime(&naive))
        }
    }
}
