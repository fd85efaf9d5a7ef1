use chrono::Duration;
use tracing::warn;

use crate::config::Config;

pub const DEFAULT_ACTIVE_WINDOW_DAYS: i64 = 7;
pub const DEFAULT_RETENTION_DAYS: i64 = 30;
pub const DEFAULT_COPY_SUFFIX: &str = "copy";

/// Tunable display and lifecycle rules. The upcoming/overdue threshold
/// is deliberately configuration rather than a fixed business rule, as
/// is the retention period for completed tasks.
#[derive(Debug, Clone)]
pub struct Policy {
    /// A non-completed task older than this is shown as overdue.
    pub active_window: Duration,

    /// Completed tasks older than this are removed by the cleanup sweep.
    pub retention: Duration,

    /// Marker appended to a duplicated category's name, e.g. "copy"
    /// producing "Groceries (copy)". Kept configurable so localized
    /// frontends can substitute their own word.
    pub copy_suffix: String,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            active_window: Duration::days(DEFAULT_ACTIVE_WINDOW_DAYS),
            retention: Duration::days(DEFAULT_RETENTION_DAYS),
            copy_suffix: DEFAULT_COPY_SUFFIX.to_string(),
        }
    }
}

impl Policy {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            active_window: parse_days(
                cfg,
                "bucket.active_window_days",
                DEFAULT_ACTIVE_WINDOW_DAYS,
            ),
            retention: parse_days(cfg, "cleanup.retention_days", DEFAULT_RETENTION_DAYS),
            copy_suffix: cfg
                .get("category.copy_suffix")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_COPY_SUFFIX.to_string()),
        }
    }
}

fn parse_days(cfg: &Config, key: &str, default: i64) -> Duration {
    let fallback = Duration::days(default);
    let Some(raw) = cfg.get(key) else {
        return fallback;
    };
    match raw.trim().parse::<i64>() {
        // try_days guards against day counts chrono cannot represent
        Ok(days) if days >= 0 => match Duration::try_days(days) {
            Some(duration) => duration,
            None => {
                warn!(key, value = %raw, "day count out of range; using default");
                fallback
            }
        },
        _ => {
            warn!(key, value = %raw, "invalid day count; using default");
            fallback
        }
    }
}
