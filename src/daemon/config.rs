use std::time::Duration;

use super::accounting::hostname::MatchMode;

pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_IDLE_THRESHOLD_SECONDS: u32 = 60;
pub const HISTORY_LIMIT: usize = 30;

/// Tunables of the accountant and its scheduler.
#[derive(Debug, Clone)]
pub struct AccountantConfig {
    /// How often the active tab is sampled. Every tracked sample counts as one second.
    pub sample_interval: Duration,
    /// How often unflushed seconds are persisted. This bounds what a crash can lose.
    pub flush_interval: Duration,
    /// Idle threshold the extension should use when classifying the user.
    pub idle_threshold_seconds: u32,
    pub history_limit: usize,
    pub match_mode: MatchMode,
    /// Treat an idle user as active while a video plays in the focused tab.
    pub count_video_as_active: bool,
}

impl Default for AccountantConfig {
    fn default() -> Self {
        Self {
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            idle_threshold_seconds: DEFAULT_IDLE_THRESHOLD_SECONDS,
            history_limit: HISTORY_LIMIT,
            match_mode: MatchMode::Strict,
            count_video_as_active: true,
        }
    }
}
