use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;

use super::{
    accounting::hostname::MatchMode,
    config::{AccountantConfig, DEFAULT_FLUSH_INTERVAL, DEFAULT_IDLE_THRESHOLD_SECONDS},
};

#[derive(Parser, Debug, Clone)]
pub struct HostArgs {
    /// Application directory. By default $XDG_STATE_HOME/sitetally or $HOME/.local/state/sitetally
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// Mirror logs to stderr. This option is for debugging purposes only.
    #[arg(long = "log-console")]
    pub log_console: bool,
    #[arg(long = "log-filter")]
    pub log: Option<LevelFilter>,
    #[command(flatten)]
    pub tuning: TuningArgs,
    /// Browsers launch native hosts with the calling extension's origin as arguments.
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub caller: Vec<String>,
}

impl HostArgs {
    pub fn accountant_config(&self) -> AccountantConfig {
        self.tuning.accountant_config()
    }
}

/// Accounting knobs shared by the native host and `sitetally serve`.
#[derive(clap::Args, Debug, Clone)]
pub struct TuningArgs {
    /// Seconds without input after which the browser reports the user as idle.
    #[arg(long, default_value_t = DEFAULT_IDLE_THRESHOLD_SECONDS)]
    pub idle_threshold: u32,
    /// Seconds between flushes of accumulated time.
    #[arg(long, default_value_t = DEFAULT_FLUSH_INTERVAL.as_secs(), value_parser = clap::value_parser!(u64).range(1..))]
    pub flush_interval: u64,
    /// Also match hostnames a tracked entry ends with, e.g. `google.com` for `mail.google.com`.
    #[arg(long)]
    pub lenient_matching: bool,
    /// Don't count idle time while a video plays.
    #[arg(long)]
    pub ignore_video: bool,
}

impl TuningArgs {
    pub fn accountant_config(&self) -> AccountantConfig {
        AccountantConfig {
            flush_interval: std::time::Duration::from_secs(self.flush_interval),
            idle_threshold_seconds: self.idle_threshold,
            match_mode: if self.lenient_matching {
                MatchMode::Lenient
            } else {
                MatchMode::Strict
            },
            count_video_as_active: !self.ignore_video,
            ..AccountantConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::Parser;

    use super::HostArgs;
    use crate::daemon::accounting::hostname::MatchMode;

    #[test]
    fn test_default_config() {
        let args = HostArgs::parse_from(["sitetally-host"]);
        let config = args.accountant_config();
        assert_eq!(config.flush_interval, Duration::from_secs(10));
        assert_eq!(config.sample_interval, Duration::from_secs(1));
        assert_eq!(config.idle_threshold_seconds, 60);
        assert_eq!(config.match_mode, MatchMode::Strict);
        assert!(config.count_video_as_active);
    }

    #[test]
    fn test_flags_override_config() {
        let args = HostArgs::parse_from([
            "sitetally-host",
            "--flush-interval",
            "30",
            "--lenient-matching",
            "--ignore-video",
        ]);
        let config = args.accountant_config();
        assert_eq!(config.flush_interval, Duration::from_secs(30));
        assert_eq!(config.match_mode, MatchMode::Lenient);
        assert!(!config.count_video_as_active);
    }

    #[test]
    fn test_browser_arguments_are_accepted() {
        let args = HostArgs::parse_from([
            "sitetally-host",
            "chrome-extension://abcdefghijklmnop/",
            "--parent-window=0",
        ]);
        assert_eq!(args.caller.len(), 2);
    }

    #[test]
    fn test_zero_flush_interval_is_rejected() {
        assert!(HostArgs::try_parse_from(["sitetally-host", "--flush-interval", "0"]).is_err());
    }
}
