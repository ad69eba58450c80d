/// Background color of the badge.
pub const BADGE_COLOR: &str = "#2196F3";

/// What the extension paints on its toolbar icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub text: String,
    pub color: &'static str,
}

impl Badge {
    pub fn from_minutes(minutes: u64) -> Self {
        Self {
            text: format_badge_text(minutes),
            color: BADGE_COLOR,
        }
    }
}

/// Compact duration used by the badge: `5m`, `1h`, `2h5m`.
pub fn format_badge_text(minutes: u64) -> String {
    if minutes < 60 {
        return format!("{minutes}m");
    }
    let hours = minutes / 60;
    match minutes % 60 {
        0 => format!("{hours}h"),
        rest => format!("{hours}h{rest}m"),
    }
}

/// Minutes shown by the badge: everything persisted for the day plus what is still in memory.
pub fn projected_minutes(persisted_seconds: u64, unflushed_seconds: u64) -> u64 {
    (persisted_seconds + unflushed_seconds) / 60
}
