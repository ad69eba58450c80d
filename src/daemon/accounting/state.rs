use chrono::{DateTime, Local};

/// In-memory runtime of the accountant. Lives as long as the host process and is never persisted,
/// losing it loses at most the unflushed seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountantState {
    /// Start of the open session, if there is one.
    pub session_start: Option<DateTime<Local>>,
    pub last_active: Option<DateTime<Local>>,
    /// Hostname the unflushed seconds belong to.
    pub current_hostname: Option<String>,
    pub unflushed_seconds: u64,
    pub last_flush: DateTime<Local>,
}

impl AccountantState {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            session_start: None,
            last_active: None,
            current_hostname: None,
            unflushed_seconds: 0,
            last_flush: now,
        }
    }

    /// Whether the sample for `hostname` continues the open session.
    pub fn continues_session(&self, hostname: &str) -> bool {
        self.current_hostname.as_deref() == Some(hostname)
    }

    pub fn record_active(&mut self, hostname: &str, seconds: u64, now: DateTime<Local>) {
        if !self.continues_session(hostname) {
            self.current_hostname = Some(hostname.to_string());
        }
        self.session_start.get_or_insert(now);
        self.unflushed_seconds += seconds;
        self.last_active = Some(now);
    }

    /// Forgets the open session. Unflushed seconds have to be flushed before.
    pub fn close_session(&mut self) {
        self.session_start = None;
        self.current_hostname = None;
    }

    pub fn mark_flushed(&mut self, now: DateTime<Local>) {
        self.unflushed_seconds = 0;
        self.last_flush = now;
    }
}
