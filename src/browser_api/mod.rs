//! Contains the contract the accountant uses to look at the browser. [bridge::BridgeBrowser] is
//! the main artifact of this module, it mirrors browser state out of native messages.

pub mod bridge;

use std::fmt::Display;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::messaging::InboundMessage;

/// User activity as classified by the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdleState {
    #[default]
    Active,
    Idle,
    Locked,
}

impl Display for IdleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdleState::Active => write!(f, "active"),
            IdleState::Idle => write!(f, "idle"),
            IdleState::Locked => write!(f, "locked"),
        }
    }
}

/// Intended to serve as a contract between the accountant and whatever knows the browser state.
#[cfg_attr(test, mockall::automock)]
pub trait BrowserApi {
    /// Url of the focused tab. [None] when no browser window is focused.
    fn get_active_tab_url(&mut self) -> Result<Option<String>>;

    fn get_idle_state(&mut self) -> Result<IdleState>;

    /// Whether a video is playing in the focused tab.
    fn is_video_playing(&mut self) -> bool;

    /// Folds a browser event into the known state.
    fn observe(&mut self, message: &InboundMessage);
}
