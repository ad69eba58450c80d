use anyhow::Result;
use tracing::debug;

use crate::messaging::InboundMessage;

use super::{BrowserApi, IdleState};

/// [BrowserApi] built from the events the extension forwards. Until the extension reports
/// otherwise the user is assumed active with nothing focused.
#[derive(Debug, Default)]
pub struct BridgeBrowser {
    active_url: Option<String>,
    /// Tab that was active when the browser lost focus.
    blurred_url: Option<String>,
    idle_state: IdleState,
    video_playing: bool,
}

impl BridgeBrowser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BrowserApi for BridgeBrowser {
    fn get_active_tab_url(&mut self) -> Result<Option<String>> {
        Ok(self.active_url.clone())
    }

    fn get_idle_state(&mut self) -> Result<IdleState> {
        Ok(self.idle_state)
    }

    fn is_video_playing(&mut self) -> bool {
        self.video_playing
    }

    fn observe(&mut self, message: &InboundMessage) {
        match message {
            InboundMessage::TabActivated { url } => {
                self.active_url = url.clone();
                self.blurred_url = None;
                // Playback state belongs to the previous tab.
                self.video_playing = false;
            }
            InboundMessage::TabUpdated { url } => {
                if self.active_url != *url {
                    self.video_playing = false;
                }
                self.active_url = url.clone();
            }
            InboundMessage::WindowFocusChanged {
                focused: false, ..
            } => {
                self.blurred_url = self.active_url.take().or(self.blurred_url.take());
                self.video_playing = false;
            }
            // Refocusing a window doesn't activate a tab, so the tab active before the blur is
            // restored unless the extension names the focused tab.
            InboundMessage::WindowFocusChanged { focused: true, url } => {
                if let Some(url) = url.clone().or(self.blurred_url.take()) {
                    self.active_url = Some(url);
                }
            }
            InboundMessage::IdleStateChanged { state } => self.idle_state = *state,
            InboundMessage::VideoStateChange { is_playing } => self.video_playing = *is_playing,
            InboundMessage::UpdateBadge => {}
        }
        debug!("Browser state is now {self:?}");
    }
}
