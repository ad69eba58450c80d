//! Messages exchanged with the browser extension. The extension side is a thin shim that forwards
//! browser events and applies the commands it receives.

pub mod codec;

use serde::{Deserialize, Serialize};

use crate::browser_api::IdleState;

/// Signals sent by the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum InboundMessage {
    /// Another tab became active.
    TabActivated {
        #[serde(default)]
        url: Option<String>,
    },
    /// The active tab navigated somewhere else.
    TabUpdated {
        #[serde(default)]
        url: Option<String>,
    },
    /// `url` is the active tab of the window that gained focus, when the extension knows it.
    WindowFocusChanged {
        focused: bool,
        #[serde(default)]
        url: Option<String>,
    },
    IdleStateChanged { state: IdleState },
    #[serde(rename_all = "camelCase")]
    VideoStateChange { is_playing: bool },
    /// The popup asks for the badge to be repainted.
    UpdateBadge,
}

/// Commands sent to the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum OutboundMessage {
    #[serde(rename_all = "camelCase")]
    Configure { idle_threshold_seconds: u32 },
    SetBadge { text: String, color: String },
    Notify {
        hours: u32,
        title: String,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::{InboundMessage, OutboundMessage};
    use crate::browser_api::IdleState;

    #[test]
    fn test_parse_inbound_messages() -> anyhow::Result<()> {
        let parsed: Vec<InboundMessage> = serde_json::from_str(
            r#"[
                {"action": "tabActivated", "url": "https://youtube.com"},
                {"action": "tabActivated"},
                {"action": "windowFocusChanged", "focused": false},
                {"action": "windowFocusChanged", "focused": true, "url": "https://reddit.com"},
                {"action": "idleStateChanged", "state": "locked"},
                {"action": "videoStateChange", "isPlaying": true},
                {"action": "updateBadge"}
            ]"#,
        )?;
        assert_eq!(
            parsed,
            vec![
                InboundMessage::TabActivated {
                    url: Some("https://youtube.com".into())
                },
                InboundMessage::TabActivated { url: None },
                InboundMessage::WindowFocusChanged {
                    focused: false,
                    url: None
                },
                InboundMessage::WindowFocusChanged {
                    focused: true,
                    url: Some("https://reddit.com".into())
                },
                InboundMessage::IdleStateChanged {
                    state: IdleState::Locked
                },
                InboundMessage::VideoStateChange { is_playing: true },
                InboundMessage::UpdateBadge,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        assert!(serde_json::from_str::<InboundMessage>(r#"{"action": "reload"}"#).is_err());
    }

    #[test]
    fn test_outbound_shape() -> anyhow::Result<()> {
        let value = serde_json::to_value(OutboundMessage::Configure {
            idle_threshold_seconds: 60,
        })?;
        assert_eq!(
            value,
            serde_json::json!({"action": "configure", "idleThresholdSeconds": 60})
        );
        let value = serde_json::to_value(OutboundMessage::SetBadge {
            text: "1h".into(),
            color: "#2196F3".into(),
        })?;
        assert_eq!(
            value,
            serde_json::json!({"action": "setBadge", "text": "1h", "color": "#2196F3"})
        );
        Ok(())
    }
}
