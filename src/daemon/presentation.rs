use anyhow::Result;
use tokio::sync::mpsc;
use tracing::debug;

use crate::{daemon::accounting::badge::Badge, messaging::OutboundMessage};

pub const NOTIFICATION_TITLE: &str = "sitetally";

/// Represents where the accountant's visible effects end up.
#[cfg_attr(test, mockall::automock)]
pub trait Presenter {
    fn show_badge(&mut self, badge: &Badge) -> Result<()>;

    /// Announces that the day total reached `hours` hours.
    fn notify_milestone(&mut self, hours: u32) -> Result<()>;
}

pub fn milestone_message(hours: u32) -> String {
    let plural = if hours > 1 { "s" } else { "" };
    format!("You've spent {hours} hour{plural} on tracked websites today.")
}

/// [Presenter] that turns effects into native messages for the extension. The badge is only sent
/// when it changes.
pub struct MessagingPresenter {
    sender: mpsc::UnboundedSender<OutboundMessage>,
    last_badge: Option<Badge>,
}

impl MessagingPresenter {
    pub fn new(sender: mpsc::UnboundedSender<OutboundMessage>) -> Self {
        Self {
            sender,
            last_badge: None,
        }
    }
}

impl Presenter for MessagingPresenter {
    fn show_badge(&mut self, badge: &Badge) -> Result<()> {
        if self.last_badge.as_ref() == Some(badge) {
            return Ok(());
        }
        debug!("Painting badge {}", badge.text);
        self.sender.send(OutboundMessage::SetBadge {
            text: badge.text.clone(),
            color: badge.color.to_string(),
        })?;
        self.last_badge = Some(badge.clone());
        Ok(())
    }

    fn notify_milestone(&mut self, hours: u32) -> Result<()> {
        self.sender.send(OutboundMessage::Notify {
            hours,
            title: NOTIFICATION_TITLE.to_string(),
            message: milestone_message(hours),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tokio::sync::mpsc;

    use super::{milestone_message, MessagingPresenter, Presenter};
    use crate::{daemon::accounting::badge::Badge, messaging::OutboundMessage};

    #[test]
    fn test_milestone_message() {
        assert_eq!(
            milestone_message(1),
            "You've spent 1 hour on tracked websites today."
        );
        assert_eq!(
            milestone_message(3),
            "You've spent 3 hours on tracked websites today."
        );
    }

    #[test]
    fn test_unchanged_badge_is_sent_once() -> Result<()> {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let mut presenter = MessagingPresenter::new(sender);
        presenter.show_badge(&Badge::from_minutes(5))?;
        presenter.show_badge(&Badge::from_minutes(5))?;
        presenter.show_badge(&Badge::from_minutes(6))?;
        presenter.notify_milestone(1)?;

        let mut received = vec![];
        while let Ok(message) = receiver.try_recv() {
            received.push(message);
        }
        assert_eq!(received.len(), 3);
        assert!(matches!(&received[1], OutboundMessage::SetBadge { text, .. } if text == "6m"));
        assert!(matches!(received[2], OutboundMessage::Notify { hours: 1, .. }));
        Ok(())
    }
}
