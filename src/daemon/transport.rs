use anyhow::Result;
use futures::StreamExt;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::messaging::{
    codec::{message_stream, write_message},
    InboundMessage, OutboundMessage,
};

/// Decodes browser messages and hands them to the scheduler. Dropping the sender at the end tells
/// the scheduler the browser is gone.
pub async fn forward_inbound(
    reader: impl AsyncRead + Unpin,
    next: mpsc::Sender<InboundMessage>,
    shutdown: CancellationToken,
) {
    let messages = message_stream::<InboundMessage, _>(reader);
    tokio::pin!(messages);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            message = messages.next() => {
                let Some(message) = message else {
                    info!("Browser closed the input stream");
                    break;
                };
                if next.send(message).await.is_err() {
                    break;
                }
            }
        }
    }
}

/// Writes commands for the extension until every sender is gone.
pub async fn write_outbound(
    mut writer: impl AsyncWrite + Unpin,
    mut receiver: mpsc::UnboundedReceiver<OutboundMessage>,
) -> Result<()> {
    while let Some(message) = receiver.recv().await {
        debug!("Sending {message:?}");
        write_message(&mut writer, &message).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use anyhow::Result;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    use super::{forward_inbound, write_outbound};
    use crate::messaging::{codec::read_frame, InboundMessage, OutboundMessage};

    #[tokio::test]
    async fn test_forward_inbound_until_end_of_input() {
        let mut bytes = Vec::new();
        for body in [r#"{"action":"updateBadge"}"#, r#"{"action":"tabUpdated"}"#] {
            bytes.extend((body.len() as u32).to_ne_bytes());
            bytes.extend(body.as_bytes());
        }
        let (sender, mut receiver) = mpsc::channel(8);

        forward_inbound(Cursor::new(bytes), sender, CancellationToken::new()).await;

        assert_eq!(receiver.recv().await, Some(InboundMessage::UpdateBadge));
        assert_eq!(
            receiver.recv().await,
            Some(InboundMessage::TabUpdated { url: None })
        );
        assert_eq!(receiver.recv().await, None);
    }

    #[tokio::test]
    async fn test_write_outbound_frames_messages() -> Result<()> {
        let (sender, receiver) = mpsc::unbounded_channel();
        sender.send(OutboundMessage::SetBadge {
            text: "5m".into(),
            color: "#2196F3".into(),
        })?;
        drop(sender);

        let mut buffer = Vec::new();
        write_outbound(&mut buffer, receiver).await?;

        let mut reader = Cursor::new(buffer);
        let frame = read_frame(&mut reader).await?.unwrap();
        let message: OutboundMessage = serde_json::from_slice(&frame)?;
        assert!(matches!(message, OutboundMessage::SetBadge { text, .. } if text == "5m"));
        Ok(())
    }
}
