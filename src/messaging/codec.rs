//! Native messaging framing: every message is a 32 bit length in native byte order followed by
//! that many bytes of UTF-8 JSON.

use std::io::ErrorKind;

use anyhow::{bail, Result};
use futures::{stream, Stream};
use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::warn;

/// Browsers refuse messages from the host above this size.
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Reads a single frame. Returns [None] when the stream ends cleanly before a new frame starts.
pub async fn read_frame(reader: &mut (impl AsyncRead + Unpin)) -> Result<Option<Vec<u8>>> {
    let mut header = [0u8; 4];
    match reader.read_exact(&mut header).await {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_ne_bytes(header) as usize;
    if len > MAX_FRAME_LEN {
        bail!("Frame of {len} bytes exceeds the limit of {MAX_FRAME_LEN} bytes");
    }

    let mut body = vec![0; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(body))
}

pub async fn write_message<T: Serialize>(
    writer: &mut (impl AsyncWrite + Unpin),
    message: &T,
) -> Result<()> {
    let body = serde_json::to_vec(message)?;
    if body.len() > MAX_FRAME_LEN {
        bail!("Message of {} bytes exceeds the limit of {MAX_FRAME_LEN} bytes", body.len());
    }
    writer.write_all(&(body.len() as u32).to_ne_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

/// Turns a reader into a stream of decoded messages. Frames that don't decode into `T` are logged
/// and skipped, the stream ends on end of input or on a broken frame.
pub fn message_stream<T, R>(reader: R) -> impl Stream<Item = T>
where
    T: DeserializeOwned,
    R: AsyncRead + Unpin,
{
    stream::unfold(reader, |mut reader| async move {
        loop {
            match read_frame(&mut reader).await {
                Ok(Some(frame)) => match serde_json::from_slice::<T>(&frame) {
                    Ok(message) => return Some((message, reader)),
                    Err(e) => warn!(
                        "Skipping message {:?}: {e}",
                        String::from_utf8_lossy(&frame)
                    ),
                },
                Ok(None) => return None,
                Err(e) => {
                    warn!("Stopping message stream: {e:?}");
                    return None;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use anyhow::Result;
    use futures::StreamExt;

    use super::{message_stream, read_frame, write_message, MAX_FRAME_LEN};
    use crate::messaging::InboundMessage;

    fn frame(body: &str) -> Vec<u8> {
        let mut bytes = (body.len() as u32).to_ne_bytes().to_vec();
        bytes.extend_from_slice(body.as_bytes());
        bytes
    }

    #[tokio::test]
    async fn test_write_then_read_frame() -> Result<()> {
        let mut buffer = Vec::new();
        write_message(&mut buffer, &serde_json::json!({"action": "updateBadge"})).await?;

        let mut reader = Cursor::new(buffer);
        let body = read_frame(&mut reader).await?.unwrap();
        assert_eq!(body, br#"{"action":"updateBadge"}"#);
        assert_eq!(read_frame(&mut reader).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_oversized_frame_is_rejected() {
        let header = ((MAX_FRAME_LEN + 1) as u32).to_ne_bytes().to_vec();
        let mut reader = Cursor::new(header);
        assert!(read_frame(&mut reader).await.is_err());
    }

    #[tokio::test]
    async fn test_truncated_body_is_an_error() {
        let mut bytes = frame(r#"{"action":"updateBadge"}"#);
        bytes.truncate(10);
        let mut reader = Cursor::new(bytes);
        assert!(read_frame(&mut reader).await.is_err());
    }

    #[tokio::test]
    async fn test_stream_skips_unknown_messages() {
        let mut bytes = frame(r#"{"action":"reload"}"#);
        bytes.extend(frame(r#"{"action":"updateBadge"}"#));
        bytes.extend(frame("not json"));
        bytes.extend(frame(r#"{"action":"windowFocusChanged","focused":false}"#));

        let messages = message_stream::<InboundMessage, _>(Cursor::new(bytes))
            .collect::<Vec<_>>()
            .await;

        assert_eq!(
            messages,
            vec![
                InboundMessage::UpdateBadge,
                InboundMessage::WindowFocusChanged {
                    focused: false,
                    url: None
                }
            ]
        );
    }
}
