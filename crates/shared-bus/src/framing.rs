//! Length-prefixed message framing for the RPC transport.
//!
//! # Wire format
//!
//! ```text
//! [4-byte big-endian length][bincode payload]
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Maximum frame size accepted from the wire.
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024; // 16 MB

/// Errors from framing operations.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Socket I/O failed.
    #[error("frame I/O error: {0}")]
    Io(#[from] io::Error),

    /// Announced length exceeds [`MAX_FRAME_SIZE`].
    #[error("frame too large: {0} bytes")]
    TooLarge(usize),

    /// Payload could not be (de)serialized.
    #[error("frame codec error: {0}")]
    Codec(#[from] bincode::Error),
}

/// Write `data` as one length-prefixed frame and flush.
pub async fn write_frame<S: AsyncWrite + Unpin>(stream: &mut S, data: &[u8]) -> Result<(), FrameError> {
    if data.len() > MAX_FRAME_SIZE {
        return Err(FrameError::TooLarge(data.len()));
    }
    stream.write_all(&(data.len() as u32).to_be_bytes()).await?;
    stream.write_all(data).await?;
    stream.flush().await?;
    Ok(())
}

/// Read one length-prefixed frame.
pub async fn read_frame<S: AsyncRead + Unpin>(stream: &mut S) -> Result<Vec<u8>, FrameError> {
    let mut len_bytes = [0u8; 4];
    stream.read_exact(&mut len_bytes).await?;
    let len = u32::from_be_bytes(len_bytes) as usize;

    if len > MAX_FRAME_SIZE {
        return Err(FrameError::TooLarge(len));
    }

    let mut data = vec![0u8; len];
    stream.read_exact(&mut data).await?;
    Ok(data)
}

/// Serialize `message` and write it as a frame.
pub async fn write_message<S, T>(stream: &mut S, message: &T) -> Result<(), FrameError>
where
    S: AsyncWrite + Unpin,
    T: Serialize + ?Sized,
{
    let bytes = bincode::serialize(message)?;
    write_frame(stream, &bytes).await
}

/// Read a frame and deserialize it.
pub async fn read_message<S, T>(stream: &mut S) -> Result<T, FrameError>
where
    S: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let bytes = read_frame(stream).await?;
    Ok(bincode::deserialize(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_message_over_duplex() {
        let (mut client, mut server) = tokio::io::duplex(1024);

        write_message(&mut client, &("GetEpoch".to_string(), 7u64))
            .await
            .unwrap();
        let decoded: (String, u64) = read_message(&mut server).await.unwrap();

        assert_eq!(decoded, ("GetEpoch".to_string(), 7));
    }

    #[tokio::test]
    async fn test_read_frame_too_large() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&((MAX_FRAME_SIZE as u32) + 1).to_be_bytes());
        let mut cursor = std::io::Cursor::new(buf);

        let result = read_frame(&mut cursor).await;
        assert!(matches!(result, Err(FrameError::TooLarge(_))));
    }

    #[tokio::test]
    async fn test_read_frame_truncated_body() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&1000u32.to_be_bytes());
        buf.extend_from_slice(&[0u8; 10]);
        let mut cursor = std::io::Cursor::new(buf);

        let result = read_frame(&mut cursor).await;
        assert!(matches!(result, Err(FrameError::Io(_))));
    }

    #[tokio::test]
    async fn test_empty_stream() {
        let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
        assert!(matches!(read_frame(&mut cursor).await, Err(FrameError::Io(_))));
    }
}
