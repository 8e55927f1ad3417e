// src/session.rs - Line-delimited JSON session server, one engine per connection
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::{TcpListener, ToSocketAddrs};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::GestureConfig;
use crate::engine::GestureEngine;
use crate::landmarks::LandmarkFrame;
use crate::model::GestureModel;

/// Longest accepted frame line, newline excluded.
pub const MAX_FRAME_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames: u64,
    pub rejected: u64,
    pub commands: u64,
}

enum FrameLine {
    Line,
    Oversized,
    Closed,
}

/// Reads one newline-terminated line into `buf`, holding at most
/// `max_len + 1` bytes in memory. The rest of an oversized line is read and
/// dropped so the next call starts on a fresh line.
async fn read_frame_line<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_len: usize,
) -> std::io::Result<FrameLine>
where
    R: AsyncBufRead + Unpin,
{
    let limit = max_len as u64 + 1;
    buf.clear();
    let read = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
    if read == 0 {
        return Ok(FrameLine::Closed);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        return Ok(FrameLine::Line);
    }
    if buf.len() <= max_len {
        // final line without a trailing newline
        return Ok(FrameLine::Line);
    }

    loop {
        buf.clear();
        let read = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
        if read == 0 || buf.last() == Some(&b'\n') {
            break;
        }
    }
    buf.clear();
    Ok(FrameLine::Oversized)
}

pub async fn serve(
    addr: impl ToSocketAddrs,
    config: GestureConfig,
    model: Arc<dyn GestureModel>,
) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind gesture server socket")?;
    info!(
        "Gesture server listening on {}",
        listener.local_addr().context("Listener has no local address")?
    );
    serve_listener(listener, config, model).await
}

/// Accepts connections forever. Each connection gets its own engine; the
/// model is shared because backends are read-only.
pub async fn serve_listener(
    listener: TcpListener,
    config: GestureConfig,
    model: Arc<dyn GestureModel>,
) -> Result<()> {
    loop {
        let (stream, peer) = listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        let config = config.clone();
        let model = Arc::clone(&model);
        tokio::spawn(async move {
            info!("Client connected: {}", peer);
            match handle_session(stream, config, model).await {
                Ok(summary) => info!(
                    "Client disconnected: {} ({} frames, {} commands)",
                    peer, summary.frames, summary.commands
                ),
                Err(e) => error!("Session with {} ended with error: {:#}", peer, e),
            }
        });
    }
}

/// Runs one session to completion: reads `{"hands":..,"pose":..}` lines and
/// answers each emitted command with a `{"gesture":..}` line. Lines longer
/// than [`MAX_FRAME_BYTES`] are dropped unparsed. The engine is dropped when
/// the peer closes its side.
pub async fn handle_session<S>(
    stream: S,
    config: GestureConfig,
    model: Arc<dyn GestureModel>,
) -> Result<SessionSummary>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let session_id = Uuid::new_v4();
    let mut engine = GestureEngine::new(config, model);
    let mut summary = SessionSummary::default();

    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        let line = read_frame_line(&mut reader, &mut buf, MAX_FRAME_BYTES)
            .await
            .with_context(|| format!("Failed to read from session {session_id}"))?;
        match line {
            FrameLine::Closed => break,
            FrameLine::Oversized => {
                summary.rejected += 1;
                warn!(
                    "Session {}: dropping frame longer than {} bytes",
                    session_id, MAX_FRAME_BYTES
                );
                continue;
            }
            FrameLine::Line => {}
        }

        let text = match std::str::from_utf8(&buf) {
            Ok(text) => text.trim(),
            Err(e) => {
                summary.rejected += 1;
                warn!("Session {}: skipping non UTF-8 frame: {}", session_id, e);
                continue;
            }
        };
        if text.is_empty() {
            continue;
        }
        let frame = match LandmarkFrame::from_json(text) {
            Ok(frame) => frame,
            Err(e) => {
                summary.rejected += 1;
                warn!("Session {}: skipping malformed frame: {}", session_id, e);
                continue;
            }
        };
        summary.frames += 1;

        if let Some(command) = engine.process_frame(&frame) {
            let mut message = command.to_json();
            message.push('\n');
            writer
                .write_all(message.as_bytes())
                .await
                .with_context(|| format!("Failed to send command to session {session_id}"))?;
            summary.commands += 1;
            debug!("Session {}: sent {}", session_id, command);
        }
    }

    if let Err(e) = writer.flush().await {
        warn!("Session {}: failed to flush pending commands: {}", session_id, e);
    }
    Ok(summary)
}
