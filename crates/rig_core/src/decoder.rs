//! Frame decoder: turns a raw byte source into a sequence of [`Event`]s.

use shared::{
    error::DecodeError,
    protocol::{payload_len, Event, SYNC_MARKER, TASK_DONE},
};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

/// Lazy decoder over any byte source.
///
/// The mode is fixed for the lifetime of one connection: in debug mode every
/// call reads one newline-terminated text line; in binary mode every call
/// consumes exactly one frame. A call that finds the source closed at a
/// frame boundary yields `Ok(None)`; a source that closes mid-frame is a
/// fatal [`DecodeError::TruncatedFrame`].
pub struct FrameDecoder<R> {
    reader: BufReader<R>,
    debug: bool,
}

impl<R: AsyncRead + Unpin> FrameDecoder<R> {
    pub fn new(source: R, debug: bool) -> Self {
        Self {
            reader: BufReader::new(source),
            debug,
        }
    }

    /// Decode the next event, suspending until enough bytes are available.
    pub async fn next_event(&mut self) -> Result<Option<Event>, DecodeError> {
        if self.debug {
            return Ok(self
                .read_line_from(&[])
                .await?
                .map(|line| Event::Debug { line }));
        }

        let mut first = [0u8; 1];
        if self.reader.read(&mut first).await? == 0 {
            return Ok(None);
        }

        if first[0] != SYNC_MARKER {
            // Firmware fell back to plain text; consume through the
            // terminator so the next call starts on a fresh record.
            let line = self
                .read_line_from(&first)
                .await?
                .unwrap_or_default();
            return Ok(Some(Event::NonBinaryLine { line }));
        }

        let mut cmd = [0u8; 1];
        if self.reader.read(&mut cmd).await? == 0 {
            return Err(DecodeError::TruncatedHeader);
        }
        let cmd = cmd[0];

        let event = match payload_len(cmd) {
            Some(needed) => {
                let payload = self.read_payload(cmd, needed).await?;
                decode_frame(cmd, &payload)
            }
            // No payload may be assumed for an unrecognized code; consuming
            // anything here would desynchronize the stream.
            None => Event::Unknown { cmd },
        };
        Ok(Some(event))
    }

    /// Read a full payload of `needed` bytes; EOF inside it is fatal.
    async fn read_payload(&mut self, cmd: u8, needed: usize) -> Result<Vec<u8>, DecodeError> {
        let mut payload = vec![0u8; needed];
        let mut got = 0;
        while got < needed {
            let n = self.reader.read(&mut payload[got..]).await?;
            if n == 0 {
                return Err(DecodeError::TruncatedFrame { cmd, needed, got });
            }
            got += n;
        }
        Ok(payload)
    }

    /// Read up to and including a line terminator, prepend any bytes already
    /// consumed, and return the line with trailing whitespace stripped.
    /// `Ok(None)` only when nothing at all was read (clean EOF).
    async fn read_line_from(&mut self, prefix: &[u8]) -> Result<Option<String>, DecodeError> {
        let mut raw = prefix.to_vec();
        let n = self.reader.read_until(b'\n', &mut raw).await?;
        if n == 0 && raw.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            String::from_utf8_lossy(&raw).trim_end().to_string(),
        ))
    }
}

/// Decode one binary frame body given its command code and full payload.
fn decode_frame(cmd: u8, payload: &[u8]) -> Event {
    let t = |p: &[u8]| u32::from_le_bytes([p[0], p[1], p[2], p[3]]);
    match cmd {
        0..=39 => Event::VrSample {
            cmd,
            t: t(payload),
            y: u16::from_le_bytes([payload[4], payload[5]]),
        },
        40..=49 => Event::Sync { cmd, t: t(payload) },
        60..=69 => Event::TrialState {
            cmd,
            t: t(payload),
            state: cmd - 60,
            trial: u16::from_le_bytes([payload[4], payload[5]]),
        },
        70..=79 => Event::Laser { cmd, t: t(payload) },
        80..=89 => Event::Reward { cmd, t: t(payload) },
        TASK_DONE => Event::Done { cmd },
        // Unreachable while the bucket table and this match agree.
        _ => Event::Unknown { cmd },
    }
}

#[cfg(test)]
#[path = "tests/decoder_tests.rs"]
mod tests;
