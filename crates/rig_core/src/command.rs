//! Outbound command writer for the duplex link to the rig.

use std::io;

use shared::protocol::Command;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Encodes and writes command bytes, flushing per command. Writes originate
/// from the consumer context; no ordering is guaranteed relative to inbound
/// reads beyond what the transport itself provides.
pub struct CommandWriter<W> {
    sink: W,
}

impl<W: AsyncWrite + Unpin> CommandWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub async fn send(&mut self, command: Command) -> io::Result<()> {
        let bytes = command.encode();
        debug!(?command, "sending command");
        self.sink.write_all(&bytes).await?;
        self.sink.flush().await
    }

    /// Command sequence for a session start: configure the trial count,
    /// select the protocol mode, then start.
    pub async fn start_sequence(&mut self, n_trials: u32, debug_mode: bool) -> io::Result<()> {
        self.send(Command::ConfigureTrials(n_trials)).await?;
        self.send(if debug_mode {
            Command::DebugOn
        } else {
            Command::DebugOff
        })
        .await?;
        self.send(Command::Start).await
    }

    pub async fn stop_sequence(&mut self) -> io::Result<()> {
        self.send(Command::End).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_sequence_emits_configure_mode_start() {
        let mut sink = Vec::new();
        {
            let mut writer = CommandWriter::new(&mut sink);
            writer.start_sequence(200, false).await.expect("send");
        }
        assert_eq!(sink, b"n200Ds");
    }

    #[tokio::test]
    async fn debug_session_selects_text_mode() {
        let mut sink = Vec::new();
        {
            let mut writer = CommandWriter::new(&mut sink);
            writer.start_sequence(20, true).await.expect("send");
        }
        assert_eq!(sink, b"n20ds");
    }

    #[tokio::test]
    async fn stop_and_force_stop_bytes() {
        let mut sink = Vec::new();
        {
            let mut writer = CommandWriter::new(&mut sink);
            writer.stop_sequence().await.expect("send");
            writer.send(Command::ForceStop).await.expect("send");
        }
        assert_eq!(sink, b"ef");
    }
}
