//! Host-side core for the avoidance-task rig: frame decoding, session
//! counters, velocity trace, and the decode-loop task.
//!
//! Transport is a collaborator, not a concern of this crate: the decode
//! loop takes any `AsyncRead` byte source and pushes decoded events to the
//! consumer over an ordered channel; the consumer owns [`SessionState`],
//! [`VelocityTrace`], and the event log.

use shared::{error::DecodeError, protocol::Event};
use tokio::{
    io::AsyncRead,
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{error, info};

pub mod command;
pub mod config;
pub mod decoder;
pub mod logger;
pub mod session;
pub mod trace;

pub use command::CommandWriter;
pub use config::{load_settings, Settings};
pub use decoder::FrameDecoder;
pub use logger::{session_log_path, EventLogger};
pub use session::SessionState;
pub use trace::VelocityTrace;

/// Spawn the decode loop for one connection.
///
/// Events are sent in decode order on `events`; the channel is unbounded so
/// the loop never blocks on a slow consumer and never reorders. The loop
/// terminates when the source closes cleanly, when the consumer drops the
/// receiver, or when `stop` flips to `true`. Stopping is cooperative and
/// best-effort: a loop parked inside a multi-byte payload read is only
/// interrupted at its next await point.
///
/// Fatal conditions (truncated frame, source fault) are logged and returned
/// through the join handle so the consumer can tear down.
pub fn spawn_decode_loop<R>(
    source: R,
    debug: bool,
    events: mpsc::UnboundedSender<Event>,
    mut stop: watch::Receiver<bool>,
) -> JoinHandle<Result<(), DecodeError>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut decoder = FrameDecoder::new(source, debug);
        loop {
            tokio::select! {
                // Resolves only when the flag reads true (or the sender is
                // gone), so a republished `false` can never cancel a frame
                // mid-read.
                _ = stop.wait_for(|flag| *flag) => {
                    info!("decode loop stopped");
                    return Ok(());
                }
                next = decoder.next_event() => match next {
                    Ok(Some(event)) => {
                        if events.send(event).is_err() {
                            info!("event consumer gone, stopping decode loop");
                            return Ok(());
                        }
                    }
                    Ok(None) => {
                        info!("byte source closed");
                        return Ok(());
                    }
                    Err(err) => {
                        error!(%err, "decode loop terminated");
                        return Err(err);
                    }
                }
            }
        }
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
