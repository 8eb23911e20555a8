use thiserror::Error;

/// Fatal conditions raised by the frame decoder.
///
/// Unrecognized command codes are not errors: they decode to
/// [`crate::protocol::Event::Unknown`] so the stream stays synchronized and
/// the session keeps running.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The source closed mid-payload; the stream is desynchronized beyond
    /// recovery and the decode loop must terminate.
    #[error("stream ended inside frame for cmd {cmd}: needed {needed} payload bytes, got {got}")]
    TruncatedFrame { cmd: u8, needed: usize, got: usize },

    /// The source closed after a sync marker but before the command byte.
    #[error("stream ended after sync marker before a command byte")]
    TruncatedHeader,

    /// The byte source reported a fault. End-of-stream at a frame boundary
    /// is not reported here; it ends the event sequence cleanly.
    #[error("byte source fault: {0}")]
    Source(#[from] std::io::Error),
}
