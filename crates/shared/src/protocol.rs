//! Wire model for the behavioral-rig serial protocol.
//!
//! Binary frames are `[0xFF, cmd, payload...]` with all integer fields
//! little-endian. The command byte selects a contiguous bucket of codes that
//! share one payload layout; the bucket table is the single source of truth
//! for payload lengths, so adding a command means extending the table, not
//! branching ad hoc in the decoder.

use serde::{Deserialize, Serialize};

/// Byte that opens every binary frame.
pub const SYNC_MARKER: u8 = 0xFF;

/// Laser command code that marks the end of a tagging block.
pub const LASER_TAGGING_DONE: u8 = 79;

/// Command code sent by the firmware when the task is finished.
pub const TASK_DONE: u8 = 99;

/// One decoded record from the rig, one variant per command bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Free-form diagnostic line, only produced in debug mode.
    Debug { line: String },
    /// Locomotion sample: timestamp in microseconds and raw encoder count.
    VrSample { cmd: u8, t: u32, y: u16 },
    /// Synchronization pulse.
    Sync { cmd: u8, t: u32 },
    /// Trial state-machine transition; `state` is `cmd - 60`.
    TrialState { cmd: u8, t: u32, state: u8, trial: u16 },
    Laser { cmd: u8, t: u32 },
    Reward { cmd: u8, t: u32 },
    /// Terminal event of a session (`cmd == 99`).
    Done { cmd: u8 },
    /// Command code outside every enumerated bucket; carries no payload.
    Unknown { cmd: u8 },
    /// Text line received while expecting binary framing (first byte != 0xFF).
    NonBinaryLine { line: String },
}

/// Payload length in bytes after the two-byte `[marker, cmd]` header.
///
/// `None` means the code is outside every enumerated bucket: the decoder
/// must consume no payload for it, otherwise the stream desynchronizes.
pub fn payload_len(cmd: u8) -> Option<usize> {
    match cmd {
        0..=39 => Some(10),
        40..=49 => Some(6),
        60..=69 => Some(8),
        70..=79 => Some(6),
        80..=89 => Some(4),
        TASK_DONE => Some(0),
        _ => None,
    }
}

impl Event {
    /// Canonical log-line form: comma-separated decoded fields, no header.
    ///
    /// Byte-compatible with the flat text logs written by earlier rig hosts,
    /// so existing analysis scripts keep working.
    pub fn log_line(&self) -> String {
        match self {
            Event::Debug { line } | Event::NonBinaryLine { line } => format!("0,{line}"),
            Event::VrSample { cmd, t, y } => format!("{cmd},{t},{y}"),
            Event::Sync { cmd, t } | Event::Laser { cmd, t } | Event::Reward { cmd, t } => {
                format!("{cmd},{t}")
            }
            Event::TrialState {
                cmd,
                t,
                state,
                trial,
            } => format!("{cmd},{t},{state},{trial}"),
            Event::Done { cmd } | Event::Unknown { cmd } => format!("{cmd}"),
        }
    }
}

/// Outbound command to the rig firmware, encoded as ASCII bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `n<N>`: configure the trial count for the upcoming session.
    ConfigureTrials(u32),
    /// `d`: firmware emits plain text lines instead of binary frames.
    DebugOn,
    /// `D`: firmware emits binary frames.
    DebugOff,
    Start,
    End,
    LaserOn,
    LaserOff,
    Punishment,
    Reward,
    /// `f`: force-stop, sent on shutdown.
    ForceStop,
}

impl Command {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Command::ConfigureTrials(n) => format!("n{n}").into_bytes(),
            Command::DebugOn => b"d".to_vec(),
            Command::DebugOff => b"D".to_vec(),
            Command::Start => b"s".to_vec(),
            Command::End => b"e".to_vec(),
            Command::LaserOn => b"l".to_vec(),
            Command::LaserOff => b"L".to_vec(),
            Command::Punishment => b"p".to_vec(),
            Command::Reward => b"r".to_vec(),
            Command::ForceStop => b"f".to_vec(),
        }
    }
}
