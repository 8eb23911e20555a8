use serde::{Deserialize, Serialize};

/// Identifier of the animal running the session, used in log file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseId(pub u32);

/// Trial phase as reported by the firmware state machine.
///
/// The wire carries the phase as `cmd - 60`; codes outside this table are
/// forward-compatible no-ops for the session aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialPhase {
    Start,
    End,
    Success,
    Fail,
}

impl TrialPhase {
    pub fn from_state_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Start),
            2 => Some(Self::End),
            3 => Some(Self::Success),
            4 => Some(Self::Fail),
            _ => None,
        }
    }
}
