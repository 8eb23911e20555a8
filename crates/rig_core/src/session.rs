//! Session aggregator: running counters plus human-readable status lines.

use shared::{
    domain::TrialPhase,
    protocol::{Event, LASER_TAGGING_DONE},
};

/// Counters for one session. Mutated only through [`SessionState::apply`];
/// the UI reads these, it never writes them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub trial_index: u32,
    pub state_index: u8,
    pub correct_count: u32,
    pub reward_count: u32,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every counter; called when a new session starts.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fold one event into the counters, returning a status line when the
    /// event is worth showing to the operator.
    ///
    /// Status-line branching never gates logging: callers hand every event
    /// to the log before dispatching here.
    pub fn apply(&mut self, event: &Event) -> Option<String> {
        match event {
            Event::TrialState {
                t, state, trial, ..
            } => {
                self.trial_index = u32::from(*trial);
                self.state_index = *state;
                let secs = f64::from(*t) / 1e6;
                match TrialPhase::from_state_code(*state) {
                    Some(TrialPhase::Start) => Some(format!("{secs:.1}: {trial}, trial start")),
                    Some(TrialPhase::End) => Some(format!("{secs:.1}: {trial}, trial end")),
                    Some(TrialPhase::Success) => {
                        self.correct_count += 1;
                        Some(format!("{secs:.1}: {trial}, trial success"))
                    }
                    // The firmware sends a spurious fail at trial 0 before
                    // the first real trial; suppress it.
                    Some(TrialPhase::Fail) if *trial > 0 => {
                        Some(format!("{secs:.1}: {trial}, trial fail"))
                    }
                    Some(TrialPhase::Fail) => None,
                    None => None,
                }
            }
            Event::Reward { t, .. } => {
                self.reward_count += 1;
                let secs = f64::from(*t) / 1e6;
                Some(format!("{secs:.1}: reward"))
            }
            Event::Laser { cmd, .. } if *cmd == LASER_TAGGING_DONE => {
                Some("Tagging finished".to_string())
            }
            Event::Laser { .. } => None,
            Event::Done { .. } => Some("Task finished".to_string()),
            // Never dropped silently; the operator should see these even
            // though they change no counter.
            Event::Unknown { cmd } => Some(format!("unknown cmd {cmd}")),
            Event::Debug { line } | Event::NonBinaryLine { line } => Some(line.clone()),
            Event::VrSample { .. } | Event::Sync { .. } => None,
        }
    }
}
