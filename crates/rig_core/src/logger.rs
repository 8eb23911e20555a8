//! Append-only event log: one canonical line per decoded event.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use shared::{domain::MouseId, protocol::Event};

/// Writes each event's canonical text form to a sink, flushing per line so
/// at most one undelivered line can ever be lost to a crash.
pub struct EventLogger<W: Write> {
    sink: W,
}

impl<W: Write> EventLogger<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn log(&mut self, event: &Event) -> io::Result<()> {
        writeln!(self.sink, "{}", event.log_line())?;
        self.sink.flush()
    }
}

/// Log file path for one session: `A<mouse>_<timestamp>[_laser].txt`,
/// matching the naming scheme of earlier rig hosts.
pub fn session_log_path(data_dir: &Path, mouse: MouseId, laser: bool) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let suffix = if laser { "_laser" } else { "" };
    data_dir.join(format!("A{:03}_{stamp}{suffix}.txt", mouse.0))
}
