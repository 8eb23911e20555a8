//! Headless session runner: decodes a captured (or piped) rig byte stream,
//! maintains session counters and the velocity trace, and writes the event
//! log. Stands in for the GUI host wherever a display is unavailable.

use std::{fs, fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rig_core::{
    load_settings, session_log_path, spawn_decode_loop, CommandWriter, EventLogger, SessionState,
    VelocityTrace,
};
use shared::{
    domain::MouseId,
    protocol::{Command, Event},
};
use tokio::{
    io::AsyncRead,
    sync::{mpsc, watch},
};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(about = "Replay or ingest a behavioral-rig byte stream")]
struct Args {
    /// Capture file to decode; reads stdin when omitted.
    input: Option<PathBuf>,

    /// Treat the stream as newline-delimited text (firmware debug mode).
    #[arg(long)]
    debug: bool,

    /// Mark the log as a laser-tagging block.
    #[arg(long)]
    laser: bool,

    #[arg(long)]
    mouse: Option<u32>,

    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Journal the outbound start/stop command bytes to this file instead
    /// of a live link (dry-run of the controller side).
    #[arg(long)]
    command_sink: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = load_settings();
    if args.debug {
        settings.debug = true;
    }
    if let Some(mouse) = args.mouse {
        settings.mouse_id = mouse;
    }
    if let Some(data_dir) = args.data_dir {
        settings.data_dir = data_dir;
    }

    fs::create_dir_all(&settings.data_dir)
        .with_context(|| format!("failed to create data dir {:?}", settings.data_dir))?;
    let log_path = session_log_path(&settings.data_dir, MouseId(settings.mouse_id), args.laser);
    let log_file = File::create(&log_path)
        .with_context(|| format!("failed to create event log {log_path:?}"))?;
    let mut logger = EventLogger::new(log_file);
    info!(path = %log_path.display(), "event log open");

    let mut commands = match &args.command_sink {
        Some(path) => {
            let sink = tokio::fs::File::create(path)
                .await
                .with_context(|| format!("failed to create command sink {path:?}"))?;
            let mut writer = CommandWriter::new(sink);
            writer.start_sequence(settings.n_trials, settings.debug).await?;
            Some(writer)
        }
        None => None,
    };

    let source: Box<dyn AsyncRead + Unpin + Send> = match &args.input {
        Some(path) => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open capture {path:?}"))?,
        ),
        None => Box::new(tokio::io::stdin()),
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let (stop_tx, stop_rx) = watch::channel(false);
    let decode_loop = spawn_decode_loop(source, settings.debug, tx, stop_rx);

    let mut session = SessionState::new();
    let mut trace = VelocityTrace::new(settings.speed_scale);
    while let Some(event) = rx.recv().await {
        // Log before any status branching so the log stays complete.
        logger.log(&event).context("failed to append event log")?;

        if let Event::VrSample { t, y, .. } = &event {
            trace.push(*y, *t);
            if trace.redraw_due() {
                debug!(cursor = trace.cursor(), "trace redraw due");
            }
        }
        if let Some(line) = session.apply(&event) {
            info!("{line}");
        }
        if matches!(event, Event::Done { .. }) {
            break;
        }
    }

    stop_tx.send(true).ok();
    decode_loop
        .await
        .context("decode loop panicked")?
        .context("decode loop failed")?;

    if let Some(writer) = commands.as_mut() {
        writer.stop_sequence().await?;
        writer.send(Command::ForceStop).await?;
    }

    info!(
        trials = session.trial_index,
        correct = session.correct_count,
        rewards = session.reward_count,
        "session finished"
    );
    Ok(())
}
