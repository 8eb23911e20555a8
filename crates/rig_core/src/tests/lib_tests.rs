use super::*;
use shared::protocol::SYNC_MARKER;
use tokio::io::AsyncWriteExt;

fn session_capture() -> Vec<u8> {
    let mut bytes = Vec::new();
    // trial 1 start
    bytes.extend_from_slice(&[SYNC_MARKER, 61]);
    bytes.extend_from_slice(&5_000_000u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 2]);
    // locomotion sample
    bytes.extend_from_slice(&[SYNC_MARKER, 35]);
    bytes.extend_from_slice(&5_100_000u32.to_le_bytes());
    bytes.extend_from_slice(&82u16.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 4]);
    // reward
    bytes.extend_from_slice(&[SYNC_MARKER, 80]);
    bytes.extend_from_slice(&5_200_000u32.to_le_bytes());
    // done
    bytes.extend_from_slice(&[SYNC_MARKER, 99]);
    bytes
}

#[tokio::test]
async fn decode_loop_preserves_event_order_end_to_end() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (_stop_tx, stop_rx) = watch::channel(false);
    let handle = spawn_decode_loop(std::io::Cursor::new(session_capture()), false, tx, stop_rx);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    handle.await.expect("join").expect("decode loop");

    assert_eq!(
        events,
        vec![
            Event::TrialState {
                cmd: 61,
                t: 5_000_000,
                state: 1,
                trial: 1
            },
            Event::VrSample {
                cmd: 35,
                t: 5_100_000,
                y: 82
            },
            Event::Reward {
                cmd: 80,
                t: 5_200_000
            },
            Event::Done { cmd: 99 },
        ]
    );
}

#[tokio::test]
async fn consumer_state_tracks_a_replayed_session() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (_stop_tx, stop_rx) = watch::channel(false);
    let handle = spawn_decode_loop(std::io::Cursor::new(session_capture()), false, tx, stop_rx);

    let mut log = Vec::new();
    let mut session = SessionState::new();
    let mut trace = VelocityTrace::new(0.082);
    {
        let mut logger = EventLogger::new(&mut log);
        while let Some(event) = rx.recv().await {
            logger.log(&event).expect("log");
            if let Event::VrSample { t, y, .. } = &event {
                trace.push(*y, *t);
            }
            session.apply(&event);
        }
    }
    handle.await.expect("join").expect("decode loop");

    assert_eq!(session.trial_index, 1);
    assert_eq!(session.reward_count, 1);
    assert_eq!(session.correct_count, 0);
    assert_eq!(trace.cursor(), 1);
    assert!((trace.samples()[0] - 100.0).abs() < 1e-9);
    assert_eq!(
        String::from_utf8(log).expect("utf8"),
        "61,5000000,1,1\n35,5100000,82\n80,5200000\n99\n"
    );
}

#[tokio::test]
async fn truncated_stream_fails_through_join_handle() {
    // Reward frame cut after two payload bytes.
    let bytes = vec![SYNC_MARKER, 80, 0x01, 0x02];
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (_stop_tx, stop_rx) = watch::channel(false);
    let handle = spawn_decode_loop(std::io::Cursor::new(bytes), false, tx, stop_rx);

    assert_eq!(rx.recv().await, None);
    let result = handle.await.expect("join");
    assert!(matches!(
        result,
        Err(DecodeError::TruncatedFrame {
            cmd: 80,
            needed: 4,
            got: 2
        })
    ));
}

#[tokio::test]
async fn stop_flag_ends_loop_on_idle_source() {
    // A duplex pipe with no writer activity parks the decoder mid-poll.
    let (client, mut server) = tokio::io::duplex(64);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (stop_tx, stop_rx) = watch::channel(false);
    let handle = spawn_decode_loop(client, false, tx, stop_rx);

    // One complete frame flows through before the stop request.
    server
        .write_all(&[SYNC_MARKER, 99])
        .await
        .expect("write");
    assert_eq!(rx.recv().await, Some(Event::Done { cmd: 99 }));

    stop_tx.send(true).expect("stop");
    handle.await.expect("join").expect("loop result");
    assert_eq!(rx.recv().await, None);
}

#[tokio::test]
async fn republished_false_stop_leaves_a_frame_in_flight_intact() {
    let (client, mut server) = tokio::io::duplex(64);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (stop_tx, stop_rx) = watch::channel(false);
    let handle = spawn_decode_loop(client, false, tx, stop_rx);

    // Park the decoder inside a frame: marker delivered, command byte pending.
    server.write_all(&[SYNC_MARKER]).await.expect("write");
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    stop_tx.send(false).expect("publish");
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    server.write_all(&[99]).await.expect("write");

    assert_eq!(rx.recv().await, Some(Event::Done { cmd: 99 }));
    stop_tx.send(true).expect("stop");
    handle.await.expect("join").expect("loop result");
}

#[tokio::test]
async fn dropping_the_receiver_stops_the_loop() {
    let (client, mut server) = tokio::io::duplex(64);
    let (tx, rx) = mpsc::unbounded_channel();
    let (_stop_tx, stop_rx) = watch::channel(false);
    let handle = spawn_decode_loop(client, false, tx, stop_rx);

    drop(rx);
    // The loop notices the closed channel when the next event arrives.
    server
        .write_all(&[SYNC_MARKER, 99])
        .await
        .expect("write");
    handle.await.expect("join").expect("loop result");
}
